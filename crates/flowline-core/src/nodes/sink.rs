//! Sink nodes and [`FlowGraph::read`], the only way to run a graph.

use core::marker::PhantomData;

use crate::convert::{F32, I16, I24Packed, I32, SampleFormat, SampleFormatKind};
use crate::graph::{FlowGraph, FlowNode, GraphError, NodeId, ProcessContext};

/// Terminal node that exposes its single input to [`FlowGraph::read`],
/// encoded as wire format `F`.
pub struct Sink<F: SampleFormat> {
    channels: usize,
    _format: PhantomData<F>,
}

/// `f32` sink.
pub type SinkFloat = Sink<F32>;
/// `i16` sink.
pub type SinkI16 = Sink<I16>;
/// Packed 24-bit sink.
pub type SinkI24 = Sink<I24Packed>;
/// `i32` sink.
pub type SinkI32 = Sink<I32>;

impl<F: SampleFormat> Sink<F> {
    /// Creates a sink with `channels` samples per frame.
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            _format: PhantomData,
        }
    }

    /// Samples per frame.
    pub fn channel_count(&self) -> usize {
        self.channels
    }
}

impl<F: SampleFormat> FlowNode for Sink<F> {
    fn name(&self) -> &'static str {
        match F::KIND {
            SampleFormatKind::F32 => "SinkFloat",
            SampleFormatKind::I16 => "SinkI16",
            SampleFormatKind::I24Packed => "SinkI24",
            SampleFormatKind::I32 => "SinkI32",
        }
    }

    fn input_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn output_channels(&self) -> &[usize] {
        &[]
    }

    fn process(&mut self, _ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        frames
    }
}

impl FlowGraph {
    /// Runs the graph until `frames` frames have been written to `dest`
    /// or a pull delivers nothing.
    ///
    /// `sink` must be a [`Sink<F>`]. Each loop iteration mints the sink's
    /// next call count, pulls at most one block, and encodes it into
    /// `dest`. Returns the frames written; fewer than requested means the
    /// upstream ran dry. `frames` is clamped to what `dest` can hold.
    pub fn read<F: SampleFormat>(
        &mut self,
        sink: NodeId,
        dest: &mut [F::Sample],
        frames: usize,
    ) -> Result<usize, GraphError> {
        let channels = self.node::<Sink<F>>(sink)?.channel_count();
        let units_per_frame = channels * F::UNITS_PER_SAMPLE;
        if units_per_frame == 0 {
            return Ok(0);
        }
        let frames = frames.min(dest.len() / units_per_frame);
        let mut delivered = 0;
        while delivered < frames {
            let call_count = self.nodes[sink.slot()].last_call_count + 1;
            let pulled = self.pull_data(sink, frames - delivered, call_count);
            if pulled == 0 {
                break;
            }
            let signal = self.input_buffer(sink, 0);
            let samples = (pulled * channels).min(signal.len());
            let start = delivered * units_per_frame;
            F::encode(
                &signal[..samples],
                &mut dest[start..start + pulled * units_per_frame],
            );
            delivered += pulled;
        }
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::SourceFloat;

    fn chain(frames: usize) -> (FlowGraph, NodeId, NodeId) {
        let mut graph = FlowGraph::new();
        let source = graph.add_node(SourceFloat::new(2)).unwrap();
        let sink = graph.add_node(SinkI16::new(2)).unwrap();
        graph.connect(source.output(0), sink.input(0)).unwrap();
        let data = (0..frames * 2).map(|i| i as f32 / 64.0).collect();
        graph
            .node_mut::<SourceFloat>(source)
            .unwrap()
            .set_data(data, frames);
        (graph, source, sink)
    }

    #[test]
    fn read_loops_over_blocks() {
        let (mut graph, _, sink) = chain(20);
        let mut dest = [0i16; 40];
        assert_eq!(graph.read::<I16>(sink, &mut dest, 20).unwrap(), 20);
        assert_eq!(dest[1], 512);
        assert_eq!(dest[39], 39 * 512);
    }

    #[test]
    fn read_stops_at_end_of_stream() {
        let (mut graph, _, sink) = chain(5);
        let mut dest = [-1i16; 40];
        assert_eq!(graph.read::<I16>(sink, &mut dest, 20).unwrap(), 5);
        assert_eq!(dest[10], -1);
        assert_eq!(graph.read::<I16>(sink, &mut dest, 20).unwrap(), 0);
    }

    #[test]
    fn read_clamps_to_destination() {
        let (mut graph, _, sink) = chain(20);
        let mut dest = [0i16; 6];
        assert_eq!(graph.read::<I16>(sink, &mut dest, 20).unwrap(), 3);
    }

    #[test]
    fn read_checks_sink_format() {
        let (mut graph, source, sink) = chain(4);
        let mut dest = [0.0f32; 8];
        assert!(matches!(
            graph.read::<F32>(sink, &mut dest, 4),
            Err(GraphError::WrongNodeType { found: "SinkI16", .. })
        ));
        assert!(graph.read::<F32>(source, &mut dest, 4).is_err());
    }

    #[test]
    fn each_read_advances_the_call_count() {
        let (mut graph, _, sink) = chain(20);
        let mut dest = [0i16; 40];
        graph.read::<I16>(sink, &mut dest, 20).unwrap();
        // 20 frames at 8 per block: three pulls.
        assert_eq!(graph.last_call_count(sink).unwrap(), 2);
    }
}
