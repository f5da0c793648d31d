//! Ready-made conversion chain from one stream format to another.
//!
//! [`ConversionPipeline`] wires the node library into the graph a stream
//! needs when its producer and consumer disagree on layout:
//!
//! ```text
//! source(input format)
//!   -> channel conversion         (if channel counts differ)
//!   -> SampleRateConverter        (if sample rates differ)
//!   -> RampLinear                 (gain)
//!   -> ClipToRange | Limiter      (per Clipping)
//!   -> sink(output format)
//! ```
//!
//! # Example
//!
//! ```rust
//! use flowline_core::pipeline::{ConversionPipeline, PipelineConfig, SampleBuffer, StreamFormat};
//! use flowline_core::SampleFormatKind;
//!
//! let config = PipelineConfig {
//!     input: StreamFormat::new(1, 44_100, SampleFormatKind::I16),
//!     output: StreamFormat::new(2, 48_000, SampleFormatKind::F32),
//!     ..PipelineConfig::default()
//! };
//! let mut pipeline = ConversionPipeline::new(config)?;
//! pipeline.bind_input(SampleBuffer::I16(vec![0; 441]))?;
//!
//! let mut out = SampleBuffer::zeroed(SampleFormatKind::F32, 2 * 512);
//! let frames = pipeline.read(&mut out, 512)?;
//! assert!((479..=481).contains(&frames));
//! # Ok::<(), flowline_core::pipeline::PipelineError>(())
//! ```

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use flowline_resampler::{Quality, ResamplerError, ResamplerKind};

use crate::convert::{F32, I16, I24Packed, I32, SampleFormat, SampleFormatKind};
use crate::graph::{FlowGraph, GraphError, NodeId, OutputPort};
use crate::nodes::{
    ChannelCountConverter, ClipToRange, DEFAULT_RAMP_FRAMES, Limiter, MonoToMultiConverter,
    MultiToMonoConverter, RampLinear, RampTarget, SampleRateConverter, Sink, SourceBuffered,
};

/// Block size of a pipeline graph unless configured otherwise.
pub const DEFAULT_PIPELINE_BLOCK_SIZE: usize = 256;

/// Errors from building or driving a [`ConversionPipeline`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PipelineError {
    /// Wiring the graph failed.
    Graph(GraphError),
    /// The resampler could not be built.
    Resampler(ResamplerError),
    /// A stream format has no channels.
    ZeroChannels,
    /// A stream format has a sample rate of 0.
    ZeroSampleRate,
    /// A buffer is not in the format the pipeline was built for.
    FormatMismatch {
        /// Format the pipeline expects.
        expected: SampleFormatKind,
        /// Format of the buffer passed in.
        found: SampleFormatKind,
    },
}

impl core::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Graph(e) => write!(f, "graph error: {e}"),
            Self::Resampler(e) => write!(f, "resampler error: {e}"),
            Self::ZeroChannels => write!(f, "stream format needs at least one channel"),
            Self::ZeroSampleRate => write!(f, "stream format needs a non-zero sample rate"),
            Self::FormatMismatch { expected, found } => {
                write!(f, "expected a {expected} buffer, got {found}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PipelineError {}

impl From<GraphError> for PipelineError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

impl From<ResamplerError> for PipelineError {
    fn from(e: ResamplerError) -> Self {
        Self::Resampler(e)
    }
}

/// Channel count, rate and wire format of one end of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    /// Samples per frame.
    pub channels: usize,
    /// Frames per second.
    pub sample_rate: u32,
    /// Wire format.
    pub format: SampleFormatKind,
}

impl StreamFormat {
    /// Creates a stream format.
    pub const fn new(channels: usize, sample_rate: u32, format: SampleFormatKind) -> Self {
        Self {
            channels,
            sample_rate,
            format,
        }
    }
}

impl Default for StreamFormat {
    fn default() -> Self {
        Self::new(2, 48_000, SampleFormatKind::F32)
    }
}

/// Protection stage before the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clipping {
    /// [`ClipToRange`] for float output; nothing for integer output, whose
    /// encoder already saturates.
    #[default]
    Auto,
    /// Always [`ClipToRange`] at its default headroom.
    Clip,
    /// Always [`Limiter`].
    Limit,
    /// No protection stage.
    Off,
}

impl Clipping {
    /// All modes.
    pub const ALL: [Clipping; 4] = [Clipping::Auto, Clipping::Clip, Clipping::Limit, Clipping::Off];

    /// Lower-case name: `auto`, `clip`, `limit`, `off`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Clip => "clip",
            Self::Limit => "limit",
            Self::Off => "off",
        }
    }

    /// Parses a name produced by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    fn resolve(self, output: SampleFormatKind) -> Self {
        match self {
            Self::Auto if output.is_integer() => Self::Off,
            Self::Auto => Self::Clip,
            other => other,
        }
    }
}

/// Everything [`ConversionPipeline::new`] needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Format of the buffers bound as input.
    pub input: StreamFormat,
    /// Format of the buffers read as output.
    pub output: StreamFormat,
    /// Resampler quality, used only when the rates differ.
    pub quality: Quality,
    /// Frames per graph block.
    pub block_size: usize,
    /// Length of gain ramps.
    pub ramp_frames: usize,
    /// Linear gain applied from the first frame.
    pub initial_gain: f32,
    /// Protection stage before the sink.
    pub clipping: Clipping,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: StreamFormat::default(),
            output: StreamFormat::default(),
            quality: Quality::default(),
            block_size: DEFAULT_PIPELINE_BLOCK_SIZE,
            ramp_frames: DEFAULT_RAMP_FRAMES,
            initial_gain: 1.0,
            clipping: Clipping::default(),
        }
    }
}

/// An interleaved buffer in any supported wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    /// 32-bit float samples.
    F32(Vec<f32>),
    /// 16-bit samples.
    I16(Vec<i16>),
    /// Packed little-endian 24-bit samples, 3 bytes each.
    I24Packed(Vec<u8>),
    /// 32-bit samples.
    I32(Vec<i32>),
}

impl SampleBuffer {
    /// An empty buffer of format `kind`.
    pub fn new(kind: SampleFormatKind) -> Self {
        Self::zeroed(kind, 0)
    }

    /// `samples` zero samples of format `kind`.
    pub fn zeroed(kind: SampleFormatKind, samples: usize) -> Self {
        match kind {
            SampleFormatKind::F32 => Self::F32(vec![0.0; samples]),
            SampleFormatKind::I16 => Self::I16(vec![0; samples]),
            SampleFormatKind::I24Packed => Self::I24Packed(vec![0; samples * 3]),
            SampleFormatKind::I32 => Self::I32(vec![0; samples]),
        }
    }

    /// Wire format of the buffer.
    pub fn kind(&self) -> SampleFormatKind {
        match self {
            Self::F32(_) => SampleFormatKind::F32,
            Self::I16(_) => SampleFormatKind::I16,
            Self::I24Packed(_) => SampleFormatKind::I24Packed,
            Self::I32(_) => SampleFormatKind::I32,
        }
    }

    /// Number of whole samples held.
    pub fn len_samples(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I24Packed(v) => v.len() / 3,
            Self::I32(v) => v.len(),
        }
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len_samples() == 0
    }

    /// Number of whole frames of `channels` samples held.
    pub fn frames(&self, channels: usize) -> usize {
        if channels == 0 {
            0
        } else {
            self.len_samples() / channels
        }
    }

    /// Keeps only the first `samples` samples.
    pub fn truncate(&mut self, samples: usize) {
        match self {
            Self::F32(v) => v.truncate(samples),
            Self::I16(v) => v.truncate(samples),
            Self::I24Packed(v) => v.truncate(samples * 3),
            Self::I32(v) => v.truncate(samples),
        }
    }
}

/// A [`FlowGraph`] wired to convert one [`StreamFormat`] into another.
pub struct ConversionPipeline {
    graph: FlowGraph,
    config: PipelineConfig,
    chain: Vec<NodeId>,
    source: NodeId,
    sink: NodeId,
    resampler: Option<NodeId>,
    gain: RampTarget,
}

impl ConversionPipeline {
    /// Builds the graph for `config`.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let PipelineConfig { input, output, .. } = config;
        if input.channels == 0 || output.channels == 0 {
            return Err(PipelineError::ZeroChannels);
        }
        if input.sample_rate == 0 || output.sample_rate == 0 {
            return Err(PipelineError::ZeroSampleRate);
        }

        let mut graph = FlowGraph::with_block_size(config.block_size);
        let source = match input.format {
            SampleFormatKind::F32 => graph.add_node(SourceBuffered::<F32>::new(input.channels)),
            SampleFormatKind::I16 => graph.add_node(SourceBuffered::<I16>::new(input.channels)),
            SampleFormatKind::I24Packed => {
                graph.add_node(SourceBuffered::<I24Packed>::new(input.channels))
            }
            SampleFormatKind::I32 => graph.add_node(SourceBuffered::<I32>::new(input.channels)),
        }?;
        let mut chain = vec![source];
        let mut tail = source.output(0);

        if input.channels != output.channels {
            let node = if input.channels == 1 {
                graph.add_node(MonoToMultiConverter::new(output.channels))
            } else if output.channels == 1 {
                graph.add_node(MultiToMonoConverter::new(input.channels))
            } else {
                graph.add_node(ChannelCountConverter::new(input.channels, output.channels))
            }?;
            tail = append(&mut graph, &mut chain, tail, node)?;
        }

        let mut resampler = None;
        if input.sample_rate != output.sample_rate {
            let src = SampleRateConverter::make(
                output.channels,
                input.sample_rate,
                output.sample_rate,
                config.quality,
            )?;
            let node = graph.add_node(src)?;
            tail = append(&mut graph, &mut chain, tail, node)?;
            resampler = Some(node);
        }

        let gain = RampTarget::new(config.initial_gain);
        let mut ramp = RampLinear::with_target(output.channels, gain.clone());
        ramp.set_length_in_frames(config.ramp_frames);
        let node = graph.add_node(ramp)?;
        tail = append(&mut graph, &mut chain, tail, node)?;

        match config.clipping.resolve(output.format) {
            Clipping::Clip => {
                let node = graph.add_node(ClipToRange::new(output.channels))?;
                tail = append(&mut graph, &mut chain, tail, node)?;
            }
            Clipping::Limit => {
                let node = graph.add_node(Limiter::new(output.channels))?;
                tail = append(&mut graph, &mut chain, tail, node)?;
            }
            Clipping::Auto | Clipping::Off => {}
        }

        let sink = match output.format {
            SampleFormatKind::F32 => graph.add_node(Sink::<F32>::new(output.channels)),
            SampleFormatKind::I16 => graph.add_node(Sink::<I16>::new(output.channels)),
            SampleFormatKind::I24Packed => graph.add_node(Sink::<I24Packed>::new(output.channels)),
            SampleFormatKind::I32 => graph.add_node(Sink::<I32>::new(output.channels)),
        }?;
        append(&mut graph, &mut chain, tail, sink)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "pipeline: {}ch {}Hz {} -> {}ch {}Hz {}, {} nodes",
            input.channels,
            input.sample_rate,
            input.format,
            output.channels,
            output.sample_rate,
            output.format,
            chain.len()
        );

        Ok(Self {
            graph,
            config,
            chain,
            source,
            sink,
            resampler,
            gain,
        })
    }

    /// The configuration the pipeline was built from.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The underlying graph.
    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// Names of the nodes from source to sink.
    pub fn node_names(&self) -> Vec<&'static str> {
        self.chain
            .iter()
            .filter_map(|&id| self.graph.node_name(id).ok())
            .collect()
    }

    /// Interpolator of the sample-rate stage, if the rates differ.
    pub fn resampler_kind(&self) -> Option<ResamplerKind> {
        let id = self.resampler?;
        self.graph
            .node::<SampleRateConverter>(id)
            .ok()
            .map(SampleRateConverter::kind)
    }

    /// Handle for changing the gain, from any thread.
    pub fn gain_handle(&self) -> RampTarget {
        self.gain.clone()
    }

    /// Ramps to a new linear gain.
    pub fn set_gain(&self, gain: f32) {
        self.gain.set(gain);
    }

    /// Output frames that `input_frames` input frames turn into, rounded up.
    ///
    /// After [`finish`](Self::finish) this includes the flushed resampler
    /// tail.
    pub fn expected_output_frames(&self, input_frames: usize) -> usize {
        let input_rate = self.config.input.sample_rate as u64;
        let output_rate = self.config.output.sample_rate as u64;
        let frames = (input_frames + self.tail_input_frames()) as u64;
        (frames * output_rate).div_ceil(input_rate) as usize
    }

    /// Declares the bound input to be the end of the stream.
    ///
    /// Once it runs out, reads flush the resampler's filter tail instead of
    /// stopping, so the last input frames reach the output. Without a
    /// sample-rate stage there is nothing to flush. [`reset`](Self::reset)
    /// clears it.
    pub fn finish(&mut self) {
        self.set_draining(true);
    }

    /// Whether [`finish`](Self::finish) was called since the last reset.
    pub fn is_finished(&self) -> bool {
        self.resampler
            .and_then(|id| self.graph.node::<SampleRateConverter>(id).ok())
            .is_some_and(SampleRateConverter::is_draining)
    }

    fn set_draining(&mut self, draining: bool) {
        if let Some(id) = self.resampler
            && let Ok(node) = self.graph.node_mut::<SampleRateConverter>(id)
        {
            node.set_draining(draining);
        }
    }

    fn tail_input_frames(&self) -> usize {
        self.resampler
            .and_then(|id| self.graph.node::<SampleRateConverter>(id).ok())
            .filter(|node| node.is_draining())
            .map_or(0, |node| node.resampler().latency_frames())
    }

    /// Binds a new input buffer and rewinds.
    ///
    /// Returns the previously bound buffer.
    pub fn bind_input(&mut self, buffer: SampleBuffer) -> Result<SampleBuffer, PipelineError> {
        expect_format(self.config.input.format, buffer.kind())?;
        let channels = self.config.input.channels;
        let frames = buffer.frames(channels);
        let source = self.source;
        let graph = &mut self.graph;
        Ok(match buffer {
            SampleBuffer::F32(v) => SampleBuffer::F32(bind::<F32>(graph, source, v, frames)?),
            SampleBuffer::I16(v) => SampleBuffer::I16(bind::<I16>(graph, source, v, frames)?),
            SampleBuffer::I24Packed(v) => {
                SampleBuffer::I24Packed(bind::<I24Packed>(graph, source, v, frames)?)
            }
            SampleBuffer::I32(v) => SampleBuffer::I32(bind::<I32>(graph, source, v, frames)?),
        })
    }

    /// Unbinds and returns the input buffer.
    pub fn take_input(&mut self) -> Result<SampleBuffer, PipelineError> {
        let source = self.source;
        let graph = &mut self.graph;
        Ok(match self.config.input.format {
            SampleFormatKind::F32 => SampleBuffer::F32(take::<F32>(graph, source)?),
            SampleFormatKind::I16 => SampleBuffer::I16(take::<I16>(graph, source)?),
            SampleFormatKind::I24Packed => {
                SampleBuffer::I24Packed(take::<I24Packed>(graph, source)?)
            }
            SampleFormatKind::I32 => SampleBuffer::I32(take::<I32>(graph, source)?),
        })
    }

    /// Input frames not yet consumed.
    pub fn input_frames_remaining(&self) -> usize {
        fn remaining<F: SampleFormat>(graph: &FlowGraph, id: NodeId) -> usize {
            graph
                .node::<SourceBuffered<F>>(id)
                .map_or(0, SourceBuffered::frames_remaining)
        }
        match self.config.input.format {
            SampleFormatKind::F32 => remaining::<F32>(&self.graph, self.source),
            SampleFormatKind::I16 => remaining::<I16>(&self.graph, self.source),
            SampleFormatKind::I24Packed => remaining::<I24Packed>(&self.graph, self.source),
            SampleFormatKind::I32 => remaining::<I32>(&self.graph, self.source),
        }
    }

    /// Converts up to `frames` frames into the front of `dest`.
    ///
    /// Returns the frames written; fewer than requested means the input is
    /// used up. `frames` is clamped to what `dest` holds.
    pub fn read(&mut self, dest: &mut SampleBuffer, frames: usize) -> Result<usize, PipelineError> {
        expect_format(self.config.output.format, dest.kind())?;
        let sink = self.sink;
        let graph = &mut self.graph;
        let frames = match dest {
            SampleBuffer::F32(v) => graph.read::<F32>(sink, v, frames)?,
            SampleBuffer::I16(v) => graph.read::<I16>(sink, v, frames)?,
            SampleBuffer::I24Packed(v) => graph.read::<I24Packed>(sink, v, frames)?,
            SampleBuffer::I32(v) => graph.read::<I32>(sink, v, frames)?,
        };
        Ok(frames)
    }

    /// Returns every node to its initial state, including resampler
    /// history, and undoes [`finish`](Self::finish). The bound input stays
    /// bound but is not rewound.
    pub fn reset(&mut self) {
        self.graph.pull_reset(self.sink);
        self.set_draining(false);
    }
}

fn expect_format(expected: SampleFormatKind, found: SampleFormatKind) -> Result<(), PipelineError> {
    if expected == found {
        Ok(())
    } else {
        Err(PipelineError::FormatMismatch { expected, found })
    }
}

fn bind<F: SampleFormat>(
    graph: &mut FlowGraph,
    source: NodeId,
    data: Vec<F::Sample>,
    frames: usize,
) -> Result<Vec<F::Sample>, GraphError> {
    Ok(graph
        .node_mut::<SourceBuffered<F>>(source)?
        .set_data(data, frames))
}

fn take<F: SampleFormat>(
    graph: &mut FlowGraph,
    source: NodeId,
) -> Result<Vec<F::Sample>, GraphError> {
    Ok(graph.node_mut::<SourceBuffered<F>>(source)?.take_data())
}

fn append(
    graph: &mut FlowGraph,
    chain: &mut Vec<NodeId>,
    tail: OutputPort,
    node: NodeId,
) -> Result<OutputPort, GraphError> {
    graph.connect(tail, node.input(0))?;
    chain.push(node);
    Ok(node.output(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(input: StreamFormat, output: StreamFormat) -> PipelineConfig {
        PipelineConfig {
            input,
            output,
            block_size: 64,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn identity_chain_is_source_ramp_clip_sink() {
        let format = StreamFormat::default();
        let pipeline = ConversionPipeline::new(config(format, format)).unwrap();
        assert_eq!(
            pipeline.node_names(),
            ["SourceFloat", "RampLinear", "ClipToRange", "SinkFloat"]
        );
        assert_eq!(pipeline.resampler_kind(), None);
    }

    #[test]
    fn full_chain_for_layout_and_rate_change() {
        let pipeline = ConversionPipeline::new(config(
            StreamFormat::new(1, 44_100, SampleFormatKind::I16),
            StreamFormat::new(2, 48_000, SampleFormatKind::I24Packed),
        ))
        .unwrap();
        assert_eq!(
            pipeline.node_names(),
            [
                "SourceI16",
                "MonoToMultiConverter",
                "SampleRateConverter",
                "RampLinear",
                "SinkI24"
            ]
        );
        assert_eq!(
            pipeline.resampler_kind(),
            Some(ResamplerKind::PolyphaseStereo)
        );
    }

    #[test]
    fn limiter_replaces_clipper_on_request() {
        let mut cfg = config(
            StreamFormat::new(4, 48_000, SampleFormatKind::F32),
            StreamFormat::new(2, 48_000, SampleFormatKind::I16),
        );
        cfg.clipping = Clipping::Limit;
        let pipeline = ConversionPipeline::new(cfg).unwrap();
        assert_eq!(
            pipeline.node_names(),
            ["SourceFloat", "ChannelCountConverter", "RampLinear", "Limiter", "SinkI16"]
        );
    }

    #[test]
    fn rejects_degenerate_formats() {
        let zero_channels = StreamFormat::new(0, 48_000, SampleFormatKind::F32);
        assert_eq!(
            ConversionPipeline::new(config(zero_channels, StreamFormat::default())).err(),
            Some(PipelineError::ZeroChannels)
        );
        let zero_rate = StreamFormat::new(2, 0, SampleFormatKind::F32);
        assert_eq!(
            ConversionPipeline::new(config(StreamFormat::default(), zero_rate)).err(),
            Some(PipelineError::ZeroSampleRate)
        );
    }

    #[test]
    fn converts_i16_to_f32_with_gain() {
        let mut cfg = config(
            StreamFormat::new(2, 48_000, SampleFormatKind::I16),
            StreamFormat::new(2, 48_000, SampleFormatKind::F32),
        );
        cfg.initial_gain = 0.5;
        let mut pipeline = ConversionPipeline::new(cfg).unwrap();
        pipeline
            .bind_input(SampleBuffer::I16(vec![16384; 200]))
            .unwrap();
        assert_eq!(pipeline.input_frames_remaining(), 100);

        let mut out = SampleBuffer::zeroed(SampleFormatKind::F32, 400);
        assert_eq!(pipeline.read(&mut out, 200).unwrap(), 100);
        let SampleBuffer::F32(samples) = &out else {
            unreachable!()
        };
        assert!(samples[..200].iter().all(|&s| s == 0.25));
        assert_eq!(pipeline.input_frames_remaining(), 0);
    }

    #[test]
    fn wrong_buffer_format_is_rejected() {
        let mut pipeline = ConversionPipeline::new(PipelineConfig::default()).unwrap();
        let err = pipeline.bind_input(SampleBuffer::I16(vec![0; 4])).unwrap_err();
        assert_eq!(
            err,
            PipelineError::FormatMismatch {
                expected: SampleFormatKind::F32,
                found: SampleFormatKind::I16
            }
        );
        let mut out = SampleBuffer::zeroed(SampleFormatKind::I32, 4);
        assert!(pipeline.read(&mut out, 2).is_err());
    }

    #[test]
    fn bind_returns_previous_input() {
        let mut pipeline = ConversionPipeline::new(PipelineConfig::default()).unwrap();
        let first = pipeline.bind_input(SampleBuffer::F32(vec![0.1; 8])).unwrap();
        assert!(first.is_empty());
        let second = pipeline.bind_input(SampleBuffer::F32(vec![0.2; 4])).unwrap();
        assert_eq!(second, SampleBuffer::F32(vec![0.1; 8]));
        assert_eq!(pipeline.take_input().unwrap(), SampleBuffer::F32(vec![0.2; 4]));
    }

    #[test]
    fn gain_change_ramps() {
        let format = StreamFormat::new(1, 48_000, SampleFormatKind::F32);
        let mut cfg = config(format, format);
        cfg.ramp_frames = 4;
        let mut pipeline = ConversionPipeline::new(cfg).unwrap();
        pipeline.bind_input(SampleBuffer::F32(vec![1.0; 16])).unwrap();

        let mut out = SampleBuffer::zeroed(SampleFormatKind::F32, 16);
        assert_eq!(pipeline.read(&mut out, 4).unwrap(), 4);
        pipeline.gain_handle().set(0.0);
        assert_eq!(pipeline.read(&mut out, 8).unwrap(), 8);
        let SampleBuffer::F32(samples) = &out else {
            unreachable!()
        };
        assert_eq!(&samples[..8], &[1.0, 0.75, 0.5, 0.25, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn expected_output_frames_rounds_up() {
        let pipeline = ConversionPipeline::new(config(
            StreamFormat::new(2, 44_100, SampleFormatKind::F32),
            StreamFormat::new(2, 48_000, SampleFormatKind::F32),
        ))
        .unwrap();
        assert_eq!(pipeline.expected_output_frames(44_100), 48_000);
        assert_eq!(pipeline.expected_output_frames(1), 2);
    }

    #[test]
    fn finish_flushes_the_resampler_tail() {
        let mut pipeline = ConversionPipeline::new(config(
            StreamFormat::new(1, 44_100, SampleFormatKind::F32),
            StreamFormat::new(1, 48_000, SampleFormatKind::F32),
        ))
        .unwrap();
        let mut input = vec![0.0; 441];
        input[440] = 0.5;
        pipeline.bind_input(SampleBuffer::F32(input)).unwrap();
        pipeline.finish();
        assert!(pipeline.is_finished());

        // 441 frames plus the 4-frame tail of the 8-tap kernel.
        let expected = pipeline.expected_output_frames(441);
        assert_eq!(expected, 485);
        let mut out = SampleBuffer::zeroed(SampleFormatKind::F32, 600);
        assert_eq!(pipeline.read(&mut out, 600).unwrap(), expected);
        assert_eq!(pipeline.read(&mut out, 600).unwrap(), 0);

        let SampleBuffer::F32(samples) = &out else {
            unreachable!()
        };
        let tail_peak = samples[470..expected]
            .iter()
            .fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!(tail_peak > 0.2, "tail peak {tail_peak}");

        pipeline.reset();
        assert!(!pipeline.is_finished());
        assert_eq!(pipeline.expected_output_frames(441), 480);
    }

    #[test]
    fn finish_without_resampler_changes_nothing() {
        let format = StreamFormat::new(1, 48_000, SampleFormatKind::F32);
        let mut pipeline = ConversionPipeline::new(config(format, format)).unwrap();
        pipeline.bind_input(SampleBuffer::F32(vec![0.5; 10])).unwrap();
        pipeline.finish();
        assert!(!pipeline.is_finished());
        let mut out = SampleBuffer::zeroed(SampleFormatKind::F32, 32);
        assert_eq!(pipeline.read(&mut out, 32).unwrap(), 10);
    }

    #[test]
    fn clipping_names_round_trip() {
        for mode in Clipping::ALL {
            assert_eq!(Clipping::from_name(mode.name()), Some(mode));
        }
        assert_eq!(Clipping::from_name("loud"), None);
    }
}
