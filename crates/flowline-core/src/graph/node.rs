//! Node identity, the [`FlowNode`] processing trait, and per-node scheduler
//! state.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec, vec::Vec};

use core::any::Any;

use super::context::ProcessContext;
use super::port::{InputPort, InputSlot, OutputPort};

/// Sentinel call count for a node that has not been pulled since it was
/// created or reset.
pub const INITIAL_CALL_COUNT: i64 = -1;

/// Identifier of a node in a [`FlowGraph`](super::FlowGraph).
///
/// Assigned sequentially by [`add_node`](super::FlowGraph::add_node) and
/// valid for the lifetime of the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    /// Address of this node's output port `index`.
    #[inline]
    pub fn output(self, index: usize) -> OutputPort {
        OutputPort { node: self, index }
    }

    /// Address of this node's input port `index`.
    #[inline]
    pub fn input(self, index: usize) -> InputPort {
        InputPort { node: self, index }
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Upcast to [`Any`] for typed node access.
///
/// Implemented for every `'static` type; node authors never implement it.
pub trait AsAny {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of DSP computation in a flow graph.
///
/// The port layout is read once, when the node is added to a graph: each
/// entry of [`input_channels`](Self::input_channels) and
/// [`output_channels`](Self::output_channels) declares one port and its
/// samples per frame. The graph owns the port buffers.
///
/// # Real-Time Safety
///
/// [`process`](Self::process) runs on the audio thread. Implementations
/// must not allocate, lock or block; do that in the constructor or in
/// [`prepare`](Self::prepare).
///
/// # Example
///
/// ```rust
/// use flowline_core::{FlowNode, ProcessContext};
///
/// /// Inverts polarity.
/// struct Invert {
///     channels: usize,
/// }
///
/// impl FlowNode for Invert {
///     fn name(&self) -> &'static str {
///         "Invert"
///     }
///
///     fn input_channels(&self) -> &[usize] {
///         core::slice::from_ref(&self.channels)
///     }
///
///     fn output_channels(&self) -> &[usize] {
///         core::slice::from_ref(&self.channels)
///     }
///
///     fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
///         let samples = frames * self.channels;
///         let (input, output) = ctx.io(0, 0);
///         for (o, &i) in output[..samples].iter_mut().zip(&input[..samples]) {
///             *o = -i;
///         }
///         frames
///     }
/// }
/// ```
pub trait FlowNode: AsAny + Send {
    /// Short type name, used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Samples per frame of each input port, in port order.
    fn input_channels(&self) -> &[usize];

    /// Samples per frame of each output port, in port order.
    fn output_channels(&self) -> &[usize];

    /// Produces up to `frames` frames into the output buffers.
    ///
    /// For automatically pulling nodes, `frames` is already the minimum
    /// the inputs delivered and never exceeds the graph block size. Returns
    /// the number of frames actually produced.
    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize;

    /// Clears internal state after a stream discontinuity.
    fn reset(&mut self) {}

    /// Whether the scheduler pulls every input before calling
    /// [`process`](Self::process).
    ///
    /// Nodes that consume input at a different rate than they produce
    /// output return `false` and call
    /// [`ProcessContext::pull_input`] themselves.
    fn pulls_automatically(&self) -> bool {
        true
    }

    /// Called once when the node joins a graph, before any pull.
    ///
    /// Nodes that need scratch storage sized to the block size allocate it
    /// here.
    fn prepare(&mut self, _frames_per_buffer: usize) {}
}

/// Graph-side bookkeeping for one node.
pub(crate) struct NodeEntry {
    /// `None` while the node is inside its own `process`.
    pub processor: Option<Box<dyn FlowNode>>,
    pub name: &'static str,
    pub inputs: Vec<InputSlot>,
    pub outputs: Vec<Vec<f32>>,
    pub output_channels: Vec<usize>,
    pub last_call_count: i64,
    pub last_frame_count: usize,
    pub block_recursion: bool,
    pub pulls_automatically: bool,
}

impl NodeEntry {
    pub fn new(mut processor: Box<dyn FlowNode>, frames_per_buffer: usize) -> Self {
        processor.prepare(frames_per_buffer);
        let inputs = processor
            .input_channels()
            .iter()
            .map(|&channels| InputSlot::new(channels, frames_per_buffer))
            .collect();
        let output_channels: Vec<usize> = processor.output_channels().to_vec();
        let outputs = output_channels
            .iter()
            .map(|&channels| vec![0.0; channels * frames_per_buffer])
            .collect();
        Self {
            name: processor.name(),
            pulls_automatically: processor.pulls_automatically(),
            processor: Some(processor),
            inputs,
            outputs,
            output_channels,
            last_call_count: INITIAL_CALL_COUNT,
            last_frame_count: 0,
            block_recursion: false,
        }
    }
}
