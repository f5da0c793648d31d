//! Pull-driven dataflow graph.
//!
//! A [`FlowGraph`] owns every node and every port buffer. Nodes are
//! addressed by [`NodeId`], ports by [`OutputPort`] / [`InputPort`]. A
//! connected input holds only the address of the output it reads; the
//! output buffer is borrowed in place at process time, never copied.
//!
//! # Scheduling
//!
//! Nothing runs until a sink is read. A read mints a new call count and
//! pulls the sink, which pulls its inputs, which pull theirs:
//!
//! ```text
//! pull_data(node, frames, call_count):
//!     if call_count <= node.last_call_count: return node.last_frame_count
//!     node.last_call_count = call_count
//!     for each input (if the node pulls automatically):
//!         frames = pull(input, frames, call_count)   // running minimum
//!     if frames > 0: frames = node.process(frames)
//!     node.last_frame_count = frames
//! ```
//!
//! Storing the call count before recursing is what makes the scheduler
//! safe on shared upstream nodes (a diamond processes its source once per
//! pull) and on cycles (the second visit returns the memoized count).
//!
//! # Example
//!
//! ```rust
//! use flowline_core::{FlowGraph, SinkFloat, SourceFloat};
//!
//! let mut graph = FlowGraph::new();
//! let source = graph.add_node(SourceFloat::new(1))?;
//! let sink = graph.add_node(SinkFloat::new(1))?;
//! graph.connect(source.output(0), sink.input(0))?;
//!
//! graph
//!     .node_mut::<SourceFloat>(source)?
//!     .set_data(vec![0.1, 0.2, 0.3], 3);
//! let mut out = [0.0_f32; 8];
//! assert_eq!(graph.read::<flowline_core::F32>(sink, &mut out, 8)?, 3);
//! # Ok::<(), flowline_core::GraphError>(())
//! ```
//!
//! # Threading
//!
//! The graph is driven by one thread at a time. Topology changes take
//! `&mut FlowGraph` and therefore cannot overlap a pull.

pub mod context;
pub mod node;
pub mod port;

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

pub use context::{Inputs, Outputs, ProcessContext};
pub use node::{AsAny, FlowNode, INITIAL_CALL_COUNT, NodeId};
pub use port::{DEFAULT_FRAMES_PER_BUFFER, InputPort, OutputPort};

use node::NodeEntry;
use port::InputSlot;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Errors from graph construction and typed node access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// The node does not exist in this graph.
    NodeNotFound(NodeId),
    /// The node has no such input port.
    InputNotFound(InputPort),
    /// The node has no such output port.
    OutputNotFound(OutputPort),
    /// Connected ports must carry the same samples per frame.
    ChannelMismatch {
        /// Samples per frame of the output port.
        output: usize,
        /// Samples per frame of the input port.
        input: usize,
    },
    /// An input cannot read an output of its own node.
    SelfLoop(NodeId),
    /// A node declared a port with zero samples per frame.
    ZeroChannels {
        /// Name of the rejected node.
        node: &'static str,
    },
    /// The node is not of the requested type.
    WrongNodeType {
        /// The node that was looked up.
        node: NodeId,
        /// Name of the node actually stored there.
        found: &'static str,
    },
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::InputNotFound(port) => {
                write!(f, "node {} has no input port {}", port.node, port.index)
            }
            Self::OutputNotFound(port) => {
                write!(f, "node {} has no output port {}", port.node, port.index)
            }
            Self::ChannelMismatch { output, input } => write!(
                f,
                "cannot connect a {output}-channel output to a {input}-channel input"
            ),
            Self::SelfLoop(id) => write!(f, "node {id} cannot feed its own input"),
            Self::ZeroChannels { node } => write!(f, "{node} has a port with zero channels"),
            Self::WrongNodeType { node, found } => {
                write!(f, "node {node} is a {found}, not the requested type")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

/// Arena of flow-graph nodes plus the pull scheduler.
///
/// # Usage
///
/// 1. Create a graph with [`new()`](Self::new) or
///    [`with_block_size()`](Self::with_block_size)
/// 2. Add nodes with [`add_node()`](Self::add_node)
/// 3. Wire them with [`connect()`](Self::connect)
/// 4. Run the graph by reading a sink with [`read()`](Self::read)
pub struct FlowGraph {
    pub(crate) nodes: Vec<NodeEntry>,
    frames_per_buffer: usize,
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowGraph {
    /// Creates an empty graph with [`DEFAULT_FRAMES_PER_BUFFER`] frame
    /// port buffers.
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_FRAMES_PER_BUFFER)
    }

    /// Creates an empty graph whose port buffers hold `frames_per_buffer`
    /// frames (at least 1).
    pub fn with_block_size(frames_per_buffer: usize) -> Self {
        Self {
            nodes: Vec::new(),
            frames_per_buffer: frames_per_buffer.max(1),
        }
    }

    /// Capacity of every port buffer, in frames.
    #[inline]
    pub fn frames_per_buffer(&self) -> usize {
        self.frames_per_buffer
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of all nodes in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Adds a node and allocates its port buffers.
    ///
    /// Fails with [`GraphError::ZeroChannels`] if any port of the node
    /// carries zero samples per frame.
    pub fn add_node<N: FlowNode + 'static>(&mut self, node: N) -> Result<NodeId, GraphError> {
        self.add_boxed(Box::new(node))
    }

    /// Adds an already boxed node.
    pub fn add_boxed(&mut self, node: Box<dyn FlowNode>) -> Result<NodeId, GraphError> {
        let has_empty_port = node
            .input_channels()
            .iter()
            .chain(node.output_channels())
            .any(|&channels| channels == 0);
        if has_empty_port {
            return Err(GraphError::ZeroChannels { node: node.name() });
        }
        let id = NodeId(self.nodes.len() as u32);
        let entry = NodeEntry::new(node, self.frames_per_buffer);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_add: {id} {} ({} in, {} out)",
            entry.name,
            entry.inputs.len(),
            entry.outputs.len()
        );
        self.nodes.push(entry);
        Ok(id)
    }

    /// Name reported by the node.
    pub fn node_name(&self, node: NodeId) -> Result<&'static str, GraphError> {
        Ok(self.entry(node)?.name)
    }

    /// Typed shared access to a node.
    pub fn node<N: FlowNode + 'static>(&self, id: NodeId) -> Result<&N, GraphError> {
        let entry = self.entry(id)?;
        entry
            .processor
            .as_deref()
            .and_then(|node| node.as_any().downcast_ref::<N>())
            .ok_or(GraphError::WrongNodeType {
                node: id,
                found: entry.name,
            })
    }

    /// Typed mutable access to a node.
    ///
    /// This is how sources are fed and parameters changed between pulls.
    pub fn node_mut<N: FlowNode + 'static>(&mut self, id: NodeId) -> Result<&mut N, GraphError> {
        let entry = self
            .nodes
            .get_mut(id.slot())
            .ok_or(GraphError::NodeNotFound(id))?;
        let found = entry.name;
        entry
            .processor
            .as_deref_mut()
            .and_then(|node| node.as_any_mut().downcast_mut::<N>())
            .ok_or(GraphError::WrongNodeType { node: id, found })
    }

    /// Connects `output` to `input`, replacing any previous connection of
    /// `input`.
    pub fn connect(&mut self, output: OutputPort, input: InputPort) -> Result<(), GraphError> {
        let output_channels = *self
            .entry(output.node)?
            .output_channels
            .get(output.index)
            .ok_or(GraphError::OutputNotFound(output))?;
        let slot = self.input_slot_mut(input)?;
        if output.node == input.node {
            return Err(GraphError::SelfLoop(input.node));
        }
        if slot.channels != output_channels {
            return Err(GraphError::ChannelMismatch {
                output: output_channels,
                input: slot.channels,
            });
        }
        slot.connection = Some(output);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_connect: {}[{}] -> {}[{}]",
            output.node,
            output.index,
            input.node,
            input.index
        );
        Ok(())
    }

    /// Disconnects `input`, returning the output it was reading.
    pub fn disconnect(&mut self, input: InputPort) -> Result<Option<OutputPort>, GraphError> {
        let previous = self.input_slot_mut(input)?.connection.take();
        #[cfg(feature = "tracing")]
        if let Some(output) = previous {
            tracing::debug!(
                "graph_disconnect: {}[{}] -x- {}[{}]",
                output.node,
                output.index,
                input.node,
                input.index
            );
        }
        Ok(previous)
    }

    /// Disconnects `input` only if it is currently reading `output`.
    ///
    /// Returns whether a connection was removed.
    pub fn disconnect_from(
        &mut self,
        output: OutputPort,
        input: InputPort,
    ) -> Result<bool, GraphError> {
        if self.connection(input)? == Some(output) {
            self.disconnect(input)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// The output `input` is connected to, if any.
    pub fn connection(&self, input: InputPort) -> Result<Option<OutputPort>, GraphError> {
        Ok(self.input_slot(input)?.connection)
    }

    /// Fills the own buffer of `input` with `value`.
    ///
    /// The value is what the port reads while it is unconnected.
    pub fn set_value(&mut self, input: InputPort, value: f32) -> Result<(), GraphError> {
        self.input_slot_mut(input)?.values.fill(value);
        Ok(())
    }

    /// What `input` currently reads: the upstream output buffer when
    /// connected, its own buffer otherwise.
    pub fn input_values(&self, input: InputPort) -> Result<&[f32], GraphError> {
        self.input_slot(input)?;
        Ok(self.input_buffer(input.node, input.index))
    }

    /// Contents of an output buffer.
    pub fn output_buffer(&self, output: OutputPort) -> Result<&[f32], GraphError> {
        self.entry(output.node)?
            .outputs
            .get(output.index)
            .map(Vec::as_slice)
            .ok_or(GraphError::OutputNotFound(output))
    }

    /// Call count of the most recent pull that processed `node`, or
    /// [`INITIAL_CALL_COUNT`].
    pub fn last_call_count(&self, node: NodeId) -> Result<i64, GraphError> {
        Ok(self.entry(node)?.last_call_count)
    }

    /// Frames produced by the most recent pull of `node`.
    pub fn last_frame_count(&self, node: NodeId) -> Result<usize, GraphError> {
        Ok(self.entry(node)?.last_frame_count)
    }

    /// Pulls up to `frames` frames from `node` for pull cycle `call_count`.
    ///
    /// Returns the frames the node produced, at most the block size. A
    /// call count not greater than the node's last one returns the
    /// memoized frame count without processing again; so does a node that
    /// is already inside its own `process`.
    pub fn pull_data(&mut self, node: NodeId, frames: usize, call_count: i64) -> usize {
        let slot = node.slot();
        let Some(entry) = self.nodes.get_mut(slot) else {
            debug_assert!(false, "pull_data on unknown {node}");
            return 0;
        };
        if call_count <= entry.last_call_count || entry.processor.is_none() {
            return entry.last_frame_count;
        }
        entry.last_call_count = call_count;

        let mut frame_count = frames.min(self.frames_per_buffer);
        if entry.pulls_automatically {
            for index in 0..entry.inputs.len() {
                frame_count = self.pull_input_port(node, index, frame_count, call_count);
            }
        }
        if frame_count > 0 {
            frame_count = self.run_process(node, frame_count);
        }
        self.nodes[slot].last_frame_count = frame_count;
        frame_count
    }

    /// Resets `node` and everything upstream of it.
    ///
    /// Each reached node gets its call count set back to
    /// [`INITIAL_CALL_COUNT`], its frame count to zero, and its
    /// [`FlowNode::reset`] called. Terminates on cyclic graphs. Must not be
    /// called from inside a pull.
    pub fn pull_reset(&mut self, node: NodeId) {
        let slot = node.slot();
        let Some(entry) = self.nodes.get_mut(slot) else {
            return;
        };
        if entry.block_recursion {
            return;
        }
        entry.block_recursion = true;
        for index in 0..self.nodes[slot].inputs.len() {
            if let Some(upstream) = self.nodes[slot].inputs[index].connection {
                self.pull_reset(upstream.node);
            }
        }
        let entry = &mut self.nodes[slot];
        entry.block_recursion = false;
        entry.last_call_count = INITIAL_CALL_COUNT;
        entry.last_frame_count = 0;
        if let Some(processor) = entry.processor.as_mut() {
            processor.reset();
        }
    }

    /// Pulls one input port: delegates to the connected output's node, or
    /// reports a full block for an unconnected port.
    pub(crate) fn pull_input_port(
        &mut self,
        node: NodeId,
        index: usize,
        frames: usize,
        call_count: i64,
    ) -> usize {
        let Some(input) = self
            .nodes
            .get(node.slot())
            .and_then(|entry| entry.inputs.get(index))
        else {
            return 0;
        };
        let frames = frames.min(self.frames_per_buffer);
        match input.connection {
            Some(upstream) => self.pull_data(upstream.node, frames, call_count),
            None => frames,
        }
    }

    /// Samples an input currently reads. Empty when the port is unknown or
    /// its upstream node is mid-process.
    pub(crate) fn input_buffer(&self, node: NodeId, index: usize) -> &[f32] {
        let Some(input) = self
            .nodes
            .get(node.slot())
            .and_then(|entry| entry.inputs.get(index))
        else {
            return &[];
        };
        match input.connection {
            Some(upstream) => self
                .nodes
                .get(upstream.node.slot())
                .and_then(|entry| entry.outputs.get(upstream.index))
                .map_or(&[][..], Vec::as_slice),
            None => &input.values,
        }
    }

    fn run_process(&mut self, node: NodeId, frames: usize) -> usize {
        let slot = node.slot();
        let entry = &mut self.nodes[slot];
        let Some(mut processor) = entry.processor.take() else {
            return entry.last_frame_count;
        };
        let mut outputs = core::mem::take(&mut entry.outputs);
        let produced = {
            let mut ctx = ProcessContext {
                graph: self,
                node,
                outputs: &mut outputs,
            };
            processor.process(&mut ctx, frames)
        };
        let entry = &mut self.nodes[slot];
        entry.outputs = outputs;
        entry.processor = Some(processor);
        produced.min(frames)
    }

    fn entry(&self, node: NodeId) -> Result<&NodeEntry, GraphError> {
        self.nodes
            .get(node.slot())
            .ok_or(GraphError::NodeNotFound(node))
    }

    fn input_slot(&self, input: InputPort) -> Result<&InputSlot, GraphError> {
        self.entry(input.node)?
            .inputs
            .get(input.index)
            .ok_or(GraphError::InputNotFound(input))
    }

    fn input_slot_mut(&mut self, input: InputPort) -> Result<&mut InputSlot, GraphError> {
        self.nodes
            .get_mut(input.node.slot())
            .ok_or(GraphError::NodeNotFound(input.node))?
            .inputs
            .get_mut(input.index)
            .ok_or(GraphError::InputNotFound(input))
    }
}
