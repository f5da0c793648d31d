//! The view of the graph a node gets while it processes.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::FlowGraph;
use super::node::NodeId;

/// Buffers and upstream access for one [`FlowNode::process`] call.
///
/// Input buffers are borrowed from the graph: a connected input reads the
/// upstream output buffer in place, an unconnected one reads its own
/// [`set_value`](FlowGraph::set_value) storage. Output buffers belong to the
/// node being processed.
///
/// [`FlowNode::process`]: super::FlowNode::process
pub struct ProcessContext<'a> {
    pub(crate) graph: &'a mut FlowGraph,
    pub(crate) node: NodeId,
    pub(crate) outputs: &'a mut [Vec<f32>],
}

impl<'a> ProcessContext<'a> {
    /// The node being processed.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Capacity of every port buffer, in frames.
    pub fn frames_per_buffer(&self) -> usize {
        self.graph.frames_per_buffer()
    }

    /// Number of input ports.
    pub fn num_inputs(&self) -> usize {
        self.graph.nodes[self.node.slot()].inputs.len()
    }

    /// Number of output ports.
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Interleaved samples of input port `index`.
    ///
    /// Empty if the port does not exist.
    pub fn input(&self, index: usize) -> &[f32] {
        self.graph.input_buffer(self.node, index)
    }

    /// Interleaved samples of output port `index`.
    ///
    /// # Panics
    ///
    /// Panics if the port does not exist.
    pub fn output_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.outputs[index]
    }

    /// Input port `input` and output port `output` at the same time.
    pub fn io(&mut self, input: usize, output: usize) -> (&[f32], &mut [f32]) {
        (
            self.graph.input_buffer(self.node, input),
            &mut self.outputs[output],
        )
    }

    /// All inputs and all outputs at the same time, for nodes with several
    /// of either.
    pub fn split(&mut self) -> (Inputs<'_>, Outputs<'_>) {
        (
            Inputs {
                graph: &*self.graph,
                node: self.node,
            },
            Outputs {
                buffers: &mut *self.outputs,
            },
        )
    }

    /// Pulls input port `index` with an explicit call count.
    ///
    /// For nodes whose [`pulls_automatically`](super::FlowNode::pulls_automatically)
    /// is `false`. Returns the frames now readable through
    /// [`input`](Self::input).
    pub fn pull_input(&mut self, index: usize, frames: usize, call_count: i64) -> usize {
        self.graph.pull_input_port(self.node, index, frames, call_count)
    }
}

/// Read access to every input of the node being processed.
pub struct Inputs<'a> {
    graph: &'a FlowGraph,
    node: NodeId,
}

impl<'a> Inputs<'a> {
    /// Number of input ports.
    pub fn len(&self) -> usize {
        self.graph.nodes[self.node.slot()].inputs.len()
    }

    /// Whether the node has no inputs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interleaved samples of input port `index`; empty if absent.
    pub fn get(&self, index: usize) -> &'a [f32] {
        self.graph.input_buffer(self.node, index)
    }
}

/// Write access to every output of the node being processed.
pub struct Outputs<'a> {
    buffers: &'a mut [Vec<f32>],
}

impl Outputs<'_> {
    /// Number of output ports.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the node has no outputs.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Interleaved samples of output port `index`.
    ///
    /// # Panics
    ///
    /// Panics if the port does not exist.
    pub fn get_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.buffers[index]
    }
}
