//! Port addresses and input port storage.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use super::node::NodeId;

/// Frames per port buffer unless the graph is built with
/// [`FlowGraph::with_block_size`](super::FlowGraph::with_block_size).
pub const DEFAULT_FRAMES_PER_BUFFER: usize = 8;

/// Address of an output port: `(node, port index)`.
///
/// An output port may feed any number of input ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutputPort {
    /// Owning node.
    pub node: NodeId,
    /// Port index within the node's outputs.
    pub index: usize,
}

/// Address of an input port: `(node, port index)`.
///
/// An input port has at most one upstream connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputPort {
    /// Owning node.
    pub node: NodeId,
    /// Port index within the node's inputs.
    pub index: usize,
}

/// Storage behind one input port.
///
/// `values` is only read while the port is unconnected; a connected port
/// reads the upstream output buffer in place.
pub(crate) struct InputSlot {
    pub channels: usize,
    pub values: Vec<f32>,
    pub connection: Option<OutputPort>,
}

impl InputSlot {
    pub fn new(channels: usize, frames_per_buffer: usize) -> Self {
        Self {
            channels,
            values: vec![0.0; channels * frames_per_buffer],
            connection: None,
        }
    }
}
