//! Flowline Core - pull-scheduled audio flow graph
//!
//! Audio flows through a graph of nodes connected port to port. Nothing
//! runs until a sink is read; the read pulls the sink, which pulls its
//! inputs, and so on up to the sources. Every node processes at most once
//! per pull, however many downstream nodes share it.
//!
//! # Core Abstractions
//!
//! ## Graph
//!
//! - [`FlowGraph`] - arena of nodes plus the pull scheduler
//! - [`FlowNode`] - trait every processing node implements
//! - [`ProcessContext`] - a node's view of its ports while processing
//! - [`NodeId`], [`OutputPort`], [`InputPort`] - addresses
//!
//! ## Nodes
//!
//! - Sources and sinks: [`SourceBuffered`], [`CallbackSource`], [`Sink`]
//! - Gain and protection: [`RampLinear`], [`ClipToRange`], [`Limiter`]
//! - Channel layout: [`MonoToMultiConverter`], [`MultiToMonoConverter`],
//!   [`ChannelCountConverter`], [`ManyToMultiConverter`],
//!   [`MultiToManyConverter`], [`MonoBlend`]
//! - Rate: [`SampleRateConverter`] (built on `flowline-resampler`)
//!
//! ## Edges of the graph
//!
//! - [`convert`] - sample format conversion leaves (`i16`, packed 24-bit,
//!   `i32`, `f32`)
//! - [`block`] - fixed-size block adapters for block-oriented callbacks
//! - [`pipeline`] - a ready-made stream conversion chain
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc`). Disable the
//! default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! flowline-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use flowline_core::{F32, FlowGraph, RampLinear, SinkFloat, SourceFloat};
//!
//! let mut graph = FlowGraph::new();
//! let source = graph.add_node(SourceFloat::new(2))?;
//! let ramp = graph.add_node(RampLinear::new(2))?;
//! let sink = graph.add_node(SinkFloat::new(2))?;
//! graph.connect(source.output(0), ramp.input(0))?;
//! graph.connect(ramp.output(0), sink.input(0))?;
//!
//! graph.node_mut::<RampLinear>(ramp)?.set_target(0.5);
//! graph.node_mut::<SourceFloat>(source)?.set_data(vec![0.5; 64], 32);
//!
//! let mut out = vec![0.0_f32; 64];
//! assert_eq!(graph.read::<F32>(sink, &mut out, 32)?, 32);
//! assert_eq!(out[0], 0.25);
//! # Ok::<(), flowline_core::GraphError>(())
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: port buffers are allocated when a node is added;
//!   pulls never allocate, lock or return errors
//! - **Single-threaded driving**: topology changes need `&mut FlowGraph`,
//!   so they cannot overlap a pull
//! - **no_std**: `alloc` + `libm` only

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod block;
pub mod convert;
pub mod graph;
pub mod nodes;
pub mod pipeline;

pub use block::{BlockConsumer, BlockProducer, FixedBlockReader, FixedBlockWriter};
pub use convert::{F32, I16, I24Packed, I32, SampleFormat, SampleFormatKind};
pub use graph::{
    FlowGraph, FlowNode, GraphError, INITIAL_CALL_COUNT, InputPort, Inputs, NodeId, OutputPort,
    Outputs, ProcessContext,
};
pub use nodes::{
    CallbackSource, ChannelCountConverter, ClipToRange, Limiter, ManyToMultiConverter, MonoBlend,
    MonoToMultiConverter, MultiToManyConverter, MultiToMonoConverter, RampLinear, RampTarget,
    SampleRateConverter, Sink, SinkFloat, SinkI16, SinkI24, SinkI32, SourceBuffered, SourceFloat,
    SourceI16, SourceI24, SourceI32,
};
pub use pipeline::{
    Clipping, ConversionPipeline, PipelineConfig, PipelineError, SampleBuffer, StreamFormat,
};

pub use flowline_resampler::{Quality, ResamplerKind};
