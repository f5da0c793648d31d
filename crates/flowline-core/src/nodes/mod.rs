//! Node library.
//!
//! | node | ports | what it does |
//! |------|-------|--------------|
//! | [`SourceBuffered`] | – → N | plays a bound buffer once |
//! | [`CallbackSource`] | – → N | reads a fixed-block producer |
//! | [`Sink`] | N → – | read through [`FlowGraph::read`](crate::FlowGraph::read) |
//! | [`RampLinear`] | N → N | gain with linear ramps |
//! | [`ClipToRange`] | N → N | hard clip |
//! | [`Limiter`] | N → N | soft-knee limit to ±√2 |
//! | [`MonoToMultiConverter`] | 1 → N | duplicate |
//! | [`MultiToMonoConverter`] | N → 1 | keep channel 0 |
//! | [`ChannelCountConverter`] | N → M | wrap channels |
//! | [`ManyToMultiConverter`] | N × 1 → N | interleave |
//! | [`MultiToManyConverter`] | N → N × 1 | de-interleave |
//! | [`MonoBlend`] | N → N | average channels |
//! | [`SampleRateConverter`] | N → N | resample |

pub mod callback;
pub mod channels;
pub mod clip;
pub mod limiter;
pub mod ramp;
pub mod sample_rate;
pub mod sink;
pub mod source;

pub use callback::CallbackSource;
pub use channels::{
    ChannelCountConverter, ManyToMultiConverter, MonoBlend, MonoToMultiConverter,
    MultiToManyConverter, MultiToMonoConverter,
};
pub use clip::{ClipToRange, DEFAULT_MAX_HEADROOM};
pub use limiter::{Limiter, limit};
pub use ramp::{DEFAULT_RAMP_FRAMES, RampLinear, RampTarget};
pub use sample_rate::SampleRateConverter;
pub use sink::{Sink, SinkFloat, SinkI16, SinkI24, SinkI32};
pub use source::{SourceBuffered, SourceFloat, SourceI16, SourceI24, SourceI32};
