//! Flowline Resampler - real-time multi-channel sample rate conversion
//!
//! A family of interchangeable FIR interpolators behind one frame-by-frame
//! interface, chosen by a factory from the rate ratio, channel count and a
//! [`Quality`] level:
//!
//! - [`MultiChannelResampler`] - the resampler handle
//! - [`ResamplerBuilder`] - explicit configuration (taps, cutoff, window)
//! - [`ResamplerKind`] - which interpolator was selected
//! - [`IntegerRatio`] - exact rate ratio used by the phase accumulator
//! - [`generate_coefficients`] - windowed-sinc kernel tables
//! - [`HyperbolicCosineWindow`], [`KaiserWindow`] - kernel windows
//!
//! # Example
//!
//! ```rust
//! use flowline_resampler::{MultiChannelResampler, Quality, ResamplerKind};
//!
//! let resampler = MultiChannelResampler::make(2, 44100, 48000, Quality::Medium)?;
//! assert_eq!(resampler.kind(), ResamplerKind::PolyphaseStereo);
//! # Ok::<(), flowline_resampler::ResamplerError>(())
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: all tables and delay lines are allocated by the
//!   builder; reads and writes never allocate
//! - **Drift-free**: phase is tracked with integer arithmetic
//! - **no_std**: `alloc` + `libm` only

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod coefficients;
pub mod ratio;
pub mod resampler;
pub mod window;

pub use coefficients::{KernelDesign, generate_coefficients, sinc};
pub use ratio::{IntegerRatio, gcd};
pub use resampler::{
    DEFAULT_NORMALIZED_CUTOFF, MAX_COEFFICIENTS, MultiChannelResampler, Quality,
    ResamplerBuilder, ResamplerError, ResamplerKind,
};
pub use window::{
    DEFAULT_STOP_BAND_ATTENUATION_DB, HyperbolicCosineWindow, KaiserWindow, WindowKind,
};
