//! Soft-knee limiter.
//!
//! Samples within `[-1, 1]` pass unchanged. Above 1 a quadratic spline
//! bends the curve so it meets `√2` (+3 dB) with zero slope at
//! `x = 2√2 - 1`; beyond that the output holds at `√2`:
//!
//! ```text
//! |x| <= 1                 y = x
//! 1 < |x| < 2√2 - 1        y = sign(x) · (a·|x|² + b·|x| + c)
//! |x| >= 2√2 - 1           y = sign(x) · √2
//! ```
//!
//! The spline matches value and slope at both ends, so the curve is
//! continuously differentiable.

use core::f32::consts::SQRT_2;

use crate::graph::{FlowNode, ProcessContext};

const SPLINE_A: f32 = -0.603_553_4;
const SPLINE_B: f32 = 2.207_106_8;
const SPLINE_C: f32 = -0.603_553_4;
/// Input level at which the output reaches `√2`.
const KNEE_END: f32 = 1.828_427_1;

/// Applies the limiter curve to one sample. NaN passes through.
#[inline]
pub fn limit(x: f32) -> f32 {
    let magnitude = x.abs();
    if magnitude <= 1.0 {
        return x;
    }
    let out = if magnitude < KNEE_END {
        (SPLINE_A * magnitude + SPLINE_B) * magnitude + SPLINE_C
    } else {
        SQRT_2
    };
    if x < 0.0 { -out } else { out }
}

/// Limits every sample to `±√2` with a smooth knee; a NaN input repeats the
/// last valid output instead.
pub struct Limiter {
    channels: usize,
    last_valid_output: f32,
}

impl Limiter {
    /// Creates a limiter.
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            last_valid_output: 0.0,
        }
    }
}

impl FlowNode for Limiter {
    fn name(&self) -> &'static str {
        "Limiter"
    }

    fn input_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn output_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        let samples = frames * self.channels;
        let (input, output) = ctx.io(0, 0);
        for (o, &i) in output.iter_mut().zip(input).take(samples) {
            if !i.is_nan() {
                self.last_valid_output = limit(i);
            }
            *o = self.last_valid_output;
        }
        frames
    }

    fn reset(&mut self) {
        self.last_valid_output = 0.0;
    }
}
