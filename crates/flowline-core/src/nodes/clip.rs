//! Hard clipping to a fixed range.

use crate::graph::{FlowNode, ProcessContext};

/// Default clip ceiling: +3 dB above full scale.
pub const DEFAULT_MAX_HEADROOM: f32 = 1.412_537_5;

/// Clamps every sample to `[minimum, maximum]`.
///
/// NaN input comes out as `minimum`.
pub struct ClipToRange {
    channels: usize,
    minimum: f32,
    maximum: f32,
}

impl ClipToRange {
    /// Creates a clipper for `±DEFAULT_MAX_HEADROOM`.
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            minimum: -DEFAULT_MAX_HEADROOM,
            maximum: DEFAULT_MAX_HEADROOM,
        }
    }

    /// Sets the lower bound.
    pub fn set_minimum(&mut self, minimum: f32) {
        self.minimum = minimum;
    }

    /// Lower bound.
    pub fn minimum(&self) -> f32 {
        self.minimum
    }

    /// Sets the upper bound.
    pub fn set_maximum(&mut self, maximum: f32) {
        self.maximum = maximum;
    }

    /// Upper bound.
    pub fn maximum(&self) -> f32 {
        self.maximum
    }
}

impl FlowNode for ClipToRange {
    fn name(&self) -> &'static str {
        "ClipToRange"
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
            // f32::max drops NaN, so NaN lands on the lower bound.
            *o = i.max(self.minimum).min(self.maximum);
        }
        frames
    }
}
