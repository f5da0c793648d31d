//! Sample-rate conversion as a graph node.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use flowline_resampler::{MultiChannelResampler, Quality, ResamplerError, ResamplerKind};

use crate::graph::{FlowNode, INITIAL_CALL_COUNT, ProcessContext};

/// Wraps a [`MultiChannelResampler`] so it can sit in a graph.
///
/// Consumes input at a different rate than it produces output, so it pulls
/// its input itself: whenever the resampler needs a frame and the last
/// input block is used up, it pulls the next block with a call count of
/// its own. The outer pull cycle only decides how many output frames are
/// wanted.
///
/// By default an empty input pull ends the output block, which is what a
/// live stream wants on underrun. With [`set_draining`](Self::set_draining)
/// the converter treats an empty pull as end of stream instead and feeds
/// [`latency_frames`](MultiChannelResampler::latency_frames) frames of
/// silence, so the last real input frames reach the output.
pub struct SampleRateConverter {
    channels: usize,
    resampler: MultiChannelResampler,
    input_call_count: i64,
    input_cursor: usize,
    valid_input_frames: usize,
    draining: bool,
    drained_frames: usize,
    silence: Vec<f32>,
}

impl SampleRateConverter {
    /// Wraps an already built resampler.
    pub fn new(resampler: MultiChannelResampler) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "src_node: {:?}, {} channels, {}:{}",
            resampler.kind(),
            resampler.channel_count(),
            resampler.numerator(),
            resampler.denominator()
        );
        let channels = resampler.channel_count();
        Self {
            channels,
            resampler,
            input_call_count: INITIAL_CALL_COUNT,
            input_cursor: 0,
            valid_input_frames: 0,
            draining: false,
            drained_frames: 0,
            silence: vec![0.0; channels],
        }
    }

    /// Builds the resampler with [`MultiChannelResampler::make`] and wraps
    /// it.
    pub fn make(
        channels: usize,
        input_rate: u32,
        output_rate: u32,
        quality: Quality,
    ) -> Result<Self, ResamplerError> {
        MultiChannelResampler::make(channels, input_rate, output_rate, quality).map(Self::new)
    }

    /// The wrapped resampler.
    pub fn resampler(&self) -> &MultiChannelResampler {
        &self.resampler
    }

    /// Mutable access to the wrapped resampler, e.g. to clear its history.
    pub fn resampler_mut(&mut self) -> &mut MultiChannelResampler {
        &mut self.resampler
    }

    /// Interpolator chosen for the wrapped resampler.
    pub fn kind(&self) -> ResamplerKind {
        self.resampler.kind()
    }

    /// Input frames pulled but not yet fed to the resampler.
    pub fn buffered_input_frames(&self) -> usize {
        self.valid_input_frames - self.input_cursor
    }

    /// Whether an empty input pull flushes the filter tail.
    pub fn set_draining(&mut self, draining: bool) {
        self.draining = draining;
    }

    /// See [`set_draining`](Self::set_draining).
    pub fn is_draining(&self) -> bool {
        self.draining
    }

    /// True once the whole filter tail has been flushed.
    pub fn is_drained(&self) -> bool {
        self.drained_frames >= self.resampler.latency_frames()
    }
}

impl FlowNode for SampleRateConverter {
    fn name(&self) -> &'static str {
        "SampleRateConverter"
    }

    fn input_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn output_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn pulls_automatically(&self) -> bool {
        false
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        let channels = self.channels;
        let block = ctx.frames_per_buffer();
        let mut produced = 0;
        while produced < frames {
            if self.resampler.is_write_needed() {
                if self.input_cursor >= self.valid_input_frames {
                    self.input_call_count += 1;
                    self.valid_input_frames = ctx.pull_input(0, block, self.input_call_count);
                    self.input_cursor = 0;
                    if self.valid_input_frames == 0 {
                        if !self.draining || self.is_drained() {
                            break;
                        }
                        self.resampler.write_next_frame(&self.silence);
                        self.drained_frames += 1;
                        continue;
                    }
                }
                let start = self.input_cursor * channels;
                let Some(frame) = ctx.input(0).get(start..start + channels) else {
                    // Upstream is mid-process (cycle); nothing readable.
                    self.valid_input_frames = 0;
                    break;
                };
                self.resampler.write_next_frame(frame);
                self.input_cursor += 1;
            } else {
                let start = produced * channels;
                let output = ctx.output_mut(0);
                self.resampler
                    .read_next_frame(&mut output[start..start + channels]);
                produced += 1;
            }
        }
        produced
    }

    fn reset(&mut self) {
        self.input_cursor = 0;
        self.valid_input_frames = 0;
        self.drained_frames = 0;
        self.resampler.reset();
    }
}
