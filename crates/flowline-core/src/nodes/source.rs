//! Buffer-backed source nodes.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::marker::PhantomData;

use crate::convert::{F32, I16, I24Packed, I32, SampleFormat, SampleFormatKind};
use crate::graph::{FlowNode, ProcessContext};

/// Plays an interleaved buffer in wire format `F` once, front to back.
///
/// The buffer is handed over as a `Vec` and handed back by
/// [`take_data`](Self::take_data) or the next
/// [`set_data`](Self::set_data); samples are never copied into the node.
/// Once [`size_in_frames`](Self::size_in_frames) frames have been read the
/// source produces 0 frames until new data is bound.
pub struct SourceBuffered<F: SampleFormat> {
    channels: usize,
    data: Vec<F::Sample>,
    size_in_frames: usize,
    frame_index: usize,
    _format: PhantomData<F>,
}

/// `f32` source.
pub type SourceFloat = SourceBuffered<F32>;
/// `i16` source.
pub type SourceI16 = SourceBuffered<I16>;
/// Packed 24-bit source.
pub type SourceI24 = SourceBuffered<I24Packed>;
/// `i32` source.
pub type SourceI32 = SourceBuffered<I32>;

impl<F: SampleFormat> SourceBuffered<F> {
    /// Creates a source with `channels` samples per frame and no data.
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            data: Vec::new(),
            size_in_frames: 0,
            frame_index: 0,
            _format: PhantomData,
        }
    }

    /// Binds `data` holding `frames` interleaved frames and rewinds.
    ///
    /// `frames` is clamped to what `data` actually holds. Returns the
    /// previously bound buffer so the caller can reuse its allocation.
    pub fn set_data(&mut self, data: Vec<F::Sample>, frames: usize) -> Vec<F::Sample> {
        let units_per_frame = self.units_per_frame();
        let capacity = if units_per_frame == 0 {
            0
        } else {
            data.len() / units_per_frame
        };
        self.size_in_frames = frames.min(capacity);
        self.frame_index = 0;
        core::mem::replace(&mut self.data, data)
    }

    /// Unbinds and returns the current buffer.
    pub fn take_data(&mut self) -> Vec<F::Sample> {
        self.size_in_frames = 0;
        self.frame_index = 0;
        core::mem::take(&mut self.data)
    }

    /// The bound buffer.
    pub fn data(&self) -> &[F::Sample] {
        &self.data
    }

    /// Samples per frame.
    pub fn channel_count(&self) -> usize {
        self.channels
    }

    /// Frames in the bound buffer.
    pub fn size_in_frames(&self) -> usize {
        self.size_in_frames
    }

    /// Index of the next frame to be read.
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Moves the read position, clamped to the end of the data.
    pub fn set_frame_index(&mut self, frame_index: usize) {
        self.frame_index = frame_index.min(self.size_in_frames);
    }

    /// Frames left to read.
    pub fn frames_remaining(&self) -> usize {
        self.size_in_frames - self.frame_index
    }

    fn units_per_frame(&self) -> usize {
        self.channels * F::UNITS_PER_SAMPLE
    }
}

impl<F: SampleFormat> FlowNode for SourceBuffered<F> {
    fn name(&self) -> &'static str {
        match F::KIND {
            SampleFormatKind::F32 => "SourceFloat",
            SampleFormatKind::I16 => "SourceI16",
            SampleFormatKind::I24Packed => "SourceI24",
            SampleFormatKind::I32 => "SourceI32",
        }
    }

    fn input_channels(&self) -> &[usize] {
        &[]
    }

    fn output_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        let frames = frames.min(self.frames_remaining());
        let units_per_frame = self.units_per_frame();
        let start = self.frame_index * units_per_frame;
        let src = &self.data[start..start + frames * units_per_frame];
        let output = ctx.output_mut(0);
        let samples = (frames * self.channels).min(output.len());
        F::decode(src, &mut output[..samples]);
        self.frame_index += frames;
        frames
    }
}
