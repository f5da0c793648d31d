//! Source node fed by a fixed-block producer.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec, vec::Vec};

use core::marker::PhantomData;

use crate::block::{BlockProducer, FixedBlockReader};
use crate::convert::{SampleFormat, SampleFormatKind};
use crate::graph::{FlowNode, ProcessContext};

/// Pulls wire-format bytes from a [`BlockProducer`] that only fills whole
/// blocks of `frames_per_block` frames, and decodes them as format `F`.
///
/// Whatever the graph block size, the producer is called with its own
/// block size; leftovers wait in a [`FixedBlockReader`]. A producer that
/// returns 0 ends the current pull early.
///
/// Producers may return byte counts that are not a whole number of frames.
/// The bytes of a trailing partial frame are kept and completed by the next
/// pull instead of being dropped.
pub struct CallbackSource<F: SampleFormat> {
    channels: usize,
    reader: FixedBlockReader,
    producer: Box<dyn BlockProducer + Send>,
    scratch: Vec<u8>,
    /// Bytes of an incomplete frame at the front of `scratch`.
    pending: usize,
    timeout_nanos: u64,
    _format: PhantomData<F>,
}

impl<F: SampleFormat> CallbackSource<F> {
    /// Creates a source of `channels` channels whose producer delivers
    /// `frames_per_block` frames per call.
    pub fn new<P>(channels: usize, frames_per_block: usize, producer: P) -> Self
    where
        P: BlockProducer + Send + 'static,
    {
        Self {
            channels,
            reader: FixedBlockReader::new(frames_per_block * Self::bytes_per_frame(channels)),
            producer: Box::new(producer),
            scratch: Vec::new(),
            pending: 0,
            timeout_nanos: 0,
            _format: PhantomData,
        }
    }

    /// How long the producer may block per call.
    pub fn set_timeout_nanos(&mut self, timeout_nanos: u64) {
        self.timeout_nanos = timeout_nanos;
    }

    /// See [`set_timeout_nanos`](Self::set_timeout_nanos).
    pub fn timeout_nanos(&self) -> u64 {
        self.timeout_nanos
    }

    /// Samples per frame.
    pub fn channel_count(&self) -> usize {
        self.channels
    }

    fn bytes_per_frame(channels: usize) -> usize {
        channels * F::KIND.bytes_per_sample()
    }
}

impl<F: SampleFormat> FlowNode for CallbackSource<F> {
    fn name(&self) -> &'static str {
        match F::KIND {
            SampleFormatKind::F32 => "CallbackSourceFloat",
            SampleFormatKind::I16 => "CallbackSourceI16",
            SampleFormatKind::I24Packed => "CallbackSourceI24",
            SampleFormatKind::I32 => "CallbackSourceI32",
        }
    }

    fn input_channels(&self) -> &[usize] {
        &[]
    }

    fn output_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn prepare(&mut self, frames_per_buffer: usize) {
        self.scratch = vec![0; frames_per_buffer * Self::bytes_per_frame(self.channels)];
        self.pending = 0;
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        let bytes_per_frame = Self::bytes_per_frame(self.channels);
        if bytes_per_frame == 0 {
            return 0;
        }
        let wanted = (frames * bytes_per_frame).min(self.scratch.len());
        if wanted <= self.pending {
            return 0;
        }
        let bytes = self.reader.read(
            &mut self.scratch[self.pending..wanted],
            self.producer.as_mut(),
            self.timeout_nanos,
        );
        let total = self.pending + bytes;
        let frames = total / bytes_per_frame;
        let used = frames * bytes_per_frame;
        let output = ctx.output_mut(0);
        let samples = (frames * self.channels).min(output.len());
        F::decode_bytes(&self.scratch[..used], &mut output[..samples]);
        self.scratch.copy_within(used..total, 0);
        self.pending = total - used;
        frames
    }

    fn reset(&mut self) {
        self.reader.reset();
        self.pending = 0;
    }
}
