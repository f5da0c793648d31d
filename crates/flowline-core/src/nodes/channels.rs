//! Channel layout converters.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::graph::{FlowNode, ProcessContext};

const MONO: &[usize] = &[1];

/// Copies a mono input to every channel of its output.
pub struct MonoToMultiConverter {
    output_channels: usize,
}

impl MonoToMultiConverter {
    /// Creates a 1 → `output_channels` converter.
    pub fn new(output_channels: usize) -> Self {
        Self { output_channels }
    }
}

impl FlowNode for MonoToMultiConverter {
    fn name(&self) -> &'static str {
        "MonoToMultiConverter"
    }

    fn input_channels(&self) -> &[usize] {
        MONO
    }

    fn output_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.output_channels)
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        let (input, output) = ctx.io(0, 0);
        for (frame, &sample) in output
            .chunks_exact_mut(self.output_channels)
            .zip(input)
            .take(frames)
        {
            frame.fill(sample);
        }
        frames
    }
}

/// Keeps channel 0 of a multi-channel input.
pub struct MultiToMonoConverter {
    input_channels: usize,
}

impl MultiToMonoConverter {
    /// Creates an `input_channels` → 1 converter.
    pub fn new(input_channels: usize) -> Self {
        Self { input_channels }
    }
}

impl FlowNode for MultiToMonoConverter {
    fn name(&self) -> &'static str {
        "MultiToMonoConverter"
    }

    fn input_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.input_channels)
    }

    fn output_channels(&self) -> &[usize] {
        MONO
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        let (input, output) = ctx.io(0, 0);
        for (out, frame) in output
            .iter_mut()
            .zip(input.chunks_exact(self.input_channels))
            .take(frames)
        {
            *out = frame[0];
        }
        frames
    }
}

/// Maps N input channels onto M output channels: output channel `k` reads
/// input channel `k mod N`.
///
/// Stereo to quad gives `L R L R`; quad to stereo keeps the front pair.
pub struct ChannelCountConverter {
    channels: [usize; 2],
}

impl ChannelCountConverter {
    /// Creates an `input_channels` → `output_channels` converter.
    pub fn new(input_channels: usize, output_channels: usize) -> Self {
        Self {
            channels: [input_channels, output_channels],
        }
    }

    /// Samples per input frame.
    pub fn input_channel_count(&self) -> usize {
        self.channels[0]
    }

    /// Samples per output frame.
    pub fn output_channel_count(&self) -> usize {
        self.channels[1]
    }
}

impl FlowNode for ChannelCountConverter {
    fn name(&self) -> &'static str {
        "ChannelCountConverter"
    }

    fn input_channels(&self) -> &[usize] {
        &self.channels[..1]
    }

    fn output_channels(&self) -> &[usize] {
        &self.channels[1..]
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        let [input_channels, output_channels] = self.channels;
        let (input, output) = ctx.io(0, 0);
        for (out, inp) in output
            .chunks_exact_mut(output_channels)
            .zip(input.chunks_exact(input_channels))
            .take(frames)
        {
            for (k, o) in out.iter_mut().enumerate() {
                *o = inp[k % input_channels];
            }
        }
        frames
    }
}

/// Interleaves N mono inputs into one N-channel output.
pub struct ManyToMultiConverter {
    inputs: Vec<usize>,
    channels: usize,
}

impl ManyToMultiConverter {
    /// Creates a converter with `channels` mono inputs.
    pub fn new(channels: usize) -> Self {
        Self {
            inputs: vec![1; channels],
            channels,
        }
    }
}

impl FlowNode for ManyToMultiConverter {
    fn name(&self) -> &'static str {
        "ManyToMultiConverter"
    }

    fn input_channels(&self) -> &[usize] {
        &self.inputs
    }

    fn output_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        let channels = self.channels;
        let (inputs, mut outputs) = ctx.split();
        let output = outputs.get_mut(0);
        for ch in 0..channels {
            let input = inputs.get(ch);
            for (frame, &sample) in output.chunks_exact_mut(channels).zip(input).take(frames) {
                frame[ch] = sample;
            }
        }
        frames
    }
}

/// Splits one N-channel input into N mono outputs.
pub struct MultiToManyConverter {
    channels: usize,
    outputs: Vec<usize>,
}

impl MultiToManyConverter {
    /// Creates a converter with `channels` mono outputs.
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            outputs: vec![1; channels],
        }
    }
}

impl FlowNode for MultiToManyConverter {
    fn name(&self) -> &'static str {
        "MultiToManyConverter"
    }

    fn input_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn output_channels(&self) -> &[usize] {
        &self.outputs
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        let channels = self.channels;
        let (inputs, mut outputs) = ctx.split();
        let input = inputs.get(0);
        for ch in 0..channels {
            let output = outputs.get_mut(ch);
            for (out, frame) in output
                .iter_mut()
                .zip(input.chunks_exact(channels))
                .take(frames)
            {
                *out = frame[ch];
            }
        }
        frames
    }
}

/// Replaces every channel of a frame with the mean of that frame.
pub struct MonoBlend {
    channels: usize,
}

impl MonoBlend {
    /// Creates a blend over `channels` channels.
    pub fn new(channels: usize) -> Self {
        Self { channels }
    }
}

impl FlowNode for MonoBlend {
    fn name(&self) -> &'static str {
        "MonoBlend"
    }

    fn input_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn output_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        let channels = self.channels;
        let inverse = 1.0 / channels as f32;
        let (input, output) = ctx.io(0, 0);
        for (out, inp) in output
            .chunks_exact_mut(channels)
            .zip(input.chunks_exact(channels))
            .take(frames)
        {
            let mean = inp.iter().sum::<f32>() * inverse;
            out.fill(mean);
        }
        frames
    }
}
