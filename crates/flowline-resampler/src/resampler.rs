//! The multi-channel resampler and its factory.
//!
//! A [`MultiChannelResampler`] is driven frame by frame:
//!
//! ```rust
//! use flowline_resampler::{MultiChannelResampler, Quality};
//!
//! let mut resampler = MultiChannelResampler::make(2, 44100, 48000, Quality::Medium).unwrap();
//! let input = [0.25_f32, -0.25];
//! let mut output = [0.0_f32; 2];
//!
//! for _ in 0..64 {
//!     if resampler.is_write_needed() {
//!         resampler.write_next_frame(&input);
//!     } else {
//!         resampler.read_next_frame(&mut output);
//!     }
//! }
//! ```
//!
//! # Phase accounting
//!
//! The input:output rate ratio is reduced to `numerator:denominator`. An
//! integer phase starts at `denominator`; every read adds `numerator`, every
//! write subtracts `denominator`, and a write is needed whenever the phase
//! is at or above `denominator`. Because the bookkeeping is exact integer
//! arithmetic the output never drifts against the input, however long the
//! stream runs.
//!
//! # Algorithms
//!
//! The factory picks one of a closed set of interpolators once, at build
//! time ([`ResamplerKind`]):
//!
//! - **Linear**: two-point interpolation, no low-pass filter. Used only for
//!   [`Quality::Fastest`].
//! - **Polyphase**: one precomputed kernel row per distinct output phase.
//!   Chosen when `num_taps × denominator` fits in [`MAX_COEFFICIENTS`].
//!   Mono and stereo have unrolled inner loops.
//! - **Sinc**: a fixed-resolution table of kernel rows, interpolated
//!   between the two rows that bracket the current phase. Used when the
//!   reduced denominator is too large for a polyphase table.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::coefficients::{KernelDesign, generate_coefficients};
use crate::ratio::IntegerRatio;
use crate::window::WindowKind;

/// Upper bound on the size of a polyphase coefficient table.
pub const MAX_COEFFICIENTS: usize = 8 * 1024;

/// Cutoff applied when downsampling, as a fraction of the output Nyquist.
pub const DEFAULT_NORMALIZED_CUTOFF: f64 = 0.70;

/// Speed/quality trade-off; each level maps to a kernel length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quality {
    /// 2 taps: linear interpolation, no anti-alias filter.
    Fastest,
    /// 4 taps.
    Low,
    /// 8 taps.
    #[default]
    Medium,
    /// 16 taps.
    High,
    /// 32 taps.
    Best,
}

impl Quality {
    /// All quality levels, fastest first.
    pub const ALL: [Quality; 5] = [
        Quality::Fastest,
        Quality::Low,
        Quality::Medium,
        Quality::High,
        Quality::Best,
    ];

    /// Kernel length for this quality.
    pub fn num_taps(self) -> usize {
        match self {
            Quality::Fastest => 2,
            Quality::Low => 4,
            Quality::Medium => 8,
            Quality::High => 16,
            Quality::Best => 32,
        }
    }

    /// Lower-case name, e.g. `"medium"`.
    pub fn name(self) -> &'static str {
        match self {
            Quality::Fastest => "fastest",
            Quality::Low => "low",
            Quality::Medium => "medium",
            Quality::High => "high",
            Quality::Best => "best",
        }
    }

    /// Parses a name produced by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.name() == name)
    }
}

/// The interpolator the factory selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResamplerKind {
    /// Two-point linear interpolation.
    Linear,
    /// Polyphase table, one channel.
    PolyphaseMono,
    /// Polyphase table, two channels.
    PolyphaseStereo,
    /// Polyphase table, any channel count.
    Polyphase,
    /// Interpolated sinc table, two channels.
    SincStereo,
    /// Interpolated sinc table, any channel count.
    Sinc,
}

/// Errors reported when a resampler cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplerError {
    /// Channel count was zero.
    ZeroChannels,
    /// A sample rate was zero.
    ZeroRate,
    /// Tap count was odd, below 2, or too long for the coefficient budget.
    InvalidTapCount(usize),
}

impl core::fmt::Display for ResamplerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroChannels => write!(f, "channel count must be at least 1"),
            Self::ZeroRate => write!(f, "sample rates must be non-zero"),
            Self::InvalidTapCount(n) => write!(
                f,
                "tap count {n} must be even and between 2 and {}",
                MAX_COEFFICIENTS / 2
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ResamplerError {}

/// Configuration for a [`MultiChannelResampler`].
#[derive(Debug, Clone, Copy)]
pub struct ResamplerBuilder {
    channel_count: usize,
    input_rate: u32,
    output_rate: u32,
    num_taps: usize,
    normalized_cutoff: f64,
    window: WindowKind,
}

impl Default for ResamplerBuilder {
    fn default() -> Self {
        Self {
            channel_count: 1,
            input_rate: 48000,
            output_rate: 48000,
            num_taps: Quality::default().num_taps(),
            normalized_cutoff: DEFAULT_NORMALIZED_CUTOFF,
            window: WindowKind::default(),
        }
    }
}

impl ResamplerBuilder {
    /// Creates a builder with mono 48 kHz → 48 kHz and medium quality.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of interleaved channels.
    pub fn channel_count(mut self, channel_count: usize) -> Self {
        self.channel_count = channel_count;
        self
    }

    /// Sets the input sample rate in Hz.
    pub fn input_rate(mut self, rate: u32) -> Self {
        self.input_rate = rate;
        self
    }

    /// Sets the output sample rate in Hz.
    pub fn output_rate(mut self, rate: u32) -> Self {
        self.output_rate = rate;
        self
    }

    /// Sets the kernel length directly.
    pub fn num_taps(mut self, num_taps: usize) -> Self {
        self.num_taps = num_taps;
        self
    }

    /// Sets the kernel length from a [`Quality`].
    pub fn quality(self, quality: Quality) -> Self {
        self.num_taps(quality.num_taps())
    }

    /// Sets the low-pass cutoff used when downsampling.
    pub fn normalized_cutoff(mut self, cutoff: f64) -> Self {
        self.normalized_cutoff = cutoff;
        self
    }

    /// Selects the kernel window.
    pub fn window(mut self, window: WindowKind) -> Self {
        self.window = window;
        self
    }

    /// Returns the interpolator [`build`](Self::build) would select.
    pub fn select_kind(&self) -> ResamplerKind {
        if self.num_taps == 2 {
            return ResamplerKind::Linear;
        }
        let ratio = IntegerRatio::new(self.input_rate, self.output_rate).reduced();
        let use_polyphase =
            self.num_taps.saturating_mul(ratio.denominator() as usize) <= MAX_COEFFICIENTS;
        match (use_polyphase, self.channel_count) {
            (true, 1) => ResamplerKind::PolyphaseMono,
            (true, 2) => ResamplerKind::PolyphaseStereo,
            (true, _) => ResamplerKind::Polyphase,
            (false, 2) => ResamplerKind::SincStereo,
            (false, _) => ResamplerKind::Sinc,
        }
    }

    /// Validates the configuration, selects an interpolator and precomputes
    /// its coefficient table.
    pub fn build(self) -> Result<MultiChannelResampler, ResamplerError> {
        if self.channel_count == 0 {
            return Err(ResamplerError::ZeroChannels);
        }
        if self.input_rate == 0 || self.output_rate == 0 {
            return Err(ResamplerError::ZeroRate);
        }
        if self.num_taps < 2 || self.num_taps % 2 != 0 || self.num_taps > MAX_COEFFICIENTS / 2 {
            return Err(ResamplerError::InvalidTapCount(self.num_taps));
        }

        let kind = self.select_kind();
        let ratio = IntegerRatio::new(self.input_rate, self.output_rate).reduced();
        let design = KernelDesign {
            num_taps: self.num_taps,
            input_rate: self.input_rate,
            output_rate: self.output_rate,
            normalized_cutoff: self.normalized_cutoff,
            window: self.window,
        };
        let channels = self.channel_count;

        let interpolator = match kind {
            ResamplerKind::Linear => Interpolator::Linear {
                previous: vec![0.0; channels],
                current: vec![0.0; channels],
            },
            ResamplerKind::PolyphaseMono
            | ResamplerKind::PolyphaseStereo
            | ResamplerKind::Polyphase => {
                let num_rows = ratio.denominator() as usize;
                let numerator = u64::from(ratio.numerator());
                let denominator = u64::from(ratio.denominator());
                let coefficients = generate_coefficients(&design, num_rows, |row| {
                    ((row as u64 * numerator) % denominator) as f64 / denominator as f64
                });
                Interpolator::Polyphase {
                    coefficients,
                    cursor: 0,
                }
            }
            ResamplerKind::SincStereo | ResamplerKind::Sinc => {
                // The last row is a guard row at phase 1.0 so the upper
                // neighbour of any phase below 1.0 exists.
                let num_rows = MAX_COEFFICIENTS / self.num_taps;
                let spacing = (num_rows - 1) as f64;
                let coefficients =
                    generate_coefficients(&design, num_rows, |row| row as f64 / spacing);
                Interpolator::Sinc {
                    coefficients,
                    num_rows,
                    phase_scaler: spacing / f64::from(ratio.denominator()),
                    accumulator_high: vec![0.0; channels],
                }
            }
        };

        let delay_line = match kind {
            ResamplerKind::Linear => Vec::new(),
            _ => vec![0.0; 2 * self.num_taps * channels],
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "resampler: {:?} {} ch {} -> {} Hz ({}:{}), {} taps",
            kind,
            channels,
            self.input_rate,
            self.output_rate,
            ratio.numerator(),
            ratio.denominator(),
            self.num_taps
        );

        Ok(MultiChannelResampler {
            kind,
            channel_count: channels,
            num_taps: self.num_taps,
            numerator: i64::from(ratio.numerator()),
            denominator: i64::from(ratio.denominator()),
            integer_phase: i64::from(ratio.denominator()),
            cursor: 0,
            delay_line,
            accumulator: vec![0.0; channels],
            interpolator,
        })
    }
}

/// Per-algorithm state.
#[derive(Debug, Clone)]
enum Interpolator {
    Linear {
        previous: Vec<f32>,
        current: Vec<f32>,
    },
    Polyphase {
        coefficients: Vec<f32>,
        /// Start of the row used by the next read.
        cursor: usize,
    },
    Sinc {
        coefficients: Vec<f32>,
        num_rows: usize,
        /// Converts the integer phase into a fractional row index.
        phase_scaler: f64,
        accumulator_high: Vec<f32>,
    },
}

/// Converts a stream of interleaved frames from one sample rate to another.
///
/// All memory is allocated in [`ResamplerBuilder::build`];
/// [`write_next_frame`](Self::write_next_frame) and
/// [`read_next_frame`](Self::read_next_frame) are allocation-free.
#[derive(Debug, Clone)]
pub struct MultiChannelResampler {
    kind: ResamplerKind,
    channel_count: usize,
    num_taps: usize,
    numerator: i64,
    denominator: i64,
    integer_phase: i64,
    /// Frame index of the most recently written frame in the delay line.
    cursor: usize,
    /// `num_taps` frames stored twice back to back so a kernel can always
    /// be read as one contiguous slice.
    delay_line: Vec<f32>,
    accumulator: Vec<f32>,
    interpolator: Interpolator,
}

impl MultiChannelResampler {
    /// Factory: builds the cheapest resampler that meets `quality` for the
    /// given rates.
    ///
    /// The builder's [`DEFAULT_NORMALIZED_CUTOFF`] applies; it only takes
    /// effect when downsampling.
    pub fn make(
        channel_count: usize,
        input_rate: u32,
        output_rate: u32,
        quality: Quality,
    ) -> Result<Self, ResamplerError> {
        ResamplerBuilder::new()
            .channel_count(channel_count)
            .input_rate(input_rate)
            .output_rate(output_rate)
            .quality(quality)
            .build()
    }

    /// Returns the selected interpolator.
    pub fn kind(&self) -> ResamplerKind {
        self.kind
    }

    /// Returns the number of interleaved channels.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Returns the kernel length.
    pub fn num_taps(&self) -> usize {
        self.num_taps
    }

    /// Delay through the filter, in input frames.
    ///
    /// Writing this many silent frames after the last real one moves all
    /// of the real input through the kernel.
    pub fn latency_frames(&self) -> usize {
        self.num_taps / 2
    }

    /// Reduced input-rate term of the ratio.
    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    /// Reduced output-rate term of the ratio.
    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    /// Current integer phase.
    pub fn integer_phase(&self) -> i64 {
        self.integer_phase
    }

    /// The precomputed coefficient table, row by row. Empty for
    /// [`ResamplerKind::Linear`].
    pub fn coefficients(&self) -> &[f32] {
        match &self.interpolator {
            Interpolator::Linear { .. } => &[],
            Interpolator::Polyphase { coefficients, .. }
            | Interpolator::Sinc { coefficients, .. } => coefficients.as_slice(),
        }
    }

    /// True when the next operation must be a write.
    #[inline]
    pub fn is_write_needed(&self) -> bool {
        self.integer_phase >= self.denominator
    }

    /// Pushes one input frame of `channel_count` samples.
    ///
    /// Call only while [`is_write_needed`](Self::is_write_needed) is true.
    #[inline]
    pub fn write_next_frame(&mut self, frame: &[f32]) {
        self.write_frame(frame);
        self.integer_phase -= self.denominator;
    }

    /// Produces one output frame of `channel_count` samples.
    ///
    /// Call only while [`is_write_needed`](Self::is_write_needed) is false.
    #[inline]
    pub fn read_next_frame(&mut self, frame: &mut [f32]) {
        self.read_frame(frame);
        self.integer_phase += self.numerator;
    }

    /// Runs as many writes and reads as the two buffers allow.
    ///
    /// Returns `(input_frames_consumed, output_frames_produced)`. Stops when
    /// the next step would need input that is not there or output space
    /// that is not there.
    pub fn process_interleaved(&mut self, input: &[f32], output: &mut [f32]) -> (usize, usize) {
        let channels = self.channel_count;
        let mut inputs = input.chunks_exact(channels);
        let mut consumed = 0;
        let mut produced = 0;
        let output_frames = output.len() / channels;
        loop {
            if self.is_write_needed() {
                match inputs.next() {
                    Some(frame) => {
                        self.write_next_frame(frame);
                        consumed += 1;
                    }
                    None => break,
                }
            } else {
                if produced == output_frames {
                    break;
                }
                let start = produced * channels;
                self.read_next_frame(&mut output[start..start + channels]);
                produced += 1;
            }
        }
        (consumed, produced)
    }

    /// Clears history and returns the phase to its initial state.
    ///
    /// For stream discontinuities (seek, restart). Coefficients are kept.
    pub fn reset(&mut self) {
        self.delay_line.fill(0.0);
        self.cursor = 0;
        self.integer_phase = self.denominator;
        match &mut self.interpolator {
            Interpolator::Linear { previous, current } => {
                previous.fill(0.0);
                current.fill(0.0);
            }
            Interpolator::Polyphase { cursor, .. } => *cursor = 0,
            Interpolator::Sinc { .. } => {}
        }
    }

    fn write_frame(&mut self, frame: &[f32]) {
        let channels = self.channel_count;
        debug_assert!(frame.len() >= channels, "frame shorter than channel count");
        let frame = &frame[..channels];

        if let Interpolator::Linear { previous, current } = &mut self.interpolator {
            previous.copy_from_slice(current);
            current.copy_from_slice(frame);
            return;
        }

        // Move the cursor first so it points at the newest frame when reading.
        self.cursor = if self.cursor == 0 {
            self.num_taps - 1
        } else {
            self.cursor - 1
        };
        let start = self.cursor * channels;
        let mirror = start + self.num_taps * channels;
        self.delay_line[start..start + channels].copy_from_slice(frame);
        self.delay_line[mirror..mirror + channels].copy_from_slice(frame);
    }

    fn read_frame(&mut self, frame: &mut [f32]) {
        let channels = self.channel_count;
        debug_assert!(frame.len() >= channels, "frame shorter than channel count");
        let frame = &mut frame[..channels];

        let window_start = self.cursor * channels;
        let window_end = window_start + self.num_taps * channels;
        let taps = self.delay_line.get(window_start..window_end).unwrap_or(&[]);

        match &mut self.interpolator {
            Interpolator::Linear { previous, current } => {
                let phase = self.integer_phase as f32 / self.denominator as f32;
                for ((out, &f0), &f1) in frame.iter_mut().zip(previous.iter()).zip(current.iter())
                {
                    *out = f0 + phase * (f1 - f0);
                }
            }
            Interpolator::Polyphase {
                coefficients,
                cursor,
            } => {
                let row = &coefficients[*cursor..*cursor + self.num_taps];
                match self.kind {
                    ResamplerKind::PolyphaseMono => convolve_fixed::<1>(taps, row, frame),
                    ResamplerKind::PolyphaseStereo => convolve_fixed::<2>(taps, row, frame),
                    _ => convolve(taps, row, &mut self.accumulator, frame),
                }
                *cursor += self.num_taps;
                if *cursor >= coefficients.len() {
                    *cursor = 0;
                }
            }
            Interpolator::Sinc {
                coefficients,
                num_rows,
                phase_scaler,
                accumulator_high,
            } => {
                let table_phase = self.integer_phase as f64 * *phase_scaler;
                let index_low = (table_phase as usize).min(*num_rows - 2);
                let fraction = (table_phase - index_low as f64) as f32;
                let low_start = index_low * self.num_taps;
                let high_start = low_start + self.num_taps;
                let low = &coefficients[low_start..high_start];
                let high = &coefficients[high_start..high_start + self.num_taps];

                if self.kind == ResamplerKind::SincStereo {
                    convolve_pair_fixed::<2>(taps, low, high, fraction, frame);
                } else {
                    let acc_low = &mut self.accumulator;
                    acc_low.fill(0.0);
                    accumulator_high.fill(0.0);
                    for ((samples, &c_low), &c_high) in
                        taps.chunks_exact(channels).zip(low.iter()).zip(high.iter())
                    {
                        for ch in 0..channels {
                            acc_low[ch] += samples[ch] * c_low;
                            accumulator_high[ch] += samples[ch] * c_high;
                        }
                    }
                    for ch in 0..channels {
                        let l = acc_low[ch];
                        frame[ch] = l + fraction * (accumulator_high[ch] - l);
                    }
                }
            }
        }
    }
}

/// Dot product of each channel of `taps` with `row`, fixed channel count.
#[inline]
fn convolve_fixed<const N: usize>(taps: &[f32], row: &[f32], frame: &mut [f32]) {
    let mut acc = [0.0_f32; N];
    for (samples, &coefficient) in taps.chunks_exact(N).zip(row.iter()) {
        for ch in 0..N {
            acc[ch] += samples[ch] * coefficient;
        }
    }
    frame[..N].copy_from_slice(&acc);
}

/// Dot product of each channel of `taps` with `row`, any channel count.
#[inline]
fn convolve(taps: &[f32], row: &[f32], acc: &mut [f32], frame: &mut [f32]) {
    let channels = acc.len();
    acc.fill(0.0);
    for (samples, &coefficient) in taps.chunks_exact(channels).zip(row.iter()) {
        for (a, &s) in acc.iter_mut().zip(samples.iter()) {
            *a += s * coefficient;
        }
    }
    frame.copy_from_slice(acc);
}

/// Convolves against two neighbouring rows and blends the results.
#[inline]
fn convolve_pair_fixed<const N: usize>(
    taps: &[f32],
    low: &[f32],
    high: &[f32],
    fraction: f32,
    frame: &mut [f32],
) {
    let mut acc_low = [0.0_f32; N];
    let mut acc_high = [0.0_f32; N];
    for ((samples, &c_low), &c_high) in taps.chunks_exact(N).zip(low.iter()).zip(high.iter()) {
        for ch in 0..N {
            acc_low[ch] += samples[ch] * c_low;
            acc_high[ch] += samples[ch] * c_high;
        }
    }
    for ch in 0..N {
        frame[ch] = acc_low[ch] + fraction * (acc_high[ch] - acc_low[ch]);
    }
}
