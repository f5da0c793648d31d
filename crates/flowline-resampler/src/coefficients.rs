//! Windowed-sinc FIR coefficient tables.
//!
//! A table holds `num_rows` rows of `num_taps` coefficients. Each row is the
//! interpolation kernel for one fractional phase between input samples:
//!
//! ```text
//! h[row][tap] = sinc(π · t · cutoff_scaler) · window(t / (num_taps / 2))
//! t = phase(row) − num_taps/2 + tap
//! ```
//!
//! Rows are stored contiguously in the order the resampler walks them, and
//! every row is normalized to unity DC gain on its own, so a constant input
//! produces the same constant output whatever the phase.
//!
//! Reference: J. O. Smith, *Digital Audio Resampling Home Page*, CCRMA, 2002.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f64::consts::PI;

use crate::window::{HyperbolicCosineWindow, KaiserWindow, WindowKind};

/// `sin(x) / x`, with the removable singularity at 0 filled in.
#[inline]
pub fn sinc(radians: f64) -> f64 {
    if radians.abs() < 1.0e-9 {
        1.0
    } else {
        libm::sin(radians) / radians
    }
}

/// Parameters shared by every row of a coefficient table.
#[derive(Debug, Clone, Copy)]
pub struct KernelDesign {
    /// Taps per row. Must be even.
    pub num_taps: usize,
    /// Input sample rate in Hz.
    pub input_rate: u32,
    /// Output sample rate in Hz.
    pub output_rate: u32,
    /// Cutoff as a fraction of the output Nyquist, used only when
    /// downsampling.
    pub normalized_cutoff: f64,
    /// Window applied to the sinc kernel.
    pub window: WindowKind,
}

impl KernelDesign {
    /// Horizontal stretch applied to the sinc argument.
    ///
    /// When downsampling the kernel is widened so its cutoff lands below the
    /// output Nyquist. Upsampling cannot alias from the input side, so the
    /// kernel stays at full bandwidth.
    pub fn cutoff_scaler(&self) -> f64 {
        if self.output_rate < self.input_rate {
            self.normalized_cutoff * self.output_rate as f64 / self.input_rate as f64
        } else {
            1.0
        }
    }
}

enum Window {
    Cosh(HyperbolicCosineWindow),
    Kaiser(KaiserWindow),
}

impl Window {
    fn new(kind: WindowKind) -> Self {
        match kind {
            WindowKind::HyperbolicCosine => Window::Cosh(HyperbolicCosineWindow::new()),
            WindowKind::Kaiser => Window::Kaiser(KaiserWindow::new()),
        }
    }

    #[inline]
    fn value(&self, x: f64) -> f64 {
        match self {
            Window::Cosh(w) => w.value(x),
            Window::Kaiser(w) => w.value(x),
        }
    }
}

/// Builds a `num_rows × num_taps` coefficient table.
///
/// `row_phase(row)` gives the fractional position (normally in `[0, 1]`)
/// between input samples that row `row` interpolates.
pub fn generate_coefficients<F>(design: &KernelDesign, num_rows: usize, row_phase: F) -> Vec<f32>
where
    F: Fn(usize) -> f64,
{
    let num_taps = design.num_taps;
    debug_assert!(num_taps >= 2 && num_taps % 2 == 0, "tap count must be even");

    let window = Window::new(design.window);
    let cutoff_scaler = design.cutoff_scaler();
    let num_taps_half = (num_taps / 2) as f64;
    let inverse_half = 1.0 / num_taps_half;

    let mut coefficients = Vec::with_capacity(num_taps * num_rows);
    let mut row = Vec::with_capacity(num_taps);

    for r in 0..num_rows {
        row.clear();
        let mut tap_phase = row_phase(r) - num_taps_half;
        let mut gain = 0.0;
        for _ in 0..num_taps {
            let coefficient =
                sinc(tap_phase * PI * cutoff_scaler) * window.value(tap_phase * inverse_half);
            row.push(coefficient);
            gain += coefficient;
            tap_phase += 1.0;
        }

        let correction = 1.0 / gain;
        coefficients.extend(row.iter().map(|&c| (c * correction) as f32));
    }

    coefficients
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design(num_taps: usize, input_rate: u32, output_rate: u32) -> KernelDesign {
        KernelDesign {
            num_taps,
            input_rate,
            output_rate,
            normalized_cutoff: 0.70,
            window: WindowKind::HyperbolicCosine,
        }
    }

    #[test]
    fn sinc_is_one_at_origin() {
        assert_eq!(sinc(0.0), 1.0);
        assert_eq!(sinc(5.0e-10), 1.0);
        assert!(sinc(PI).abs() < 1e-12);
        assert!((sinc(PI / 2.0) - 2.0 / PI).abs() < 1e-12);
    }

    #[test]
    fn every_row_has_unity_gain() {
        for window in [WindowKind::HyperbolicCosine, WindowKind::Kaiser] {
            let mut d = design(16, 48000, 44100);
            d.window = window;
            let rows = 7;
            let table = generate_coefficients(&d, rows, |r| r as f64 / rows as f64);
            assert_eq!(table.len(), 16 * rows);
            for row in table.chunks_exact(16) {
                let sum: f32 = row.iter().sum();
                assert!((sum - 1.0).abs() < 1e-5, "row sum {sum}");
            }
        }
    }

    #[test]
    fn zero_phase_row_is_near_impulse_when_upsampling() {
        // At phase 0 with full bandwidth the kernel samples sinc at integers:
        // a single 1.0 at the center tap and zeros elsewhere.
        let table = generate_coefficients(&design(8, 44100, 48000), 1, |_| 0.0);
        for (i, &c) in table.iter().enumerate() {
            if i == 4 {
                assert!((c - 1.0).abs() < 1e-6);
            } else {
                assert!(c.abs() < 1e-6, "tap {i} = {c}");
            }
        }
    }

    #[test]
    fn cutoff_only_scales_when_downsampling() {
        assert_eq!(design(8, 44100, 48000).cutoff_scaler(), 1.0);
        let down = design(8, 48000, 24000).cutoff_scaler();
        assert!((down - 0.35).abs() < 1e-12);
    }
}
