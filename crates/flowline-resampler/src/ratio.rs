//! Exact integer ratios between sample rates.

/// Ratio of two positive integers, typically `input_rate : output_rate`.
///
/// The resampler phase accumulator works in units of this ratio, so reducing
/// it keeps the accumulator small and the polyphase table short.
///
/// ```rust
/// use flowline_resampler::IntegerRatio;
///
/// let ratio = IntegerRatio::new(44100, 48000).reduced();
/// assert_eq!((ratio.numerator(), ratio.denominator()), (147, 160));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerRatio {
    numerator: u32,
    denominator: u32,
}

impl IntegerRatio {
    /// Creates a ratio without reducing it.
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Divides both terms by their greatest common divisor in place.
    pub fn reduce(&mut self) {
        let g = gcd(self.numerator, self.denominator);
        if g > 1 {
            self.numerator /= g;
            self.denominator /= g;
        }
    }

    /// Returns the ratio in lowest terms.
    pub fn reduced(mut self) -> Self {
        self.reduce();
        self
    }

    /// Returns the numerator.
    #[inline]
    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    /// Returns the denominator.
    #[inline]
    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Returns the ratio as a float.
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

/// Greatest common divisor (Euclid). `gcd(0, 0)` is 0.
pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}
