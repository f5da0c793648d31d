//! Sample format conversion between wire formats and internal `f32`.
//!
//! All graph processing happens in `f32`. Sources decode from, and sinks
//! encode to, one of four interleaved wire formats:
//!
//! | format | storage | decode | encode |
//! |--------|---------|--------|--------|
//! | [`F32`] | `f32` | identity | identity |
//! | [`I16`] | `i16` | `x / 2^15` | `round(x · 2^15)`, clamped |
//! | [`I24Packed`] | 3 × `u8`, little-endian | `(b0<<8 \| b1<<16 \| b2<<24) / 2^31` | `round(x · 2^23)`, clamped |
//! | [`I32`] | `i32` | `x / 2^31` | `round(x · 2^31)`, clamped |
//!
//! Every converter is total: out-of-range input clamps, NaN encodes as zero,
//! and mismatched slice lengths convert the common prefix.

use core::fmt;

const SCALE_I16: f32 = 1.0 / 32768.0;
const SCALE_I32: f32 = 1.0 / 2_147_483_648.0;
const FULL_SCALE_I24: f32 = 8_388_608.0;

/// Decodes a 16-bit sample.
#[inline]
pub fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) * SCALE_I16
}

/// Encodes a 16-bit sample, rounding to nearest and clamping.
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    libm::roundf(sample * 32768.0).clamp(-32768.0, 32767.0) as i16
}

/// Decodes a packed little-endian 24-bit sample.
///
/// The three bytes land in the top of a 32-bit word so the sign bit lines
/// up, then the word is scaled like a full-range 32-bit sample.
#[inline]
pub fn i24_packed_to_f32(bytes: [u8; 3]) -> f32 {
    let word =
        (u32::from(bytes[0]) << 8) | (u32::from(bytes[1]) << 16) | (u32::from(bytes[2]) << 24);
    word as i32 as f32 * SCALE_I32
}

/// Encodes a packed little-endian 24-bit sample, rounding to nearest and
/// clamping to `[-2^23, 2^23 - 1]`.
#[inline]
pub fn f32_to_i24_packed(sample: f32) -> [u8; 3] {
    let n = libm::roundf(sample * FULL_SCALE_I24)
        .clamp(-FULL_SCALE_I24, FULL_SCALE_I24 - 1.0) as i32;
    let bytes = n.to_le_bytes();
    [bytes[0], bytes[1], bytes[2]]
}

/// Decodes a full-range 32-bit sample.
#[inline]
pub fn i32_to_f32(sample: i32) -> f32 {
    sample as f32 * SCALE_I32
}

/// Encodes a full-range 32-bit sample, rounding to nearest and clamping.
#[inline]
pub fn f32_to_i32(sample: f32) -> i32 {
    // f32 cannot represent 2^31 - 1, so round and clamp in f64.
    libm::round(f64::from(sample) * 2_147_483_648.0)
        .clamp(-2_147_483_648.0, 2_147_483_647.0) as i32
}

/// Decodes a slice of 16-bit samples.
pub fn convert_i16_to_f32(src: &[i16], dst: &mut [f32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = i16_to_f32(s);
    }
}

/// Encodes a slice of 16-bit samples.
pub fn convert_f32_to_i16(src: &[f32], dst: &mut [i16]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = f32_to_i16(s);
    }
}

/// Decodes packed 24-bit samples; `src` holds three bytes per sample.
pub fn convert_i24_packed_to_f32(src: &[u8], dst: &mut [f32]) {
    for (d, s) in dst.iter_mut().zip(src.chunks_exact(3)) {
        *d = i24_packed_to_f32([s[0], s[1], s[2]]);
    }
}

/// Encodes packed 24-bit samples; `dst` receives three bytes per sample.
pub fn convert_f32_to_i24_packed(src: &[f32], dst: &mut [u8]) {
    for (d, &s) in dst.chunks_exact_mut(3).zip(src) {
        d.copy_from_slice(&f32_to_i24_packed(s));
    }
}

/// Decodes a slice of 32-bit samples.
pub fn convert_i32_to_f32(src: &[i32], dst: &mut [f32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = i32_to_f32(s);
    }
}

/// Encodes a slice of 32-bit samples.
pub fn convert_f32_to_i32(src: &[f32], dst: &mut [i32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = f32_to_i32(s);
    }
}

/// Runtime tag for a wire format, used by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleFormatKind {
    /// 32-bit float.
    #[default]
    F32,
    /// Signed 16-bit.
    I16,
    /// Signed 24-bit packed in three little-endian bytes.
    I24Packed,
    /// Signed 32-bit.
    I32,
}

impl SampleFormatKind {
    /// All formats.
    pub const ALL: [SampleFormatKind; 4] = [
        SampleFormatKind::F32,
        SampleFormatKind::I16,
        SampleFormatKind::I24Packed,
        SampleFormatKind::I32,
    ];

    /// Bytes one sample occupies on the wire.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::I16 => 2,
            Self::I24Packed => 3,
            Self::F32 | Self::I32 => 4,
        }
    }

    /// Whether the format is an integer format.
    pub fn is_integer(self) -> bool {
        !matches!(self, Self::F32)
    }

    /// Short lower-case name: `f32`, `i16`, `i24`, `i32`.
    pub fn name(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::I16 => "i16",
            Self::I24Packed => "i24",
            Self::I32 => "i32",
        }
    }

    /// Parses a name produced by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for SampleFormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A wire format known at compile time.
///
/// `Sample` is the storage unit of a buffer in this format. For
/// [`I24Packed`] that is a byte, so one sample spans
/// [`UNITS_PER_SAMPLE`](Self::UNITS_PER_SAMPLE) units.
pub trait SampleFormat: Send + 'static {
    /// Storage unit.
    type Sample: Copy + Default + Send + Sync + fmt::Debug + 'static;

    /// Runtime tag.
    const KIND: SampleFormatKind;

    /// Storage units per sample.
    const UNITS_PER_SAMPLE: usize = 1;

    /// Decodes `src` into `dst`.
    fn decode(src: &[Self::Sample], dst: &mut [f32]);

    /// Encodes `src` into `dst`.
    fn encode(src: &[f32], dst: &mut [Self::Sample]);

    /// Decodes little-endian wire bytes into `dst`.
    fn decode_bytes(src: &[u8], dst: &mut [f32]);
}

/// 32-bit float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct F32;

/// Signed 16-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I16;

/// Signed 24-bit integer, packed little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I24Packed;

/// Signed 32-bit integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I32;

impl SampleFormat for F32 {
    type Sample = f32;
    const KIND: SampleFormatKind = SampleFormatKind::F32;

    fn decode(src: &[f32], dst: &mut [f32]) {
        let n = src.len().min(dst.len());
        dst[..n].copy_from_slice(&src[..n]);
    }

    fn encode(src: &[f32], dst: &mut [f32]) {
        let n = src.len().min(dst.len());
        dst[..n].copy_from_slice(&src[..n]);
    }

    fn decode_bytes(src: &[u8], dst: &mut [f32]) {
        for (d, s) in dst.iter_mut().zip(src.chunks_exact(4)) {
            *d = f32::from_le_bytes([s[0], s[1], s[2], s[3]]);
        }
    }
}

impl SampleFormat for I16 {
    type Sample = i16;
    const KIND: SampleFormatKind = SampleFormatKind::I16;

    fn decode(src: &[i16], dst: &mut [f32]) {
        convert_i16_to_f32(src, dst);
    }

    fn encode(src: &[f32], dst: &mut [i16]) {
        convert_f32_to_i16(src, dst);
    }

    fn decode_bytes(src: &[u8], dst: &mut [f32]) {
        for (d, s) in dst.iter_mut().zip(src.chunks_exact(2)) {
            *d = i16_to_f32(i16::from_le_bytes([s[0], s[1]]));
        }
    }
}

impl SampleFormat for I24Packed {
    type Sample = u8;
    const KIND: SampleFormatKind = SampleFormatKind::I24Packed;
    const UNITS_PER_SAMPLE: usize = 3;

    fn decode(src: &[u8], dst: &mut [f32]) {
        convert_i24_packed_to_f32(src, dst);
    }

    fn encode(src: &[f32], dst: &mut [u8]) {
        convert_f32_to_i24_packed(src, dst);
    }

    fn decode_bytes(src: &[u8], dst: &mut [f32]) {
        convert_i24_packed_to_f32(src, dst);
    }
}

impl SampleFormat for I32 {
    type Sample = i32;
    const KIND: SampleFormatKind = SampleFormatKind::I32;

    fn decode(src: &[i32], dst: &mut [f32]) {
        convert_i32_to_f32(src, dst);
    }

    fn encode(src: &[f32], dst: &mut [i32]) {
        convert_f32_to_i32(src, dst);
    }

    fn decode_bytes(src: &[u8], dst: &mut [f32]) {
        for (d, s) in dst.iter_mut().zip(src.chunks_exact(4)) {
            *d = i32_to_f32(i32::from_le_bytes([s[0], s[1], s[2], s[3]]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i16_full_scale() {
        assert_eq!(i16_to_f32(i16::MIN), -1.0);
        assert_eq!(i16_to_f32(16384), 0.5);
        assert_eq!(f32_to_i16(0.5), 16384);
        assert_eq!(f32_to_i16(1.0), i16::MAX);
        assert_eq!(f32_to_i16(-1.0), i16::MIN);
        assert_eq!(f32_to_i16(7.0), i16::MAX);
        assert_eq!(f32_to_i16(f32::NAN), 0);
    }

    #[test]
    fn i24_sign_extends() {
        assert_eq!(i24_packed_to_f32([0x00, 0x00, 0x80]), -1.0);
        assert_eq!(i24_packed_to_f32([0x00, 0x00, 0x40]), 0.5);
        assert_eq!(i24_packed_to_f32([0xFF, 0xFF, 0xFF]), -1.0 / 8_388_608.0);
    }

    #[test]
    fn i24_encode_clamps() {
        assert_eq!(f32_to_i24_packed(0.0), [0, 0, 0]);
        assert_eq!(f32_to_i24_packed(-1.0), [0x00, 0x00, 0x80]);
        assert_eq!(f32_to_i24_packed(1.0), [0xFF, 0xFF, 0x7F]);
        assert_eq!(f32_to_i24_packed(3.5), [0xFF, 0xFF, 0x7F]);
        assert_eq!(f32_to_i24_packed(-3.5), [0x00, 0x00, 0x80]);
        assert_eq!(f32_to_i24_packed(f32::NAN), [0, 0, 0]);
    }

    #[test]
    fn i32_full_scale() {
        assert_eq!(i32_to_f32(i32::MIN), -1.0);
        assert_eq!(f32_to_i32(1.0), i32::MAX);
        assert_eq!(f32_to_i32(-1.0), i32::MIN);
        assert_eq!(f32_to_i32(0.5), 1 << 30);
        assert_eq!(f32_to_i32(-2.0), i32::MIN);
    }

    #[test]
    fn slice_converters_stop_at_shorter_slice() {
        let mut dst = [9.0_f32; 4];
        convert_i16_to_f32(&[16384, -16384], &mut dst);
        assert_eq!(dst, [0.5, -0.5, 9.0, 9.0]);

        let mut bytes = [0u8; 5];
        convert_f32_to_i24_packed(&[0.5, 0.5], &mut bytes);
        assert_eq!(bytes, [0x00, 0x00, 0x40, 0, 0]);
    }

    #[test]
    fn decode_bytes_matches_decode() {
        let samples: [i16; 3] = [-12000, 0, 31000];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let mut from_bytes = [0.0; 3];
        let mut from_samples = [0.0; 3];
        I16::decode_bytes(&bytes, &mut from_bytes);
        I16::decode(&samples, &mut from_samples);
        assert_eq!(from_bytes, from_samples);
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in SampleFormatKind::ALL {
            assert_eq!(SampleFormatKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(SampleFormatKind::from_name("u8"), None);
        assert_eq!(SampleFormatKind::I24Packed.bytes_per_sample(), 3);
        assert_eq!(<I24Packed as SampleFormat>::UNITS_PER_SAMPLE, 3);
    }
}
