//! WAV files as flowline sample buffers.
//!
//! Samples are loaded in their native wire format (`i16`, packed 24-bit,
//! `i32` or `f32`) so the conversion pipeline does all decoding itself.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flowline_core::{SampleBuffer, SampleFormatKind, StreamFormat};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::CliError;

type Reader = WavReader<BufReader<File>>;
type Writer = WavWriter<BufWriter<File>>;

/// Metadata of a WAV file.
#[derive(Debug, Clone, Copy)]
pub struct WavInfo {
    /// Channel count, rate and wire format.
    pub stream: StreamFormat,
    /// Bits per sample as stored in the file.
    pub bits_per_sample: u16,
    /// Frames in the file.
    pub frames: u64,
}

impl WavInfo {
    /// Length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.stream.sample_rate)
    }
}

/// Maps a WAV encoding onto a flowline wire format.
fn wire_format(path: &Path, spec: WavSpec) -> Result<SampleFormatKind, CliError> {
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => Ok(SampleFormatKind::I16),
        (SampleFormat::Int, 24) => Ok(SampleFormatKind::I24Packed),
        (SampleFormat::Int, 32) => Ok(SampleFormatKind::I32),
        (SampleFormat::Float, 32) => Ok(SampleFormatKind::F32),
        (format, bits) => Err(CliError::UnsupportedWav {
            path: path.to_path_buf(),
            bits,
            kind: match format {
                SampleFormat::Int => "int",
                SampleFormat::Float => "float",
            },
        }),
    }
}

fn open(path: &Path) -> Result<Reader, CliError> {
    WavReader::open(path).map_err(|e| CliError::wav(path, e))
}

fn info_from(path: &Path, reader: &Reader) -> Result<WavInfo, CliError> {
    let spec = reader.spec();
    let channels = usize::from(spec.channels);
    Ok(WavInfo {
        stream: StreamFormat::new(channels, spec.sample_rate, wire_format(path, spec)?),
        bits_per_sample: spec.bits_per_sample,
        frames: u64::from(reader.len()) / channels.max(1) as u64,
    })
}

/// Reads only the header of a WAV file.
pub fn read_info(path: &Path) -> Result<WavInfo, CliError> {
    let reader = open(path)?;
    info_from(path, &reader)
}

/// Reads a whole WAV file in its native wire format.
pub fn read(path: &Path) -> Result<(SampleBuffer, WavInfo), CliError> {
    let mut reader = open(path)?;
    let info = info_from(path, &reader)?;
    let wav_err = |e| CliError::wav(path, e);

    let buffer = match info.stream.format {
        SampleFormatKind::F32 => SampleBuffer::F32(
            reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(wav_err)?,
        ),
        SampleFormatKind::I16 => SampleBuffer::I16(
            reader
                .samples::<i16>()
                .collect::<Result<_, _>>()
                .map_err(wav_err)?,
        ),
        SampleFormatKind::I24Packed => {
            let mut bytes = Vec::with_capacity(reader.len() as usize * 3);
            for sample in reader.samples::<i32>() {
                let b = sample.map_err(wav_err)?.to_le_bytes();
                bytes.extend_from_slice(&b[..3]);
            }
            SampleBuffer::I24Packed(bytes)
        }
        SampleFormatKind::I32 => SampleBuffer::I32(
            reader
                .samples::<i32>()
                .collect::<Result<_, _>>()
                .map_err(wav_err)?,
        ),
    };
    Ok((buffer, info))
}

/// Streams sample buffers into a WAV file.
pub struct WavOutput {
    path: PathBuf,
    writer: Writer,
}

impl WavOutput {
    /// Creates `path` for `stream`.
    pub fn create(path: &Path, stream: StreamFormat) -> Result<Self, CliError> {
        let (bits_per_sample, sample_format) = match stream.format {
            SampleFormatKind::F32 => (32, SampleFormat::Float),
            SampleFormatKind::I16 => (16, SampleFormat::Int),
            SampleFormatKind::I24Packed => (24, SampleFormat::Int),
            SampleFormatKind::I32 => (32, SampleFormat::Int),
        };
        let channels =
            u16::try_from(stream.channels).map_err(|_| CliError::TooManyChannels {
                path: path.to_path_buf(),
                channels: stream.channels,
            })?;
        let spec = WavSpec {
            channels,
            sample_rate: stream.sample_rate,
            bits_per_sample,
            sample_format,
        };
        let writer = WavWriter::create(path, spec).map_err(|e| CliError::wav(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
        })
    }

    /// Appends the first `samples` samples of `buffer`.
    pub fn write(&mut self, buffer: &SampleBuffer, samples: usize) -> Result<(), CliError> {
        let result = match buffer {
            SampleBuffer::F32(v) => write_all(&mut self.writer, &v[..samples.min(v.len())]),
            SampleBuffer::I16(v) => write_all(&mut self.writer, &v[..samples.min(v.len())]),
            SampleBuffer::I24Packed(v) => {
                let bytes = &v[..(samples * 3).min(v.len())];
                bytes.chunks_exact(3).try_for_each(|b| {
                    // Sign-extend from the top byte.
                    let value = i32::from_le_bytes([0, b[0], b[1], b[2]]) >> 8;
                    self.writer.write_sample(value)
                })
            }
            SampleBuffer::I32(v) => write_all(&mut self.writer, &v[..samples.min(v.len())]),
        };
        result.map_err(|e| CliError::wav(&self.path, e))
    }

    /// Writes the header and closes the file.
    pub fn finalize(self) -> Result<(), CliError> {
        let path = self.path;
        self.writer.finalize().map_err(|e| CliError::wav(path, e))
    }
}

fn write_all<S: hound::Sample + Copy>(writer: &mut Writer, samples: &[S]) -> hound::Result<()> {
    samples.iter().try_for_each(|&s| writer.write_sample(s))
}
