//! TOML pipeline settings.
//!
//! Every field is optional; whatever is left unset falls back to the input
//! file's own layout (rate, channels, format) or to the library defaults.
//!
//! ```toml
//! sample_rate = 48000
//! channels = 2
//! format = "i24"
//! quality = "high"
//! gain_db = -3.0
//! clipping = "limit"
//! ```

use std::path::Path;

use flowline_core::{Clipping, PipelineConfig, Quality, SampleFormatKind, StreamFormat};
use serde::Deserialize;

use crate::error::CliError;

/// Pipeline settings from a config file or from command-line flags.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineFile {
    /// Output sample rate in Hz.
    pub sample_rate: Option<u32>,
    /// Output channel count.
    pub channels: Option<usize>,
    /// Output wire format: `f32`, `i16`, `i24` or `i32`.
    pub format: Option<String>,
    /// Resampler quality: `fastest`, `low`, `medium`, `high` or `best`.
    pub quality: Option<String>,
    /// Frames per graph block.
    pub block_size: Option<usize>,
    /// Output gain in dB.
    pub gain_db: Option<f32>,
    /// Gain ramp length in frames.
    pub ramp_frames: Option<usize>,
    /// Protection stage: `auto`, `clip`, `limit` or `off`.
    pub clipping: Option<String>,
}

impl PipelineFile {
    /// Loads settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::read_file(path, e))?;
        toml::from_str(&text).map_err(|source| CliError::TomlParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fields set in `self` win; unset ones are taken from `fallback`.
    pub fn or(self, fallback: PipelineFile) -> PipelineFile {
        PipelineFile {
            sample_rate: self.sample_rate.or(fallback.sample_rate),
            channels: self.channels.or(fallback.channels),
            format: self.format.or(fallback.format),
            quality: self.quality.or(fallback.quality),
            block_size: self.block_size.or(fallback.block_size),
            gain_db: self.gain_db.or(fallback.gain_db),
            ramp_frames: self.ramp_frames.or(fallback.ramp_frames),
            clipping: self.clipping.or(fallback.clipping),
        }
    }

    /// Builds the pipeline configuration for converting `input`.
    pub fn to_config(&self, input: StreamFormat) -> Result<PipelineConfig, CliError> {
        let defaults = PipelineConfig::default();
        let format = match &self.format {
            Some(name) => parse_format(name)?,
            None => input.format,
        };
        Ok(PipelineConfig {
            input,
            output: StreamFormat::new(
                self.channels.unwrap_or(input.channels),
                self.sample_rate.unwrap_or(input.sample_rate),
                format,
            ),
            quality: self
                .quality
                .as_deref()
                .map(parse_quality)
                .transpose()?
                .unwrap_or(defaults.quality),
            block_size: self.block_size.unwrap_or(defaults.block_size),
            ramp_frames: self.ramp_frames.unwrap_or(defaults.ramp_frames),
            initial_gain: self.gain_db.map_or(defaults.initial_gain, db_to_linear),
            clipping: self
                .clipping
                .as_deref()
                .map(parse_clipping)
                .transpose()?
                .unwrap_or(defaults.clipping),
        })
    }
}

/// Converts decibels to linear gain.
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

fn invalid(field: &'static str, value: &str, expected: &[&str]) -> CliError {
    CliError::InvalidValue {
        field,
        value: value.to_string(),
        expected: expected.join(", "),
    }
}

/// Parses a wire format name.
pub fn parse_format(name: &str) -> Result<SampleFormatKind, CliError> {
    SampleFormatKind::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = SampleFormatKind::ALL.iter().map(|k| k.name()).collect();
        invalid("format", name, &names)
    })
}

/// Parses a resampler quality name.
pub fn parse_quality(name: &str) -> Result<Quality, CliError> {
    Quality::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = Quality::ALL.iter().map(|q| q.name()).collect();
        invalid("quality", name, &names)
    })
}

/// Parses a clipping mode name.
pub fn parse_clipping(name: &str) -> Result<Clipping, CliError> {
    Clipping::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = Clipping::ALL.iter().map(|c| c.name()).collect();
        invalid("clipping", name, &names)
    })
}
