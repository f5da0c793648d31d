//! Error types for the CLI.

use std::path::PathBuf;

use flowline_core::PipelineError;
use thiserror::Error;

/// Errors that can occur while loading, converting or writing files.
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to open, decode or encode a WAV file
    #[error("WAV error in '{path}': {source}")]
    Wav {
        /// Path of the WAV file.
        path: PathBuf,
        /// Underlying WAV error.
        #[source]
        source: hound::Error,
    },

    /// The WAV sample layout has no flowline wire format
    #[error("unsupported WAV encoding in '{path}': {bits}-bit {kind}")]
    UnsupportedWav {
        /// Path of the WAV file.
        path: PathBuf,
        /// Bits per sample.
        bits: u16,
        /// `int` or `float`.
        kind: &'static str,
    },

    /// The channel count does not fit a WAV header
    #[error("cannot write {channels} channels to '{path}' (WAV allows at most 65535)")]
    TooManyChannels {
        /// Path of the WAV file.
        path: PathBuf,
        /// Requested channel count.
        channels: usize,
    },

    /// Failed to parse a pipeline config file
    #[error("failed to parse config '{path}': {source}")]
    TomlParse {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A config field or flag has an unknown value
    #[error("invalid {field} '{value}' (expected one of: {expected})")]
    InvalidValue {
        /// Name of the field or flag.
        field: &'static str,
        /// The value given.
        value: String,
        /// Accepted values.
        expected: String,
    },

    /// The conversion graph could not be built or run
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

impl CliError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a WAV error.
    pub fn wav(path: impl Into<PathBuf>, source: hound::Error) -> Self {
        CliError::Wav {
            path: path.into(),
            source,
        }
    }
}
