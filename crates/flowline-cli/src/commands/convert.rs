//! File-based format, layout and rate conversion.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use flowline_core::{ConversionPipeline, SampleBuffer};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::PipelineFile;
use crate::wav::{self, WavOutput};

/// Frames converted per progress step.
const CHUNK_FRAMES: usize = 8192;

#[derive(Args)]
pub struct ConvertArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Pipeline settings file (TOML); flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output sample rate in Hz
    #[arg(short, long)]
    rate: Option<u32>,

    /// Output channel count
    #[arg(long)]
    channels: Option<usize>,

    /// Output sample format (f32, i16, i24, i32)
    #[arg(short, long)]
    format: Option<String>,

    /// Resampler quality (fastest, low, medium, high, best)
    #[arg(short, long)]
    quality: Option<String>,

    /// Output gain in dB
    #[arg(long, allow_hyphen_values = true)]
    gain_db: Option<f32>,

    /// Protection stage before the output (auto, clip, limit, off)
    #[arg(long)]
    clipping: Option<String>,

    /// Frames per graph block
    #[arg(long)]
    block_size: Option<usize>,
}

impl ConvertArgs {
    fn flags(&self) -> PipelineFile {
        PipelineFile {
            sample_rate: self.rate,
            channels: self.channels,
            format: self.format.clone(),
            quality: self.quality.clone(),
            block_size: self.block_size,
            gain_db: self.gain_db,
            ramp_frames: None,
            clipping: self.clipping.clone(),
        }
    }
}

pub fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let file = match &args.config {
        Some(path) => PipelineFile::load(path)?,
        None => PipelineFile::default(),
    };
    let settings = args.flags().or(file);

    println!("Reading {}...", args.input.display());
    let (input, info) = wav::read(&args.input)?;
    println!(
        "  {} frames, {} ch, {} Hz, {}",
        info.frames, info.stream.channels, info.stream.sample_rate, info.stream.format
    );

    let config = settings.to_config(info.stream)?;
    let mut pipeline = ConversionPipeline::new(config)?;
    tracing::info!(
        nodes = ?pipeline.node_names(),
        resampler = ?pipeline.resampler_kind(),
        "pipeline built"
    );

    let input_frames = input.frames(config.input.channels);
    pipeline.bind_input(input)?;
    pipeline.finish();
    let expected = pipeline.expected_output_frames(input_frames);

    println!(
        "Converting to {} ch, {} Hz, {}...",
        config.output.channels, config.output.sample_rate, config.output.format
    );
    let pb = ProgressBar::new(expected as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("invalid progress bar template")?
            .progress_chars("##-"),
    );

    let mut out = WavOutput::create(&args.output, config.output)?;
    let channels = config.output.channels;
    let mut chunk = SampleBuffer::zeroed(config.output.format, CHUNK_FRAMES * channels);
    let mut written = 0usize;
    loop {
        let frames = pipeline.read(&mut chunk, CHUNK_FRAMES)?;
        if frames == 0 {
            break;
        }
        out.write(&chunk, frames * channels)?;
        written += frames;
        pb.set_position(written.min(expected) as u64);
    }
    pb.finish_with_message("done");
    out.finalize()?;

    tracing::info!(input_frames, output_frames = written, "conversion finished");
    println!("Wrote {} frames to {}", written, args.output.display());
    Ok(())
}
