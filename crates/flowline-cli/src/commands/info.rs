//! Display WAV file metadata.

use std::path::PathBuf;

use clap::Args;
use flowline_resampler::MultiChannelResampler;

use crate::config::parse_quality;
use crate::wav::read_info;

/// Display WAV file information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to the WAV file
    pub file: PathBuf,

    /// Also show the resampler a conversion to this rate would use
    #[arg(long)]
    pub rate: Option<u32>,

    /// Resampler quality for --rate
    #[arg(long, default_value = "medium")]
    pub quality: String,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let info = read_info(&args.file)?;
    let stream = info.stream;

    println!("File:        {}", args.file.display());
    println!("Format:      {} ({}-bit)", stream.format, info.bits_per_sample);
    println!("Channels:    {}", stream.channels);
    println!("Sample Rate: {} Hz", stream.sample_rate);
    println!("Duration:    {:.3}s ({} frames)", info.duration_secs(), info.frames);

    if let Some(rate) = args.rate {
        let quality = parse_quality(&args.quality)?;
        let resampler =
            MultiChannelResampler::make(stream.channels, stream.sample_rate, rate, quality)?;
        println!();
        println!("Resampling {} Hz -> {} Hz ({}):", stream.sample_rate, rate, quality.name());
        println!("  Kind:      {:?}", resampler.kind());
        println!("  Ratio:     {}:{}", resampler.numerator(), resampler.denominator());
        println!("  Taps:      {}", resampler.num_taps());
        println!("  Latency:   {} input frames", resampler.latency_frames());
        println!("  Table:     {} coefficients", resampler.coefficients().len());
    }

    Ok(())
}
