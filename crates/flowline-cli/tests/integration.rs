//! Integration tests for flowline-cli.
//!
//! Each test writes a WAV fixture into a temp directory, runs the `flowline`
//! binary on it and inspects the output file with `hound`.

use std::path::Path;
use std::process::Command;

/// Helper to get the path to the `flowline` binary built by cargo.
fn flowline_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_flowline"))
}

/// Writes `frames` frames of a 440 Hz sine at half scale as 16-bit PCM.
fn write_sine_i16(path: &Path, channels: u16, sample_rate: u32, frames: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for n in 0..frames {
        let t = n as f32 / sample_rate as f32;
        let s = (0.5 * (core::f32::consts::TAU * 440.0 * t).sin() * 32767.0) as i16;
        for _ in 0..channels {
            writer.write_sample(s).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn rms(samples: &[f32]) -> f32 {
    let sum_sq: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

// ---------------------------------------------------------------------------
// `flowline info`
// ---------------------------------------------------------------------------

#[test]
fn info_prints_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    write_sine_i16(&input, 2, 44_100, 4410);

    let output = flowline_bin()
        .arg("info")
        .arg(&input)
        .output()
        .expect("failed to run flowline info");
    assert!(output.status.success(), "flowline info failed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("i16"), "got: {stdout}");
    assert!(stdout.contains("Channels:    2"), "got: {stdout}");
    assert!(stdout.contains("44100 Hz"), "got: {stdout}");
    assert!(stdout.contains("4410 frames"), "got: {stdout}");
}

#[test]
fn info_reports_resampler_choice() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    write_sine_i16(&input, 2, 44_100, 100);

    let output = flowline_bin()
        .args(["info", "--rate", "48000"])
        .arg(&input)
        .output()
        .expect("failed to run flowline info --rate");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PolyphaseStereo"), "got: {stdout}");
    assert!(stdout.contains("147:160"), "got: {stdout}");
    assert!(stdout.contains("Latency:   4 input frames"), "got: {stdout}");
}

#[test]
fn info_fails_on_missing_file() {
    let output = flowline_bin()
        .args(["info", "/definitely/not/here.wav"])
        .output()
        .expect("failed to run flowline info");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("here.wav"), "got: {stderr}");
}

// ---------------------------------------------------------------------------
// `flowline convert`
// ---------------------------------------------------------------------------

#[test]
fn convert_resamples_and_changes_layout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");
    write_sine_i16(&input, 1, 44_100, 44_100);

    let status = flowline_bin()
        .arg("convert")
        .arg(&input)
        .arg(&output_path)
        .args(["--rate", "48000", "--channels", "2", "--format", "f32"])
        .status()
        .expect("failed to run flowline convert");
    assert!(status.success());

    let mut reader = hound::WavReader::open(&output_path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 48_000);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    assert_eq!(spec.bits_per_sample, 32);

    let samples: Vec<f32> = reader.samples::<f32>().map(Result::unwrap).collect();
    let frames = samples.len() / 2;
    // One second at 48 kHz plus the flushed 4-frame tail of the medium
    // quality kernel: ceil(44104 * 160 / 147).
    assert_eq!(frames, 48_005);

    let left: Vec<f32> = samples.iter().step_by(2).copied().collect();
    let level = rms(&left[4800..43_200]);
    let expected = 0.5 / core::f32::consts::SQRT_2;
    assert!((level - expected).abs() < expected * 0.05, "rms {level}");
}

/// An impulse in the very last input frame must survive resampling.
#[test]
fn convert_keeps_the_last_input_frame() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&input, spec).unwrap();
    for n in 0..4410 {
        writer.write_sample(if n == 4409 { 1.0_f32 } else { 0.0 }).unwrap();
    }
    writer.finalize().unwrap();

    let status = flowline_bin()
        .arg("convert")
        .arg(&input)
        .arg(&output_path)
        .args(["--rate", "48000", "--quality", "best"])
        .status()
        .expect("failed to run flowline convert");
    assert!(status.success());

    let mut reader = hound::WavReader::open(&output_path).unwrap();
    let samples: Vec<f32> = reader.samples::<f32>().map(Result::unwrap).collect();
    assert_eq!(samples.len(), ((4410 + 16) * 160_usize).div_ceil(147));
    let tail_peak = samples[4800..].iter().fold(0.0_f32, |m, s| m.max(s.abs()));
    assert!(tail_peak > 0.5, "tail peak {tail_peak}");
}

#[test]
fn convert_applies_config_file_and_flag_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");
    let config = dir.path().join("pipeline.toml");
    write_sine_i16(&input, 2, 48_000, 4800);
    std::fs::write(
        &config,
        "format = \"i24\"\ngain_db = -6.0206\nclipping = \"limit\"\nsample_rate = 96000\n",
    )
    .unwrap();

    let status = flowline_bin()
        .arg("convert")
        .arg(&input)
        .arg(&output_path)
        .arg("--config")
        .arg(&config)
        .args(["--rate", "48000"])
        .status()
        .expect("failed to run flowline convert --config");
    assert!(status.success());

    let mut reader = hound::WavReader::open(&output_path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 48_000, "flag must override the file");
    assert_eq!(spec.bits_per_sample, 24);

    let samples: Vec<i32> = reader.samples::<i32>().map(Result::unwrap).collect();
    assert_eq!(samples.len(), 4800 * 2);
    let peak = samples.iter().map(|s| s.abs()).max().unwrap_or(0);
    // Half-scale sine at -6 dB peaks near a quarter of 24-bit full scale.
    let quarter = 1 << 21;
    assert!(
        (peak - quarter).abs() < quarter / 50,
        "peak {peak}, expected about {quarter}"
    );
}

#[test]
fn convert_rejects_unknown_format() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    write_sine_i16(&input, 1, 8000, 10);

    let output = flowline_bin()
        .arg("convert")
        .arg(&input)
        .arg(dir.path().join("out.wav"))
        .args(["--format", "u8"])
        .output()
        .expect("failed to run flowline convert");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("f32, i16, i24, i32"), "got: {stderr}");
}
