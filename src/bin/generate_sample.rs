use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use hound::{SampleFormat, WavSpec, WavWriter};
use rand::prelude::*;
use rand::rngs::StdRng;

use birdclef_manifest::labels::BIRDCLEF_CODES;
use birdclef_manifest::manifest::{AUDIO_DIR, METADATA_FILE};

/// Write a small synthetic dataset (metadata table + WAV tones) that the
/// manifest builder can run on.
#[derive(Parser, Debug)]
#[command(name = "generate-sample")]
struct Args {
    /// Dataset directory to create
    #[arg(default_value = "sample_data")]
    out_dir: PathBuf,

    /// Number of species to include
    #[arg(long, default_value_t = 6)]
    classes: usize,

    /// Recordings per species are drawn from min..=max
    #[arg(long, default_value_t = 5)]
    min_per_class: usize,
    #[arg(long, default_value_t = 12)]
    max_per_class: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const SAMPLE_RATES: [u32; 3] = [16000, 22050, 32000];

fn write_tone(path: &Path, frequency: f32, sample_rate: u32, frames: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("creating {}", path.display()))?;
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let sample = (2.0 * std::f32::consts::PI * frequency * t).sin();
        writer.write_sample((sample * 0.3 * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    anyhow::ensure!(
        args.min_per_class <= args.max_per_class,
        "--min-per-class must not exceed --max-per-class"
    );
    let mut rng = StdRng::seed_from_u64(args.seed);

    let audio_dir = args.out_dir.join(AUDIO_DIR);
    std::fs::create_dir_all(&audio_dir)
        .with_context(|| format!("creating {}", audio_dir.display()))?;

    let metadata_path = args.out_dir.join(METADATA_FILE);
    let mut metadata = csv::Writer::from_path(&metadata_path).context("creating metadata CSV")?;
    metadata.write_record([
        "primary_label",
        "secondary_labels",
        "type",
        "latitude",
        "longitude",
        "rating",
        "filename",
    ])?;

    let mut rows = Vec::new();
    let mut recording_id = 100_000u32;
    for (class_idx, label) in BIRDCLEF_CODES.iter().take(args.classes).enumerate() {
        std::fs::create_dir_all(audio_dir.join(label))?;
        let frequency = 440.0 + 110.0 * class_idx as f32;
        let count = rng.gen_range(args.min_per_class..=args.max_per_class);

        for _ in 0..count {
            let sample_rate = *SAMPLE_RATES.choose(&mut rng).unwrap_or(&32000);
            let seconds: f32 = rng.gen_range(0.5..3.0);
            let frames = (seconds * sample_rate as f32) as u32;

            let filename = format!("{label}/XC{recording_id}.wav");
            write_tone(&audio_dir.join(&filename), frequency, sample_rate, frames)?;
            rows.push((label.to_string(), filename));
            recording_id += 1;
        }
    }

    // Interleave classes the way a real metadata export would be ordered.
    rows.shuffle(&mut rng);
    for (label, filename) in &rows {
        let latitude: f32 = rng.gen_range(-35.0..37.0);
        let longitude: f32 = rng.gen_range(-18.0..52.0);
        let rating = rng.gen_range(0..=10) as f32 / 2.0;
        let (latitude, longitude, rating) = (
            format!("{latitude:.4}"),
            format!("{longitude:.4}"),
            format!("{rating:.1}"),
        );
        metadata.write_record([
            label.as_str(),
            "[]",
            "['call']",
            latitude.as_str(),
            longitude.as_str(),
            rating.as_str(),
            filename.as_str(),
        ])?;
    }
    metadata.flush()?;

    println!(
        "Wrote {} recordings of {} species to {}",
        rows.len(),
        args.classes.min(BIRDCLEF_CODES.len()),
        args.out_dir.display()
    );
    Ok(())
}
