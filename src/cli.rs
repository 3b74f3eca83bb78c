//! Command-line surface of the `birdclef-manifest` binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::audio::SymphoniaProbe;
use crate::data::model::Manifest;
use crate::labels::LabelSet;
use crate::manifest::{
    build_manifest_with, BuildOptions, DEFAULT_NUM_FOLDS, DEFAULT_PREVIEW_ROWS, DEFAULT_SEED,
};

/// Build a stratified k-fold training manifest from a BirdCLEF-style dataset.
#[derive(Parser, Debug)]
#[command(name = "birdclef-manifest")]
#[command(version)]
pub struct Args {
    /// Directory containing train_metadata.csv and train_audio/
    pub data_dir: PathBuf,

    /// Destination of the manifest (.csv, .json or .parquet)
    pub output_path: PathBuf,

    /// Seed for the fold shuffle
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Number of cross-validation folds
    #[arg(long = "num_fold", alias = "num-fold", default_value_t = DEFAULT_NUM_FOLDS)]
    pub num_fold: usize,

    /// Newline-separated label list replacing the built-in species codes
    #[arg(long, env = "BIRDCLEF_CLASSES")]
    pub classes: Option<PathBuf>,

    /// Head and tail rows shown in the final preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview: usize,
}

impl Args {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            data_dir: self.data_dir.clone(),
            output_path: self.output_path.clone(),
            seed: self.seed,
            num_folds: self.num_fold,
            preview_rows: self.preview,
        }
    }
}

/// Read a `--classes` label list.
pub fn read_label_set(path: &Path) -> Result<LabelSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading label list {}", path.display()))?;
    let set =
        LabelSet::parse(&text).with_context(|| format!("parsing label list {}", path.display()))?;
    info!("Using {} labels from {}", set.len(), path.display());
    Ok(set)
}

/// Build the manifest described by the command line.
pub fn run(args: &Args) -> Result<Manifest> {
    let opts = args.build_options();
    match &args.classes {
        Some(path) => {
            let labels = read_label_set(path)?;
            build_manifest_with(&opts, &labels, &SymphoniaProbe)
        }
        None => build_manifest_with(&opts, LabelSet::birdclef(), &SymphoniaProbe),
    }
}
