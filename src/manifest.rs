//! The manifest build pipeline: load → resolve → label → split → probe → save.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::audio::{AudioProbe, SymphoniaProbe};
use crate::data::loader::load_metadata;
use crate::data::model::{AudioInfo, Manifest, ManifestRow, MetadataRow};
use crate::data::writer::{preview, write_manifest};
use crate::error::{InputError, LabelError, ProbeFailures};
use crate::labels::LabelSet;
use crate::split::StratifiedKFold;

pub const METADATA_FILE: &str = "train_metadata.csv";
pub const AUDIO_DIR: &str = "train_audio";
pub const DEFAULT_SEED: u64 = 2021;
pub const DEFAULT_NUM_FOLDS: usize = 5;
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

const PROGRESS_EVERY: usize = 500;

/// Inputs of one manifest build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory holding `train_metadata.csv` and `train_audio/`.
    pub data_dir: PathBuf,
    pub output_path: PathBuf,
    pub seed: u64,
    pub num_folds: usize,
    /// Head and tail rows shown in the final log preview.
    pub preview_rows: usize,
}

impl BuildOptions {
    pub fn new(data_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_path: output_path.into(),
            seed: DEFAULT_SEED,
            num_folds: DEFAULT_NUM_FOLDS,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(METADATA_FILE)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.data_dir.join(AUDIO_DIR)
    }
}

/// Build the manifest with the built-in label set and the symphonia probe,
/// and write it to `opts.output_path`.
pub fn build_manifest(opts: &BuildOptions) -> Result<Manifest> {
    build_manifest_with(opts, LabelSet::birdclef(), &SymphoniaProbe)
}

/// Build and write the manifest.  Any failure aborts before the output
/// file is touched.
pub fn build_manifest_with(
    opts: &BuildOptions,
    labels: &LabelSet,
    probe: &dyn AudioProbe,
) -> Result<Manifest> {
    info!(
        "args: data_dir={} output_path={} seed={} num_fold={}",
        opts.data_dir.display(),
        opts.output_path.display(),
        opts.seed,
        opts.num_folds
    );

    check_inputs(opts)?;

    let metadata = load_metadata(&opts.metadata_path())
        .with_context(|| format!("loading {}", opts.metadata_path().display()))?;
    info!("Loaded {} metadata rows", metadata.len());

    let paths: Vec<PathBuf> = metadata
        .iter()
        .map(|row| resolve_audio_path(&opts.data_dir, &row.filename))
        .collect();
    let class_ids = resolve_class_ids(&metadata, labels)?;

    info!("CV split");
    let folds = StratifiedKFold::new(opts.num_folds, opts.seed)
        .assign(&class_ids)
        .context("assigning cross-validation folds")?;

    info!("Probing {} audio files", paths.len());
    let infos = probe_all(&paths, probe)?;

    let rows = metadata
        .into_iter()
        .zip(paths)
        .zip(class_ids)
        .zip(folds)
        .zip(infos)
        .map(|((((meta, path), class_id), fold), audio)| ManifestRow {
            path: path.to_string_lossy().into_owned(),
            class_id,
            class: meta.primary_label,
            fold,
            frames: audio.frames,
            sr: audio.sr,
            duration: audio.duration,
        })
        .collect();
    let manifest = Manifest::new(rows);

    info!("Save");
    write_manifest(&manifest, &opts.output_path)
        .with_context(|| format!("writing manifest to {}", opts.output_path.display()))?;

    log_summary(&manifest, opts.preview_rows)?;
    Ok(manifest)
}

fn check_inputs(opts: &BuildOptions) -> Result<(), InputError> {
    if !opts.data_dir.is_dir() {
        return Err(InputError::MissingDataDir(opts.data_dir.clone()));
    }
    let metadata = opts.metadata_path();
    if !metadata.is_file() {
        return Err(InputError::MissingMetadata(metadata));
    }
    let audio_dir = opts.audio_dir();
    if !audio_dir.is_dir() {
        return Err(InputError::MissingAudioDir(audio_dir));
    }
    Ok(())
}

/// Class id of every row; all unknown labels are reported at once.
fn resolve_class_ids(rows: &[MetadataRow], labels: &LabelSet) -> Result<Vec<usize>, LabelError> {
    let mut ids = Vec::with_capacity(rows.len());
    let mut unknown = BTreeSet::new();
    let mut unknown_rows = 0;

    for row in rows {
        match labels.id_of(&row.primary_label) {
            Some(id) => ids.push(id),
            None => {
                unknown.insert(row.primary_label.clone());
                unknown_rows += 1;
            }
        }
    }

    if unknown.is_empty() {
        Ok(ids)
    } else {
        Err(LabelError::UnknownLabels {
            labels: unknown.into_iter().collect(),
            rows: unknown_rows,
        })
    }
}

/// Probe every file in row order.  Failures are collected, never defaulted.
fn probe_all(paths: &[PathBuf], probe: &dyn AudioProbe) -> Result<Vec<AudioInfo>, ProbeFailures> {
    let mut infos = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for (i, path) in paths.iter().enumerate() {
        match probe.info(path) {
            Ok(info) => {
                debug!("{}: {info}", path.display());
                infos.push(info);
            }
            Err(err) => failures.push(err),
        }
        if (i + 1) % PROGRESS_EVERY == 0 {
            info!("Probed {}/{} files", i + 1, paths.len());
        }
    }

    if failures.is_empty() {
        Ok(infos)
    } else {
        Err(ProbeFailures(failures))
    }
}

fn log_summary(manifest: &Manifest, preview_rows: usize) -> Result<()> {
    let folds = manifest
        .fold_counts()
        .iter()
        .map(|(fold, n)| format!("{fold}:{n}"))
        .collect::<Vec<_>>()
        .join(" ");
    info!(
        "{} rows, {} classes, {:.1} hours of audio; rows per fold {folds}",
        manifest.len(),
        manifest.classes().len(),
        manifest.total_duration() / 3600.0
    );
    info!("\n{}", preview(manifest, preview_rows)?);
    Ok(())
}

/// Location of a recording: `<data_dir>/train_audio/<filename>`.
pub fn resolve_audio_path(data_dir: &Path, filename: &str) -> PathBuf {
    data_dir.join(AUDIO_DIR).join(filename)
}
