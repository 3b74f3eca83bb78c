use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MetadataRow – one row of train_metadata.csv
// ---------------------------------------------------------------------------

/// The two metadata columns the manifest needs.  Every other column of the
/// source table is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    /// Path relative to the audio directory, e.g. `afrsil1/XC125458.ogg`.
    pub filename: String,
    /// Dominant species code of the recording.
    pub primary_label: String,
}

// ---------------------------------------------------------------------------
// AudioInfo – header properties of one recording
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfo {
    /// Samples per channel.
    pub frames: u64,
    /// Sample rate in Hz.
    pub sr: u32,
    /// `frames / sr`, in seconds.
    pub duration: f64,
}

impl AudioInfo {
    /// `None` when `sr` is zero, since no duration can be derived.
    pub fn new(frames: u64, sr: u32) -> Option<Self> {
        if sr == 0 {
            return None;
        }
        Some(AudioInfo {
            frames,
            sr,
            duration: frames as f64 / sr as f64,
        })
    }
}

impl fmt::Display for AudioInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} frames @ {} Hz ({:.3}s)", self.frames, self.sr, self.duration)
    }
}

// ---------------------------------------------------------------------------
// ManifestRow – one row of the output table
// ---------------------------------------------------------------------------

/// Field order is the column order of the written manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRow {
    pub path: String,
    pub class_id: usize,
    pub class: String,
    pub fold: usize,
    pub frames: u64,
    pub sr: u32,
    pub duration: f64,
}

impl ManifestRow {
    pub const COLUMNS: [&'static str; 7] =
        ["path", "class_id", "class", "fold", "frames", "sr", "duration"];
}

// ---------------------------------------------------------------------------
// Manifest – the complete output table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub rows: Vec<ManifestRow>,
}

impl Manifest {
    pub fn new(rows: Vec<ManifestRow>) -> Self {
        Manifest { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows in each fold.
    pub fn fold_counts(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.fold).or_default() += 1;
        }
        counts
    }

    /// class_id → (fold → rows of that class in that fold).
    pub fn class_fold_counts(&self) -> BTreeMap<usize, BTreeMap<usize, usize>> {
        let mut counts: BTreeMap<usize, BTreeMap<usize, usize>> = BTreeMap::new();
        for row in &self.rows {
            *counts
                .entry(row.class_id)
                .or_default()
                .entry(row.fold)
                .or_default() += 1;
        }
        counts
    }

    /// Distinct class ids present.
    pub fn classes(&self) -> BTreeSet<usize> {
        self.rows.iter().map(|r| r.class_id).collect()
    }

    /// Sum of all durations, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.rows.iter().map(|r| r.duration).sum()
    }
}
