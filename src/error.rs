use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Input errors – the dataset directory is not what we expect
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum InputError {
    #[error("data directory does not exist: {0}")]
    MissingDataDir(PathBuf),
    #[error("metadata table not found: {0}")]
    MissingMetadata(PathBuf),
    #[error("audio directory not found: {0}")]
    MissingAudioDir(PathBuf),
    #[error("metadata table has no '{0}' column")]
    MissingColumn(String),
    #[error("metadata row {row}: empty '{column}' cell")]
    EmptyCell { row: usize, column: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Label errors – label set / metadata mismatch
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("{rows} row(s) carry labels missing from the label set: {}", .labels.join(", "))]
    UnknownLabels { labels: Vec<String>, rows: usize },
    #[error("duplicate label in label set: {0}")]
    DuplicateLabel(String),
    #[error("empty label in label set")]
    EmptyLabel,
}

// ---------------------------------------------------------------------------
// Split errors – fold count incompatible with the class distribution
// ---------------------------------------------------------------------------

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SplitError {
    #[error("at least 2 folds are required, got {0}")]
    TooFewSplits(usize),
    #[error("cannot split {n_rows} row(s) into {n_splits} folds")]
    MoreSplitsThanRows { n_splits: usize, n_rows: usize },
    #[error("class {class_id} has {count} row(s), fewer than the {n_splits} folds requested")]
    ClassTooSmall {
        class_id: usize,
        count: usize,
        n_splits: usize,
    },
}

// ---------------------------------------------------------------------------
// Probe errors – an audio header could not be read
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("opening {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reading container of {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },
    #[error("no audio track in {0}")]
    NoAudioTrack(PathBuf),
    #[error("sample rate unknown for {0}")]
    UnknownSampleRate(PathBuf),
    #[error("sample rate of {0} is zero")]
    ZeroSampleRate(PathBuf),
}

/// Every probe failure of a run, reported together before aborting.
#[derive(Error, Debug)]
#[error("{}", summarize(.0))]
pub struct ProbeFailures(pub Vec<ProbeError>);

fn summarize(failures: &[ProbeError]) -> String {
    let mut text = format!("{} audio file(s) could not be probed", failures.len());
    for err in failures {
        text.push_str(&format!("\n  - {err}"));
    }
    text
}
