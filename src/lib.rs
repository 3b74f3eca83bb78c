//! Training manifest builder for bird-call audio classification datasets.
//!
//! Reads `train_metadata.csv`, maps primary labels to class ids, assigns
//! stratified cross-validation folds, probes every recording's header for
//! frame count / sample rate / duration, and writes one flat table.

pub mod audio;
pub mod cli;
pub mod data;
pub mod error;
pub mod labels;
pub mod manifest;
pub mod split;

pub use data::model::{AudioInfo, Manifest, ManifestRow, MetadataRow};
pub use labels::LabelSet;
pub use manifest::{build_manifest, build_manifest_with, BuildOptions};
