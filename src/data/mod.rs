/// Data layer: core types, loading, and writing.
///
/// Architecture:
/// ```text
///  train_metadata.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse table → Vec<MetadataRow>
///   └──────────┘
///        │            (manifest builder: labels, folds, audio info)
///        ▼
///   ┌──────────┐
///   │ Manifest  │  Vec<ManifestRow>, fixed column order
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  .csv / .json / .parquet
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod writer;

use std::path::Path;

/// On-disk manifest format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Default for `.csv` and any unrecognised extension.
    Csv,
    /// Records-oriented array: `[{ "path": ..., "class_id": ... }, ...]`.
    Json,
    Parquet,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "parquet" | "pq" => OutputFormat::Parquet,
            "json" => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("train.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("train.PQ")), OutputFormat::Parquet);
        assert_eq!(OutputFormat::from_path(Path::new("a/train.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("train")), OutputFormat::Csv);
    }
}
