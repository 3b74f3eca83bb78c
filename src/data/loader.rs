use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Manifest, ManifestRow, MetadataRow};
use super::OutputFormat;
use crate::error::InputError;

// ---------------------------------------------------------------------------
// Metadata table
// ---------------------------------------------------------------------------

/// Read `filename` and `primary_label` from every row of a metadata CSV.
///
/// Columns are located by header name so the table may carry any number of
/// extra columns (ratings, coordinates, secondary labels, ...).  Header
/// names are trimmed; cell values are kept verbatim.
pub fn load_metadata(path: &Path) -> Result<Vec<MetadataRow>, InputError> {
    if !path.is_file() {
        return Err(InputError::MissingMetadata(path.to_path_buf()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| InputError::MissingColumn(name.to_string()))
    };
    let filename_idx = column("filename")?;
    let label_idx = column("primary_label")?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |idx: usize, name: &str| {
            let value = record.get(idx).unwrap_or("");
            if value.is_empty() {
                Err(InputError::EmptyCell {
                    row: row_no,
                    column: name.to_string(),
                })
            } else {
                Ok(value.to_string())
            }
        };
        rows.push(MetadataRow {
            filename: cell(filename_idx, "filename")?,
            primary_label: cell(label_idx, "primary_label")?,
        });
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Manifest read-back
// ---------------------------------------------------------------------------

/// Load a manifest previously written by [`super::writer::write_manifest`].
/// Dispatch by extension, same as the writer.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    match OutputFormat::from_path(path) {
        OutputFormat::Csv => load_csv(path),
        OutputFormat::Json => load_json(path),
        OutputFormat::Parquet => load_parquet(path),
    }
}

fn load_csv(path: &Path) -> Result<Manifest> {
    let mut reader = csv::Reader::from_path(path).context("opening manifest CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading manifest headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers != ManifestRow::COLUMNS {
        bail!(
            "Unexpected manifest columns {headers:?}, expected {:?}",
            ManifestRow::COLUMNS
        );
    }

    let rows = reader
        .deserialize()
        .enumerate()
        .map(|(i, r)| r.with_context(|| format!("manifest CSV row {i}")))
        .collect::<Result<Vec<ManifestRow>>>()?;
    Ok(Manifest::new(rows))
}

fn load_json(path: &Path) -> Result<Manifest> {
    let text = std::fs::read_to_string(path).context("reading manifest JSON")?;
    let rows: Vec<ManifestRow> = serde_json::from_str(&text).context("parsing manifest JSON")?;
    Ok(Manifest::new(rows))
}

fn load_parquet(path: &Path) -> Result<Manifest> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let path_col = column(&batch, "path")?;
        let class_id_col = int_column(column(&batch, "class_id")?, "class_id")?;
        let class_col = column(&batch, "class")?;
        let fold_col = int_column(column(&batch, "fold")?, "fold")?;
        let frames_col = int_column(column(&batch, "frames")?, "frames")?;
        let sr_col = int_column(column(&batch, "sr")?, "sr")?;
        let duration_col = column(&batch, "duration")?
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("'duration' is not a Float64 column")?;

        for row in 0..batch.num_rows() {
            rows.push(ManifestRow {
                path: string_value(path_col, row)
                    .with_context(|| format!("Row {row}: failed to read 'path'"))?,
                class_id: usize::try_from(class_id_col.value(row))
                    .with_context(|| format!("Row {row}: negative class_id"))?,
                class: string_value(class_col, row)
                    .with_context(|| format!("Row {row}: failed to read 'class'"))?,
                fold: usize::try_from(fold_col.value(row))
                    .with_context(|| format!("Row {row}: negative fold"))?,
                frames: u64::try_from(frames_col.value(row))
                    .with_context(|| format!("Row {row}: negative frame count"))?,
                sr: u32::try_from(sr_col.value(row))
                    .with_context(|| format!("Row {row}: sample rate out of range"))?,
                duration: duration_col.value(row),
            });
        }
    }

    Ok(Manifest::new(rows))
}

// -- Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>> {
    batch
        .column_by_name(name)
        .with_context(|| format!("Parquet manifest missing '{name}' column"))
}

fn int_column<'a>(col: &'a Arc<dyn Array>, name: &str) -> Result<&'a Int64Array> {
    col.as_any()
        .downcast_ref::<Int64Array>()
        .with_context(|| format!("'{name}' is not an Int64 column"))
}

fn string_value(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in string column");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected Utf8 column, got {other:?}"),
    }
}
