use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

use super::model::Manifest;
use super::OutputFormat;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write the manifest to `path`.  Dispatch by extension:
///
/// * `.parquet` / `.pq` – one record batch, schema from [`manifest_schema`]
/// * `.json`            – `[{ "path": ..., "class_id": ..., ... }, ...]`
/// * anything else      – CSV with a header row and no index column
///
/// The table is written next to the destination first and renamed into
/// place, so a failed write never leaves a partial manifest behind.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let staging = staging_path(path);
    let written = match OutputFormat::from_path(path) {
        OutputFormat::Csv => write_csv(manifest, &staging),
        OutputFormat::Json => write_json(manifest, &staging),
        OutputFormat::Parquet => write_parquet(manifest, &staging),
    };
    if let Err(err) = written {
        let _ = std::fs::remove_file(&staging);
        return Err(err);
    }

    if let Err(err) = std::fs::rename(&staging, path) {
        let _ = std::fs::remove_file(&staging);
        return Err(err)
            .with_context(|| format!("moving manifest into place at {}", path.display()));
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manifest".to_string());
    path.with_file_name(format!(".{name}.partial"))
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn write_csv(manifest: &Manifest, path: &Path) -> Result<()> {
    let file = File::create(path).context("creating manifest CSV")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    for (i, row) in manifest.rows.iter().enumerate() {
        writer
            .serialize(row)
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer.flush().context("flushing manifest CSV")?;
    Ok(())
}

fn write_json(manifest: &Manifest, path: &Path) -> Result<()> {
    let file = File::create(path).context("creating manifest JSON")?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer(&mut out, &manifest.rows).context("serializing manifest JSON")?;
    out.flush().context("flushing manifest JSON")?;
    Ok(())
}

fn write_parquet(manifest: &Manifest, path: &Path) -> Result<()> {
    let batch = to_record_batch(manifest)?;
    let file = File::create(path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Arrow conversion
// ---------------------------------------------------------------------------

/// Arrow schema of the manifest, in output column order.
pub fn manifest_schema() -> Schema {
    Schema::new(vec![
        Field::new("path", DataType::Utf8, false),
        Field::new("class_id", DataType::Int64, false),
        Field::new("class", DataType::Utf8, false),
        Field::new("fold", DataType::Int64, false),
        Field::new("frames", DataType::Int64, false),
        Field::new("sr", DataType::Int64, false),
        Field::new("duration", DataType::Float64, false),
    ])
}

/// Convert the manifest into a single Arrow record batch.
pub fn to_record_batch(manifest: &Manifest) -> Result<RecordBatch> {
    let rows = &manifest.rows;

    let path = StringArray::from(rows.iter().map(|r| r.path.as_str()).collect::<Vec<_>>());
    let class_id = Int64Array::from(rows.iter().map(|r| r.class_id as i64).collect::<Vec<_>>());
    let class = StringArray::from(rows.iter().map(|r| r.class.as_str()).collect::<Vec<_>>());
    let fold = Int64Array::from(rows.iter().map(|r| r.fold as i64).collect::<Vec<_>>());
    let frames = Int64Array::from(
        rows.iter()
            .map(|r| i64::try_from(r.frames).context("frame count exceeds Int64"))
            .collect::<Result<Vec<_>>>()?,
    );
    let sr = Int64Array::from(rows.iter().map(|r| i64::from(r.sr)).collect::<Vec<_>>());
    let duration = Float64Array::from(rows.iter().map(|r| r.duration).collect::<Vec<_>>());

    RecordBatch::try_new(
        Arc::new(manifest_schema()),
        vec![
            Arc::new(path),
            Arc::new(class_id),
            Arc::new(class),
            Arc::new(fold),
            Arc::new(frames),
            Arc::new(sr),
            Arc::new(duration),
        ],
    )
    .context("building manifest record batch")
}

/// Render the first and last `n` rows as a text table for the log.
pub fn preview(manifest: &Manifest, n: usize) -> Result<String> {
    let batch = to_record_batch(manifest)?;
    let total = batch.num_rows();

    let batches = if total <= 2 * n {
        vec![batch]
    } else {
        vec![batch.slice(0, n), batch.slice(total - n, n)]
    };
    let table = pretty_format_batches(&batches).context("formatting manifest preview")?;
    Ok(format!(
        "{table}\n[{total} rows x {} columns]",
        manifest_schema().fields().len()
    ))
}
