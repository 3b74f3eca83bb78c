//! End-to-end runs of the manifest builder on generated WAV datasets.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::TempDir;

use birdclef_manifest::data::loader::load_manifest;
use birdclef_manifest::error::{InputError, LabelError, ProbeFailures, SplitError};
use birdclef_manifest::manifest::{AUDIO_DIR, METADATA_FILE};
use birdclef_manifest::{build_manifest, BuildOptions, LabelSet};

/// One metadata row: (primary_label, filename, sample_rate, frames).
type Recording<'a> = (&'a str, String, u32, u32);

fn write_wav(path: &Path, sample_rate: u32, frames: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        writer.write_sample(((i * 37) % 2000) as i16 - 1000).unwrap();
    }
    writer.finalize().unwrap();
}

/// Create `train_metadata.csv` and `train_audio/` under a fresh temp dir.
fn create_dataset(recordings: &[Recording]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let audio_dir = dir.path().join(AUDIO_DIR);
    fs::create_dir_all(&audio_dir).unwrap();

    let mut csv = String::from("primary_label,secondary_labels,type,rating,filename\n");
    for (label, filename, sample_rate, frames) in recordings {
        write_wav(&audio_dir.join(filename), *sample_rate, *frames);
        csv.push_str(&format!("{label},[],['call'],4.0,{filename}\n"));
    }
    fs::write(dir.path().join(METADATA_FILE), csv).unwrap();
    dir
}

/// `per_class` recordings for each label, classes interleaved row by row.
fn interleaved(labels: &[&'static str], per_class: usize) -> Vec<Recording<'static>> {
    let mut rows = Vec::new();
    for i in 0..per_class {
        for (c, label) in labels.iter().enumerate() {
            let frames = 1000 * (i as u32 + 1) + c as u32;
            rows.push((*label, format!("{label}/XC{c}{i:03}.wav"), 16000, frames));
        }
    }
    rows
}

fn options(dir: &TempDir, output: &str, seed: u64, num_folds: usize) -> BuildOptions {
    let mut opts = BuildOptions::new(dir.path(), dir.path().join(output));
    opts.seed = seed;
    opts.num_folds = num_folds;
    opts
}

#[test]
fn every_row_is_kept_in_order_with_audio_properties() {
    let recordings = interleaved(&["barswa", "hoopoe", "comsan"], 6);
    let dir = create_dataset(&recordings);
    let opts = options(&dir, "train.csv", 2021, 3);

    let manifest = build_manifest(&opts).unwrap();
    assert_eq!(manifest.len(), recordings.len());

    let labels = LabelSet::birdclef();
    for (row, (label, filename, sr, frames)) in manifest.rows.iter().zip(&recordings) {
        let expected_path = dir.path().join(AUDIO_DIR).join(filename);
        assert_eq!(Path::new(&row.path), expected_path);
        assert_eq!(row.class, *label);
        assert_eq!(Some(row.class_id), labels.id_of(label));
        assert!(row.fold < 3);
        assert_eq!(row.sr, *sr);
        assert_eq!(row.frames, u64::from(*frames));
        assert!((row.duration - *frames as f64 / *sr as f64).abs() < 1e-12);
    }
}

#[test]
fn ten_rows_two_classes_five_folds() {
    let recordings = interleaved(&["abethr1", "yebsto1"], 5);
    let dir = create_dataset(&recordings);
    let opts = options(&dir, "train.csv", 42, 5);

    let manifest = build_manifest(&opts).unwrap();
    let per_class = manifest.class_fold_counts();
    assert_eq!(per_class.keys().copied().collect::<Vec<_>>(), vec![0, 263]);
    for per_fold in per_class.values() {
        assert_eq!(per_fold.len(), 5);
        assert!(per_fold.values().all(|&n| n == 1));
    }
    assert!(manifest.fold_counts().values().all(|&n| n == 2));
}

#[test]
fn same_seed_writes_identical_manifest() {
    let recordings = interleaved(&["barswa", "hoopoe", "egygoo", "gargan"], 9);
    let dir = create_dataset(&recordings);

    let first = options(&dir, "a.csv", 7, 4);
    let second = options(&dir, "b.csv", 7, 4);
    build_manifest(&first).unwrap();
    build_manifest(&second).unwrap();

    assert_eq!(
        fs::read(&first.output_path).unwrap(),
        fs::read(&second.output_path).unwrap()
    );
}

#[test]
fn classes_are_balanced_across_folds() {
    let mut recordings = Vec::new();
    for (label, count) in [("barswa", 17), ("hoopoe", 6), ("comsan", 11)] {
        for i in 0..count {
            recordings.push((label, format!("{label}/XC{i:04}.wav"), 22050, 500 + i));
        }
    }
    let dir = create_dataset(&recordings);
    let num_folds = 5;
    let manifest = build_manifest(&options(&dir, "train.csv", 2021, num_folds)).unwrap();

    for (class_id, per_fold) in manifest.class_fold_counts() {
        let k = manifest.rows.iter().filter(|r| r.class_id == class_id).count();
        for fold in 0..num_folds {
            let n = per_fold.get(&fold).copied().unwrap_or(0);
            assert!(n == k / num_folds || n == k.div_ceil(num_folds));
        }
    }
}

#[test]
fn written_csv_reads_back_unchanged() {
    let dir = create_dataset(&interleaved(&["barswa", "hoopoe"], 5));
    let opts = options(&dir, "out/train.csv", 2021, 5);
    let manifest = build_manifest(&opts).unwrap();

    let header = fs::read_to_string(&opts.output_path).unwrap();
    assert!(header.starts_with("path,class_id,class,fold,frames,sr,duration\n"));
    assert_eq!(load_manifest(&opts.output_path).unwrap(), manifest);
}

#[test]
fn parquet_output_reads_back_unchanged() {
    let dir = create_dataset(&interleaved(&["barswa", "hoopoe"], 5));
    let opts = options(&dir, "train.parquet", 2021, 5);
    let manifest = build_manifest(&opts).unwrap();
    assert_eq!(load_manifest(&opts.output_path).unwrap(), manifest);
}

#[test]
fn unknown_label_aborts_before_writing() {
    let mut recordings = interleaved(&["barswa"], 5);
    recordings.push(("unknownbird", "unknownbird/XC1.wav".to_string(), 16000, 100));
    let dir = create_dataset(&recordings);
    let opts = options(&dir, "train.csv", 2021, 5);

    let err = build_manifest(&opts).unwrap_err();
    match err.downcast_ref::<LabelError>() {
        Some(LabelError::UnknownLabels { labels, rows }) => {
            assert_eq!(labels, &vec!["unknownbird".to_string()]);
            assert_eq!(*rows, 1);
        }
        other => panic!("expected unknown label error, got {other:?}"),
    }
    assert!(!opts.output_path.exists());
}

#[test]
fn missing_metadata_aborts() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(AUDIO_DIR)).unwrap();
    let opts = options(&dir, "train.csv", 2021, 5);

    let err = build_manifest(&opts).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::MissingMetadata(_))
    ));
    assert!(!opts.output_path.exists());
}

#[test]
fn missing_audio_file_aborts() {
    let recordings = interleaved(&["barswa", "hoopoe"], 5);
    let dir = create_dataset(&recordings);
    fs::remove_file(dir.path().join(AUDIO_DIR).join(&recordings[3].1)).unwrap();
    let opts = options(&dir, "train.csv", 2021, 5);

    let err = build_manifest(&opts).unwrap_err();
    let failures = err.downcast_ref::<ProbeFailures>().unwrap();
    assert_eq!(failures.0.len(), 1);
    assert!(!opts.output_path.exists());
}

#[test]
fn too_many_folds_for_a_class_aborts() {
    let mut recordings = interleaved(&["barswa"], 6);
    recordings.extend(interleaved(&["hoopoe"], 3));
    let dir = create_dataset(&recordings);
    let opts = options(&dir, "train.csv", 2021, 4);

    let err = build_manifest(&opts).unwrap_err();
    let hoopoe = LabelSet::birdclef().id_of("hoopoe").unwrap();
    assert_eq!(
        err.downcast_ref::<SplitError>(),
        Some(&SplitError::ClassTooSmall {
            class_id: hoopoe,
            count: 3,
            n_splits: 4
        })
    );
    assert!(!opts.output_path.exists());
}
