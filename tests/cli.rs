//! Runs the `birdclef-manifest` binary on generated datasets.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::TempDir;

use birdclef_manifest::manifest::{AUDIO_DIR, METADATA_FILE};

fn write_wav(path: &Path, frames: u32) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        writer.write_sample((i % 256) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// Five recordings of each label.
fn create_dataset(labels: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut csv = String::from("primary_label,rating,filename\n");
    for i in 0..5 {
        for label in labels {
            let filename = format!("{label}/XC{i:03}.wav");
            write_wav(&dir.path().join(AUDIO_DIR).join(&filename), 800 + i);
            csv.push_str(&format!("{label},3.5,{filename}\n"));
        }
    }
    fs::write(dir.path().join(METADATA_FILE), csv).unwrap();
    dir
}

fn run_cli(dir: &TempDir, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_birdclef-manifest"))
        .arg(dir.path())
        .arg(dir.path().join("train.csv"))
        .args(extra)
        .env_remove("BIRDCLEF_CLASSES")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn writes_manifest_and_exits_zero() {
    let dir = create_dataset(&["barswa", "hoopoe"]);
    let output = run_cli(&dir, &["--num_fold", "5", "--seed", "42"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = fs::read_to_string(dir.path().join("train.csv")).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("path,class_id,class,fold,frames,sr,duration"));
    assert_eq!(lines.count(), 10);
}

#[test]
fn unknown_label_exits_non_zero_without_output() {
    let dir = create_dataset(&["barswa", "unknownbird"]);
    let output = run_cli(&dir, &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknownbird"));
    assert!(!dir.path().join("train.csv").exists());
}

#[test]
fn custom_label_list_is_used() {
    let dir = create_dataset(&["foo", "bar"]);
    let classes = dir.path().join("classes.txt");
    fs::write(&classes, "bar\nfoo\n").unwrap();

    let output = run_cli(&dir, &["--classes", classes.to_str().unwrap(), "--num-fold", "5"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = fs::read_to_string(dir.path().join("train.csv")).unwrap();
    let first = text.lines().nth(1).unwrap();
    assert!(first.contains(",1,foo,"), "{first}");
}
