use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn cue_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SFX cue ducking synchronizer"));
}

#[test]
fn test_cli_print_config() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("--print-config")
        .arg("--window")
        .arg("0.8")
        .assert()
        .success()
        .stdout(predicate::str::contains("window_secs = 0.8"));
}

#[test]
fn test_cli_rejects_invalid_volume() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("--print-config")
        .arg("--ducked-volume")
        .arg("3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ducked volume"));
}

#[test]
fn test_cli_flag_repairs_bad_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[ducking]\nducked_volume = 2.0").unwrap();

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("--config")
        .arg(file.path())
        .arg("--print-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ducked volume"));

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("--config")
        .arg(file.path())
        .arg("--ducked-volume")
        .arg("0.5")
        .arg("--print-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("ducked_volume = 0.5"));
}

#[test]
fn test_cli_inspect_demo() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("inspect")
        .arg("demos/whoosh.json")
        .arg("--duration")
        .arg("10")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cues: 3"))
        .stdout(predicate::str::contains("CineWhoosh"))
        .stdout(predicate::str::contains("90.0%"));
}

#[test]
fn test_cli_at_inside_window() {
    let file = cue_file(r#"[{"timestamp": "0:05", "effect": "Whoosh"}]"#);
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("at")
        .arg(file.path())
        .arg("--time")
        .arg("5.5")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"activeEffect\": \"Whoosh\""))
        .stdout(predicate::str::contains("\"active\": true"));
}

#[test]
fn test_cli_at_outside_window() {
    let file = cue_file(r#"[{"timestamp": "0:05", "effect": "Whoosh"}]"#);
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("at")
        .arg(file.path())
        .arg("--time")
        .arg("6")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"active\": false"))
        .stdout(predicate::str::contains("\"appliedVolume\": 1.0"));
}

#[test]
fn test_cli_simulate_with_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.md");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("simulate")
        .arg("demos/whoosh.json")
        .arg("--duration")
        .arg("10")
        .arg("--rate")
        .arg("4")
        .arg("--export-report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ducking for ModernPop"))
        .stdout(predicate::str::contains("3 duck(s)"));

    let content = std::fs::read_to_string(&report).unwrap();
    assert!(content.contains("# Ducking Simulation Report"));
}

#[test]
fn test_cli_simulate_malformed_cue_still_runs() {
    let file = cue_file(r#"[{"timestamp": "abc", "effect": "Glitch"}]"#);
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("simulate")
        .arg(file.path())
        .arg("--duration")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ducking for Glitch"))
        .stderr(predicate::str::contains("malformed cue timestamp"));
}

#[test]
fn test_cli_missing_cue_file() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("inspect")
        .arg("/nonexistent/cues.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read cue file"));
}

#[test]
fn test_cli_render_wav() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("music.wav");
    let output = dir.path().join("ducked.wav");

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&input, spec).unwrap();
    for _ in 0..24000 {
        writer.write_sample(i16::MAX / 2).unwrap();
    }
    writer.finalize().unwrap();

    let cues = cue_file(r#"[{"timestamp": "1", "effect": "Snap"}]"#);
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cue-sync"));
    cmd.arg("render")
        .arg(cues.path())
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ducked audio"));

    let mut reader = hound::WavReader::open(&output).unwrap();
    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 24000);
    assert!(samples[8500] < samples[500] * 0.5);
    assert!((samples[20000] - samples[500]).abs() < 1e-4);
}
