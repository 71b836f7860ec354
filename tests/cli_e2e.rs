// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end test of the `wallforge` binary: run the pipeline against a
//! small JSON fixture on disk and inspect the persisted artifacts.

use assert_cmd::Command;
use predicates::str::contains;
use std::io::Write;

fn sample_document() -> serde_json::Value {
    serde_json::json!({
        "layers": {
            "A-WALL": {
                "entities": [
                    {"type": "LINE", "start": {"x": 0.0, "y": 0.0}, "end": {"x": 1000.0, "y": 0.0}},
                    {"type": "LINE", "start": {"x": 0.0, "y": 100.0}, "end": {"x": 1000.0, "y": 100.0}}
                ]
            }
        }
    })
}

#[test]
fn run_then_inspect_round_trips_through_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.json");
    let mut f = std::fs::File::create(&input_path).unwrap();
    write!(f, "{}", sample_document()).unwrap();

    let out_dir = dir.path().join("out");
    let job_id = uuid::Uuid::new_v4();

    Command::cargo_bin("wallforge")
        .unwrap()
        .args([
            "run",
            "--input",
            input_path.to_str().unwrap(),
            "--layers",
            "A-WALL",
            "--job-id",
            &job_id.to_string(),
            "--out",
            out_dir.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(contains("wall rectangles: 1"));

    let job_dir = out_dir.join(job_id.to_string());
    assert!(job_dir.join("canvas_data.json").is_file());
    assert!(job_dir.join("logic_e_rectangles.json").is_file());
    assert!(job_dir.join("step_metrics.json").is_file());

    Command::cargo_bin("wallforge")
        .unwrap()
        .args(["inspect", "--out", out_dir.to_str().unwrap(), "--job-id", &job_id.to_string()])
        .assert()
        .success()
        .stdout(contains("\"stages\""));
}

#[test]
fn run_rejects_an_input_document_with_no_layers_object() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("bad.json");
    std::fs::write(&input_path, "{}").unwrap();

    Command::cargo_bin("wallforge")
        .unwrap()
        .args([
            "run",
            "--input",
            input_path.to_str().unwrap(),
            "--layers",
            "A-WALL",
            "--out",
            dir.path().join("out").to_str().unwrap(),
        ])
        .assert()
        .failure();
}
