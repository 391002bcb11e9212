//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn fertiplan() -> Command {
    Command::cargo_bin("fertiplan").unwrap()
}

const PARCEL: &str = r#"{
    "parcel": { "name": "Za humny", "area_ha": 8.0, "texture": "light", "land_use": "arable" },
    "analyses": [
        { "sample_date": "2025-09-01", "ph": 5.0, "phosphorus": 90, "potassium": 150, "magnesium": 60, "sulfur": 15 }
    ],
    "crop_rotation": [ { "year": 2026, "crop": "winter_wheat", "expected_yield_t_ha": 7.2 } ],
    "lime_products": [
        { "name": "Mletý vápenec", "cao_percent": 52, "mgo_percent": 1 },
        { "name": "Dolomit", "cao_percent": 30, "mgo_percent": 18 }
    ],
    "as_of": "2026-02-01"
}"#;

fn document(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn help_shows_all_subcommands() {
    fertiplan().arg("--help").assert().success().stdout(
        predicate::str::contains("lime")
            .and(predicate::str::contains("plan"))
            .and(predicate::str::contains("tier"))
            .and(predicate::str::contains("config"))
            .and(predicate::str::contains("init")),
    );
}

#[test]
fn lime_table_lists_schedule() {
    let doc = document(PARCEL);
    fertiplan()
        .args(["lime", "--input"])
        .arg(doc.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Dolomit")
                .and(predicate::str::contains("drift"))
                .and(predicate::str::contains("Scheduled:")),
        );
}

#[test]
fn lime_json_is_machine_readable() {
    let doc = document(PARCEL);
    let output = fertiplan()
        .args(["--format", "json", "lime", "--input"])
        .arg(doc.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["lime_type"], "dolomitic");
    assert!(plan["applications"].as_array().unwrap().len() >= 2);
}

#[test]
fn plan_csv_has_header_and_rows() {
    let doc = document(PARCEL);
    fertiplan()
        .args(["plan", "--format", "csv", "--input"])
        .arg(doc.path())
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("year,nutrient,category,dose_kg_ha,total_kg")
                .and(predicate::str::contains("2026,P2O5")),
        );
}

#[test]
fn tier_reports_b_for_rotation() {
    let doc = document(PARCEL);
    fertiplan()
        .args(["tier", "--input"])
        .arg(doc.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Tier B"));
}

#[test]
fn config_prints_effective_yaml() {
    let mut cfg = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    cfg.write_all(b"engine:\n  min_interval_years: 5\n").unwrap();
    fertiplan()
        .arg("--config")
        .arg(cfg.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("min_interval_years: 5"));
}

#[test]
fn invalid_ph_exits_with_error() {
    let doc = document(&PARCEL.replace("\"ph\": 5.0", "\"ph\": 9.4"));
    fertiplan()
        .args(["lime", "--input"])
        .arg(doc.path())
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("Invalid input:")
                .and(predicate::str::contains("outside the supported range 4.0-8.0")),
        );
}

#[test]
fn missing_input_file_fails() {
    fertiplan()
        .args(["plan", "--input", "does-not-exist.json"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("Error:")
                .and(predicate::str::contains("Failed to read parcel document")),
        );
}
