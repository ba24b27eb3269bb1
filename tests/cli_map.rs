//! End-to-end tests of the `dommap` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::PathBuf;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn dommap() -> Command {
    Command::cargo_bin("dommap").unwrap()
}

fn rows(stdout: &[u8]) -> Vec<Vec<String>> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.starts_with('#') && !l.starts_with("Accession"))
        .map(|l| l.split('\t').map(str::to_string).collect())
        .collect()
}

#[test]
fn test_map_text_report() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("domains.txt");

    dommap()
        .arg("map")
        .arg("-i")
        .arg(data("sample.hmmscan.txt"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let report = std::fs::read_to_string(&out)?;
    assert!(report.contains("Total Proteins:      3"));
    assert!(report.contains("Total Domains:       4"));
    assert!(report.contains("NC :   1 (25.00%)"));
    assert!(report.contains("CP :   1 (25.00%)"));
    assert!(report.contains("IS :   1 (25.00%)"));
    assert!(report.contains("# Accession\tE-Value\tResidue Range\tProperty"));

    let rows = rows(report.as_bytes());
    assert_eq!(rows.len(), 4);
    Ok(())
}

#[test]
fn test_map_tsv_rows_and_order() -> anyhow::Result<()> {
    let output = dommap()
        .args(["map", "-f", "tsv", "-i"])
        .arg(data("sample.hmmscan.txt"))
        .output()?;
    assert!(output.status.success());

    let rows = rows(&output.stdout);
    let summary: Vec<(&str, &str, &str)> = rows
        .iter()
        .map(|r| (r[0].as_str(), r[2].as_str(), r[3].as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("sp|P00001|HOST_ECOLI", "10-60,131-180", "NC"),
            ("sp|P00001|HOST_ECOLI", "65-125", "IS"),
            ("sp|P00002|PERM_ECOLI", "5-90", "CP"),
            ("sp|P00002|PERM_ECOLI", "120-180", ""),
        ]
    );

    // The weak hit is below the cutoff and the rival loses to the host
    let families: Vec<&str> = rows.iter().map(|r| r[7].as_str()).collect();
    assert!(!families.contains(&"F_weak"));
    assert!(!families.contains(&"F_rival"));

    // Without definitions every classification column is N/A
    assert!(rows.iter().all(|r| r[4] == "N/A" && r[8] == "N/A"));
    assert_eq!(rows[1][1], "1.00e-15");
    Ok(())
}

#[test]
fn test_map_json_report() -> anyhow::Result<()> {
    let output = dommap()
        .args(["map", "--format", "json", "--overlap", "20", "-i"])
        .arg(data("sample.hmmscan.txt"))
        .output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["options"]["overlap"], 20);
    assert_eq!(value["summary"]["proteins"], 3);
    assert_eq!(value["domains"].as_array().map(Vec::len), Some(4));
    Ok(())
}

#[test]
fn test_map_with_ecod_definitions() -> anyhow::Result<()> {
    let output = dommap()
        .args(["map", "-f", "tsv", "-i"])
        .arg(data("sample.hmmscan.txt"))
        .arg("--dom-def")
        .arg(data("ecod_sample.txt"))
        .output()?;
    assert!(output.status.success());

    let rows = rows(&output.stdout);
    assert_eq!(rows[0][4], "alpha arrays");
    assert_eq!(rows[0][5], "ARM repeat");
    assert_eq!(rows[0][8], "1.1.1.1");
    // Unnamed X-groups fall back to the H-group, then the T-group
    assert_eq!(rows[1][5], "OB-fold");
    assert_eq!(rows[2][5], "Ferredoxin-like");
    // Families missing from the dictionary keep their name only
    assert_eq!(rows[3][7], "F_single");
    assert_eq!(rows[3][4], "N/A");
    Ok(())
}

#[test]
fn test_defs_export_and_reuse() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let json = dir.path().join("defs.json");

    dommap()
        .arg("defs")
        .arg(data("ecod_sample.txt"))
        .arg("-o")
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 3 families"));

    dommap()
        .args(["map", "-f", "tsv", "-i"])
        .arg(data("sample.hmmscan.txt"))
        .arg("--dom-def")
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha arrays\tARM repeat"));
    Ok(())
}

#[test]
fn test_defs_single_family() {
    dommap()
        .arg("defs")
        .arg(data("ecod_sample.txt"))
        .args(["--family", "F_guest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("X-group:      OB-fold"))
        .stdout(predicate::str::contains("F-id:         2.1.1.4"));

    dommap()
        .arg("defs")
        .arg(data("ecod_sample.txt"))
        .args(["--family", "F_missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_gzipped_input() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let gz = dir.path().join("sample.hmmscan.txt.gz");
    let mut encoder = flate2::write::GzEncoder::new(
        std::fs::File::create(&gz)?,
        flate2::Compression::default(),
    );
    encoder.write_all(&std::fs::read(data("sample.hmmscan.txt"))?)?;
    encoder.finish()?;

    let output = dommap().args(["map", "-f", "tsv", "-i"]).arg(&gz).output()?;
    assert!(output.status.success());
    assert_eq!(rows(&output.stdout).len(), 4);
    Ok(())
}

#[test]
fn test_negative_option_is_rejected() {
    dommap()
        .args(["map", "--overlap", "-5", "-i"])
        .arg(data("sample.hmmscan.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlap must be non-negative"));

    dommap()
        .args(["map", "--frac-overlap", "1.5", "-i"])
        .arg(data("sample.hmmscan.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("frac_overlap must lie between 0 and 1"));
}

#[test]
fn test_options_are_checked_before_input() {
    // The input does not exist, but the option error is reported first
    dommap()
        .args(["map", "--inter-gap", "-1", "-i", "/nonexistent/report.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("inter_gap must be non-negative"));
}

#[test]
fn test_empty_input_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let empty = dir.path().join("empty.txt");
    std::fs::write(&empty, "")?;

    dommap()
        .args(["map", "-i"])
        .arg(&empty)
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
    Ok(())
}

#[test]
fn test_domtblout_input_is_rejected_with_hint() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let domtbl = dir.path().join("sample.domtbl");
    std::fs::write(
        &domtbl,
        "# target name  accession  tlen  query name  accession  qlen  E-value\n\
         F_host  -  100  sp|P00001|HOST_ECOLI  -  300  1e-36\n",
    )?;

    dommap()
        .args(["map", "-i"])
        .arg(&domtbl)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--domtblout"));
    Ok(())
}
