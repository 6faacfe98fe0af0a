//! Command-line behaviour of the `agp-validate` binary.

use std::io::Write;
use std::path::PathBuf;

use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use predicates::prelude::*;
use tempfile::TempDir;

const VALID_AGP: &str = "\
##agp-version\t2.0
chr1\t1\t1000\t1\tW\tAC123.1\t1\t1000\t+
chr1\t1001\t1100\t2\tN\t100\tscaffold\tyes\tpaired-ends
chr1\t1101\t2100\t3\tW\tAC456.2\t1\t1000\t-
";

const BROKEN_AGP: &str = "\
chr1\t1\t1000\t1\tW\tAC123.1\t1\t1000\t+
chr1\t1001\t2000\t3\tW\tAC456.2\t1\t1000\t+
";

fn cmd() -> Command {
    Command::cargo_bin("agp-validate").unwrap()
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_valid_file_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "good.agp", VALID_AGP);

    cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No errors"));
}

#[test]
fn test_errors_fail_with_report() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.agp", BROKEN_AGP);

    cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "ERROR: part number (column 4) != previous part number + 1",
        ))
        .stdout(predicate::str::contains("2:chr1\t1001\t2000"));
}

#[test]
fn test_reads_stdin() {
    cmd()
        .arg("validate")
        .write_stdin(VALID_AGP)
        .assert()
        .success();

    cmd()
        .args(["validate", "-"])
        .write_stdin(BROKEN_AGP)
        .assert()
        .failure();
}

#[test]
fn test_reads_gzip_input() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("good.agp.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(VALID_AGP.as_bytes()).unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();

    cmd()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No errors"));
}

#[test]
fn test_json_and_xml_reports() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.agp", BROKEN_AGP);

    cmd()
        .args(["--format", "json", "validate"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"severity\":\"ERROR\""))
        .stdout(predicate::str::contains("\"summary\""));

    cmd()
        .args(["validate", "--format", "xml"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("<?xml"))
        .stdout(predicate::str::contains("</page>"));
}

#[test]
fn test_skip_hides_but_still_counts() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.agp", BROKEN_AGP);

    cmd()
        .arg("validate")
        .arg(&path)
        .args(["--skip", "previous part number"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR: part number").not())
        .stdout(predicate::str::contains("not printed"));
}

#[test]
fn test_unknown_selector_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "good.agp", VALID_AGP);

    cmd()
        .arg("validate")
        .arg(&path)
        .args(["--only", "no message says this"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No message code matches"));
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.agp", BROKEN_AGP);
    let good_config = write_file(&dir, "config.json", r#"{"skip": ["err"]}"#);
    let bad_config = write_file(&dir, "typo.json", r#"{"skipp": ["err"]}"#);

    cmd()
        .arg("validate")
        .arg(&path)
        .arg("--config")
        .arg(&good_config)
        .assert()
        .failure()
        .stdout(predicate::str::contains("ERROR:").not());

    cmd()
        .arg("validate")
        .arg(&path)
        .arg("--config")
        .arg(&bad_config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_version_option() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "v1.agp",
        "chr1\t1\t100\t1\tW\tAC1.1\t1\t100\t0\n",
    );

    cmd()
        .arg("validate")
        .arg(&path)
        .args(["--agp-version", "1.1"])
        .assert()
        .success();

    cmd()
        .arg("validate")
        .arg(&path)
        .args(["--agp-version", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported AGP version"));
}

#[test]
fn test_multiple_files_are_labelled() {
    let dir = TempDir::new().unwrap();
    let good = write_file(&dir, "good.agp", VALID_AGP);
    let bad = write_file(&dir, "bad.agp", BROKEN_AGP);

    cmd()
        .arg("validate")
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains(format!(
            "{}:2:chr1\t1001\t2000",
            bad.display()
        )));
}

#[test]
fn test_max_errors_stops_early() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "junk.agp", "a\nb\nc\nd\n");

    cmd()
        .arg("validate")
        .arg(&path)
        .args(["--max-errors", "2"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("3:c").not())
        .stderr(predicate::str::contains("stopped after 2 lines with errors"));
}

#[test]
fn test_stats() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "good.agp", VALID_AGP);

    cmd()
        .arg("validate")
        .arg(&path)
        .arg("--stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Objects:     1"))
        .stdout(predicate::str::contains("Components:  2"));
}

#[test]
fn test_codes_listing() {
    cmd()
        .arg("codes")
        .assert()
        .success()
        .stdout(predicate::str::contains("expecting 9 tab-separated columns"));

    cmd()
        .args(["codes", "gap"])
        .assert()
        .success()
        .stdout(predicate::str::contains("expecting 9").not())
        .stdout(predicate::str::contains("gap at the end of object"));
}
