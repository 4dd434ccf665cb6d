//! Argument handling and failure paths of the two binaries. Network calls
//! only ever target a closed local port.

use assert_cmd::Command;
use predicates::prelude::*;

/// Binary with a clean environment and quiet logging.
fn bin(name: &str) -> Command {
    let mut cmd = Command::cargo_bin(name).unwrap();
    for key in [
        "LOG_FILE_PATH",
        "USAC_API_URL",
        "USAC_DATASET",
        "USAC_PAGE_SIZE",
        "USAC_MAX_PAGES",
        "USAC_TIMEOUT_SECS",
        "USAC_APP_TOKEN",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("RUST_LOG", "error");
    cmd
}

#[test]
fn test_year_query_help() {
    bin("year_query")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--school-threshold"))
        .stdout(predicate::str::contains("<STATE>"));
}

#[test]
fn test_year_query_rejects_bad_state() {
    bin("year_query")
        .args(["Oklahoma", "2024"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("2-letter"));
}

#[test]
fn test_year_query_rejects_out_of_range_year() {
    bin("year_query")
        .args(["OK", "1999"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("between 2016 and 2030"));
}

#[test]
fn test_year_query_rejects_negative_threshold() {
    bin("year_query")
        .args(["OK", "2024", "--sku-threshold=-5"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn test_year_query_unreachable_api_fails_without_report() {
    let dir = tempfile::tempdir().unwrap();
    bin("year_query")
        .env("USAC_API_URL", "http://127.0.0.1:9")
        .env("USAC_TIMEOUT_SECS", "5")
        .args(["OK", "2024", "--save-csv", "--output-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Error:"))
        .stdout(predicate::str::contains("Analysis completed at").not());

    assert!(!dir.path().join("ok_erate_filtered_2024.csv").exists());
}

#[test]
fn test_rust_log_level_silences_info_records() {
    bin("year_query")
        .env("USAC_API_URL", "http://127.0.0.1:9")
        .env("USAC_TIMEOUT_SECS", "5")
        .env("RUST_LOG", "warn")
        .args(["OK", "2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("INFO").not())
        .stderr(predicate::str::contains("Fetching state line items").not())
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_info_records_shown_by_default() {
    bin("year_query")
        .env_remove("RUST_LOG")
        .env("USAC_API_URL", "http://127.0.0.1:9")
        .env("USAC_TIMEOUT_SECS", "5")
        .args(["OK", "2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fetching state line items"));
}

#[test]
fn test_school_query_requires_organization_or_search() {
    bin("school_query").assert().failure().code(2);
}

#[test]
fn test_school_query_state_requires_search() {
    bin("school_query")
        .args(["TULSA", "--state", "OK"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));

    bin("school_query")
        .args(["--state", "OK"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_school_query_rejects_inverted_year_range() {
    bin("school_query")
        .args(["TULSA", "--from-year", "2024", "--to-year", "2020"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("after --to-year"));
}

#[test]
fn test_school_query_rejects_blank_search_term() {
    bin("school_query")
        .args(["--find-school", "  "])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("search term cannot be empty"));
}
