// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use cvgrep::store::{VectorStore, CHUNKS_FILE, INDEX_FILE};

const RESUME: &str = "John Doe\njohn@example.com\n\nEDUCATION\nSoutheastern Louisiana University\nBachelor of Arts in Marketing\n\nEXPERIENCE\nXYZ Corp, marketing intern\n\nSKILLS\nPython, SQL, Excel, Tableau\n";

fn cvgrep() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("cvgrep"))
}

fn write_dummy_config(dir: &Path) {
    fs::write(
        dir.join(".cvgreprc.toml"),
        r#"
[embeddings]
provider = "dummy"
dimension = 8
"#,
    )
    .unwrap();
}

fn write_resume(dir: &Path) {
    fs::write(dir.join("resume.txt"), RESUME).unwrap();
}

#[test]
fn ingest_creates_both_store_artifacts() {
    let dir = TempDir::new().unwrap();
    write_dummy_config(dir.path());
    write_resume(dir.path());

    cvgrep()
        .current_dir(dir.path())
        .args(["ingest", "resume.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 section headers"));

    let store_dir = dir.path().join(".cvgrep");
    assert!(store_dir.join(INDEX_FILE).exists());
    assert!(store_dir.join(CHUNKS_FILE).exists());

    let store = VectorStore::open(&store_dir, 8).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.vector_count(), 3);
}

#[test]
fn ingest_json_reports_the_pipeline_outcome() {
    let dir = TempDir::new().unwrap();
    write_dummy_config(dir.path());
    write_resume(dir.path());

    let assert = cvgrep()
        .current_dir(dir.path())
        .args(["--format", "json", "ingest", "resume.txt", "--store", "store"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let outcome: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcome["chunks_added"], 3);
    assert_eq!(outcome["chunks_skipped"], 0);
    assert_eq!(outcome["store_records"], 3);
    let headers: Vec<&str> = outcome["confirmed_headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h.as_str().unwrap())
        .collect();
    assert_eq!(headers, vec!["EDUCATION", "EXPERIENCE", "SKILLS"]);
}

#[test]
fn repeated_ingest_appends_without_dedup() {
    let dir = TempDir::new().unwrap();
    write_dummy_config(dir.path());
    write_resume(dir.path());

    for _ in 0..2 {
        cvgrep()
            .current_dir(dir.path())
            .args(["ingest", "resume.txt", "--store", "store", "--quiet"])
            .assert()
            .success();
    }

    let store = VectorStore::open(dir.path().join("store"), 8).unwrap();
    assert_eq!(store.len(), 6);
}

#[test]
fn headers_command_lists_sections_with_confidence() {
    let dir = TempDir::new().unwrap();
    write_dummy_config(dir.path());
    write_resume(dir.path());

    cvgrep()
        .current_dir(dir.path())
        .args(["headers", "resume.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EDUCATION"))
        .stdout(predicate::str::contains("Best match: education"))
        .stdout(predicate::str::contains("Confidence: high"));
}

#[test]
fn headers_json_is_machine_readable() {
    let dir = TempDir::new().unwrap();
    write_dummy_config(dir.path());
    write_resume(dir.path());

    let assert = cvgrep()
        .current_dir(dir.path())
        .args(["--format", "json", "headers", "resume.txt"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let candidates: Value = serde_json::from_str(&stdout).unwrap();
    let candidates = candidates.as_array().unwrap();
    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0]["matched_reference"], "education");
    assert_eq!(candidates[0]["similarity_score"], 1.0);
}

#[test]
fn search_returns_ranked_chunks() {
    let dir = TempDir::new().unwrap();
    write_dummy_config(dir.path());
    write_resume(dir.path());

    cvgrep()
        .current_dir(dir.path())
        .args(["ingest", "resume.txt", "--store", "store", "--quiet"])
        .assert()
        .success();

    cvgrep()
        .current_dir(dir.path())
        .args(["search", "what are the skills?", "--store", "store", "-k", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[1]"))
        .stdout(predicate::str::contains("[2]"))
        .stdout(predicate::str::contains("distance: 0.0000"));
}

#[test]
fn search_k_beyond_store_size_returns_all_records() {
    let dir = TempDir::new().unwrap();
    write_dummy_config(dir.path());
    write_resume(dir.path());

    cvgrep()
        .current_dir(dir.path())
        .args(["ingest", "resume.txt", "--store", "store", "--quiet"])
        .assert()
        .success();

    let assert = cvgrep()
        .current_dir(dir.path())
        .args([
            "--format", "json", "search", "anything", "--store", "store", "-k", "10",
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let hits: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 3);
}

#[test]
fn search_against_an_empty_store_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    write_dummy_config(dir.path());

    cvgrep()
        .current_dir(dir.path())
        .args(["search", "skills", "--store", "store"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn ask_runs_the_full_pipeline_with_a_stub_answerer() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".cvgreprc.toml"),
        r#"
[embeddings]
provider = "dummy"
dimension = 8

[answer]
command = "cat > /dev/null; echo the candidate knows Python"
"#,
    )
    .unwrap();
    write_resume(dir.path());

    cvgrep()
        .current_dir(dir.path())
        .args(["ask", "resume.txt", "What skills does the candidate have?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Answer ==="))
        .stdout(predicate::str::contains("the candidate knows Python"))
        .stdout(predicate::str::contains("=== Retrieved Chunks ==="))
        .stdout(predicate::str::contains("SKILLS"));
}

#[test]
fn ask_without_an_answer_command_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    write_dummy_config(dir.path());
    write_resume(dir.path());

    cvgrep()
        .current_dir(dir.path())
        .args(["ask", "resume.txt", "question?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No answer command configured"));
}

#[test]
fn ingest_of_a_missing_document_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    write_dummy_config(dir.path());

    cvgrep()
        .current_dir(dir.path())
        .args(["ingest", "nope.txt"])
        .assert()
        .failure();
}

#[test]
fn ingest_without_recognizable_headers_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    write_dummy_config(dir.path());
    fs::write(
        dir.path().join("notes.txt"),
        "just some free-form notes\nnothing that looks like a resume section\n",
    )
    .unwrap();

    cvgrep()
        .current_dir(dir.path())
        .args(["ingest", "notes.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no section headers"));
}
