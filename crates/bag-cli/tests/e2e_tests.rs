//! End-to-end tests for the `bagr` binary.

mod common;
use common::*;

use std::fs;

// ============== create ==============

#[test]
fn create_then_validate() {
    let dir = tempfile::tempdir().unwrap();
    let bag = setup_bag(dir.path());

    assert!(bag.join("data/readme.txt").is_file());
    assert!(bag.join("manifest-sha256.txt").is_file());

    let result = bagr(dir.path(), &["validate", "payload"]);
    assert_exit(&result, 0);
    assert!(result.stdout.trim_end().ends_with("payload is valid"), "{}", result.stdout);
}

#[test]
fn create_with_algorithms_and_tags() {
    let dir = tempfile::tempdir().unwrap();
    let payload = setup_payload(dir.path());

    let result = bagr(
        dir.path(),
        &[
            "create", "payload", "-a", "md5", "--algorithm", "sha512",
            "--tag", "Contact-Name=Jane Doe", "--processes", "4",
        ],
    );
    assert_exit(&result, 0);
    assert!(payload.join("manifest-md5.txt").is_file());
    assert!(payload.join("manifest-sha512.txt").is_file());
    assert!(!payload.join("manifest-sha256.txt").exists());
    let info = fs::read_to_string(payload.join("bag-info.txt")).unwrap();
    assert!(info.contains("Contact-Name: Jane Doe"));
    assert!(info.contains("Payload-Oxum: 18.2"));
}

#[test]
fn algorithm_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let payload = setup_payload(dir.path());

    let result = bagr_with_env(dir.path(), &["create", "payload"], &[("BAGR_ALGORITHM", "sha1,md5")]);
    assert_exit(&result, 0);
    assert!(payload.join("manifest-sha1.txt").is_file());
    assert!(payload.join("tagmanifest-md5.txt").is_file());
}

#[test]
fn create_unknown_algorithm() {
    let dir = tempfile::tempdir().unwrap();
    setup_payload(dir.path());

    let result = bagr(dir.path(), &["create", "payload", "--algorithm", "crc32"]);
    assert_exit(&result, 128);
    assert!(result.stderr.contains("crc32"));
    assert!(dir.path().join("payload/readme.txt").is_file());
}

#[test]
fn create_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let result = bagr(dir.path(), &["create", "nowhere"]);
    assert_exit(&result, 128);
    assert!(result.stderr.contains("fatal:"));
    assert!(result.stderr.contains("does not exist"));
}

// ============== validate ==============

#[test]
fn validate_reports_tampering() {
    let dir = tempfile::tempdir().unwrap();
    let bag = setup_bag(dir.path());
    fs::write(bag.join("data/readme.txt"), "HELLO BAG\n").unwrap();
    fs::write(bag.join("data/stray.txt"), "x").unwrap();

    let result = bagr(dir.path(), &["validate", "payload", "-p", "3"]);
    assert_exit(&result, 1);
    assert!(result.stdout.contains("is invalid: Bag validation failed: "));
    assert!(result.stdout.contains("data/readme.txt sha256 validation failed"));
    assert!(result
        .stdout
        .contains("data/stray.txt exists on filesystem but is not in the manifest"));
}

#[test]
fn validate_fast_misses_same_size_change() {
    let dir = tempfile::tempdir().unwrap();
    let bag = setup_bag(dir.path());
    fs::write(bag.join("data/readme.txt"), "HELLO BAG\n").unwrap();

    assert_exit(&bagr(dir.path(), &["validate", "--fast", "payload"]), 0);
    assert_exit(&bagr(dir.path(), &["validate", "payload"]), 1);
}

#[test]
fn validate_not_a_bag() {
    let dir = tempfile::tempdir().unwrap();
    setup_payload(dir.path());

    let result = bagr(dir.path(), &["validate", "payload"]);
    assert_exit(&result, 128);
    assert!(result.stderr.contains("is not a bag"));
}

// ============== add ==============

#[test]
fn add_tag_and_payload_files() {
    let dir = tempfile::tempdir().unwrap();
    let bag = setup_bag(dir.path());
    fs::write(dir.path().join("notes.txt"), "tag file").unwrap();
    fs::write(dir.path().join("image.raw"), [7u8; 32]).unwrap();

    assert_exit(&bagr(dir.path(), &["add", "payload", "notes.txt"]), 0);
    assert!(bag.join("notes.txt").is_file());

    let result = bagr(
        dir.path(),
        &["add", "payload", "image.raw", "--payload", "--dest", "img/0001.raw"],
    );
    assert_exit(&result, 0);
    assert!(bag.join("data/img/0001.raw").is_file());

    assert_exit(&bagr(dir.path(), &["validate", "payload", "--fast"]), 0);
    assert_exit(&bagr(dir.path(), &["validate", "payload"]), 0);
}

#[test]
fn add_dest_requires_payload() {
    let dir = tempfile::tempdir().unwrap();
    setup_bag(dir.path());
    fs::write(dir.path().join("f"), "f").unwrap();

    let result = bagr(dir.path(), &["add", "payload", "f", "--dest", "x"]);
    assert_exit(&result, 128);
}

#[test]
fn add_refuses_escape() {
    let dir = tempfile::tempdir().unwrap();
    setup_bag(dir.path());
    fs::write(dir.path().join("f"), "f").unwrap();

    let result = bagr(dir.path(), &["add", "payload", "f", "--payload", "--dest", "../f2"]);
    assert_exit(&result, 128);
    assert!(result.stderr.contains("must stay inside"));
}

// ============== hash ==============

#[test]
fn hash_prints_manifest_lines() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("abc.txt"), "abc").unwrap();

    let result = bagr(dir.path(), &["hash", "--algorithm", "md5", "abc.txt"]);
    assert_exit(&result, 0);
    assert_eq!(result.stdout, "900150983cd24fb0d6963f7d28e17f72  abc.txt\n");
}

#[test]
fn hash_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = bagr(dir.path(), &["hash", "missing.bin"]);
    assert_exit(&result, 128);
    assert!(result.stderr.contains("missing.bin"));
}

// ============== logging ==============

#[test]
fn quiet_suppresses_progress() {
    let dir = tempfile::tempdir().unwrap();
    setup_payload(dir.path());

    let loud = bagr(dir.path(), &["create", "payload"]);
    assert_exit(&loud, 0);
    assert!(loud.stderr.contains("creating bag"));

    let dir = tempfile::tempdir().unwrap();
    setup_payload(dir.path());
    let quiet = bagr(dir.path(), &["-q", "create", "payload"]);
    assert_exit(&quiet, 0);
    assert!(!quiet.stderr.contains("creating bag"));
}

#[test]
fn help_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let result = bagr(dir.path(), &["--help"]);
    assert_exit(&result, 0);
    assert!(result.stdout.contains("validate"));
}
