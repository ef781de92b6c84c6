use std::fs;

use catalog_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("exports").join("today");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());

    // Existing directory is accepted as-is.
    ensure_output_dir(&new_dir).unwrap();
}

#[test]
fn rejects_file_as_output_dir() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("taken");
    fs::write(&file_path, "x").unwrap();

    let err = ensure_output_dir(&file_path).unwrap_err();
    assert!(matches!(err, PersistError::OutputDir(_)));
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("apify_actors.json", "[]").unwrap();
    assert_eq!(first.file_name().unwrap(), "apify_actors.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "[]");

    let second = writer.write("apify_actors.json", "[1]").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "[1]");

    // Only the target remains; no temp files are left behind.
    let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("APIFY_ACTORS.md", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("APIFY_ACTORS.md").exists());
}
