use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn doc_name_normalization() {
    assert_eq!(normalize_doc_name("Travel_Policy.pdf"), "Travel Policy");
    assert_eq!(normalize_doc_name("remote-work-policy.pdf"), "remote work policy");
    assert_eq!(normalize_doc_name("Handbook.PDF"), "Handbook");
    assert_eq!(normalize_doc_name("plain.pdf"), "plain");
    assert_eq!(normalize_doc_name("mixed_and-dashed.pdf"), "mixed and dashed");
}

#[test]
fn discovers_only_pdfs_sorted() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(temp_dir.path().join("b.pdf"), b"x").expect("should write");
    fs::write(temp_dir.path().join("a.PDF"), b"x").expect("should write");
    fs::write(temp_dir.path().join("notes.txt"), b"x").expect("should write");
    fs::write(temp_dir.path().join("no_extension"), b"x").expect("should write");

    let files = discover_pdfs(temp_dir.path()).expect("should discover");

    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().expect("file name").to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.PDF", "b.pdf"]);
}

#[test]
fn missing_directory_is_an_ingestion_error() {
    let result = discover_pdfs(Path::new("/nonexistent/docs"));
    assert!(matches!(result, Err(DocChatError::Ingestion(_))));
}
