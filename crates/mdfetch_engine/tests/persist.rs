use std::fs;

use mdfetch_engine::{
    deterministic_filename, ensure_output_dir, AtomicFileWriter, ContentKind, PersistError,
    Rendered,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn rendered(content: &str) -> Rendered {
    Rendered {
        target: "example.com/docs".into(),
        url: "https://example.com/docs".into(),
        kind: ContentKind::Html,
        backend: "Firefox".into(),
        content: content.into(),
    }
}

#[test]
fn missing_output_dir_is_created() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("out").join("pages");
    ensure_output_dir(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn file_in_place_of_dir_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("doc.md", "data");
    assert!(matches!(result, Err(PersistError::OutputDir { .. })));
    assert!(!file_path.with_file_name("doc.md").exists());
}

#[test]
fn rewriting_replaces_previous_content() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("doc.md", "hello").unwrap();
    let second = writer.write("doc.md", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn rendered_page_is_saved_under_its_url_name() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let path = writer
        .save_rendered(&rendered("# Docs\n\nBody\n"), "2026-03-01T10:00:00+00:00")
        .unwrap();

    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        deterministic_filename("https://example.com/docs")
    );
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "---\nurl: https://example.com/docs\nbackend: Firefox\nkind: html\nfetched_utc: 2026-03-01T10:00:00+00:00\n---\n\n# Docs\n\nBody\n"
    );
}
