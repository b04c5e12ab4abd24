use super::*;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::fs;
use tempfile::TempDir;

/// Build a minimal PDF with one page per entry in `page_texts`
fn write_test_pdf(path: &Path, page_texts: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("should encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = page_texts.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("should save test pdf");
}

#[test]
fn extracts_all_pages_in_order() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("policies.pdf");
    write_test_pdf(
        &path,
        &[
            "General guidelines for employees.",
            "Relocation assistance is provided.",
            "Contact the HR department.",
        ],
    );

    let pages = extract_pages(&path).expect("should extract pages");

    assert_eq!(pages.len(), 3);
    assert_eq!(
        pages.iter().map(|p| p.number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(pages[1].text.contains("Relocation"));
}

#[test]
fn unreadable_file_is_an_ingestion_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("garbage.pdf");
    fs::write(&path, b"this is not a pdf at all").expect("should write file");

    let result = extract_pages(&path);

    assert!(matches!(result, Err(DocChatError::Ingestion(_))));
}

#[test]
fn missing_file_is_an_ingestion_error() {
    let result = extract_pages(Path::new("/nonexistent/never.pdf"));
    assert!(matches!(result, Err(DocChatError::Ingestion(_))));
}
