//! End-to-end document generation tests: build documents through the
//! public API and check the structure of the produced bytes.

use pretty_assertions::assert_eq;
use scribe_pdf::{
    Color, Document, DocumentOptions, PageBox, PdfError, Transition, TransitionType,
};

fn pdf_text(doc: &Document) -> String {
    String::from_utf8_lossy(&doc.to_bytes().unwrap()).into_owned()
}

#[test]
fn empty_document_cannot_be_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.pdf");

    let doc = Document::default();
    let err = doc.write(&path).unwrap_err();
    assert!(matches!(err, PdfError::EmptyDocument));
    // A failing document must not leave a file behind
    assert!(!path.exists());
}

#[test]
fn single_page_document_writes_a_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rect.pdf");

    let mut doc = Document::default();
    let mut ctx = doc.page_context();
    ctx.set_fill_color(Color::rgb(0.9, 0.1, 0.1).unwrap()).unwrap();
    ctx.rect(100.0, 100.0, 200.0, 150.0).fill();
    doc.add_page(ctx).unwrap();
    doc.write(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7\n"));
    assert!(bytes.ends_with(b"%%EOF\n"));

    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Type /Catalog"));
    assert!(text.contains("/Type /Pages"));
    assert!(text.contains("/Type /Page"));
    assert!(text.contains("startxref"));
}

#[test]
fn default_page_is_a4() {
    let mut doc = Document::default();
    doc.add_page(doc.page_context()).unwrap();
    assert!(pdf_text(&doc).contains("/MediaBox [0 0 595 842]"));
}

#[test]
fn page_box_options_are_written() {
    let mut options = DocumentOptions::new();
    options
        .set_page_box(PageBox::Media, 0.0, 0.0, 640.0, 480.0)
        .set_page_box(PageBox::Crop, 10.0, 10.0, 630.0, 470.0);

    let mut doc = Document::new(options);
    doc.add_page(doc.page_context()).unwrap();

    let text = pdf_text(&doc);
    assert!(text.contains("/MediaBox [0 0 640 480]"));
    assert!(text.contains("/CropBox [10 10 630 470]"));
}

#[test]
fn uncompressed_content_stream_is_readable() {
    let mut options = DocumentOptions::new();
    options.set_compress(false);

    let mut doc = Document::new(options);
    let mut ctx = doc.page_context();
    ctx.set_line_width(3.0).unwrap();
    ctx.move_to(10.0, 10.0).line_to(100.0, 100.0).stroke();
    doc.add_page(ctx).unwrap();

    let text = pdf_text(&doc);
    assert!(text.contains("3.00 w\n"));
    assert!(text.contains("10.00 10.00 m\n"));
    assert!(text.contains("100.00 100.00 l\n"));
    assert!(!text.contains("/Filter /FlateDecode"));
}

#[cfg(feature = "compression")]
#[test]
fn compressed_content_stream_is_not_plain_text() {
    let mut doc = Document::default();
    let mut ctx = doc.page_context();
    ctx.rect(0.0, 0.0, 100.0, 100.0).fill();
    doc.add_page(ctx).unwrap();

    let text = pdf_text(&doc);
    assert!(text.contains("/Filter /FlateDecode"));
    assert!(!text.contains("100.00 100.00 re"));
}

#[test]
fn multiple_pages_are_counted() {
    let mut doc = Document::default();
    for _ in 0..3 {
        doc.add_page(doc.page_context()).unwrap();
    }
    assert_eq!(doc.page_count(), 3);

    let text = pdf_text(&doc);
    assert!(text.contains("/Count 3"));
}

#[test]
fn info_dictionary_carries_title_and_author() {
    let mut options = DocumentOptions::new();
    options.set_title("Quarterly Review").set_author("presenter");

    let mut doc = Document::new(options);
    doc.add_page(doc.page_context()).unwrap();

    let text = pdf_text(&doc);
    assert!(text.contains("/Title (Quarterly Review)"));
    assert!(text.contains("/Author (presenter)"));
    assert!(text.contains("/CreationDate (D:"));
}

#[test]
fn page_transition_is_written() {
    let mut doc = Document::default();
    let mut ctx = doc.page_context();
    ctx.set_page_transition(Transition::new(TransitionType::Dissolve, 1.5));
    doc.add_page(ctx).unwrap();

    let text = pdf_text(&doc);
    assert!(text.contains("/Trans << /Type /Trans /S /Dissolve /D 1.5 >>"));
}

#[test]
fn unbalanced_page_fails_and_produces_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unbalanced.pdf");

    let mut doc = Document::default();
    let mut ctx = doc.page_context();
    ctx.push_gstate();
    ctx.rect(0.0, 0.0, 10.0, 10.0).fill();
    let err = doc.add_page(ctx).unwrap_err();
    assert!(matches!(err, PdfError::UnbalancedState(_)));

    assert_eq!(doc.page_count(), 0);
    assert!(matches!(doc.write(&path).unwrap_err(), PdfError::EmptyDocument));
    assert!(!path.exists());
}

#[test]
fn nested_gstate_scopes_serialize() {
    let mut options = DocumentOptions::new();
    options.set_compress(false);

    let mut doc = Document::new(options);
    let mut ctx = doc.page_context();
    ctx.with_gstate(|ctx| {
        ctx.translate(100.0, 100.0);
        ctx.with_gstate(|ctx| {
            ctx.rotate(std::f64::consts::FRAC_PI_4);
            ctx.rect(0.0, 0.0, 50.0, 50.0).stroke();
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();
    doc.add_page(ctx).unwrap();

    let text = pdf_text(&doc);
    assert_eq!(text.matches("q\n").count(), 2);
    assert_eq!(text.matches("Q\n").count(), 2);
}

#[test]
fn to_bytes_is_deterministic() {
    let build = || {
        let mut doc = Document::default();
        let mut ctx = doc.page_context();
        ctx.rect(10.0, 10.0, 20.0, 20.0).fill();
        doc.add_page(ctx).unwrap();
        doc
    };
    // Two documents built the same way differ only in CreationDate, which
    // a single document never does across calls.
    let doc = build();
    assert_eq!(doc.to_bytes().unwrap(), doc.to_bytes().unwrap());
}
