use prepdoc_core::{
    classify, extract, process, unpack, ArchiveLimits, ErrorClass, FileType, ProcessingConfig,
    ProcessingError, SegmentKind,
};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn zip_parts(parts: &[(&str, String)]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        writer.start_file(*name, SimpleFileOptions::default())?;
        writer.write_all(body.as_bytes())?;
    }
    Ok(writer.finish()?.into_inner())
}

fn docx(paragraphs: &[String]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let body = paragraphs
        .iter()
        .map(|text| format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"))
        .collect::<String>();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    zip_parts(&[("word/document.xml", document)])
}

fn slide(title: &str, body: &str) -> String {
    let shape = |text: &str| {
        format!("<p:sp><p:txBody><a:bodyPr/><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>")
    };
    format!(
        r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}{}</p:spTree></p:cSld></p:sld>"#,
        shape(title),
        shape(body)
    )
}

/// 500 characters of words, no trailing whitespace.
fn long_paragraph() -> String {
    format!("{}abcde", "abcd ".repeat(99))
}

#[test]
fn plain_text_hello_world_is_one_chunk() -> Result<(), Box<dyn std::error::Error>> {
    let processed = process(b"Hello world.", "hello.txt", &ProcessingConfig::default())?;

    assert_eq!(processed.file_type, FileType::PlainText);
    assert_eq!(processed.full_text, "Hello world.");
    assert_eq!(processed.chunks.len(), 1);
    assert_eq!(processed.chunks[0].index, 0);
    assert_eq!(processed.chunks[0].text, "Hello world.");
    assert!(processed.warnings.is_empty());
    Ok(())
}

#[test]
fn word_paragraphs_are_cut_at_paragraph_breaks() -> Result<(), Box<dyn std::error::Error>> {
    let paragraph = long_paragraph();
    assert_eq!(paragraph.chars().count(), 500);
    let bytes = docx(&[paragraph.clone(), paragraph.clone(), paragraph])?;
    let config = ProcessingConfig {
        max_chunk_chars: 800,
        overlap_chars: 100,
        ..ProcessingConfig::default()
    };

    let processed = process(&bytes, "prep.docx", &config)?;

    assert_eq!(processed.file_type, FileType::WordDocument);
    assert_eq!(processed.full_text.len(), 1_504);
    let spans: Vec<(usize, usize)> = processed
        .chunks
        .iter()
        .map(|chunk| (chunk.start_offset, chunk.end_offset))
        .collect();
    assert_eq!(spans, vec![(0, 502), (402, 1_004), (904, 1_504)]);
    for chunk in &processed.chunks[..2] {
        assert!(chunk.text.ends_with("abcde\n\n"));
    }
    Ok(())
}

#[test]
fn non_archive_docx_is_corrupt() {
    let result = process(
        b"this is plain text pretending",
        "notes.docx",
        &ProcessingConfig::default(),
    );

    match result {
        Err(error @ ProcessingError::CorruptArchive(_)) => {
            assert_eq!(error.class(), ErrorClass::DocumentCorruption)
        }
        other => panic!("expected corrupt archive, got {other:?}"),
    }
}

#[test]
fn slides_come_out_in_numeric_order() -> Result<(), Box<dyn std::error::Error>> {
    let stored_order = [3, 5, 1, 4, 2];
    let parts = stored_order
        .iter()
        .map(|n| {
            (
                format!("ppt/slides/slide{n}.xml"),
                slide(&format!("Title {n}"), &format!("Body line {n}")),
            )
        })
        .collect::<Vec<_>>();
    let borrowed = parts
        .iter()
        .map(|(name, body)| (name.as_str(), body.clone()))
        .collect::<Vec<_>>();
    let bytes = zip_parts(&borrowed)?;

    let extracted = extract(unpack(&bytes, FileType::SlideDeck, &ArchiveLimits::default())?)?;

    assert_eq!(extracted.segments.len(), 5);
    for (position, segment) in extracted.segments.iter().enumerate() {
        let n = position + 1;
        assert_eq!(segment.kind, SegmentKind::SlideBlock);
        assert_eq!(segment.ordinal, position);
        assert_eq!(segment.text, format!("Title {n}\nBody line {n}"));
    }

    let processed = process(&bytes, "review.pptx", &ProcessingConfig::default())?;
    assert!(processed.full_text.starts_with("Title 1\nBody line 1\n\nTitle 2"));
    assert!(processed.full_text.ends_with("Title 5\nBody line 5"));
    Ok(())
}

#[test]
fn extraction_warnings_reach_the_processed_document() -> Result<(), Box<dyn std::error::Error>>
{
    let bytes = docx(&[
        "Before".to_string(),
        "broken &bogus; entity".to_string(),
        "After".to_string(),
    ])?;

    let processed = process(&bytes, "notes.docx", &ProcessingConfig::default())?;

    assert_eq!(processed.full_text, "Before\n\nAfter");
    assert_eq!(processed.warnings.len(), 1);
    assert_eq!(processed.warnings[0].kind, SegmentKind::Paragraph);
    assert_eq!(processed.warnings[0].ordinal, 1);
    assert_eq!(processed.chunks.len(), 1);
    Ok(())
}

#[test]
fn zero_length_buffers_are_empty_documents() {
    for filename in ["empty.txt", "empty.docx", "empty.pptx"] {
        let result = process(&[], filename, &ProcessingConfig::default());
        assert!(
            matches!(result, Err(ProcessingError::EmptyDocument)),
            "{filename}: {result:?}"
        );
    }
}

#[test]
fn unsupported_types_are_gated_on_the_name() {
    assert_eq!(classify("notes.csv"), FileType::Unsupported);

    let result = process(&[], "notes.csv", &ProcessingConfig::default());
    assert!(matches!(
        result,
        Err(ProcessingError::UnsupportedFileType { .. })
    ));
}

#[test]
fn deck_with_only_blank_slides_is_empty() -> Result<(), Box<dyn std::error::Error>> {
    let bytes = zip_parts(&[("ppt/slides/slide1.xml", slide("", ""))])?;

    let result = process(&bytes, "blank.pptx", &ProcessingConfig::default());
    assert!(matches!(result, Err(ProcessingError::EmptyDocument)));
    Ok(())
}

#[test]
fn repeated_runs_are_identical() -> Result<(), Box<dyn std::error::Error>> {
    let text = "Agenda. Budget review! Hiring plan? Open questions follow.\n".repeat(40);
    let config = ProcessingConfig {
        max_chunk_chars: 150,
        overlap_chars: 30,
        ..ProcessingConfig::default()
    };

    let first = process(text.as_bytes(), "agenda.txt", &config)?;
    let second = process(text.as_bytes(), "agenda.txt", &config)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn chunks_reassemble_the_full_text() -> Result<(), Box<dyn std::error::Error>> {
    let paragraphs = (0..12)
        .map(|n| format!("Point {n}: the team reviewed item {n} and agreed on next steps."))
        .collect::<Vec<_>>();
    let bytes = docx(&paragraphs)?;
    let config = ProcessingConfig {
        max_chunk_chars: 120,
        overlap_chars: 20,
        ..ProcessingConfig::default()
    };

    let processed = process(&bytes, "minutes.docx", &config)?;

    let mut rebuilt = String::new();
    let mut covered = 0;
    for (position, chunk) in processed.chunks.iter().enumerate() {
        assert_eq!(chunk.index, position);
        assert!(chunk.text.chars().count() <= 120);
        assert!(chunk.start_offset <= covered);
        rebuilt.push_str(&chunk.text[covered - chunk.start_offset..]);
        covered = chunk.end_offset;
    }
    assert_eq!(rebuilt, processed.full_text);
    assert!(processed
        .chunks
        .windows(2)
        .all(|pair| pair[0].start_offset <= pair[1].start_offset));
    Ok(())
}

#[test]
fn processed_document_serializes_for_callers() -> Result<(), Box<dyn std::error::Error>> {
    let processed = process(b"Quarterly goals", "goals.txt", &ProcessingConfig::default())?;

    let json = serde_json::to_value(&processed)?;

    assert_eq!(json["file_type"], "PlainText");
    assert_eq!(json["chunks"][0]["text"], "Quarterly goals");
    assert_eq!(json["content_hash"].as_str().map(str::len), Some(64));
    Ok(())
}
