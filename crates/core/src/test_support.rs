//! In-memory OOXML fixtures for unit tests.

use crate::archive::WORD_BODY_PART;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub fn zip_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for (name, body) in parts {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("zip entry should start");
        writer
            .write_all(body.as_bytes())
            .expect("zip entry should be written");
    }

    writer
        .finish()
        .expect("zip archive should finish")
        .into_inner()
}

/// Wraps `w:p` markup in a minimal WordprocessingML body.
pub fn word_body(paragraphs: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{paragraphs}<w:sectPr/></w:body></w:document>"#
    )
}

pub fn word_paragraph(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}

pub fn docx_bytes(paragraphs: &str) -> Vec<u8> {
    zip_parts(&[
        ("[Content_Types].xml", "<Types/>"),
        (WORD_BODY_PART, word_body(paragraphs).as_str()),
    ])
}

/// A slide with one shape per entry, each shape holding a single paragraph.
pub fn slide_xml(shape_texts: &[&str]) -> String {
    let shapes = shape_texts
        .iter()
        .map(|text| {
            format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Shape"/></p:nvSpPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp>"#
            )
        })
        .collect::<String>();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{shapes}</p:spTree></p:cSld></p:sld>"#
    )
}
