use crate::models::FileType;
use std::path::Path;

/// Classifies an upload by its filename extension alone; the bytes are never sniffed.
pub fn classify(filename: &str) -> FileType {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    if extension.eq_ignore_ascii_case("txt") {
        FileType::PlainText
    } else if extension.eq_ignore_ascii_case("docx") {
        FileType::WordDocument
    } else if extension.eq_ignore_ascii_case("pptx") {
        FileType::SlideDeck
    } else {
        FileType::Unsupported
    }
}
