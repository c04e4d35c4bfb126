use crate::archive::{ArchivePart, DocumentParts};
use crate::error::{ProcessingError, Result};
use crate::models::{ExtractedText, ExtractionWarning, FileType, SegmentKind, TextSegment};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

/// Placed between the text blocks of one slide while walking it; removed before the segment is built.
const BLOCK_SEPARATOR: char = '\u{1e}';

/// `mc:Fallback` repeats the content of its sibling `mc:Choice` for older readers.
const FALLBACK: &[u8] = b"Fallback";

/// Runs the extraction strategy matching the unpacked parts.
pub fn extract(parts: DocumentParts<'_>) -> Result<ExtractedText> {
    let extracted = match parts {
        DocumentParts::PlainText(bytes) => extract_plain_text(bytes),
        DocumentParts::WordDocument(body) => extract_word_document(&body),
        DocumentParts::SlideDeck(slides) => extract_slide_deck(&slides),
    };

    if extracted
        .segments
        .iter()
        .all(|segment| segment.text.is_empty())
    {
        return Err(ProcessingError::EmptyDocument);
    }

    debug!(
        file_type = %extracted.file_type,
        segments = extracted.segments.len(),
        warnings = extracted.warnings.len(),
        "extracted text"
    );
    Ok(extracted)
}

fn extract_plain_text(bytes: &[u8]) -> ExtractedText {
    let mut warnings = Vec::new();

    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.strip_prefix('\u{feff}').unwrap_or(text).to_string(),
        Err(error) => {
            warn!(%error, "plain text is not valid UTF-8, decoding as Latin-1");
            warnings.push(ExtractionWarning {
                kind: SegmentKind::Paragraph,
                ordinal: 0,
                message: format!("not valid UTF-8 ({error}), decoded as Latin-1"),
            });
            decode_latin1(bytes)
        }
    };

    let segments = text
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .enumerate()
        .map(|(ordinal, line)| TextSegment {
            text: line.to_string(),
            kind: SegmentKind::Paragraph,
            ordinal,
        })
        .collect();

    ExtractedText {
        file_type: FileType::PlainText,
        segments,
        warnings,
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

fn extract_word_document(body: &ArchivePart) -> ExtractedText {
    let mut reader = Reader::from_reader(body.data.as_slice());
    reader.config_mut().check_end_names = false;

    let mut buf = Vec::new();
    let mut segments = Vec::new();
    let mut warnings = Vec::new();

    let mut paragraph = String::new();
    let mut corrupt_run: Option<String> = None;
    let mut paragraph_depth = 0usize;
    let mut run_depth = 0usize;
    let mut fallback_depth = 0usize;
    let mut in_text = false;
    let mut text_box_break = false;
    let mut ordinal = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) if element.local_name().as_ref() == FALLBACK => {
                fallback_depth += 1;
            }
            Ok(Event::End(element)) if element.local_name().as_ref() == FALLBACK => {
                fallback_depth = fallback_depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(error) => {
                let position = reader.buffer_position();
                warn!(ordinal, position, %error, "document body is malformed, stopping");
                warnings.push(ExtractionWarning {
                    kind: SegmentKind::Paragraph,
                    ordinal,
                    message: format!(
                        "malformed markup at byte {position}: {error}; remaining content skipped"
                    ),
                });
                break;
            }
            _ if fallback_depth > 0 => {}
            Ok(Event::Start(element)) => match element.local_name().as_ref() {
                b"p" => {
                    if paragraph_depth == 0 {
                        paragraph.clear();
                        corrupt_run = None;
                        text_box_break = false;
                    } else {
                        text_box_break = true;
                    }
                    paragraph_depth += 1;
                }
                b"r" if paragraph_depth > 0 => run_depth += 1,
                b"t" if run_depth > 0 => in_text = true,
                b"tab" | b"br" | b"cr" if run_depth > 0 => paragraph.push(' '),
                _ => {}
            },
            Ok(Event::Empty(element)) => match element.local_name().as_ref() {
                b"p" if paragraph_depth == 0 => {
                    segments.push(TextSegment {
                        text: String::new(),
                        kind: SegmentKind::Paragraph,
                        ordinal,
                    });
                    ordinal += 1;
                }
                b"tab" | b"br" | b"cr" if run_depth > 0 => paragraph.push(' '),
                _ => {}
            },
            Ok(Event::End(element)) => match element.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"p" if paragraph_depth > 0 => {
                    paragraph_depth -= 1;
                    if paragraph_depth > 0 {
                        text_box_break = true;
                    } else {
                        run_depth = 0;
                        in_text = false;
                        match corrupt_run.take() {
                            Some(reason) => {
                                warn!(ordinal, %reason, "skipping paragraph with corrupt run");
                                warnings.push(ExtractionWarning {
                                    kind: SegmentKind::Paragraph,
                                    ordinal,
                                    message: format!("paragraph skipped: {reason}"),
                                });
                            }
                            None => segments.push(TextSegment {
                                text: std::mem::take(&mut paragraph),
                                kind: SegmentKind::Paragraph,
                                ordinal,
                            }),
                        }
                        ordinal += 1;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(text)) if in_text => match text.unescape() {
                Ok(value) => push_run_text(&mut paragraph, &mut text_box_break, &value),
                Err(error) => corrupt_run = Some(error.to_string()),
            },
            Ok(Event::CData(data)) if in_text => {
                let value = String::from_utf8_lossy(&data);
                push_run_text(&mut paragraph, &mut text_box_break, &value);
            }
            _ => {}
        }
        buf.clear();
    }

    ExtractedText {
        file_type: FileType::WordDocument,
        segments,
        warnings,
    }
}

/// Appends run text, keeping text box paragraphs apart from the text around them.
fn push_run_text(paragraph: &mut String, text_box_break: &mut bool, value: &str) {
    if std::mem::take(text_box_break) && !paragraph.is_empty() && !paragraph.ends_with(' ') {
        paragraph.push(' ');
    }
    paragraph.push_str(value);
}

fn extract_slide_deck(slides: &[ArchivePart]) -> ExtractedText {
    let mut warnings = Vec::new();
    let segments = slides
        .iter()
        .enumerate()
        .map(|(ordinal, slide)| TextSegment {
            text: slide_text(slide, ordinal, &mut warnings),
            kind: SegmentKind::SlideBlock,
            ordinal,
        })
        .collect();

    ExtractedText {
        file_type: FileType::SlideDeck,
        segments,
        warnings,
    }
}

/// Text paragraphs of every shape on the slide, in tree order, one per line.
fn slide_text(slide: &ArchivePart, ordinal: usize, warnings: &mut Vec<ExtractionWarning>) -> String {
    let mut reader = Reader::from_reader(slide.data.as_slice());
    reader.config_mut().check_end_names = false;

    let mut buf = Vec::new();
    let mut blocks = String::new();
    let mut paragraph = String::new();
    let mut corrupt_run: Option<String> = None;
    let mut in_paragraph = false;
    let mut in_text = false;
    let mut fallback_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(element)) if element.local_name().as_ref() == FALLBACK => {
                fallback_depth += 1;
            }
            Ok(Event::End(element)) if element.local_name().as_ref() == FALLBACK => {
                fallback_depth = fallback_depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(error) => {
                warn!(slide = slide.index, %error, "slide markup is malformed, stopping");
                warnings.push(ExtractionWarning {
                    kind: SegmentKind::SlideBlock,
                    ordinal,
                    message: format!("{}: malformed markup: {error}", slide.name),
                });
                break;
            }
            _ if fallback_depth > 0 => {}
            Ok(Event::Start(element)) => match element.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    paragraph.clear();
                    corrupt_run = None;
                }
                b"t" if in_paragraph => in_text = true,
                b"br" if in_paragraph => paragraph.push(' '),
                _ => {}
            },
            Ok(Event::Empty(element)) => {
                if in_paragraph && element.local_name().as_ref() == b"br" {
                    paragraph.push(' ');
                }
            }
            Ok(Event::End(element)) => match element.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" if in_paragraph => {
                    in_paragraph = false;
                    in_text = false;
                    if let Some(reason) = corrupt_run.take() {
                        warn!(slide = slide.index, %reason, "skipping slide text with corrupt run");
                        warnings.push(ExtractionWarning {
                            kind: SegmentKind::SlideBlock,
                            ordinal,
                            message: format!("{}: text block skipped: {reason}", slide.name),
                        });
                    } else {
                        blocks.push_str(&paragraph);
                        blocks.push(BLOCK_SEPARATOR);
                    }
                }
                _ => {}
            },
            Ok(Event::Text(text)) if in_text => match text.unescape() {
                Ok(value) => paragraph.push_str(&value),
                Err(error) => corrupt_run = Some(error.to_string()),
            },
            Ok(Event::CData(data)) if in_text => {
                paragraph.push_str(&String::from_utf8_lossy(&data));
            }
            _ => {}
        }
        buf.clear();
    }

    blocks
        .split(BLOCK_SEPARATOR)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
