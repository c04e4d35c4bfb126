use crate::error::{ProcessingError, Result};
use crate::models::{ArchiveLimits, FileType};
use std::io::{Cursor, Read};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

pub const WORD_BODY_PART: &str = "word/document.xml";
const SLIDE_PREFIX: &str = "ppt/slides/slide";
const SLIDE_SUFFIX: &str = ".xml";

/// A decompressed archive member, detached from the archive it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePart {
    pub name: String,
    /// Numeric index embedded in the part name; zero for single-part formats.
    pub index: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentParts<'a> {
    PlainText(&'a [u8]),
    WordDocument(ArchivePart),
    /// Slides in ascending numeric order.
    SlideDeck(Vec<ArchivePart>),
}

pub fn unpack<'a>(
    bytes: &'a [u8],
    file_type: FileType,
    limits: &ArchiveLimits,
) -> Result<DocumentParts<'a>> {
    match file_type {
        FileType::PlainText => Ok(DocumentParts::PlainText(bytes)),
        FileType::WordDocument => {
            let mut archive = open_archive(bytes, limits)?;
            let mut budget = limits.max_decompressed_bytes;
            let data = read_part(&mut archive, WORD_BODY_PART, &mut budget)?;
            debug!(bytes = data.len(), "read document body");

            Ok(DocumentParts::WordDocument(ArchivePart {
                name: WORD_BODY_PART.to_string(),
                index: 0,
                data,
            }))
        }
        FileType::SlideDeck => {
            let mut archive = open_archive(bytes, limits)?;
            let mut budget = limits.max_decompressed_bytes;

            let mut slide_names = archive
                .file_names()
                .filter_map(|name| slide_index(name).map(|index| (index, name.to_string())))
                .collect::<Vec<_>>();
            slide_names.sort();

            let mut slides = Vec::with_capacity(slide_names.len());
            for (index, name) in slide_names {
                let data = read_part(&mut archive, &name, &mut budget)?;
                slides.push(ArchivePart { name, index, data });
            }
            debug!(slides = slides.len(), "read slide parts");

            Ok(DocumentParts::SlideDeck(slides))
        }
        FileType::Unsupported => Err(ProcessingError::UnsupportedFileType {
            filename: "<unclassified>".to_string(),
        }),
    }
}

/// Parses `ppt/slides/slide<N>.xml` into `N`; layouts, masters and rels do not match.
pub fn slide_index(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(SLIDE_PREFIX)?.strip_suffix(SLIDE_SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn open_archive<'a>(
    bytes: &'a [u8],
    limits: &ArchiveLimits,
) -> Result<ZipArchive<Cursor<&'a [u8]>>> {
    let archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|error| ProcessingError::CorruptArchive(error.to_string()))?;

    if archive.len() > limits.max_entries {
        return Err(ProcessingError::ArchiveLimitExceeded(format!(
            "{} entries, limit is {}",
            archive.len(),
            limits.max_entries
        )));
    }

    Ok(archive)
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
    budget: &mut u64,
) -> Result<Vec<u8>> {
    let entry = archive.by_name(name).map_err(|error| match error {
        ZipError::FileNotFound => ProcessingError::MissingRequiredPart {
            part: name.to_string(),
        },
        other => ProcessingError::CorruptArchive(format!("{name}: {other}")),
    })?;

    let declared = entry.size();
    if declared > *budget {
        return Err(decompressed_limit(name));
    }

    read_within_budget(entry, name, budget)
}

/// Declared sizes can lie, so the budget is enforced on the bytes actually inflated.
fn read_within_budget(entry: impl Read, name: &str, budget: &mut u64) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    entry
        .take(budget.saturating_add(1))
        .read_to_end(&mut data)
        .map_err(|error| ProcessingError::CorruptArchive(format!("{name}: {error}")))?;

    let read = data.len() as u64;
    if read > *budget {
        return Err(decompressed_limit(name));
    }
    *budget -= read;
    Ok(data)
}

fn decompressed_limit(name: &str) -> ProcessingError {
    ProcessingError::ArchiveLimitExceeded(format!(
        "decompressed size budget exhausted while reading {name}"
    ))
}
