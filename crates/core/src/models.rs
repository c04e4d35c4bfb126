use crate::error::{ProcessingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FileType {
    PlainText,
    WordDocument,
    SlideDeck,
    Unsupported,
}

impl FileType {
    /// Canonical extension, without the dot.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::PlainText => Some("txt"),
            Self::WordDocument => Some("docx"),
            Self::SlideDeck => Some("pptx"),
            Self::Unsupported => None,
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Self::WordDocument | Self::SlideDeck)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::PlainText => "plain text",
            Self::WordDocument => "word document",
            Self::SlideDeck => "slide deck",
            Self::Unsupported => "unsupported",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SourceDocument<'a> {
    pub bytes: &'a [u8],
    pub filename: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Paragraph,
    SlideBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextSegment {
    pub text: String,
    pub kind: SegmentKind,
    /// Position in the source: paragraph index, or slide position in numeric order.
    pub ordinal: usize,
}

/// A recoverable problem met during extraction; the affected content was skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionWarning {
    pub kind: SegmentKind,
    pub ordinal: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractedText {
    pub file_type: FileType,
    pub segments: Vec<TextSegment>,
    pub warnings: Vec<ExtractionWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedText {
    pub full_text: String,
    /// Byte offsets of segment starts in `full_text`, non-decreasing.
    pub segment_boundaries: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub chunk_id: String,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub file_type: FileType,
    /// SHA-256 of the uploaded bytes, hex encoded.
    pub content_hash: String,
    pub full_text: String,
    pub chunks: Vec<Chunk>,
    pub warnings: Vec<ExtractionWarning>,
}

/// Caps applied while reading container formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArchiveLimits {
    pub max_entries: usize,
    pub max_decompressed_bytes: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_entries: 4_096,
            max_decompressed_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Uploads larger than this fail with `FileTooLarge` before any parsing.
    pub max_file_size_bytes: u64,
    /// Upper bound on the characters held by a single chunk.
    pub max_chunk_chars: usize,
    /// Characters repeated from the tail of one chunk at the head of the next.
    pub overlap_chars: usize,
    pub archive: ArchiveLimits,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 10 * 1024 * 1024,
            max_chunk_chars: 1_200,
            overlap_chars: 120,
            archive: ArchiveLimits::default(),
        }
    }
}

impl ProcessingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size_bytes == 0 {
            return Err(ProcessingError::InvalidConfig(
                "max_file_size_bytes must be positive".to_string(),
            ));
        }
        if self.max_chunk_chars == 0 {
            return Err(ProcessingError::InvalidConfig(
                "max_chunk_chars must be positive".to_string(),
            ));
        }
        if self.overlap_chars == 0 {
            return Err(ProcessingError::InvalidConfig(
                "overlap_chars must be positive".to_string(),
            ));
        }
        if self.overlap_chars >= self.max_chunk_chars {
            return Err(ProcessingError::InvalidConfig(format!(
                "overlap_chars ({}) must be smaller than max_chunk_chars ({})",
                self.overlap_chars, self.max_chunk_chars
            )));
        }
        if self.archive.max_entries == 0 || self.archive.max_decompressed_bytes == 0 {
            return Err(ProcessingError::InvalidConfig(
                "archive limits must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Reads `PREPDOC_*` variables from the process environment over the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = read_setting(&lookup, "PREPDOC_MAX_FILE_SIZE_BYTES")? {
            config.max_file_size_bytes = value;
        }
        if let Some(value) = read_setting(&lookup, "PREPDOC_MAX_CHUNK_CHARS")? {
            config.max_chunk_chars = value;
        }
        if let Some(value) = read_setting(&lookup, "PREPDOC_OVERLAP_CHARS")? {
            config.overlap_chars = value;
        }
        if let Some(value) = read_setting(&lookup, "PREPDOC_ARCHIVE_MAX_ENTRIES")? {
            config.archive.max_entries = value;
        }
        if let Some(value) = read_setting(&lookup, "PREPDOC_ARCHIVE_MAX_DECOMPRESSED_BYTES")? {
            config.archive.max_decompressed_bytes = value;
        }

        config.validate()?;
        Ok(config)
    }
}

fn read_setting<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse::<T>()
        .map(Some)
        .map_err(|_| ProcessingError::InvalidConfig(format!("{key} is not a number: {raw}")))
}
