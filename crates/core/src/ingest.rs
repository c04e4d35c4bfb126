use crate::archive::unpack;
use crate::chunking::chunk;
use crate::detect::classify;
use crate::error::{ProcessingError, Result};
use crate::extractor::extract;
use crate::models::{FileType, ProcessedDocument, ProcessingConfig, SourceDocument};
use crate::normalize::normalize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Runs the whole pipeline over an in-memory upload.
///
/// The filename decides the format. Unsupported names are rejected before the
/// bytes are looked at, and oversized or empty buffers before any parsing.
pub fn process(
    bytes: &[u8],
    filename: &str,
    config: &ProcessingConfig,
) -> Result<ProcessedDocument> {
    config.validate()?;

    let file_type = classify(filename);
    if file_type == FileType::Unsupported {
        return Err(ProcessingError::UnsupportedFileType {
            filename: filename.to_string(),
        });
    }

    let size = bytes.len() as u64;
    if size > config.max_file_size_bytes {
        return Err(ProcessingError::FileTooLarge {
            size,
            limit: config.max_file_size_bytes,
        });
    }
    if bytes.is_empty() {
        return Err(ProcessingError::EmptyDocument);
    }

    let parts = unpack(bytes, file_type, &config.archive)?;
    let extracted = extract(parts)?;
    let normalized = normalize(&extracted)?;
    let chunks = chunk(&normalized, config)?;

    debug!(
        filename,
        %file_type,
        chars = normalized.full_text.len(),
        chunks = chunks.len(),
        "processed document"
    );

    Ok(ProcessedDocument {
        file_type,
        content_hash: digest_bytes(bytes),
        full_text: normalized.full_text,
        chunks,
        warnings: extracted.warnings,
    })
}

pub fn process_source(
    source: &SourceDocument<'_>,
    config: &ProcessingConfig,
) -> Result<ProcessedDocument> {
    process(source.bytes, source.filename, config)
}

pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
