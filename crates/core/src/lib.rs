pub mod archive;
pub mod chunking;
pub mod detect;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod models;
pub mod normalize;

#[cfg(test)]
pub(crate) mod test_support;

pub use archive::{unpack, ArchivePart, DocumentParts};
pub use chunking::chunk;
pub use detect::classify;
pub use error::{ErrorClass, ProcessingError, Result};
pub use extractor::extract;
pub use ingest::{digest_bytes, process, process_source};
pub use models::{
    ArchiveLimits, Chunk, ExtractedText, ExtractionWarning, FileType, NormalizedText,
    ProcessedDocument, ProcessingConfig, SegmentKind, SourceDocument, TextSegment,
};
pub use normalize::normalize;
