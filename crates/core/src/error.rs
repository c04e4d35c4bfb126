use thiserror::Error;

/// How a host application should present a failure to its own clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The upload or the configuration can be corrected by the caller.
    Validation,
    /// The file claims a container format but its contents are broken.
    DocumentCorruption,
    Internal,
}

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("unsupported file type: {filename}")]
    UnsupportedFileType { filename: String },

    #[error("file is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("archive is missing required part {part}")]
    MissingRequiredPart { part: String },

    #[error("archive limit exceeded: {0}")]
    ArchiveLimitExceeded(String),

    #[error("document has no extractable text")]
    EmptyDocument,

    #[error("invalid processing config: {0}")]
    InvalidConfig(String),

    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl ProcessingError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedFileType { .. }
            | Self::FileTooLarge { .. }
            | Self::EmptyDocument
            | Self::InvalidConfig(_) => ErrorClass::Validation,
            Self::CorruptArchive(_)
            | Self::MissingRequiredPart { .. }
            | Self::ArchiveLimitExceeded(_) => ErrorClass::DocumentCorruption,
            Self::Pattern(_) => ErrorClass::Internal,
        }
    }
}

pub type Result<T, E = ProcessingError> = std::result::Result<T, E>;
