use crate::document::DocumentFormat;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not read this {format} file: {reason}")]
    UnreadableDocument {
        format: DocumentFormat,
        reason: String,
    },

    #[error("text file is not valid UTF-8 (invalid byte at offset {valid_up_to})")]
    Encoding { valid_up_to: usize },

    #[error("question answering failed: {0}")]
    Inference(String),

    #[error("failed to load QA model: {0}")]
    ModelLoad(String),

    #[error("upload is {size} bytes, over the {limit} byte limit")]
    UploadTooLarge { size: u64, limit: u64 },

    #[error("'{name}' does not look like a {declared} file")]
    FormatMismatch {
        declared: DocumentFormat,
        name: String,
    },

    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`Error`], stable for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnreadableDocument,
    Encoding,
    Inference,
    ModelLoad,
    RejectedUpload,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnreadableDocument { .. } => ErrorKind::UnreadableDocument,
            Error::Encoding { .. } => ErrorKind::Encoding,
            Error::Inference(_) => ErrorKind::Inference,
            Error::ModelLoad(_) => ErrorKind::ModelLoad,
            Error::UploadTooLarge { .. }
            | Error::FormatMismatch { .. }
            | Error::UnsupportedFormat(_) => ErrorKind::RejectedUpload,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn unreadable(format: DocumentFormat, reason: impl std::fmt::Display) -> Self {
        Error::UnreadableDocument {
            format,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn inference(reason: impl std::fmt::Display) -> Self {
        Error::Inference(reason.to_string())
    }

    pub(crate) fn model_load(reason: impl std::fmt::Display) -> Self {
        Error::ModelLoad(reason.to_string())
    }
}
