// src/error.rs
//! Error kinds surfaced by the store and the wizard

use thiserror::Error;

use crate::types::resume::Section;

/// Input rejected before (or by) the collaborator. Shown next to the offending
/// control; never clears existing state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("File is {size} bytes; the limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Unsupported file type '{extension}'. Allowed: pdf, doc, docx, html, txt")]
    UnsupportedFileType { extension: String },

    #[error("The selected file is empty")]
    EmptyFile,

    #[error("Enter a job description first")]
    EmptyJobDescription,

    #[error("Level must be a number between 1 and 4, got '{value}'")]
    InvalidLevel { value: String },

    #[error("No {section} entry at position {index} (there are {len})")]
    IndexOutOfRange {
        section: Section,
        index: usize,
        len: usize,
    },

    #[error("'{section}' is not a list section")]
    NotAList { section: Section },

    #[error("Unknown field '{name}' on the {step} step")]
    UnknownField { step: String, name: String },

    #[error("{0}")]
    Rejected(String),
}

/// Transport-level failure talking to the collaborator. Shown as a banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Resume service unreachable: {0}")]
    Unreachable(String),

    #[error("Resume service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response from resume service: {0}")]
    InvalidResponse(String),
}

/// Raw outcome of a collaborator call, before it is classified for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },

    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("A newer request replaced this one")]
    Superseded,
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Transport(msg) => NetworkError::Unreachable(msg).into(),
            BackendError::Rejected { detail, .. } => ValidationError::Rejected(detail).into(),
            BackendError::Status { status, body } => NetworkError::Status { status, body }.into(),
            BackendError::Decode(msg) => NetworkError::InvalidResponse(msg).into(),
        }
    }
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, StoreError::Network(_))
    }

    /// Text for the inline message or the dismissible banner.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Validation(err) => err.to_string(),
            StoreError::Network(_) => {
                "Could not reach the resume service. Check your connection and try again."
                    .to_string()
            }
            StoreError::Superseded => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_classify_for_ui() {
        let rejected: StoreError = BackendError::Rejected {
            status: 400,
            detail: "Only PDF files are supported".to_string(),
        }
        .into();
        assert!(rejected.is_validation());
        assert_eq!(rejected.user_message(), "Only PDF files are supported");

        let down: StoreError = BackendError::Transport("connection refused".to_string()).into();
        assert!(down.is_network());
        assert!(down.user_message().contains("try again"));

        let opaque: StoreError = BackendError::Status {
            status: 502,
            body: "<html>".to_string(),
        }
        .into();
        assert!(opaque.is_network());
    }
}
