//! Pipeline error kinds. Each step raises the most specific kind it can detect.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of one pipeline step.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or malformed request fields.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Remote TTS non-success code, transport failure or unusable payload.
    #[error("synthesis failed: {message}")]
    Synthesis {
        message: String,
        /// Raw response body, kept for diagnostics.
        payload: Option<String>,
    },

    #[error("storage failed for {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transcoding failed: {0}")]
    Transcoding(String),

    #[error("alignment process failed: {0}")]
    AlignmentProcess(String),

    #[error("could not read alignment artifact {}: {message}", path.display())]
    ArtifactRead { path: PathBuf, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable tag for a [`PipelineError`], used in logs and HTTP error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Synthesis,
    Storage,
    Transcoding,
    AlignmentProcess,
    ArtifactRead,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Synthesis => "SynthesisError",
            ErrorKind::Storage => "StorageError",
            ErrorKind::Transcoding => "TranscodingError",
            ErrorKind::AlignmentProcess => "AlignmentProcessError",
            ErrorKind::ArtifactRead => "ArtifactReadError",
            ErrorKind::Internal => "InternalError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Validation(_) => ErrorKind::Validation,
            PipelineError::Synthesis { .. } => ErrorKind::Synthesis,
            PipelineError::Storage { .. } => ErrorKind::Storage,
            PipelineError::Transcoding(_) => ErrorKind::Transcoding,
            PipelineError::AlignmentProcess(_) => ErrorKind::AlignmentProcess,
            PipelineError::ArtifactRead { .. } => ErrorKind::ArtifactRead,
            PipelineError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True for errors caused by the caller rather than by a pipeline step.
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub(crate) fn synthesis(message: impl Into<String>, payload: Option<String>) -> Self {
        PipelineError::Synthesis {
            message: message.into(),
            payload,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
