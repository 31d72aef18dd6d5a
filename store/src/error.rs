use std::path::PathBuf;

use serde::Serialize;

use crate::store::StoreMode;

/// Stable machine-readable codes for store failures, mirrored by every
/// consumer surface (CLI output, event payloads, the operation log).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ReadOnly,
    OutOfBounds,
    ValidationFailed,
    IoError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ReadOnly => "READ_ONLY",
            ErrorCode::OutOfBounds => "OUT_OF_BOUNDS",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::IoError => "IO_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an operation was pointed when it failed: the caller-supplied
/// relative path, the absolute path it resolved to, and the store mode at
/// the time of the call.
#[derive(Debug, Clone, Serialize)]
pub struct OpContext {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub mode: StoreMode,
}

impl std::fmt::Display for OpContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, mode {})",
            self.relative_path,
            self.absolute_path.display(),
            self.mode
        )
    }
}

/// Failure taxonomy shared by every store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A mutating call arrived while the store was gated read-only.
    #[error("store is read-only, refusing to touch {context}")]
    ReadOnly { context: OpContext },

    /// The requested path escapes the sandbox root.
    #[error("path escapes the store root: {context}")]
    OutOfBounds { context: OpContext },

    /// The pre-write validation hook rejected the payload.
    #[error("schema validation failed for {context}: {}", .violations.join("; "))]
    ValidationFailed {
        context: OpContext,
        violations: Vec<String>,
    },

    /// The underlying filesystem operation failed.
    #[error("failed to {action} {context}: {source}")]
    Io {
        action: &'static str,
        context: OpContext,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document failed to parse or serialize; the serde message is
    /// surfaced unchanged.
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}

impl StoreError {
    /// The machine-readable code, when the failure is one of the store's own.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            StoreError::ReadOnly { .. } => Some(ErrorCode::ReadOnly),
            StoreError::OutOfBounds { .. } => Some(ErrorCode::OutOfBounds),
            StoreError::ValidationFailed { .. } => Some(ErrorCode::ValidationFailed),
            StoreError::Io { .. } => Some(ErrorCode::IoError),
            StoreError::Parse(_) => None,
        }
    }

    pub fn context(&self) -> Option<&OpContext> {
        match self {
            StoreError::ReadOnly { context }
            | StoreError::OutOfBounds { context }
            | StoreError::ValidationFailed { context, .. }
            | StoreError::Io { context, .. } => Some(context),
            StoreError::Parse(_) => None,
        }
    }
}
