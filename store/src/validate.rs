use serde_json::Value;

/// Payload handed to the pre-write validation hook.
#[derive(Debug, Clone, Copy)]
pub enum WritePayload<'a> {
    /// Raw text writes and appends.
    Text(&'a str),
    /// JSON writes and NDJSON appends. The hook sees the parsed value, never
    /// the serialized string, so violations point into the document.
    Json(&'a Value),
}

/// A single pre-write validation request.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRequest<'a> {
    /// Store-relative ref of the schema document, e.g. `schemas/task.json`.
    pub schema: &'a str,
    /// Store-relative path of the artifact being written.
    pub path: &'a str,
    pub payload: WritePayload<'a>,
}

/// Rejection returned by a [`WriteValidator`]. The store wraps it into
/// [`StoreError::ValidationFailed`](crate::StoreError::ValidationFailed)
/// together with the operation context.
#[derive(Debug, thiserror::Error)]
#[error("{}", .violations.join("; "))]
pub struct ValidationRejection {
    pub violations: Vec<String>,
}

impl ValidationRejection {
    pub fn new(violations: Vec<String>) -> Self {
        Self { violations }
    }
}

/// Capability interface for the store's validation-before-write hook.
///
/// The store calls this after resolving the path and checking the mode gate,
/// and before any byte lands on disk. Implementations must not mutate the
/// tree they guard.
pub trait WriteValidator: Send + Sync {
    fn validate(&self, request: &ValidationRequest<'_>) -> Result<(), ValidationRejection>;
}
