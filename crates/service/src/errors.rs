use thiserror::Error;

use crate::records::envelope::RecordResponse;

/// Failure reported by a record store adapter. The `Display` text is what
/// clients see after the `Database error: ` prefix.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Backend(String),
    #[error("record has no string student_id key")]
    MissingKey,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Every way a record request can fail; each variant maps to exactly one
/// status code.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{0}")]
    Validation(String),
    #[error("Student not found")]
    NotFound,
    #[error("Student with this ID already exists")]
    Conflict,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Database error: {0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Unexpected(String),
}

impl RecordError {
    pub fn invalid_json() -> Self { Self::Validation("Invalid JSON in request body".into()) }

    pub fn missing_field(field: &str) -> Self {
        Self::Validation(format!("Missing required field: {field}"))
    }

    pub fn missing_id_param() -> Self { Self::Validation("student_id parameter is required".into()) }

    pub fn missing_id_for_update() -> Self {
        Self::Validation("student_id is required for update".into())
    }

    pub fn invalid_id() -> Self {
        Self::Validation("student_id must be a non-empty string".into())
    }

    pub fn id_mismatch() -> Self {
        Self::Validation("student_id in body does not match path".into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::Conflict => 409,
            Self::Store(_) | Self::Unexpected(_) => 500,
        }
    }

    pub fn into_response(self) -> RecordResponse {
        RecordResponse::error(self.status_code(), &self.to_string())
    }
}
