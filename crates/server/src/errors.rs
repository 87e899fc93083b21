use std::any::Any;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use service::errors::StoreError;
use service::records::RecordResponse;

/// Wraps a service response so axum can send it unchanged: the status code
/// as-is and the JSON body text with a JSON content type.
#[derive(Debug)]
pub struct EnvelopeResponse(pub RecordResponse);

impl IntoResponse for EnvelopeResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.0.body).into_response()
    }
}

/// Turn a handler panic into the same `{"error": ...}` 500 body the service
/// uses for unexpected failures.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let msg = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "request handler panicked".to_string()
    };
    error!(error = %msg, "handler panicked");
    EnvelopeResponse(RecordResponse::error(500, &msg)).into_response()
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("record store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
