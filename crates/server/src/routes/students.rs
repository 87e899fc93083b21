use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::Method,
    Json,
};
use serde_json::Value;
use tracing::warn;

use service::errors::RecordError;
use service::records::{InvocationEvent, InvocationResponse, RecordRequest, RecordService};

use crate::errors::EnvelopeResponse;

fn carries_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT
}

/// Body text for the service. Bytes that are not UTF-8 are invalid JSON
/// when the method reads a body and ignored otherwise.
fn body_text(method: &Method, body: Bytes) -> Result<Option<String>, RecordError> {
    if body.is_empty() {
        return Ok(None);
    }
    match String::from_utf8(body.to_vec()) {
        Ok(text) => Ok(Some(text)),
        Err(_) if carries_body(method) => Err(RecordError::invalid_json()),
        Err(_) => Ok(None),
    }
}

/// `/students`: method, query string and body are handed to the service as-is.
pub async fn students(
    State(service): State<RecordService>,
    method: Method,
    query: Option<Query<HashMap<String, String>>>,
    body: Bytes,
) -> EnvelopeResponse {
    let body = match body_text(&method, body) {
        Ok(body) => body,
        Err(err) => return EnvelopeResponse(err.into_response()),
    };
    let request = RecordRequest {
        method: method.as_str().to_string(),
        query: query.map(|Query(q)| q).filter(|q| !q.is_empty()),
        body,
    };
    EnvelopeResponse(service.handle(request).await)
}

/// `/students/:student_id`: path-style alias; the id in the path becomes the
/// `student_id` query parameter. On POST/PUT a body naming a different
/// `student_id` is rejected.
pub async fn student_by_path(
    State(service): State<RecordService>,
    method: Method,
    Path(student_id): Path<String>,
    body: Bytes,
) -> EnvelopeResponse {
    let body = match body_text(&method, body) {
        Ok(body) => body,
        Err(err) => return EnvelopeResponse(err.into_response()),
    };
    if carries_body(&method) && names_other_id(body.as_deref(), &student_id) {
        return EnvelopeResponse(RecordError::id_mismatch().into_response());
    }
    let mut request = RecordRequest::new(method.as_str()).with_query("student_id", student_id);
    request.body = body;
    EnvelopeResponse(service.handle(request).await)
}

// Only a well-formed body with a string id can mismatch; anything else is
// left to the service's own validation.
fn names_other_id(body: Option<&str>, path_id: &str) -> bool {
    let Some(Ok(Value::Object(record))) = body.map(serde_json::from_str::<Value>) else {
        return false;
    };
    matches!(record.get("student_id"), Some(Value::String(id)) if id != path_id)
}

/// `/invoke`: accepts a proxy-style invocation event and answers with the
/// `{statusCode, body}` envelope. The HTTP status itself is always 200; the
/// outcome lives in `statusCode`.
pub async fn invoke(State(service): State<RecordService>, body: Bytes) -> Json<InvocationResponse> {
    match serde_json::from_slice::<InvocationEvent>(&body) {
        Ok(event) => Json(service.handle_event(event).await),
        Err(e) => {
            warn!(error = %e, "undecodable invocation event");
            Json(RecordError::Unexpected(e.to_string()).into_response().into())
        }
    }
}
