//! Request/response envelopes.
//!
//! `RecordRequest`/`RecordResponse` are the neutral shapes the service
//! speaks. `InvocationEvent`/`InvocationResponse` mirror the serverless
//! proxy-event JSON so such events can be fed straight in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::RecordError;

/// The four record operations, selected by method tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Create,
    Read,
    Update,
    Delete,
}

impl Method {
    /// Exact, case-sensitive match on the HTTP verb.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "POST" => Some(Self::Create),
            "GET" => Some(Self::Read),
            "PUT" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Create => "POST",
            Self::Read => "GET",
            Self::Update => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordRequest {
    pub method: String,
    pub query: Option<HashMap<String, String>>,
    pub body: Option<String>,
}

impl RecordRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self { method: method.into(), ..Default::default() }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.get_or_insert_with(HashMap::new).insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// A query parameter, treating an empty value the same as an absent one.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .as_ref()
            .and_then(|q| q.get(name))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordResponse {
    pub status_code: u16,
    /// JSON text.
    pub body: String,
}

impl RecordResponse {
    pub fn json(status_code: u16, body: &Value) -> Self {
        Self { status_code, body: body.to_string() }
    }

    pub fn error(status_code: u16, message: &str) -> Self {
        Self::json(status_code, &serde_json::json!({ "error": message }))
    }

    pub fn message(status_code: u16, message: &str, student_id: &str) -> Self {
        Self::json(status_code, &serde_json::json!({ "message": message, "student_id": student_id }))
    }

    pub fn body_json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// Proxy-style invocation event. Only the fields the service consumes are
/// modelled; everything else in the event is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl TryFrom<InvocationEvent> for RecordRequest {
    type Error = RecordError;

    fn try_from(event: InvocationEvent) -> Result<Self, Self::Error> {
        let method = event
            .http_method
            .ok_or_else(|| RecordError::Unexpected("missing field: httpMethod".into()))?;
        Ok(Self { method, query: event.query_string_parameters, body: event.body })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

impl From<RecordResponse> for InvocationResponse {
    fn from(r: RecordResponse) -> Self {
        Self { status_code: r.status_code, body: r.body }
    }
}
