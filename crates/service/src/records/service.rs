use std::{sync::Arc, time::Instant};

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use common::metrics;

use crate::errors::RecordError;
use crate::records::envelope::{InvocationEvent, InvocationResponse, Method, RecordRequest, RecordResponse};
use crate::records::store::{Record, RecordStore, STUDENT_ID};

const REQUIRED_FIELDS: [&str; 3] = [STUDENT_ID, "name", "course"];

/// Stateless request handler for student records.
///
/// Holds nothing but the shared store handle; clone it freely, one clone per
/// front end or per request.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self { Self { store } }

    /// Dispatch one request and always produce a response.
    ///
    /// The operation runs on its own task; a panic there becomes a 500.
    pub async fn handle(&self, request: RecordRequest) -> RecordResponse {
        let started = Instant::now();
        let method = request.method.clone();

        let svc = self.clone();
        let outcome = match tokio::spawn(async move { svc.dispatch(request).await }).await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(RecordError::Unexpected(panic_message(join_err))),
        };

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    RecordError::Store(e) => warn!(%method, error = %e, "store failure"),
                    RecordError::Unexpected(msg) => error!(%method, error = %msg, "unexpected failure"),
                    other => debug!(%method, reason = %other, "request rejected"),
                }
                err.into_response()
            }
        };

        metrics::observe_request(&method, response.status_code, started.elapsed().as_secs_f64());
        response
    }

    /// Handle a proxy-style invocation event end to end.
    pub async fn handle_event(&self, event: InvocationEvent) -> InvocationResponse {
        match RecordRequest::try_from(event) {
            Ok(request) => self.handle(request).await.into(),
            Err(err) => {
                error!(error = %err, "malformed invocation event");
                err.into_response().into()
            }
        }
    }

    async fn dispatch(&self, request: RecordRequest) -> Result<RecordResponse, RecordError> {
        match Method::from_tag(&request.method) {
            Some(Method::Create) => self.create(request.body.as_deref()).await,
            Some(Method::Read) => self.read(request.query_param(STUDENT_ID)).await,
            Some(Method::Update) => self.update(request.body.as_deref()).await,
            Some(Method::Delete) => self.delete(request.query_param(STUDENT_ID)).await,
            None => Err(RecordError::MethodNotAllowed),
        }
    }

    #[instrument(skip_all)]
    pub async fn create(&self, body: Option<&str>) -> Result<RecordResponse, RecordError> {
        let record = parse_record(body)?;
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !record.contains_key(**f)) {
            return Err(RecordError::missing_field(missing));
        }
        let student_id = student_id_of(&record)?;

        if !self.store.insert_if_absent(record).await? {
            info!(%student_id, "create rejected: id taken");
            return Err(RecordError::Conflict);
        }
        info!(%student_id, "student record created");
        Ok(RecordResponse::message(201, "Student record created successfully", &student_id))
    }

    #[instrument(skip(self))]
    pub async fn read(&self, student_id: Option<&str>) -> Result<RecordResponse, RecordError> {
        let student_id = student_id.ok_or_else(RecordError::missing_id_param)?;
        let record = self.store.get(student_id).await?.ok_or(RecordError::NotFound)?;
        let body = serde_json::to_string(&record).map_err(|e| RecordError::Unexpected(e.to_string()))?;
        Ok(RecordResponse { status_code: 200, body })
    }

    #[instrument(skip_all)]
    pub async fn update(&self, body: Option<&str>) -> Result<RecordResponse, RecordError> {
        let record = parse_record(body)?;
        if !record.contains_key(STUDENT_ID) {
            return Err(RecordError::missing_id_for_update());
        }
        let student_id = student_id_of(&record)?;

        if !self.store.replace_if_present(record).await? {
            return Err(RecordError::NotFound);
        }
        info!(%student_id, "student record replaced");
        Ok(RecordResponse::message(200, "Student record updated successfully", &student_id))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, student_id: Option<&str>) -> Result<RecordResponse, RecordError> {
        let student_id = student_id.ok_or_else(RecordError::missing_id_param)?;
        if !self.store.remove_if_present(student_id).await? {
            return Err(RecordError::NotFound);
        }
        info!(%student_id, "student record deleted");
        Ok(RecordResponse::message(200, "Student record deleted successfully", student_id))
    }
}

/// Parse a request body into a record. A missing or unparseable body is
/// invalid JSON; well-formed JSON that is not an object has no fields, so the
/// field-presence checks report it.
fn parse_record(body: Option<&str>) -> Result<Record, RecordError> {
    match body.map(serde_json::from_str::<Value>) {
        Some(Ok(Value::Object(record))) => Ok(record),
        Some(Ok(_)) => Ok(Record::new()),
        Some(Err(_)) | None => Err(RecordError::invalid_json()),
    }
}

fn student_id_of(record: &Record) -> Result<String, RecordError> {
    match record.get(STUDENT_ID) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        _ => Err(RecordError::invalid_id()),
    }
}

fn panic_message(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "request handler panicked".to_string()
    }
}
