use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::startup;
use service::records::RecordService;
use service::storage::MemoryRecordStore;

fn build_app() -> Router {
    let service = RecordService::new(Arc::new(MemoryRecordStore::new("StudentRecords")));
    startup::build_app(service)
}

async fn call(app: &Router, method: &str, uri: &str, body: &str) -> anyhow::Result<(StatusCode, Value)> {
    call_raw(app, method, uri, body.as_bytes().to_vec()).await
}

async fn call_raw(app: &Router, method: &str, uri: &str, body: Vec<u8>) -> anyhow::Result<(StatusCode, Value)> {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body))?;
    let res = app.clone().oneshot(req).await?;
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

#[tokio::test]
async fn path_alias_reads_and_deletes() -> anyhow::Result<()> {
    let app = build_app();

    let (status, _) = call(&app, "POST", "/students", r#"{"student_id":"S1","name":"Ann","course":"CS101","email":"ann@example.com"}"#).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, "GET", "/students/S1", "").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ann@example.com");

    let (status, body) = call(&app, "DELETE", "/students/S1", "").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Student record deleted successfully", "student_id": "S1"}));

    let (status, _) = call(&app, "DELETE", "/students/S1", "").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn empty_query_value_is_rejected() -> anyhow::Result<()> {
    let app = build_app();
    let (status, body) = call(&app, "GET", "/students?student_id=", "").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "student_id parameter is required"}));

    let (status, _) = call(&app, "DELETE", "/students?other=1", "").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_verbs_get_json_405() -> anyhow::Result<()> {
    let app = build_app();
    for (method, uri) in [("PATCH", "/students"), ("PATCH", "/students/S1"), ("HEAD", "/students")] {
        let (status, _) = call(&app, method, uri, "").await?;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
    }
    let (_, body) = call(&app, "PATCH", "/students", r#"{"student_id":"S1"}"#).await?;
    assert_eq!(body, json!({"error": "Method not allowed"}));
    Ok(())
}

#[tokio::test]
async fn update_of_missing_record_is_404() -> anyhow::Result<()> {
    let app = build_app();
    let (status, body) = call(&app, "PUT", "/students", r#"{"student_id":"nobody","name":"X"}"#).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Student not found"}));
    Ok(())
}

#[tokio::test]
async fn invoke_reports_missing_method_as_500() -> anyhow::Result<()> {
    let app = build_app();
    let (status, body) = call(&app, "POST", "/invoke", r#"{"body":"{}"}"#).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statusCode"], 500);
    let inner: Value = serde_json::from_str(body["body"].as_str().unwrap_or_default())?;
    assert_eq!(inner, json!({"error": "missing field: httpMethod"}));
    Ok(())
}

#[tokio::test]
async fn non_utf8_body_gets_json_400() -> anyhow::Result<()> {
    let app = build_app();
    for (method, uri) in [("POST", "/students"), ("PUT", "/students"), ("POST", "/students/S1"), ("PUT", "/students/S1")] {
        let (status, body) = call_raw(&app, method, uri, vec![0xff, 0xfe, 0x7b]).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(body, json!({"error": "Invalid JSON in request body"}));
    }

    // a garbage body on a read is ignored
    let (status, body) = call_raw(&app, "GET", "/students/S1", vec![0xff, 0xfe]).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Student not found"}));

    let (status, body) = call_raw(&app, "POST", "/invoke", vec![0xff, 0xfe, 0x7b]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statusCode"], 500);
    Ok(())
}

#[tokio::test]
async fn path_alias_rejects_mismatched_body_id() -> anyhow::Result<()> {
    let app = build_app();
    let (status, _) = call(&app, "POST", "/students/S1", r#"{"student_id":"S1","name":"Ann","course":"CS101"}"#).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, "PUT", "/students/S2", r#"{"student_id":"S1","name":"Eve"}"#).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "student_id in body does not match path"}));

    let (status, _) = call(&app, "POST", "/students/S2", r#"{"student_id":"S1","name":"Eve","course":"X"}"#).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // S1 is untouched
    let (_, body) = call(&app, "GET", "/students/S1", "").await?;
    assert_eq!(body["name"], "Ann");

    let (status, _) = call(&app, "PUT", "/students/S1", r#"{"student_id":"S1","name":"Ann B"}"#).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
