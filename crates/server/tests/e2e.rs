use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use configs::{AppConfig, StoreBackend};
use server::startup;
use service::records::RecordService;
use service::storage::{FileRecordStore, MemoryRecordStore};

struct TestApp {
    base_url: String,
}

async fn serve(app: Router) -> anyhow::Result<TestApp> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

async fn start_server() -> anyhow::Result<TestApp> {
    let service = RecordService::new(Arc::new(MemoryRecordStore::new("StudentRecords")));
    serve(startup::build_app(service)).await
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_student_lifecycle() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let url = format!("{}/students", app.base_url);

    // Create
    let res = c.post(&url)
        .body(r#"{"student_id":"S1","name":"Ann","course":"CS101"}"#)
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    assert_eq!(
        res.json::<Value>().await?,
        json!({"message": "Student record created successfully", "student_id": "S1"})
    );

    // Duplicate create
    let res = c.post(&url)
        .body(r#"{"student_id":"S1","name":"Ann","course":"CS101"}"#)
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);

    // Read
    let res = c.get(format!("{}?student_id=S1", url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    assert_eq!(res.json::<Value>().await?, json!({"student_id": "S1", "name": "Ann", "course": "CS101"}));

    // Update replaces
    let res = c.put(&url)
        .body(r#"{"student_id":"S1","name":"Ann","course":"CS201"}"#)
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let res = c.get(format!("{}/S1", url)).send().await?;
    assert_eq!(res.json::<Value>().await?["course"], "CS201");

    // Delete, then read is 404
    let res = c.delete(format!("{}?student_id=S1", url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let res = c.get(format!("{}?student_id=S1", url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({"error": "Student not found"}));
    Ok(())
}

#[tokio::test]
async fn e2e_bad_requests() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let url = format!("{}/students", app.base_url);

    let res = c.post(&url).body(r#"{"student_id":"S1","name":"Ann"}"#).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, json!({"error": "Missing required field: course"}));

    let res = c.post(&url).body("{oops").send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, json!({"error": "Invalid JSON in request body"}));

    let res = c.get(&url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, json!({"error": "student_id parameter is required"}));

    let res = c.patch(&url).body("{}").send().await?;
    assert_eq!(res.status(), HttpStatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.json::<Value>().await?, json!({"error": "Method not allowed"}));
    Ok(())
}

#[tokio::test]
async fn e2e_invoke_envelope() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let url = format!("{}/invoke", app.base_url);

    let res = c.post(&url)
        .json(&json!({
            "httpMethod": "POST",
            "queryStringParameters": null,
            "body": "{\"student_id\":\"S7\",\"name\":\"Lee\",\"course\":\"BI110\"}"
        }))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let envelope = res.json::<Value>().await?;
    assert_eq!(envelope["statusCode"], 201);

    let res = c.post(&url)
        .json(&json!({"httpMethod": "GET", "queryStringParameters": {"student_id": "S7"}}))
        .send().await?;
    let envelope = res.json::<Value>().await?;
    assert_eq!(envelope["statusCode"], 200);
    let record: Value = serde_json::from_str(envelope["body"].as_str().unwrap_or_default())?;
    assert_eq!(record["name"], "Lee");

    let res = c.post(&url).json(&json!({"httpMethod": "OPTIONS"})).send().await?;
    assert_eq!(res.json::<Value>().await?["statusCode"], 405);

    // not an event at all
    let res = c.post(&url).body("[]").send().await?;
    assert_eq!(res.json::<Value>().await?["statusCode"], 500);
    Ok(())
}

#[tokio::test]
async fn e2e_file_backend_keeps_records_across_restart() -> anyhow::Result<()> {
    let path = std::env::temp_dir()
        .join(format!("server_e2e_{}", Uuid::new_v4()))
        .join("students.json");
    let mut cfg = AppConfig::default();
    cfg.store.backend = StoreBackend::File;
    cfg.store.path = path.to_string_lossy().into_owned();

    let first = serve(startup::build_app(startup::build_service(&cfg).await?)).await?;
    let res = client().post(format!("{}/students", first.base_url))
        .body(r#"{"student_id":"F1","name":"Fay","course":"CS101"}"#)
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    // a second server over the same file sees the record
    let store = FileRecordStore::open("StudentRecords", &path).await?;
    let second = serve(startup::build_app(RecordService::new(Arc::new(store)))).await?;
    let res = client().get(format!("{}/students/F1", second.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["name"], "Fay");

    if let Some(dir) = path.parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
    Ok(())
}
