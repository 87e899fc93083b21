use axum::{
    routing::{any, get, post},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;
use service::records::RecordService;

use crate::errors::panic_response;

pub mod students;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: REST routes, the invocation-event
/// endpoint and health, all sharing one `RecordService`.
pub fn build_router(service: RecordService, cors: CorsLayer) -> Router {
    let records = Router::new()
        // every verb goes to the service, which answers 405 for the ones it does not know
        .route("/students", any(students::students))
        .route("/students/:student_id", any(students::student_by_path))
        .route("/invoke", post(students::invoke));

    Router::new()
        .route("/health", get(health))
        .merge(records)
        .with_state(service)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request, with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                ),
        )
}
