use std::{future::Future, net::SocketAddr};

use axum::Router;
use configs::{AppConfig, StoreBackend};
use tower_http::cors::CorsLayer;
use tracing::info;

use common::{admin_http, env, metrics};
use service::{records::RecordService, storage};

use crate::errors::StartupError;
use crate::routes;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the configured store and wrap it in the service. The store handle is
/// created once here and shared by every request afterwards.
pub async fn build_service(cfg: &AppConfig) -> Result<RecordService, StartupError> {
    if cfg.store.backend == StoreBackend::File {
        env::ensure_data_dir(&cfg.store.path).await?;
    }
    let store = storage::open_store(&cfg.store).await?;
    Ok(RecordService::new(store))
}

/// Build the router for an already-constructed service.
pub fn build_app(service: RecordService) -> Router {
    routes::build_router(service, build_cors())
}

/// Public entry: build the app and serve until `shutdown` resolves.
pub async fn run_until<F>(mut cfg: AppConfig, shutdown: F) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    cfg.normalize_and_validate()
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let service = build_service(&cfg).await?;
    if let Some(admin) = &cfg.admin {
        admin_http::spawn_admin_server(&admin.addr, metrics::encode_metrics);
    }

    let app = build_app(service);
    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    let local: SocketAddr = listener
        .local_addr()
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    info!(addr = %local, table = %cfg.store.table, backend = ?cfg.store.backend, "student records server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| StartupError::Any(e.into()))?;
    info!("server stopped");
    Ok(())
}

/// Serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    run_until(cfg, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down");
        }
    })
    .await
}
