//! # Form Server
//!
//! HTTP side of the form tester. Re-validates submissions independently of the
//! client layer and echoes them back.
//!
//! ## Routes
//!
//! - `POST /api/submit-form`: multipart submission, see [`handlers::submit_form`]
//! - `GET /api/health`: liveness check
//!
//! ## Request Flow
//!
//! ```text
//! body limit -> upload middleware (type/size filter, disk write) -> handler (fields, email, password)
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;
pub mod upload;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use log::info;
use tower_http::cors::CorsLayer;

pub use config::ServerConfig;
pub use error::{ApiError, UploadRejection};
pub use state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.upload.body_limit();

    Router::new()
        .route("/api/submit-form", post(handlers::submit_form))
        .route("/api/health", get(handlers::health_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create the upload directory, bind, and serve until the process exits.
pub async fn run(config: ServerConfig) -> Result<()> {
    tokio::fs::create_dir_all(&config.upload.dir)
        .await
        .with_context(|| {
            format!(
                "failed to create upload directory {}",
                config.upload.dir.display()
            )
        })?;

    let addr = config.socket_addr()?;
    let app = router(AppState::from_config(&config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("🚀 Server running on http://{}", addr);
    info!("📡 API endpoint: http://{}/api/submit-form", addr);
    info!("📁 Uploads go to {}", config.upload.dir.display());

    axum::serve(listener, app).await?;

    Ok(())
}
