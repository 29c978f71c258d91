//! HTTP API
//!
//! JSON endpoints for agreements, the dashboard and reports, served by axum
//! over the shared [`Storage`].

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::error::{ConvenioError, ConvenioResult};
use crate::storage::Storage;

pub use error::{ApiError, ApiResult};

/// Shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(storage: Storage, settings: Settings) -> Self {
        Self {
            storage: Arc::new(storage),
            settings: Arc::new(settings),
        }
    }

    /// Reference date for expiry and series computations
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/convenios",
            get(handlers::list_agreements).post(handlers::create_agreement),
        )
        .route(
            "/convenios/apagar-selecionados",
            post(handlers::delete_selected),
        )
        .route("/convenios/:id", get(handlers::agreement_detail))
        .route("/convenios/:id/editar", post(handlers::update_agreement))
        .route("/convenios/:id/apagar", post(handlers::delete_agreement))
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/relatorios/dados", get(handlers::report_data))
        .route("/relatorios/pdf", get(handlers::report_pdf))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until interrupted
pub async fn serve(state: AppState, address: &str) -> ConvenioResult<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|e| ConvenioError::Config(format!("Cannot bind {}: {}", address, e)))?;

    tracing::info!(
        "convenios v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        address
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ConvenioError::from)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down"),
        Err(err) => {
            tracing::warn!(error = %err, "cannot listen for ctrl-c, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
