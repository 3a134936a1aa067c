//! Web server module.

mod handlers;

pub use handlers::*;

use crate::config::ServerConfig;
use crate::db::Store;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<Store>,
}

/// Web server for StatusDeck.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(config: ServerConfig, store: Arc<Store>) -> Self {
        Self {
            state: AppState { config, store },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            // Status pages
            .route("/status/{slug}", get(handlers::handle_status_page))
            // API endpoints
            .route("/api/status/{slug}", get(handlers::handle_api_status))
            .route("/api/monitors", post(handlers::handle_create_monitor))
            .route("/api/monitors/{slug}", delete(handlers::handle_delete_monitor))
            .route("/api/monitors/{slug}/theme", put(handlers::handle_update_owner_theme))
            .route("/api/viewer/{slug}/theme", put(handlers::handle_set_viewer_theme))
            .route("/api/viewer/{slug}/theme", delete(handlers::handle_clear_viewer_theme))
            .route("/api/accounts/{id}/plan-features", get(handlers::handle_plan_features))
            .route("/api/accounts/{id}/can-add-monitor", get(handlers::handle_can_add_monitor))
            .route("/api/badge/{slug}", get(handlers::handle_badge))
            // Static assets
            .route("/favicon.ico", get(handlers::handle_favicon))
            .layer(cors)
            .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
