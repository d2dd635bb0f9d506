//! # AutoForm
//!
//! Schema-driven forms whose select fields load their options from a remote
//! source and refresh them when the field they depend on changes.
//!
//! ## Features
//!
//! - **Mock option API**: named catalogs served at `/api/<name>`, optionally
//!   keyed by a `parent` query parameter, with configurable latency
//! - **Form API**: the configured schema at `/api/schema` and submission
//!   intake at `/api/submissions` with `required` checks
//! - **Form session**: a native async driver for the dependent-option
//!   resolver, backed by any [`session::OptionSource`]
//! - **Health checks** and the embedded Leptos UI
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autoform::config::Settings;
//! use std::sync::Arc;
//! use tokio::sync::RwLock;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let app = autoform::create_app(Arc::new(RwLock::new(settings)));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod demo;
pub mod session;

use crate::adapters::api_handler::{self, ApiState, SubmissionStore};
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::options_handler;
use crate::adapters::ui_handler::UIHandler;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Creates the Axum application router with all endpoints configured.
pub fn create_app(settings: Arc<RwLock<config::Settings>>) -> Router {
    let health_handler = Arc::new(HealthHandler::new(settings.clone()));

    let public_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }));

    let api_state = ApiState {
        settings,
        submissions: Arc::new(SubmissionStore::new()),
    };

    // Static segments take priority over the catalog parameter
    let api_router = Router::new()
        .route("/schema", get(api_handler::get_schema))
        .route(
            "/submissions",
            get(api_handler::list_submissions).post(api_handler::submit_form),
        )
        .route("/:catalog", get(options_handler::get_options))
        .with_state(api_state);

    let router = public_router
        .nest("/api", api_router)
        .fallback(UIHandler::serve);

    router.layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
