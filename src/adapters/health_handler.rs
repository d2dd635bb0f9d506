//! Liveness and readiness of the form service.
//!
//! Readiness means the form can actually be filled in: a schema is loaded
//! and every local option address in it is backed by a catalog.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::config::validator::catalog_name;
use crate::config::Settings;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub form: FormReport,
}

/// What the service is currently serving
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormReport {
    pub fields: usize,
    pub catalogs: usize,
    pub latency_ms: u64,
    /// Local `/api/<name>` addresses with no catalog behind them
    pub unresolved_apis: Vec<String>,
}

impl FormReport {
    pub fn from_settings(settings: &Settings) -> Self {
        let unresolved_apis = settings
            .schema
            .apis()
            .filter(|api| catalog_name(api).is_some_and(|name| settings.catalog(name).is_none()))
            .map(str::to_string)
            .collect();

        Self {
            fields: settings.schema.len(),
            catalogs: settings.catalogs.len(),
            latency_ms: settings.mock_api.latency_ms,
            unresolved_apis,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.fields > 0 && self.unresolved_apis.is_empty()
    }
}

pub struct HealthHandler {
    settings: Arc<RwLock<Settings>>,
    started: Instant,
}

impl HealthHandler {
    pub fn new(settings: Arc<RwLock<Settings>>) -> Self {
        Self {
            settings,
            started: Instant::now(),
        }
    }

    /// GET /health - always 200 while the process serves requests
    pub async fn health(&self) -> impl IntoResponse {
        let form = FormReport::from_settings(&*self.settings.read().await);
        Json(HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.started.elapsed().as_secs(),
            form,
        })
    }

    /// GET /health/ready - 503 until the form and its catalogs line up
    pub async fn ready(&self) -> impl IntoResponse {
        let form = FormReport::from_settings(&*self.settings.read().await);
        let (status, label) = if form.is_ready() {
            (StatusCode::OK, "ready")
        } else {
            tracing::warn!(unresolved = ?form.unresolved_apis, fields = form.fields, "Form not ready");
            (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
        };

        (status, Json(serde_json::json!({ "status": label, "form": form })))
    }
}
