//! Mock option API.
//!
//! Serves each configured catalog at `/api/<name>` as a bare JSON array of
//! `{value, label}` options, after the configured artificial latency.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::time::Duration;

use crate::adapters::api_handler::{ApiResponse, ApiState};

#[derive(Debug, Deserialize)]
pub struct OptionQuery {
    pub parent: Option<String>,
}

/// GET /api/:catalog?parent=<value>
pub async fn get_options(
    State(state): State<ApiState>,
    Path(catalog): Path<String>,
    Query(query): Query<OptionQuery>,
) -> Response {
    let (options, latency_ms) = {
        let settings = state.settings.read().await;
        match settings.catalog(&catalog) {
            Some(c) => (c.lookup(query.parent.as_deref()), settings.mock_api.latency_ms),
            None => {
                tracing::warn!("Option request for unknown catalog '{}'", catalog);
                return (
                    StatusCode::NOT_FOUND,
                    Json(ApiResponse::<()>::error(format!("Catalog not found: {}", catalog))),
                )
                    .into_response();
            }
        }
    };

    if latency_ms > 0 {
        tokio::time::sleep(Duration::from_millis(latency_ms)).await;
    }

    tracing::debug!(
        catalog = %catalog,
        parent = ?query.parent,
        count = options.len(),
        "Serving options"
    );
    (StatusCode::OK, Json(options)).into_response()
}
