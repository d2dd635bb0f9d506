//! REST handlers for the form schema and submissions

use autoform_core::{FieldDescriptor, FormValues, RequiredViolation};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Settings;

// ============================================================================
// Shared State
// ============================================================================

#[derive(Clone)]
pub struct ApiState {
    pub settings: Arc<RwLock<Settings>>,
    pub submissions: Arc<SubmissionStore>,
}

/// A form submission accepted by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub values: FormValues,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub field_count: usize,
}

impl From<&Submission> for SubmissionReceipt {
    fn from(submission: &Submission) -> Self {
        Self {
            id: submission.id,
            received_at: submission.received_at,
            field_count: submission.values.len(),
        }
    }
}

/// In-memory log of accepted submissions
#[derive(Default)]
pub struct SubmissionStore {
    entries: RwLock<Vec<Submission>>,
}

impl SubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, values: FormValues) -> Submission {
        let submission = Submission {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            values,
        };
        self.entries.write().await.push(submission.clone());
        submission
    }

    pub async fn list(&self) -> Vec<Submission> {
        self.entries.read().await.clone()
    }
}

// ============================================================================
// Response Envelope
// ============================================================================

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/schema - Field descriptors of the configured form
pub async fn get_schema(State(state): State<ApiState>) -> impl IntoResponse {
    let settings = state.settings.read().await;
    let fields: Vec<FieldDescriptor> = settings.schema.fields().to_vec();
    (StatusCode::OK, Json(ApiResponse::success(fields)))
}

/// POST /api/submissions - Accept submitted form values
pub async fn submit_form(
    State(state): State<ApiState>,
    Json(values): Json<FormValues>,
) -> Response {
    let violations = {
        let settings = state.settings.read().await;
        settings.schema.missing_required(&values)
    };

    if !violations.is_empty() {
        tracing::info!("Rejected submission: {} required field(s) missing", violations.len());
        let body = ApiResponse::<Vec<RequiredViolation>> {
            success: false,
            error: Some(format!("{} required field(s) missing", violations.len())),
            data: Some(violations),
        };
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    }

    let submission = state.submissions.record(values).await;
    tracing::info!(id = %submission.id, fields = submission.values.len(), "Form submitted");
    (
        StatusCode::CREATED,
        Json(ApiResponse::success(SubmissionReceipt::from(&submission))),
    )
        .into_response()
}

/// GET /api/submissions - Submissions accepted since startup
pub async fn list_submissions(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(state.submissions.list().await)))
}
