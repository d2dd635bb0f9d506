//! Wire types of the AutoForm server API

use serde::Deserialize;

/// Envelope wrapping every non-option response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Acknowledgement of an accepted submission
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionReceipt {
    pub id: String,
    pub received_at: String,
    pub field_count: usize,
}
