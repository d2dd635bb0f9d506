//! API client for the AutoForm backend

use autoform_core::{FieldOption, FormSchema, FormValues, OptionFetchError};
use gloo_net::http::Request;

use crate::types::*;

const API_BASE: &str = "/api";

/// Fetch the form schema served by the backend
pub async fn get_schema() -> Result<FormSchema, String> {
    let url = format!("{}/schema", API_BASE);
    fetch_json::<FormSchema>(&url).await
}

/// Submit the form values; missing required fields come back as the error
pub async fn submit_form(values: &FormValues) -> Result<SubmissionReceipt, String> {
    let url = format!("{}/submissions", API_BASE);
    post_json::<FormValues, SubmissionReceipt>(&url, values).await
}

/// Option-fetch protocol: a bare JSON array of `{value, label}`
pub async fn fetch_options(url: &str) -> Result<Vec<FieldOption>, OptionFetchError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| OptionFetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !response.ok() {
        return Err(OptionFetchError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    response
        .json::<Vec<FieldOption>>()
        .await
        .map_err(|e| OptionFetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
}

async fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    let api_response: ApiResponse<T> = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    if api_response.success {
        api_response.data.ok_or_else(|| "No data in response".to_string())
    } else {
        Err(api_response.error.unwrap_or_else(|| "Unknown error".to_string()))
    }
}

async fn post_json<T: serde::Serialize, R: serde::de::DeserializeOwned>(
    url: &str,
    body: &T,
) -> Result<R, String> {
    let response = Request::post(url)
        .json(body)
        .map_err(|e| format!("Failed to serialize body: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    // Rejections carry a different payload in `data`, so decode it late
    let api_response: ApiResponse<serde_json::Value> = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    if api_response.success {
        let data = api_response.data.ok_or_else(|| "No data in response".to_string())?;
        serde_json::from_value(data).map_err(|e| format!("Failed to parse response: {}", e))
    } else {
        Err(api_response.error.unwrap_or_else(|| "Unknown error".to_string()))
    }
}
