//! Native driver for the dependent-option resolver.
//!
//! [`FormSession`] performs the fetches an [`OptionResolver`] asks for
//! through an [`OptionSource`] and feeds the results back. The resolver lock
//! is only held while issuing or completing tickets, never across a fetch,
//! so concurrent changes interleave and stale responses are dropped by the
//! resolver's generation check.

use async_trait::async_trait;
use autoform_core::{
    FetchOutcome, FetchTicket, FieldOption, FormSchema, FormValues, OptionFetchError,
    OptionResolver, ResolverError, SubmitError,
};
use futures::future::join_all;
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::ClientSettings;

/// Where option lists come from
#[async_trait]
pub trait OptionSource: Send + Sync {
    /// Fetch the options at `url`, an `api` address with its query attached
    async fn fetch(&self, url: &str) -> Result<Vec<FieldOption>, OptionFetchError>;
}

#[async_trait]
impl<T: OptionSource + ?Sized> OptionSource for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Vec<FieldOption>, OptionFetchError> {
        self.as_ref().fetch(url).await
    }
}

/// Option source speaking the option-fetch protocol over HTTP.
///
/// Relative addresses such as `/api/teams?parent=dev` are resolved against
/// the base URL; absolute ones are used as-is.
pub struct HttpOptionSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpOptionSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn from_settings(base_url: &str, settings: &ClientSettings) -> Result<Self, anyhow::Error> {
        Self::new(base_url, Duration::from_secs(settings.timeout_seconds))
    }
}

#[async_trait]
impl OptionSource for HttpOptionSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FieldOption>, OptionFetchError> {
        let target = self.base_url.join(url).map_err(|e| OptionFetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| OptionFetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(OptionFetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
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
}

/// One live form: current values, option lists and in-flight fetches
pub struct FormSession<S> {
    resolver: Mutex<OptionResolver>,
    source: S,
}

impl<S: OptionSource> FormSession<S> {
    pub fn new(schema: Arc<FormSchema>, source: S) -> Self {
        Self {
            resolver: Mutex::new(OptionResolver::new(schema)),
            source,
        }
    }

    /// Load the options of every independent remote field.
    /// Calls after the first do nothing.
    pub async fn mount(&self) -> Vec<FetchOutcome> {
        let tickets = self.resolver.lock().await.mount();
        self.run(tickets).await
    }

    /// Set a field's value and wait for its dependents' options to settle.
    ///
    /// Returns the outcome of each fetch this change issued. An outcome is
    /// [`FetchOutcome::Stale`] when a later change overtook it.
    pub async fn change(&self, name: &str, value: Value) -> Result<Vec<FetchOutcome>, ResolverError> {
        let tickets = self.resolver.lock().await.set_value(name, value)?;
        Ok(self.run(tickets).await)
    }

    /// Re-fetch a field's options without changing any value
    pub async fn reload(&self, name: &str) -> Result<Option<FetchOutcome>, ResolverError> {
        let ticket = {
            let mut resolver = self.resolver.lock().await;
            let param = resolver
                .schema()
                .field(name)
                .and_then(|f| f.depends_on())
                .and_then(|parent| resolver.value(parent))
                .and_then(autoform_core::OptionValue::from_json);
            if param.is_none() && resolver.is_disabled(name) {
                return Ok(None);
            }
            resolver.begin_fetch(name, param.as_ref())?
        };

        Ok(self.run(ticket.into_iter().collect()).await.pop())
    }

    async fn run(&self, tickets: Vec<FetchTicket>) -> Vec<FetchOutcome> {
        let fetches = tickets.into_iter().map(|ticket| async move {
            let result = self.source.fetch(&ticket.url).await;
            self.resolver.lock().await.complete(&ticket, result)
        });
        join_all(fetches).await
    }

    pub async fn options(&self, name: &str) -> Vec<FieldOption> {
        self.resolver.lock().await.options(name).to_vec()
    }

    pub async fn is_loading(&self, name: &str) -> bool {
        self.resolver.lock().await.is_loading(name)
    }

    pub async fn is_disabled(&self, name: &str) -> bool {
        self.resolver.lock().await.is_disabled(name)
    }

    pub async fn value(&self, name: &str) -> Option<Value> {
        self.resolver.lock().await.value(name).cloned()
    }

    pub async fn values(&self) -> FormValues {
        self.resolver.lock().await.values().clone()
    }

    /// Hand back the values for submission, or the unmet `required` rules
    pub async fn submit(&self) -> Result<FormValues, SubmitError> {
        let resolver = self.resolver.lock().await;
        let violations = resolver.schema().missing_required(resolver.values());
        if violations.is_empty() {
            Ok(resolver.values().clone())
        } else {
            Err(SubmitError::MissingRequired(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_source_reports_transport_errors() {
        // Port 9 (discard) is closed on test hosts
        let source = HttpOptionSource::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = source.fetch("/api/roles").await.unwrap_err();
        assert!(matches!(err, OptionFetchError::Transport { .. }));
        assert_eq!(err.url(), "/api/roles");
    }

    #[test]
    fn test_http_source_rejects_bad_base_url() {
        assert!(HttpOptionSource::new("not a url", Duration::from_secs(1)).is_err());
    }
}
