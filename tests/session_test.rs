mod common;

use async_trait::async_trait;
use autoform::config::ClientSettings;
use autoform::session::{FormSession, HttpOptionSource, OptionSource};
use autoform_core::{FetchOutcome, FieldOption, FormSchema, OptionFetchError, SubmitError};
use common::TestServer;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted option source: canned responses and per-URL delays
#[derive(Default)]
struct ScriptedSource {
    responses: HashMap<String, Result<Vec<FieldOption>, OptionFetchError>>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn respond(mut self, url: &str, labels: &[&str]) -> Self {
        let options = labels.iter().map(|l| FieldOption::new(l.to_lowercase(), *l)).collect();
        self.responses.insert(url.to_string(), Ok(options));
        self
    }

    fn fail(mut self, url: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            Err(OptionFetchError::Status {
                url: url.to_string(),
                status: 500,
            }),
        );
        self
    }

    fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl OptionSource for ScriptedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FieldOption>, OptionFetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.responses.get(url).cloned().unwrap_or_else(|| {
            Err(OptionFetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        })
    }
}

fn schema() -> Arc<FormSchema> {
    Arc::new(autoform::demo::schema().unwrap())
}

fn labels(options: &[FieldOption]) -> Vec<String> {
    options.iter().map(|o| o.label.clone()).collect()
}

#[tokio::test]
async fn test_mount_fetches_each_independent_field_once() {
    let source = Arc::new(
        ScriptedSource::default()
            .respond("/api/departments", &["Development"])
            .respond("/api/roles", &["Manager"])
            .respond("/api/countries", &["Japan"]),
    );
    let session = FormSession::new(schema(), source.clone());

    session.mount().await;
    session.mount().await;

    let mut requests = source.requests();
    requests.sort();
    assert_eq!(requests, vec!["/api/countries", "/api/departments", "/api/roles"]);
    assert_eq!(labels(&session.options("department").await), vec!["Development"]);
    assert!(!session.is_loading("department").await);
}

#[tokio::test]
async fn test_team_disabled_until_department_selected() {
    let source = Arc::new(ScriptedSource::default().respond("/api/departments", &["Development"]));
    let session = FormSession::new(schema(), source.clone());
    session.mount().await;

    assert!(session.is_disabled("team").await);
    assert!(session.options("team").await.is_empty());
    assert!(!source.requests().iter().any(|r| r.starts_with("/api/teams")));
}

#[tokio::test]
async fn test_selecting_department_loads_teams_and_clears_team() {
    let source = Arc::new(
        ScriptedSource::default()
            .respond("/api/teams?parent=dev", &["Frontend", "Backend", "Fullstack"])
            .respond("/api/teams?parent=sales", &["Domestic", "International"]),
    );
    let session = FormSession::new(schema(), source.clone());

    let outcomes = session.change("department", json!("dev")).await.unwrap();
    assert_eq!(outcomes, vec![FetchOutcome::Applied { count: 3 }]);
    session.change("team", json!("frontend")).await.unwrap();

    session.change("department", json!("sales")).await.unwrap();

    assert_eq!(session.value("team").await, None);
    assert_eq!(labels(&session.options("team").await), vec!["Domestic", "International"]);
    assert!(source.requests().contains(&"/api/teams?parent=dev".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_rapid_changes_keep_latest_response() {
    // The first request resolves after the second one; the clock is paused
    // so the ordering depends only on the scripted delays
    let source = Arc::new(
        ScriptedSource::default()
            .respond("/api/cities?parent=us", &["New York", "Los Angeles"])
            .respond("/api/cities?parent=jp", &["Tokyo", "Osaka"])
            .delay("/api/cities?parent=us", Duration::from_millis(150)),
    );
    let session = FormSession::new(schema(), source.clone());

    let (first, second) = tokio::join!(
        session.change("country", json!("us")),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session.change("country", json!("jp")).await
        }
    );

    assert_eq!(first.unwrap(), vec![FetchOutcome::Stale]);
    assert_eq!(second.unwrap(), vec![FetchOutcome::Applied { count: 2 }]);
    assert_eq!(labels(&session.options("city").await), vec!["Tokyo", "Osaka"]);
    assert!(!session.is_loading("city").await);
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_options() {
    let source = Arc::new(
        ScriptedSource::default()
            .respond("/api/cities?parent=vn", &["Hanoi", "Ho Chi Minh"])
            .fail("/api/cities?parent=jp"),
    );
    let session = FormSession::new(schema(), source);

    session.change("country", json!("vn")).await.unwrap();
    let outcomes = session.change("country", json!("jp")).await.unwrap();

    assert_eq!(outcomes, vec![FetchOutcome::Failed]);
    assert_eq!(labels(&session.options("city").await), vec!["Hanoi", "Ho Chi Minh"]);
    assert!(!session.is_loading("city").await);
}

#[tokio::test]
async fn test_reload_uses_parent_value() {
    let source = Arc::new(ScriptedSource::default().respond("/api/teams?parent=dev", &["Frontend"]));
    let session = FormSession::new(schema(), source.clone());

    assert_eq!(session.reload("team").await.unwrap(), None);

    session.change("department", json!("dev")).await.unwrap();
    let outcome = session.reload("team").await.unwrap();
    assert_eq!(outcome, Some(FetchOutcome::Applied { count: 1 }));
    assert_eq!(
        source.requests().iter().filter(|r| *r == "/api/teams?parent=dev").count(),
        2
    );
}

#[tokio::test]
async fn test_submit_reports_missing_required() {
    let session = FormSession::new(schema(), ScriptedSource::default());
    session.change("firstName", json!("Ada")).await.unwrap();

    match session.submit().await {
        Err(SubmitError::MissingRequired(missing)) => {
            assert!(missing.iter().any(|v| v.field == "lastName"));
            assert!(missing.iter().all(|v| v.field != "firstName"));
        }
        other => panic!("expected missing fields, got {:?}", other),
    }
}

#[tokio::test]
async fn test_session_against_mock_api() {
    let server = TestServer::new().await;
    let source = HttpOptionSource::new(&server.base_url, Duration::from_secs(5)).unwrap();
    let session = FormSession::new(schema(), source);

    let outcomes = session.mount().await;
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| matches!(o, FetchOutcome::Applied { .. })));
    assert_eq!(
        labels(&session.options("department").await),
        vec!["Development", "Marketing", "Sales"]
    );

    session.change("department", json!("dev")).await.unwrap();
    assert_eq!(
        labels(&session.options("team").await),
        vec!["Frontend", "Backend", "Fullstack"]
    );

    session.change("country", json!("vn")).await.unwrap();
    session.change("city", json!("hcm")).await.unwrap();
    assert_eq!(session.values().await["city"], json!("hcm"));
}

#[tokio::test]
async fn test_http_source_status_and_decode_errors() {
    let server = TestServer::new().await;
    let source = HttpOptionSource::from_settings(&server.base_url, &ClientSettings::default()).unwrap();

    let err = source.fetch("/api/planets").await.unwrap_err();
    assert!(matches!(err, OptionFetchError::Status { status: 404, .. }));

    // The schema endpoint answers with an envelope, not an option list
    let err = source.fetch("/api/schema").await.unwrap_err();
    assert!(matches!(err, OptionFetchError::Decode { .. }));
}
