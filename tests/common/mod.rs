#![allow(dead_code)]

use autoform::config::{ClientSettings, FormSettings, MockApiSettings, ServerSettings, Settings};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Demo settings with no artificial latency
pub fn demo_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        mock_api: MockApiSettings { latency_ms: 0 },
        form: FormSettings::default(),
        client: ClientSettings::default(),
        schema: autoform::demo::schema().expect("demo schema"),
        catalogs: autoform::demo::catalogs().expect("demo catalogs"),
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_settings(demo_settings()).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        let app = autoform::create_app(Arc::new(RwLock::new(settings)));

        // Random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer { addr, base_url }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
