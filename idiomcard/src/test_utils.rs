//! Test fixtures: an in-memory idiom store, stub adapters and a ready-to-use test server.

use crate::{
    AppState, build_router,
    config::Config,
    db::handlers::LocalFileStorage,
    dictionary::{Dictionary, Explanation},
    ocr::OcrEngine,
    templates::Templates,
};
use async_trait::async_trait;
use axum_test::TestServer;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::{collections::HashMap, sync::Arc};
use tempfile::TempDir;

/// Fresh in-memory SQLite database with migrations applied.
///
/// A single connection that never expires, since every new connection to `sqlite::memory:` opens
/// a separate empty database.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    crate::migrator().run(&pool).await.expect("Failed to run migrations");
    pool
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    }
}

/// OCR engine answering every image with the same text or the same failure
pub struct StaticOcrEngine {
    outcome: Result<String, String>,
}

impl StaticOcrEngine {
    pub fn text(text: &str) -> Self {
        Self { outcome: Ok(text.to_string()) }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl OcrEngine for StaticOcrEngine {
    async fn recognize(&self, _image: &[u8], _name: &str) -> anyhow::Result<String> {
        self.outcome.clone().map_err(anyhow::Error::msg)
    }
}

/// Dictionary with fixed answers; unknown texts are not found
#[derive(Default)]
pub struct StaticDictionary {
    entries: HashMap<String, Explanation>,
}

impl StaticDictionary {
    pub fn with(mut self, text: &str, explanation: Explanation) -> Self {
        self.entries.insert(text.to_string(), explanation);
        self
    }
}

#[async_trait]
impl Dictionary for StaticDictionary {
    async fn lookup(&self, text: &str) -> Explanation {
        self.entries.get(text).cloned().unwrap_or(Explanation::NotFound)
    }
}

/// Test server over the full router, with its state for inspecting side effects
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    _upload_dir: TempDir,
}

pub async fn create_test_app(ocr: impl OcrEngine + 'static, dictionary: impl Dictionary + 'static) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
    let mut config = create_test_config();
    config.storage.upload_dir = upload_dir.path().to_path_buf();

    let storage = LocalFileStorage::new(upload_dir.path().to_path_buf())
        .await
        .expect("Failed to open upload dir");

    let state = AppState::builder()
        .db(create_test_pool().await)
        .config(config)
        .storage(Arc::new(storage))
        .ocr(Arc::new(ocr))
        .dictionary(Arc::new(dictionary))
        .templates(Arc::new(Templates::new().expect("Failed to compile templates")))
        .build();

    let server = TestServer::new(build_router(&state)).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _upload_dir: upload_dir,
    }
}
