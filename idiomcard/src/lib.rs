//! # idiomcard: turn a photographed page into a shareable idiom card
//!
//! `idiomcard` is a small web service. A user uploads an image, the service recognizes its text
//! with OCR, the user picks the idioms they care about, the service looks up their explanations
//! in an online idiom dictionary, and finally draws one idiom and one explanation into a card that
//! is persisted behind a link such as `/card/學而時習之`.
//!
//! ## Architecture
//!
//! The HTTP layer is built on [Axum](https://github.com/tokio-rs/axum) and renders server-side
//! HTML with minijinja. Cards are stored in SQLite, uploaded images in a flat directory.
//!
//! ### Request Flow
//!
//! Each workflow stage is one request, and nothing is remembered between requests: the key of
//! an uploaded image travels in the URL, selections and explanations travel as repeated form
//! fields. A stage that fails redirects to the upload form with a one-shot notice, see
//! [`errors`] and [`notice`].
//!
//! ### Core Components
//!
//! - **API layer** ([`api`]): typed form DTOs and one handler per stage
//! - **Workflow** ([`workflow`]): line splitting, longest-line pick and the card draw
//! - **Persistence** ([`db`]): the idiom repository and the blob store for images
//! - **Adapters**: [`ocr`] wraps the tesseract CLI, [`dictionary`] the upstream dictionary
//!
//! External services sit behind traits ([`ocr::OcrEngine`], [`dictionary::Dictionary`],
//! [`db::handlers::FileStorage`]) held in [`AppState`], so tests swap them for stubs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use idiomcard::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = idiomcard::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     idiomcard::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod db;
pub mod dictionary;
pub mod errors;
pub mod notice;
pub mod ocr;
pub mod telemetry;
pub mod templates;
pub mod types;
pub mod workflow;

#[cfg(test)]
pub mod test_utils;

use crate::{
    db::handlers::{FileStorage, LocalFileStorage},
    dictionary::{Dictionary, MoeDictionary},
    ocr::{OcrEngine, TesseractOcrEngine},
    templates::Templates,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .storage(Arc::new(storage))
///     .ocr(Arc::new(TesseractOcrEngine::new(&config.ocr)))
///     .dictionary(Arc::new(dictionary))
///     .templates(Arc::new(Templates::new()?))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub storage: Arc<dyn FileStorage>,
    pub ocr: Arc<dyn OcrEngine>,
    pub dictionary: Arc<dyn Dictionary>,
    pub templates: Arc<Templates>,
}

/// Get the idiomcard database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Build the application router with all routes and middleware
pub fn build_router(state: &AppState) -> Router {
    let upload_limit = usize::try_from(state.config.storage.max_file_size).unwrap_or(usize::MAX);

    Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route(
            "/",
            get(api::handlers::uploads::upload_form)
                .post(api::handlers::uploads::upload_image)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/scan/{key}", get(api::handlers::scans::scan_image))
        .route("/select", post(api::handlers::selections::select_text))
        .route("/get_idiom", post(api::handlers::selections::get_idiom))
        .route("/generate_link", post(api::handlers::cards::generate_link))
        .route("/card/{*idiom}", get(api::handlers::cards::render_card))
        .route("/api/idioms", get(api::handlers::cards::list_idioms))
        .with_state(state.clone())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Connect to SQLite and bring the schema up to date
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    info!("Opening idiom store at {}", config.database.url);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    migrator().run(&pool).await?;
    Ok(pool)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] opens the database, runs migrations and wires the adapters
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests
/// 3. **Shutdown**: on the shutdown signal, in-flight requests finish and the pool is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting idiomcard with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        let storage = LocalFileStorage::new(config.storage.upload_dir.clone()).await?;

        let app_state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .storage(Arc::new(storage))
            .ocr(Arc::new(TesseractOcrEngine::new(&config.ocr)))
            .dictionary(Arc::new(MoeDictionary::new(&config.dictionary)?))
            .templates(Arc::new(Templates::new()?))
            .build();

        Ok(Self::from_state(app_state))
    }

    /// Build the application around already constructed state
    pub fn from_state(app_state: AppState) -> Self {
        Self {
            router: build_router(&app_state),
            config: app_state.config.clone(),
            pool: app_state.db.clone(),
        }
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "idiomcard listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
