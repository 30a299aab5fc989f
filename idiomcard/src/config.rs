//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `IDIOMCARD_CONFIG`
//! environment variable. A missing file is treated as empty, so the defaults below are enough to
//! run locally.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `IDIOMCARD_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `IDIOMCARD_OCR__LANGUAGE=chi_sim` sets the `ocr.language` field.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! IDIOMCARD_PORT=8080
//! DATABASE_URL="sqlite://idiomcard.db?mode=rwc"
//! IDIOMCARD_STORAGE__UPLOAD_DIR=/var/lib/idiomcard/uploads
//! IDIOMCARD_DICTIONARY__REQUEST_TIMEOUT=5s
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "IDIOMCARD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// All fields have defaults, defined in the `Default` implementations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Raw `DATABASE_URL` override, folded into `database.url` on load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Idiom record store
    pub database: DatabaseConfig,
    /// Uploaded image storage
    pub storage: StorageConfig,
    /// Text recognition
    pub ocr: OcrConfig,
    /// Upstream idiom dictionary
    pub dictionary: DictionaryConfig,
    /// Card generation
    pub card: CardConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite connection string
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Flat directory uploaded images are written into
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OcrConfig {
    /// The tesseract executable
    pub command: String,
    /// Tesseract language pack, traditional Chinese unless overridden
    pub language: String,
    /// Upper bound for a single recognition run
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DictionaryConfig {
    /// Lookup endpoint; the idiom is passed as a query parameter
    pub url: Url,
    /// Name of the query parameter carrying the idiom
    pub query_param: String,
    /// Per-lookup timeout. An expired lookup counts as a failed item, not a failed request.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// How many lookups of one request may be in flight at once
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CardConfig {
    /// Minimum number of selected texts and of explanations needed to draw a card
    pub sample_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            database_url: None,
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            ocr: OcrConfig::default(),
            dictionary: DictionaryConfig::default(),
            card: CardConfig::default(),
            enable_otel_export: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://idiomcard.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: "chi_tra".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("https://dict.idioms.moe.edu.tw/idiomList.jsp").expect("static dictionary URL is valid"),
            query_param: "idiom".to_string(),
            request_timeout: Duration::from_secs(10),
            max_concurrency: 4,
        }
    }
}

impl Default for CardConfig {
    fn default() -> Self {
        Self { sample_size: 3 }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(figment::Error::from)?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), String> {
        if self.storage.upload_dir.as_os_str().is_empty() {
            return Err("Config validation: storage.upload_dir cannot be empty".to_string());
        }
        if self.storage.max_file_size == 0 {
            return Err("Config validation: storage.max_file_size must be greater than 0".to_string());
        }
        if self.card.sample_size == 0 {
            return Err("Config validation: card.sample_size must be greater than 0".to_string());
        }
        if self.ocr.timeout.is_zero() {
            return Err("Config validation: ocr.timeout must be greater than 0".to_string());
        }
        if self.dictionary.request_timeout.is_zero() {
            return Err("Config validation: dictionary.request_timeout must be greater than 0".to_string());
        }
        if self.dictionary.max_concurrency == 0 {
            return Err("Config validation: dictionary.max_concurrency must be greater than 0".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Config validation: database.max_connections must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            // IDIOMCARD_CONFIG names the file itself and is not a config key
            .merge(Env::prefixed("IDIOMCARD_").ignore(&["config"]).split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
