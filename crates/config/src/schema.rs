use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Default public endpoint of the movie-search API.
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://db.kinorium.com";

/// Top-level configuration (`kinogram.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KinogramConfig {
    pub telegram: TelegramConfig,
    pub catalog: CatalogConfig,
    pub database: DatabaseConfig,
}

/// Telegram transport settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
        }
    }
}

/// Movie-catalog API settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the search API.
    pub base_url: String,

    /// API key for the search endpoint.
    #[serde(serialize_with = "serialize_secret")]
    pub api_key: Secret<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Free-text upstream error phrases that actually mean "nothing
    /// matched". Compared as lowercase substrings of the error message.
    pub no_results_phrases: Vec<String>,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            api_key: Secret::new(String::new()),
            timeout_secs: 7,
            no_results_phrases: default_no_results_phrases(),
        }
    }
}

fn default_no_results_phrases() -> Vec<String> {
    [
        "no results",
        "nothing found",
        "not found",
        "не найден",
        "ничего",
        "нічого",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Where the SQLite database lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite file, created on first run.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("kinogram.db"),
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
