//! Server settings, merged by figment. Highest precedence first:
//!
//! 1. Environment variables (GRANTBRIDGE_*)
//! 2. Well-known deployment variables (SONAR_API_KEY, PORT, SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY)
//! 3. TOML config file (if GRANTBRIDGE_CONFIG_FILE set)
//! 4. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Plain environment variables honoured without the GRANTBRIDGE_ prefix.
const WELL_KNOWN_VARS: &[&str] = &["SONAR_API_KEY", "PORT", "SUPABASE_URL", "SUPABASE_SERVICE_ROLE_KEY"];

/// Settings for the HTTP server, the sync job and both stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bearer token for the Sonar completions API.
    ///
    /// Set via SONAR_API_KEY or GRANTBRIDGE_SONAR_API_KEY.
    /// Required only when a completions call is made.
    #[serde(default)]
    pub sonar_api_key: Option<String>,

    /// Base URL of the completions API.
    #[serde(default = "default_sonar_base_url")]
    pub sonar_base_url: String,

    /// Model used by the cache sync job.
    #[serde(default = "default_sync_model")]
    pub sync_model: String,

    /// Model used by the live dashboard search.
    #[serde(default = "default_search_model")]
    pub search_model: String,

    /// Interface the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP server listens on.
    ///
    /// Set via PORT or GRANTBRIDGE_PORT.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the SQLite cache database, used when Supabase is not configured.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Supabase project URL. Set together with `supabase_service_role_key`.
    #[serde(default)]
    pub supabase_url: Option<String>,

    /// Supabase service-role key used by the admin REST client.
    #[serde(default)]
    pub supabase_service_role_key: Option<String>,

    /// Six-field cron expression for the scheduled cache rebuild.
    #[serde(default)]
    pub sync_cron: Option<String>,

    /// Bearer token required by `POST /api/sync-grants` when set.
    #[serde(default)]
    pub sync_token: Option<String>,

    /// Outbound HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent string for outbound HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_sonar_base_url() -> String {
    "https://api.perplexity.ai".into()
}

fn default_sync_model() -> String {
    "sonar".into()
}

fn default_search_model() -> String {
    "sonar-pro".into()
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3001
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./grantbridge-cache.sqlite")
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_user_agent() -> String {
    "grantbridge/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sonar_api_key: None,
            sonar_base_url: default_sonar_base_url(),
            sync_model: default_sync_model(),
            search_model: default_search_model(),
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            supabase_url: None,
            supabase_service_role_key: None,
            sync_cron: None,
            sync_token: None,
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// Credentials for the hosted Supabase backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseCredentials<'a> {
    pub url: &'a str,
    pub service_role_key: &'a str,
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Socket address string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Merge defaults, the optional TOML file and the environment, then validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed,
    /// or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("GRANTBRIDGE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment
            .merge(
                Env::raw()
                    .only(WELL_KNOWN_VARS)
                    .map(|key| key.as_str().to_lowercase().into()),
            )
            .merge(
                Env::prefixed("GRANTBRIDGE_")
                    .ignore(&["CONFIG_FILE"])
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Sonar API key, checked lazily so the server can boot without one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_sonar_api_key(&self) -> Result<&str, ConfigError> {
        self.sonar_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "sonar_api_key".into(),
                hint: "Set SONAR_API_KEY environment variable".into(),
            })
    }

    /// Supabase credentials, when both halves are configured.
    pub fn supabase(&self) -> Option<SupabaseCredentials<'_>> {
        match (self.supabase_url.as_deref(), self.supabase_service_role_key.as_deref()) {
            (Some(url), Some(key)) => Some(SupabaseCredentials { url, service_role_key: key }),
            _ => None,
        }
    }
}
