//! Post-load checks on [`AppConfig`].
//!
//! Only the Sonar API key is allowed to be absent at boot; it is checked
//! when a grant request first needs it.

use thiserror::Error;

use crate::config::AppConfig;

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 300_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Reject settings the server cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `sonar_base_url` or `supabase_url` is not an absolute http(s) URL
    /// - a model name or `user_agent` is empty
    /// - `sync_cron` is set but does not have six fields
    ///
    /// Returns `ConfigError::Missing` if only one of the two Supabase settings is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: format!("must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS} ms"),
            });
        }

        validate_http_url("sonar_base_url", &self.sonar_base_url)?;

        for (field, value) in [
            ("sync_model", &self.sync_model),
            ("search_model", &self.search_model),
            ("user_agent", &self.user_agent),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must not be empty".into() });
            }
        }

        match (&self.supabase_url, &self.supabase_service_role_key) {
            (Some(url), Some(_)) => validate_http_url("supabase_url", url)?,
            (Some(_), None) => {
                return Err(ConfigError::Missing {
                    field: "supabase_service_role_key".into(),
                    hint: "Set SUPABASE_SERVICE_ROLE_KEY alongside SUPABASE_URL".into(),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::Missing {
                    field: "supabase_url".into(),
                    hint: "Set SUPABASE_URL alongside SUPABASE_SERVICE_ROLE_KEY".into(),
                });
            }
            (None, None) => {}
        }

        if let Some(cron) = &self.sync_cron
            && cron.split_whitespace().count() != 6
        {
            return Err(ConfigError::Invalid {
                field: "sync_cron".into(),
                reason: "expected six fields (sec min hour day month weekday)".into(),
            });
        }

        if self.sync_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            tracing::warn!("sync_token is set but blank; manual sync trigger is effectively unprotected");
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ConfigError::Invalid { field: field.into(), reason: format!("invalid URL: {e}") })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid { field: field.into(), reason: "scheme must be http or https".into() });
    }

    Ok(())
}
