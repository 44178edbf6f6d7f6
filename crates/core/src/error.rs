//! Unified error types for grantbridge.
//!
//! Each variant carries an upper-case code prefix so log lines and API
//! responses can be grepped by failure class.

use tokio_rusqlite::rusqlite;

/// Unified error types for the grantbridge backend.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed client payload (profile, contact form).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Missing or wrong bearer token on a protected route.
    #[error("UNAUTHORIZED: {0}")]
    Unauthorized(String),

    /// A cache rebuild is already running in this process.
    #[error("SYNC_IN_PROGRESS")]
    SyncInProgress,

    /// The completions API failed or could not be reached.
    #[error("UPSTREAM_ERROR: {0}")]
    Upstream(String),

    /// The completions reply was not the JSON we asked for.
    #[error("PARSE_ERROR: {0}")]
    Parse(String),

    /// Remote store (Supabase REST) rejected a read or write.
    #[error("PERSISTENCE_ERROR: {0}")]
    Persistence(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl Error {
    /// Whether the failure was caused by the caller rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::Unauthorized(_) | Error::SyncInProgress)
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Upstream("HTTP 502".to_string());
        assert!(err.to_string().contains("UPSTREAM_ERROR"));
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_client_error_classes() {
        assert!(Error::InvalidInput("age".into()).is_client_error());
        assert!(Error::SyncInProgress.is_client_error());
        assert!(!Error::Parse("eof".into()).is_client_error());
        assert!(!Error::Persistence("insert".into()).is_client_error());
    }

    #[test]
    fn test_json_error_becomes_parse_error() {
        let err: Error = serde_json::from_str::<Vec<String>>("not json").unwrap_err().into();
        assert!(matches!(err, Error::Parse(_)));
    }
}
