//! Shared application state.

use std::sync::Arc;

use grantbridge_client::{Completions, SonarClient, SonarConfig, SonarError, SupabaseStore};
use grantbridge_core::{AppConfig, CacheDb, Error, GrantStore};
use tokio::sync::Mutex;

use crate::sync::{SyncReport, rebuild_cache};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` when no API key is configured; grant searches then fail per request.
    pub completions: Option<Arc<dyn Completions>>,
    pub store: Arc<dyn GrantStore>,
    sync_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: AppConfig, completions: Option<Arc<dyn Completions>>, store: Arc<dyn GrantStore>) -> Self {
        Self { config: Arc::new(config), completions, store, sync_lock: Arc::new(Mutex::new(())) }
    }

    /// Build the completions client and the store selected by `config`.
    pub async fn from_config(config: AppConfig) -> Result<Self, Error> {
        let completions: Option<Arc<dyn Completions>> = match SonarConfig::from_app(&config) {
            Ok(sonar) => Some(Arc::new(SonarClient::new(sonar)?) as Arc<dyn Completions>),
            Err(SonarError::MissingApiKey) => {
                tracing::warn!("SONAR_API_KEY is not set; grant searches and syncs will fail");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let store: Arc<dyn GrantStore> = match config.supabase() {
            Some(creds) => Arc::new(SupabaseStore::new(
                creds.url,
                creds.service_role_key,
                config.timeout(),
                &config.user_agent,
            )?),
            None => Arc::new(CacheDb::open(&config.db_path).await?),
        };
        tracing::info!(backend = store.backend(), "grant store ready");

        Ok(Self::new(config, completions, store))
    }

    pub fn completions(&self) -> Result<&dyn Completions, Error> {
        self.completions
            .as_deref()
            .ok_or_else(|| Error::Upstream("completions API key is not configured".into()))
    }

    /// Rebuild the cache unless a rebuild is already running in this process.
    pub async fn run_sync(&self) -> Result<SyncReport, Error> {
        let _guard = self.sync_lock.try_lock().map_err(|_| Error::SyncInProgress)?;
        let today = chrono::Utc::now().date_naive();
        rebuild_cache(self.completions()?, self.store.as_ref(), &self.config.sync_model, today).await
    }

    #[cfg(test)]
    pub(crate) fn sync_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.sync_lock)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use grantbridge_client::sonar::ChatRequest;
    use grantbridge_core::{GRANT_SOURCE, NormalizedGrant};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned completions backend counting its calls.
    #[derive(Default)]
    pub struct CannedCompletions {
        pub reply: Option<String>,
        pub calls: AtomicUsize,
    }

    impl CannedCompletions {
        pub fn replying(reply: impl Into<String>) -> Self {
            Self { reply: Some(reply.into()), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Completions for CannedCompletions {
        async fn complete(&self, _request: &ChatRequest) -> Result<String, SonarError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or(SonarError::HttpError { status: 502 })
        }
    }

    pub fn grant(id: &str) -> NormalizedGrant {
        NormalizedGrant {
            id: id.to_string(),
            source: GRANT_SOURCE.to_string(),
            title: format!("Grant {id}"),
            organization: "Example Foundation".to_string(),
            description: String::new(),
            link: "https://example.org".to_string(),
            amount_display: "$1,000".to_string(),
            amount_numeric: 1000,
            currency: "USD".to_string(),
            deadline: "2027-01-15".to_string(),
            tags: Vec::new(),
            eligibility: vec!["Undergraduates".to_string()],
            requirements: Vec::new(),
            popularity: 10,
            is_featured: true,
            created_at: None,
            updated_at: None,
        }
    }

    /// Records array as the completions API would return it.
    pub fn records_reply(count: usize) -> String {
        let records: Vec<_> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "title": format!("Award {i}"),
                    "organization": "Example Foundation",
                    "amount": "$2,500",
                    "deadline": "2027-03-01",
                    "eligibility": "US citizen; Undergraduate",
                    "requirements": "Essay",
                    "tags": "stem",
                    "link": "https://example.org/apply"
                })
            })
            .collect();
        serde_json::Value::Array(records).to_string()
    }

    /// State over an in-memory cache seeded with `cached` grants.
    pub async fn state_with(completions: Option<CannedCompletions>, cached: usize) -> (AppState, Arc<CacheDb>) {
        let db = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let seed: Vec<_> = (0..cached).map(|i| grant(&format!("seed-{i}"))).collect();
        db.replace_grants(&seed).await.unwrap();

        let completions = completions.map(|c| Arc::new(c) as Arc<dyn Completions>);
        let store: Arc<dyn GrantStore> = db.clone();
        (AppState::new(AppConfig::default(), completions, store), db)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[tokio::test]
    async fn test_missing_completions_is_upstream_error() {
        let (state, _) = state_with(None, 0).await;
        assert!(matches!(state.completions(), Err(Error::Upstream(_))));
    }

    #[tokio::test]
    async fn test_concurrent_sync_is_rejected() {
        let (state, _) = state_with(Some(CannedCompletions::replying(records_reply(3))), 0).await;
        let lock = state.sync_lock();
        let _held = lock.lock().await;

        assert!(matches!(state.run_sync().await, Err(Error::SyncInProgress)));
    }

    #[tokio::test]
    async fn test_from_config_defaults_to_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            db_path: dir.path().join("cache.sqlite"),
            sonar_api_key: Some("test-key".into()),
            ..AppConfig::default()
        };

        let state = AppState::from_config(config).await.unwrap();
        assert_eq!(state.store.backend(), "sqlite");
        assert!(state.completions.is_some());
    }

    #[tokio::test]
    async fn test_from_config_prefers_supabase() {
        let config = AppConfig {
            supabase_url: Some("https://abc.supabase.co".into()),
            supabase_service_role_key: Some("service-key".into()),
            ..AppConfig::default()
        };

        let state = AppState::from_config(config).await.unwrap();
        assert_eq!(state.store.backend(), "supabase");
        assert!(state.completions.is_none());
    }
}
