//! Supabase (PostgREST) admin store.
//!
//! Writes go through the service-role key, so row-level security does not
//! apply. The cache swap is two independent REST calls: a successful delete
//! followed by a failed insert leaves the table empty until the next sync.

use std::time::Duration;

use async_trait::async_trait;
use grantbridge_core::{ContactMessage, Error, GrantStore, NormalizedGrant};
use reqwest::{RequestBuilder, Response, header};

const CACHE_TABLE: &str = "grants_cache";
const CONTACT_TABLE: &str = "contact_messages";
const REFRESH_RPC: &str = "refresh_popular_open";

/// Supabase REST store for the grants cache.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    http: reqwest::Client,
    rest_url: String,
    service_key: String,
}

impl SupabaseStore {
    /// Create a store for the project at `project_url`.
    pub fn new(project_url: &str, service_key: &str, timeout: Duration, user_agent: &str) -> Result<Self, Error> {
        if service_key.trim().is_empty() {
            return Err(Error::InvalidInput("supabase service role key cannot be empty".into()));
        }

        let base = url::Url::parse(project_url)
            .map_err(|e| Error::InvalidInput(format!("invalid supabase url {project_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Persistence(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", base.as_str().trim_end_matches('/')),
            service_key: service_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.rest_url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header(header::ACCEPT, "application/json")
    }

    async fn send(&self, operation: &str, builder: RequestBuilder) -> Result<Response, Error> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| Error::Persistence(format!("{operation}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Persistence(format!("{operation}: HTTP {}: {body}", status.as_u16())));
        }

        Ok(response)
    }
}

#[async_trait]
impl GrantStore for SupabaseStore {
    fn backend(&self) -> &'static str {
        "supabase"
    }

    async fn replace_cache(&self, grants: &[NormalizedGrant]) -> Result<(), Error> {
        let delete = self
            .http
            .delete(self.table_url(CACHE_TABLE))
            .query(&[("id", "neq.")]);
        self.send("delete grants_cache", delete).await?;
        tracing::debug!("cleared supabase grants cache");

        if grants.is_empty() {
            return Ok(());
        }

        let insert = self
            .http
            .post(self.table_url(CACHE_TABLE))
            .header("Prefer", "return=minimal")
            .json(grants);
        self.send("insert grants_cache", insert).await?;
        tracing::debug!(inserted = grants.len(), "inserted supabase grants cache");

        Ok(())
    }

    async fn cached_grants(&self) -> Result<Vec<NormalizedGrant>, Error> {
        let select = self.http.get(self.table_url(CACHE_TABLE)).query(&[("select", "*")]);
        let response = self.send("select grants_cache", select).await?;

        response
            .json::<Vec<NormalizedGrant>>()
            .await
            .map_err(|e| Error::Persistence(format!("decode grants_cache rows: {e}")))
    }

    async fn refresh_popular(&self) -> Result<(), Error> {
        let rpc = self
            .http
            .post(format!("{}/rpc/{REFRESH_RPC}", self.rest_url))
            .json(&serde_json::json!({}));
        self.send("rpc refresh_popular_open", rpc).await?;
        Ok(())
    }

    async fn save_contact(&self, message: &ContactMessage) -> Result<(), Error> {
        let insert = self
            .http
            .post(self.table_url(CONTACT_TABLE))
            .header("Prefer", "return=minimal")
            .json(message);
        self.send("insert contact_messages", insert).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, Method, StatusCode, Uri};
    use grantbridge_core::GRANT_SOURCE;
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    fn store(url: &str) -> SupabaseStore {
        SupabaseStore::new(url, "service-key", Duration::from_secs(2), "grantbridge-test").unwrap()
    }

    fn grant(id: &str) -> NormalizedGrant {
        NormalizedGrant {
            id: id.to_string(),
            source: GRANT_SOURCE.to_string(),
            title: format!("Grant {id}"),
            organization: "Example Foundation".to_string(),
            description: String::new(),
            link: "https://example.org".to_string(),
            amount_display: "$500".to_string(),
            amount_numeric: 500,
            currency: "USD".to_string(),
            deadline: "2027-05-01".to_string(),
            tags: vec!["stem".to_string()],
            eligibility: vec!["Undergraduates".to_string()],
            requirements: Vec::new(),
            popularity: 50,
            is_featured: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[derive(Debug, Clone)]
    struct Seen {
        method: String,
        path: String,
        query: String,
        apikey: Option<String>,
        authorization: Option<String>,
        body: String,
    }

    /// In-memory stand-in for the PostgREST endpoints the store calls.
    #[derive(Default)]
    struct FakeRest {
        rows: Mutex<Vec<Value>>,
        contacts: Mutex<Vec<Value>>,
        seen: Mutex<Vec<Seen>>,
        reject_insert: bool,
    }

    impl FakeRest {
        fn seen(&self) -> Vec<Seen> {
            self.seen.lock().unwrap().clone()
        }
    }

    fn header(headers: &HeaderMap, name: &str) -> Option<String> {
        headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
    }

    async fn handle(
        State(rest): State<Arc<FakeRest>>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: String,
    ) -> (StatusCode, String) {
        rest.seen.lock().unwrap().push(Seen {
            method: method.as_str().to_string(),
            path: uri.path().to_string(),
            query: uri.query().unwrap_or_default().to_string(),
            apikey: header(&headers, "apikey"),
            authorization: header(&headers, "authorization"),
            body: body.clone(),
        });

        match (method.as_str(), uri.path()) {
            ("DELETE", "/rest/v1/grants_cache") => {
                rest.rows.lock().unwrap().clear();
                (StatusCode::NO_CONTENT, String::new())
            }
            ("POST", "/rest/v1/grants_cache") if rest.reject_insert => {
                (StatusCode::CONFLICT, r#"{"code":"23505","message":"duplicate key"}"#.to_string())
            }
            ("POST", "/rest/v1/grants_cache") => {
                let batch: Vec<Value> = serde_json::from_str(&body).unwrap_or_default();
                rest.rows.lock().unwrap().extend(batch);
                (StatusCode::CREATED, String::new())
            }
            ("GET", "/rest/v1/grants_cache") => {
                (StatusCode::OK, Value::Array(rest.rows.lock().unwrap().clone()).to_string())
            }
            ("POST", "/rest/v1/rpc/refresh_popular_open") => (StatusCode::NO_CONTENT, String::new()),
            ("POST", "/rest/v1/contact_messages") => {
                rest.contacts.lock().unwrap().push(serde_json::from_str(&body).unwrap_or(Value::Null));
                (StatusCode::CREATED, String::new())
            }
            _ => (StatusCode::NOT_FOUND, "unknown route".to_string()),
        }
    }

    async fn serve(rest: Arc<FakeRest>) -> String {
        let app = Router::new().fallback(handle).with_state(rest);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    async fn seeded(rest: FakeRest) -> (Arc<FakeRest>, SupabaseStore) {
        rest.rows.lock().unwrap().push(serde_json::to_value(grant("old")).unwrap());
        let rest = Arc::new(rest);
        let url = serve(rest.clone()).await;
        (rest, store(&url))
    }

    #[test]
    fn test_rest_url() {
        assert_eq!(store("https://abc.supabase.co").rest_url, "https://abc.supabase.co/rest/v1");
        assert_eq!(
            store("https://abc.supabase.co/").table_url("grants_cache"),
            "https://abc.supabase.co/rest/v1/grants_cache"
        );
    }

    #[test]
    fn test_rejects_empty_key() {
        let result = SupabaseStore::new("https://abc.supabase.co", " ", Duration::from_secs(2), "ua");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_bad_url() {
        let result = SupabaseStore::new("abc.supabase.co", "key", Duration::from_secs(2), "ua");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_persistence_error() {
        let store = store("http://127.0.0.1:9");
        let result = store.cached_grants().await;
        assert!(matches!(result, Err(Error::Persistence(msg)) if msg.contains("select grants_cache")));
    }

    #[tokio::test]
    async fn test_replace_cache_deletes_then_bulk_inserts() {
        let (rest, store) = seeded(FakeRest::default()).await;

        store.replace_cache(&[grant("a"), grant("b")]).await.unwrap();

        let seen = rest.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].method, "DELETE");
        assert_eq!(seen[0].path, "/rest/v1/grants_cache");
        assert_eq!(seen[0].query, "id=neq.");
        assert_eq!(seen[1].method, "POST");

        let body: Vec<Value> = serde_json::from_str(&seen[1].body).unwrap();
        assert_eq!(body.len(), 2);
        assert_eq!(body[0]["id"], "a");
        assert_eq!(body[0]["is_featured"], true);
        assert!(body[0].get("created_at").is_none());
    }

    #[tokio::test]
    async fn test_requests_carry_service_key() {
        let (rest, store) = seeded(FakeRest::default()).await;
        store.cached_grants().await.unwrap();

        let seen = rest.seen();
        assert_eq!(seen[0].apikey.as_deref(), Some("service-key"));
        assert_eq!(seen[0].authorization.as_deref(), Some("Bearer service-key"));
    }

    #[tokio::test]
    async fn test_cached_grants_decodes_rows() {
        let (rest, store) = seeded(FakeRest::default()).await;
        store.replace_cache(&[grant("a"), grant("b")]).await.unwrap();

        let rows = store.cached_grants().await.unwrap();
        let ids: Vec<_> = rows.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(rows[0].tags, vec!["stem"]);

        let select = rest.seen().into_iter().find(|s| s.method == "GET").unwrap();
        assert_eq!(select.query, "select=*");
    }

    #[tokio::test]
    async fn test_empty_batch_only_clears() {
        let (rest, store) = seeded(FakeRest::default()).await;
        store.replace_cache(&[]).await.unwrap();

        let seen = rest.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "DELETE");
        assert!(store.cached_grants().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_cache_empty() {
        let (_, store) = seeded(FakeRest { reject_insert: true, ..FakeRest::default() }).await;

        let result = store.replace_cache(&[grant("a")]).await;
        assert!(matches!(&result, Err(Error::Persistence(msg)) if msg.contains("insert grants_cache") && msg.contains("409")));
        assert!(store.cached_grants().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_popular_calls_rpc() {
        let (rest, store) = seeded(FakeRest::default()).await;
        store.refresh_popular().await.unwrap();

        let seen = rest.seen();
        assert_eq!(seen[0].method, "POST");
        assert_eq!(seen[0].path, "/rest/v1/rpc/refresh_popular_open");
        assert_eq!(seen[0].body, "{}");
    }

    #[tokio::test]
    async fn test_save_contact_posts_message() {
        let (rest, store) = seeded(FakeRest::default()).await;
        let message = ContactMessage {
            name: "Ada".into(),
            email: "ada@example.org".into(),
            subject: None,
            message: "Hello".into(),
        };

        store.save_contact(&message).await.unwrap();

        let contacts = rest.contacts.lock().unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0]["email"], "ada@example.org");
        assert!(contacts[0].get("subject").is_none());
    }

    #[tokio::test]
    async fn test_http_error_is_persistence_error() {
        let rest = Arc::new(FakeRest::default());
        let url = serve(rest).await;
        let store = SupabaseStore::new(&format!("{url}/missing"), "service-key", Duration::from_secs(2), "t").unwrap();

        let result = store.refresh_popular().await;
        assert!(matches!(result, Err(Error::Persistence(msg)) if msg.contains("HTTP 404")));
    }
}
