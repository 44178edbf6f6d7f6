//! Persistence seam for the grants cache.
//!
//! The sync job owns the cache contents; the serving endpoint only reads.
//! Implemented by the local SQLite [`CacheDb`](crate::CacheDb) and by the
//! Supabase REST store in `grantbridge-client`.

use async_trait::async_trait;

use crate::{ContactMessage, Error, NormalizedGrant};

/// Backend holding the grants cache, the popular-grants view and contact messages.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Replace every cache row with `grants`.
    ///
    /// Callers pass a batch already capped with [`prepare_cache_batch`](crate::prepare_cache_batch).
    async fn replace_cache(&self, grants: &[NormalizedGrant]) -> Result<(), Error>;

    /// Read every cache row.
    async fn cached_grants(&self) -> Result<Vec<NormalizedGrant>, Error>;

    /// Rebuild the popular-open view from the cache.
    async fn refresh_popular(&self) -> Result<(), Error>;

    /// Persist a contact form submission.
    async fn save_contact(&self, message: &ContactMessage) -> Result<(), Error>;
}
