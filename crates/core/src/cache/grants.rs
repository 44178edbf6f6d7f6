//! Grants cache operations.
//!
//! The cache is rebuilt wholesale: every sync deletes all rows and inserts
//! the new batch inside one transaction, so readers never observe an empty
//! cache between the two statements.

use super::connection::CacheDb;
use crate::{ContactMessage, Error, GrantStore, NormalizedGrant};
use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, Row, types::Type};

const SELECT_GRANTS: &str = "SELECT
    id, source, title, organization, description, link,
    amount_display, amount_numeric, currency, deadline,
    tags_json, eligibility_json, requirements_json,
    popularity, is_featured, created_at, updated_at
FROM grants_cache ORDER BY rowid ASC";

/// A row of the `popular_open` view.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PopularGrant {
    pub id: String,
    pub title: String,
    pub organization: String,
    pub deadline: String,
    pub popularity: u8,
}

impl CacheDb {
    /// Delete every cache row and insert `grants` in a single transaction.
    ///
    /// Duplicate ids within the batch overwrite each other (last write wins).
    /// Returns the number of rows deleted.
    pub async fn replace_grants(&self, grants: &[NormalizedGrant]) -> Result<u64, Error> {
        let grants = grants.to_vec();
        let now = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                let deleted = tx.execute("DELETE FROM grants_cache WHERE id != ''", [])?;

                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO grants_cache (
                        id, source, title, organization, description, link,
                        amount_display, amount_numeric, currency, deadline,
                        tags_json, eligibility_json, requirements_json,
                        popularity, is_featured, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                              ?11, ?12, ?13, ?14, ?15, ?16, ?16)
                    ON CONFLICT(id) DO UPDATE SET
                        source = excluded.source,
                        title = excluded.title,
                        organization = excluded.organization,
                        description = excluded.description,
                        link = excluded.link,
                        amount_display = excluded.amount_display,
                        amount_numeric = excluded.amount_numeric,
                        currency = excluded.currency,
                        deadline = excluded.deadline,
                        tags_json = excluded.tags_json,
                        eligibility_json = excluded.eligibility_json,
                        requirements_json = excluded.requirements_json,
                        popularity = excluded.popularity,
                        is_featured = excluded.is_featured,
                        updated_at = excluded.updated_at",
                    )?;

                    for grant in &grants {
                        stmt.execute(params![
                            &grant.id,
                            &grant.source,
                            &grant.title,
                            &grant.organization,
                            &grant.description,
                            &grant.link,
                            &grant.amount_display,
                            grant.amount_numeric,
                            &grant.currency,
                            &grant.deadline,
                            serde_json::to_string(&grant.tags)?,
                            serde_json::to_string(&grant.eligibility)?,
                            serde_json::to_string(&grant.requirements)?,
                            i64::from(grant.popularity),
                            grant.is_featured as i32,
                            &now,
                        ])?;
                    }
                }

                tx.commit()?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Read every cache row in insertion order.
    pub async fn list_grants(&self) -> Result<Vec<NormalizedGrant>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<NormalizedGrant>, Error> {
                let mut stmt = conn.prepare(SELECT_GRANTS)?;
                let rows = stmt.query_map([], grant_from_row)?;
                let grants = rows.collect::<Result<Vec<_>, _>>()?;
                Ok(grants)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of rows currently cached.
    pub async fn grant_count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM grants_cache", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Rebuild `popular_open` from the cache, most popular first.
    ///
    /// Returns the number of rows in the rebuilt view.
    pub async fn refresh_popular_open(&self) -> Result<u64, Error> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM popular_open", [])?;
                let inserted = tx.execute(
                    "INSERT INTO popular_open (id, title, organization, deadline, popularity, refreshed_at)
                    SELECT id, title, organization, deadline, popularity, ?1
                    FROM grants_cache
                    ORDER BY popularity DESC",
                    params![now],
                )?;
                tx.commit()?;
                Ok(inserted as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Read the popular-open view, most popular first.
    #[cfg(test)]
    pub(crate) async fn popular_grants(&self, limit: usize) -> Result<Vec<PopularGrant>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<PopularGrant>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, title, organization, deadline, popularity
                    FROM popular_open ORDER BY popularity DESC, id ASC LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit], |row| {
                    Ok(PopularGrant {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        organization: row.get(2)?,
                        deadline: row.get(3)?,
                        popularity: u8::try_from(row.get::<_, i64>(4)?).unwrap_or(0),
                    })
                })?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(Error::from)
    }
}

fn grant_from_row(row: &Row<'_>) -> rusqlite::Result<NormalizedGrant> {
    Ok(NormalizedGrant {
        id: row.get(0)?,
        source: row.get(1)?,
        title: row.get(2)?,
        organization: row.get(3)?,
        description: row.get(4)?,
        link: row.get(5)?,
        amount_display: row.get(6)?,
        amount_numeric: row.get(7)?,
        currency: row.get(8)?,
        deadline: row.get(9)?,
        tags: json_list(row, 10)?,
        eligibility: json_list(row, 11)?,
        requirements: json_list(row, 12)?,
        popularity: u8::try_from(row.get::<_, i64>(13)?).unwrap_or(0),
        is_featured: row.get::<_, i32>(14)? == 1,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

fn json_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[async_trait]
impl GrantStore for CacheDb {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn replace_cache(&self, grants: &[NormalizedGrant]) -> Result<(), Error> {
        let deleted = self.replace_grants(grants).await?;
        tracing::debug!(deleted, inserted = grants.len(), "replaced sqlite grants cache");
        Ok(())
    }

    async fn cached_grants(&self) -> Result<Vec<NormalizedGrant>, Error> {
        self.list_grants().await
    }

    async fn refresh_popular(&self) -> Result<(), Error> {
        let rows = self.refresh_popular_open().await?;
        tracing::debug!(rows, "refreshed popular_open");
        Ok(())
    }

    async fn save_contact(&self, message: &ContactMessage) -> Result<(), Error> {
        self.insert_contact(message).await.map(|_| ())
    }
}
