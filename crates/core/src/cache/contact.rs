//! Contact form inbox.

use super::connection::CacheDb;
use crate::{ContactMessage, Error};
use chrono::Utc;
use tokio_rusqlite::params;

impl CacheDb {
    /// Store a contact form submission. Returns the new row id.
    pub async fn insert_contact(&self, message: &ContactMessage) -> Result<i64, Error> {
        let message = message.clone();
        let now = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                conn.execute(
                    "INSERT INTO contact_messages (name, email, subject, message, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        message.name.trim(),
                        message.email.trim(),
                        &message.subject,
                        &message.message,
                        now
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(Error::from)
    }

    /// Most recent submissions first.
    #[cfg(test)]
    pub(crate) async fn recent_contacts(&self, limit: usize) -> Result<Vec<ContactMessage>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<ContactMessage>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT name, email, subject, message FROM contact_messages ORDER BY id DESC LIMIT ?1",
                )?;
                let rows = stmt.query_map(params![limit], |row| {
                    Ok(ContactMessage { name: row.get(0)?, email: row.get(1)?, subject: row.get(2)?, message: row.get(3)? })
                })?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(Error::from)
    }
}
