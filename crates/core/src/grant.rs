//! Grant records shared by the sync pipeline, the stores, and the API.

use serde::{Deserialize, Serialize};

/// Maximum number of rows the cache table holds after a sync.
pub const CACHE_CAPACITY: usize = 5;

/// Number of cached grants returned per featured-grants request.
pub const FEATURED_SAMPLE_SIZE: usize = 3;

/// Source tag stamped on every grant produced by the completions pipeline.
pub const GRANT_SOURCE: &str = "perplexity";

/// A grant in the fixed cache schema.
///
/// Recreated wholesale on every sync. `created_at`/`updated_at` are assigned
/// by the backend and are absent until the row has been read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedGrant {
    pub id: String,
    pub source: String,
    pub title: String,
    pub organization: String,
    pub description: String,
    pub link: String,
    pub amount_display: String,
    pub amount_numeric: i64,
    pub currency: String,
    pub deadline: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub eligibility: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub popularity: u8,
    pub is_featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Collapse duplicate ids, cap to the cache capacity and flag every row featured.
///
/// Ids are derived from organization and title and can collide. The later
/// record replaces the earlier one in place, before the cap is applied, so
/// every store receives the same unique rows.
pub fn prepare_cache_batch(grants: Vec<NormalizedGrant>) -> Vec<NormalizedGrant> {
    let mut batch: Vec<NormalizedGrant> = Vec::with_capacity(grants.len());
    for mut grant in grants {
        grant.is_featured = true;
        grant.created_at = None;
        grant.updated_at = None;

        match batch.iter_mut().find(|kept| kept.id == grant.id) {
            Some(kept) => *kept = grant,
            None => batch.push(grant),
        }
    }

    batch.truncate(CACHE_CAPACITY);
    batch
}

/// A message submitted through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

impl ContactMessage {
    /// Reject blank fields and obviously malformed addresses.
    pub fn validate(&self) -> Result<(), crate::Error> {
        for (field, value) in [("name", &self.name), ("email", &self.email), ("message", &self.message)] {
            if value.trim().is_empty() {
                return Err(crate::Error::InvalidInput(format!("{field} is required")));
            }
        }

        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(crate::Error::InvalidInput("email is not a valid address".into())),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn grant(id: &str) -> NormalizedGrant {
        NormalizedGrant {
            id: id.to_string(),
            source: GRANT_SOURCE.to_string(),
            title: format!("Grant {id}"),
            organization: "Example Foundation".to_string(),
            description: "Supports students".to_string(),
            link: "https://example.org/apply".to_string(),
            amount_display: "$2,500".to_string(),
            amount_numeric: 2500,
            currency: "USD".to_string(),
            deadline: "2027-03-01".to_string(),
            tags: vec!["stem".to_string()],
            eligibility: vec!["Undergraduate students".to_string()],
            requirements: vec!["Essay".to_string()],
            popularity: 42,
            is_featured: false,
            created_at: None,
            updated_at: None,
        }
    }
}
