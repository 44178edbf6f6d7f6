//! Normalization of raw grant records.
//!
//! Two shapes come out of here:
//!
//! - [`NormalizedGrant`] for the homepage cache (sync job)
//! - [`GrantListing`] for the live dashboard search

pub mod amount;
pub mod lists;

pub use amount::{ParsedAmount, parse_amount};
pub use lists::{ListGrammar, split_list};

use grantbridge_core::{GRANT_SOURCE, NormalizedGrant};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::record::RawGrantRecord;

pub const DEFAULT_TITLE: &str = "Untitled Grant";
pub const DEFAULT_ORGANIZATION: &str = "Unknown Organization";
pub const DEFAULT_AMOUNT: &str = "Varies";
pub const DEFAULT_DEADLINE: &str = "2099-12-31";
pub const DEFAULT_ELIGIBILITY: &str = "See official website for eligibility details";
pub const DEFAULT_DIFFICULTY: &str = "Medium";
pub const LISTING_DEFAULT_DEADLINE: &str = "Not specified";

/// Maximum length of a derived grant id, in characters.
pub const MAX_ID_CHARS: usize = 100;

/// Requirements grammar used when building the homepage cache.
pub const CACHE_REQUIREMENTS_GRAMMAR: ListGrammar = ListGrammar::Loose;

/// Requirements grammar used by the live dashboard search.
pub const LISTING_REQUIREMENTS_GRAMMAR: ListGrammar = ListGrammar::Requirements;

/// Grant as returned by `POST /api/grants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantListing {
    /// Position in this response. Not stable across requests.
    pub id: String,
    pub title: String,
    pub description: String,
    pub amount: String,
    pub deadline: String,
    pub eligibility: Vec<String>,
    pub organization: String,
    pub requirements: Vec<String>,
    pub tags: Vec<String>,
    pub link: String,
    pub difficulty: String,
}

/// Slug id from organization and title: lower-cased, whitespace runs
/// replaced by `-`, truncated to [`MAX_ID_CHARS`]. Not guaranteed unique.
pub fn grant_slug(organization: &str, title: &str) -> String {
    format!("{organization}-{title}")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(MAX_ID_CHARS)
        .collect()
}

fn text(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn eligibility(raw: &RawGrantRecord) -> Vec<String> {
    let items = text(&raw.eligibility)
        .map(|t| split_list(t, ListGrammar::Eligibility))
        .unwrap_or_default();

    if items.is_empty() { vec![DEFAULT_ELIGIBILITY.to_string()] } else { items }
}

fn list(field: &Option<String>, grammar: ListGrammar) -> Vec<String> {
    text(field).map(|t| split_list(t, grammar)).unwrap_or_default()
}

/// Normalize one record for the cache. Popularity is drawn from `rng`.
pub fn normalize_grant<R: Rng + ?Sized>(raw: &RawGrantRecord, rng: &mut R) -> NormalizedGrant {
    let title = text(&raw.title).unwrap_or(DEFAULT_TITLE);
    let organization = text(&raw.organization).unwrap_or(DEFAULT_ORGANIZATION);
    let amount_text = text(&raw.amount);
    let ParsedAmount { numeric, currency } = parse_amount(amount_text);

    NormalizedGrant {
        id: grant_slug(organization, title),
        source: GRANT_SOURCE.to_string(),
        title: title.to_string(),
        organization: organization.to_string(),
        description: text(&raw.description).unwrap_or_default().to_string(),
        link: text(&raw.link).unwrap_or_default().to_string(),
        amount_display: amount_text.unwrap_or(DEFAULT_AMOUNT).to_string(),
        amount_numeric: numeric,
        currency: currency.to_string(),
        deadline: text(&raw.deadline).unwrap_or(DEFAULT_DEADLINE).to_string(),
        tags: list(&raw.tags, ListGrammar::Tags),
        eligibility: eligibility(raw),
        requirements: list(&raw.requirements, CACHE_REQUIREMENTS_GRAMMAR),
        popularity: rng.gen_range(0..100),
        is_featured: true,
        created_at: None,
        updated_at: None,
    }
}

/// Normalize a whole batch, one grant per record.
pub fn normalize_grants<R: Rng + ?Sized>(records: &[RawGrantRecord], rng: &mut R) -> Vec<NormalizedGrant> {
    records.iter().map(|raw| normalize_grant(raw, rng)).collect()
}

/// Map records to dashboard listings, numbering them by position.
pub fn to_listings(records: &[RawGrantRecord]) -> Vec<GrantListing> {
    records
        .iter()
        .enumerate()
        .map(|(idx, raw)| GrantListing {
            id: idx.to_string(),
            title: text(&raw.title).unwrap_or(DEFAULT_TITLE).to_string(),
            description: text(&raw.description).unwrap_or_default().to_string(),
            amount: text(&raw.amount).unwrap_or(DEFAULT_AMOUNT).to_string(),
            deadline: text(&raw.deadline).unwrap_or(LISTING_DEFAULT_DEADLINE).to_string(),
            eligibility: eligibility(raw),
            organization: text(&raw.organization).unwrap_or(DEFAULT_ORGANIZATION).to_string(),
            requirements: list(&raw.requirements, LISTING_REQUIREMENTS_GRAMMAR),
            tags: list(&raw.tags, ListGrammar::Tags),
            link: text(&raw.link).unwrap_or_default().to_string(),
            difficulty: text(&raw.difficulty).unwrap_or(DEFAULT_DIFFICULTY).to_string(),
        })
        .collect()
}
