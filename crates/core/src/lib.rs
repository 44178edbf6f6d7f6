//! Core types and shared functionality for grantbridge.
//!
//! This crate provides:
//! - Grant, profile and contact types
//! - The `GrantStore` persistence seam and its SQLite implementation
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod grant;
pub mod profile;
pub mod store;

pub use cache::CacheDb;
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use grant::{
    CACHE_CAPACITY, ContactMessage, FEATURED_SAMPLE_SIZE, GRANT_SOURCE, NormalizedGrant, prepare_cache_batch,
};
pub use profile::{LegacyProfile, StoredProfile};
pub use store::GrantStore;
