//! SQLite-backed grants cache.
//!
//! Local persistence used when no Supabase project is configured. Async
//! access goes through tokio-rusqlite. It provides:
//!
//! - The `grants_cache` table (at most five featured rows)
//! - A `popular_open` table standing in for the hosted materialized view
//! - The `contact_messages` inbox
//! - Automatic schema migrations

pub mod connection;
pub mod contact;
pub mod grants;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
