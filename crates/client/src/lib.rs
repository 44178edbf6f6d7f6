//! Client code for grantbridge.
//!
//! This crate provides the completions API client, grant normalization,
//! and the Supabase REST store shared by the server.

pub mod record;
pub mod sonar;
pub mod supabase;
pub mod transform;

pub use record::{RawGrantRecord, grant_records_schema};
pub use sonar::{Completions, SonarClient, SonarConfig, SonarError, fetch_grant_records};
pub use supabase::SupabaseStore;
pub use transform::{GrantListing, ListGrammar, normalize_grants, parse_amount, split_list, to_listings};
