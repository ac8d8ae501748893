//! Flags job-application rows whose links point at the same posting.

pub mod canonicalizer;
pub mod config;
pub mod dedup;
pub mod sheet;
pub mod utils;

pub use canonicalizer::{
    are_job_urls_same, canonical_key, extract_target_url, normalize_final_url, normalize_query,
};
pub use dedup::{Deduplicator, KeyStrategy};
