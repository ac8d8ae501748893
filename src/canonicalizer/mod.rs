//! Canonical comparison keys for job-posting links.
//!
//! Links reached through tracking wrappers, redirectors or with reordered
//! query strings collapse to one key when they name the same posting.
//! Every operation here is a pure string transformation and never fails;
//! malformed input simply produces a key nothing else matches.

pub mod final_url;
pub mod link_cleanup;
pub mod query;
pub mod redirector;
pub mod target;


pub use final_url::normalize_final_url;
pub use link_cleanup::{clean_link, CleanupPolicy};
pub use query::normalize_query;
pub use redirector::{redirector_for, RedirectorRule};
pub use target::extract_target_url;

/// Full canonical key of a link: the resolved target, normalized
pub fn canonical_key(url: &str) -> String {
    normalize_final_url(&extract_target_url(url))
}

/// True when both links resolve to the same canonical key
pub fn are_job_urls_same(url1: &str, url2: &str) -> bool {
    canonical_key(url1) == canonical_key(url2)
}
