use serde::Deserialize;
use tracing::trace;

use super::target::extract_target_url;

/// Hosts (matched as substrings of the whole link) whose query strings
/// identify the posting and must survive cleanup
pub const DEFAULT_QUERY_ALLOW_LIST: [&str; 4] = ["indeed", "builtin", "wellfound", "wiraa"];

/// Links containing this are resolved through `extract_target_url` after cleanup
pub const DEFAULT_REDIRECTOR_MARKER: &str = "www.indeed.com";

const PATH_SUFFIXES: [&str; 2] = ["/apply", "/application"];

/// Knobs of the loose row-level cleanup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CleanupPolicy {
    pub query_allow_list: Vec<String>,
    pub redirector_marker: String,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            query_allow_list: DEFAULT_QUERY_ALLOW_LIST.iter().map(|s| s.to_string()).collect(),
            redirector_marker: DEFAULT_REDIRECTOR_MARKER.to_string(),
        }
    }
}

impl CleanupPolicy {
    /// Whether the query string of `link` is kept
    pub fn keeps_query(&self, link: &str) -> bool {
        self.query_allow_list.iter().any(|host| link.contains(host.as_str()))
    }
}

/// Loose cleanup used to key spreadsheet rows.
///
/// Applied in order: everything from the first `?` is dropped unless the link
/// mentions an allow-listed host, one trailing `/` is removed, then a trailing
/// `/apply`, then a trailing `/application`. Links mentioning the redirector
/// marker finally go through [`extract_target_url`].
///
/// # Arguments
/// * `link` - The link as stored in the sheet
/// * `policy` - Allow-listed hosts and the redirector marker
///
/// # Returns
/// * `String` - The cleaned link, used as the row key by the cleanup strategy
pub fn clean_link(link: &str, policy: &CleanupPolicy) -> String {
    let mut link = link.trim();

    if link.contains('?') && !policy.keeps_query(link) {
        link = link.split('?').next().unwrap_or(link);
    }

    link = link.strip_suffix('/').unwrap_or(link);
    for suffix in PATH_SUFFIXES {
        link = link.strip_suffix(suffix).unwrap_or(link);
    }

    if link.contains(policy.redirector_marker.as_str()) {
        trace!("Resolving redirector link {}", link);
        return extract_target_url(link);
    }

    link.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tracking_query_and_apply_suffixes() {
        let policy = CleanupPolicy::default();
        assert_eq!(
            clean_link(
                "https://jobs.ashbyhq.com/worldly/6b2b92c8-5bc6-432a-91a1-5e5fb6fc1ad4/application/apply?",
                &policy
            ),
            "https://jobs.ashbyhq.com/worldly/6b2b92c8-5bc6-432a-91a1-5e5fb6fc1ad4"
        );
        assert_eq!(
            clean_link("https://boards.greenhouse.io/acme/jobs/42/?gh_src=abc", &policy),
            "https://boards.greenhouse.io/acme/jobs/42"
        );
    }

    #[test]
    fn test_only_one_slash_removed() {
        let policy = CleanupPolicy::default();
        assert_eq!(clean_link("https://acme.com/jobs//", &policy), "https://acme.com/jobs/");
    }

    #[test]
    fn test_apply_then_application_order() {
        let policy = CleanupPolicy::default();
        assert_eq!(clean_link("https://acme.com/1/apply/", &policy), "https://acme.com/1");
        // "/application" is checked after "/apply", never the other way round
        assert_eq!(
            clean_link("https://acme.com/1/apply/application", &policy),
            "https://acme.com/1/apply"
        );
    }

    #[test]
    fn test_allow_listed_hosts_keep_query() {
        let policy = CleanupPolicy::default();
        assert_eq!(
            clean_link("https://www.builtin.com/job/1?id=7", &policy),
            "https://www.builtin.com/job/1?id=7"
        );
        assert_eq!(
            clean_link("https://wellfound.com/jobs?job=1", &policy),
            "https://wellfound.com/jobs?job=1"
        );
    }

    #[test]
    fn test_indeed_links_resolve_job_key() {
        let policy = CleanupPolicy::default();
        assert_eq!(
            clean_link("https://www.indeed.com/rc/clk?jk=abc123&from=serp&vjs=3", &policy),
            "https://www.indeed.com/viewjob?jk=abc123"
        );
        // indeed on another host keeps its query but is not resolved
        assert_eq!(
            clean_link("https://uk.indeed.com/viewjob?jk=abc&from=x", &policy),
            "https://uk.indeed.com/viewjob?jk=abc&from=x"
        );
    }

    #[test]
    fn test_custom_allow_list() {
        let policy = CleanupPolicy {
            query_allow_list: vec!["lever.co".to_string()],
            ..CleanupPolicy::default()
        };
        assert_eq!(
            clean_link("https://jobs.lever.co/acme/1?lever-source=x", &policy),
            "https://jobs.lever.co/acme/1?lever-source=x"
        );
        assert_eq!(
            clean_link("https://www.builtin.com/job/1?id=7", &policy),
            "https://www.builtin.com/job/1"
        );
    }
}
