use tracing::{debug, trace};
use url::{form_urlencoded, Url};

use super::query::{normalize_query, query_value};
use super::redirector::{redirector_for, RedirectorRule};

/// Resolves a link to the destination it actually points at.
///
/// * Known job-key hosts carrying the key are rebuilt as
///   `https://<host>/viewjob?jk=<key>`, dropping every wrapper parameter.
/// * Known wrapping hosts carrying the target parameter yield the
///   percent-decoded value of that parameter. The decoded string is not
///   checked for being a URL.
/// * Anything else comes back with its query normalized and every other
///   component left exactly as written.
///
/// Never fails: text that does not parse as a URL goes through the last
/// branch.
///
/// # Arguments
/// * `url` - The link as stored in the sheet
///
/// # Returns
/// * `String` - The destination link, ready for `normalize_final_url`
pub fn extract_target_url(url: &str) -> String {
    let parts = UrlParts::split(url);

    match Url::parse(url) {
        Ok(parsed) => {
            if let Some(host) = parsed.host_str() {
                if let Some(rule) = redirector_for(host) {
                    if let Some(value) = query_value(parts.query, rule.param()) {
                        return resolve_redirect(host, rule, &value);
                    }
                    debug!("Redirector {} without '{}' parameter, keeping link", host, rule.param());
                }
            }
        }
        Err(e) => debug!("Link does not parse as a URL ({}): {}", e, url),
    }

    parts.with_query(&normalize_query(parts.query))
}

fn resolve_redirect(host: &str, rule: RedirectorRule, value: &str) -> String {
    match rule {
        RedirectorRule::JobKey { param } => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair(param, value)
                .finish();
            trace!("Rebuilding {} link from job key {}", host, value);
            format!("https://{}/viewjob?{}", host, query)
        }
        RedirectorRule::TargetParam { .. } => {
            let decoded = urlencoding::decode_binary(value.as_bytes());
            let target = String::from_utf8_lossy(&decoded).into_owned();
            trace!("Unwrapped {} link to {}", host, target);
            target
        }
    }
}

/// Textual split of a link into the part before `?`, the query and the
/// `#fragment` (kept with its `#`)
pub(crate) struct UrlParts<'a> {
    pub(crate) base: &'a str,
    pub(crate) query: &'a str,
    pub(crate) fragment: &'a str,
}

impl<'a> UrlParts<'a> {
    pub(crate) fn split(url: &'a str) -> Self {
        let (rest, fragment) = match url.find('#') {
            Some(index) => url.split_at(index),
            None => (url, ""),
        };
        let (base, query) = rest.split_once('?').unwrap_or((rest, ""));
        Self { base, query, fragment }
    }

    pub(crate) fn with_query(&self, query: &str) -> String {
        let mut out = String::with_capacity(self.base.len() + query.len() + self.fragment.len() + 1);
        out.push_str(self.base);
        if !query.is_empty() {
            out.push('?');
            out.push_str(query);
        }
        out.push_str(self.fragment);
        out
    }
}
