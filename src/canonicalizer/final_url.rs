use tracing::debug;
use url::Url;

use super::query::normalize_query;
use super::target::UrlParts;

/// Reduces a URL to the string used as its comparison key.
///
/// The host is lower-cased and loses any leading `www.`, trailing `/` are
/// removed from the path, the query is normalized and the fragment dropped.
/// An empty path leaves no `/` and an empty query leaves no `?`.
///
/// Text that does not parse as an absolute URL (scheme-less links such as
/// `acme.com/jobs/1/`, or `mailto:` style values) gets the same path, query
/// and fragment treatment on its raw text; its host is left as written.
///
/// # Arguments
/// * `url` - The link to normalize, usually the output of `extract_target_url`
///
/// # Returns
/// * `String` - The comparison key; equal keys mean the same posting
pub fn normalize_final_url(url: &str) -> String {
    let trimmed = url.trim();
    let parsed = match Url::parse(trimmed) {
        Ok(parsed) if !parsed.cannot_be_a_base() => parsed,
        Ok(_) => return normalize_raw(trimmed),
        Err(e) => {
            debug!("Normalizing unparseable URL as text ({}): {}", e, trimmed);
            return normalize_raw(trimmed);
        }
    };

    let lowered = parsed.host_str().unwrap_or("").to_lowercase();
    let host = match lowered.trim_start_matches("www.") {
        "" => lowered.as_str(),
        stripped => stripped,
    };

    let mut key = String::with_capacity(trimmed.len());
    key.push_str(parsed.scheme());
    key.push_str("://");
    if !parsed.username().is_empty() {
        key.push_str(parsed.username());
        if let Some(password) = parsed.password() {
            key.push(':');
            key.push_str(password);
        }
        key.push('@');
    }
    key.push_str(host);
    if let Some(port) = parsed.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    key.push_str(parsed.path().trim_end_matches('/'));

    let query = normalize_query(parsed.query().unwrap_or(""));
    if !query.is_empty() {
        key.push('?');
        key.push_str(&query);
    }

    key
}

/// Textual fallback: fragment dropped, trailing `/` removed before the query,
/// query normalized
fn normalize_raw(text: &str) -> String {
    let parts = UrlParts::split(text);
    let base = parts.base.trim_end_matches('/');
    let query = normalize_query(parts.query);

    if query.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, query)
    }
}
