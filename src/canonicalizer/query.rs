use url::form_urlencoded;

/// Parses a query string into decoded key/value pairs.
///
/// Repeated keys stay as separate pairs. Pairs with an empty value (`a=` or a
/// bare `a`) are dropped, so `?a=&b=1` and `?b=1` describe the same posting.
/// A leading `?` is tolerated.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Sorts the pairs of a query string by (key, value) and re-serializes them
/// with form-urlencoded escaping
pub fn normalize_query(query: &str) -> String {
    let mut pairs = parse_query(query);
    pairs.sort();

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish()
}

/// First value of `name` in the query, if any
pub fn query_value(query: &str, name: &str) -> Option<String> {
    parse_query(query)
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_by_key_then_value() {
        assert_eq!(normalize_query("b=2&a=9&a=1"), "a=1&a=9&b=2");
    }

    #[test]
    fn test_permutations_agree() {
        let expected = normalize_query("utm=x&jk=abc&from=home");
        for query in ["jk=abc&from=home&utm=x", "from=home&utm=x&jk=abc", "utm=x&from=home&jk=abc"] {
            assert_eq!(normalize_query(query), expected);
        }
    }

    #[test]
    fn test_blank_values_dropped() {
        assert_eq!(normalize_query("a=&b=1&c"), "b=1");
        assert_eq!(normalize_query(""), "");
    }

    #[test]
    fn test_reencodes_values() {
        assert_eq!(normalize_query("q=software%20engineer&loc=new+york"), "loc=new+york&q=software+engineer");
        assert_eq!(normalize_query("?next=%2Fjobs%3Fid%3D1"), "next=%2Fjobs%3Fid%3D1");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_query("z=%E2%9C%93&a=b+c&a=b%2Bc");
        assert_eq!(normalize_query(&once), once);
    }

    #[test]
    fn test_query_value_takes_first() {
        assert_eq!(query_value("jk=1&jk=2", "jk").as_deref(), Some("1"));
        assert_eq!(query_value("jk=&from=x", "jk"), None);
        assert_eq!(query_value("from=x", "jk"), None);
    }
}
