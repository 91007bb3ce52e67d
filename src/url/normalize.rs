use crate::UrlError;
use url::form_urlencoded;
use url::Url;

/// Normalizes a URL so equivalent spellings compare equal
///
/// # Normalization Steps
///
/// 1. Parse as an absolute URL; reject if malformed
/// 2. Remove the fragment (everything after #)
/// 3. Sort query parameters by key and rebuild the query
///    (an empty query is dropped)
/// 4. Remove a trailing slash from a non-root path
///
/// No I/O and no shared state: the same input always yields the same output.
///
/// # Examples
///
/// ```
/// use onyx_harvest::url::normalize_url;
///
/// let url = normalize_url("https://docs.example.io/book/?b=2&a=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.io/book?a=1&b=2");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    url.set_fragment(None);

    if url.query().is_some() {
        let params = sorted_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (key, value) in &params {
                serializer.append_pair(key, value);
            }
            url.set_query(Some(&serializer.finish()));
        }
    }

    let path = url.path();
    if path != "/" && path.ends_with('/') {
        let trimmed = path[..path.len() - 1].to_string();
        url.set_path(&trimmed);
    }

    Ok(url)
}

/// Normalizes a URL and additionally requires an http(s) scheme and a host
///
/// Used for seeds, which must be fetchable.
pub fn normalize_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = normalize_url(url_str)?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns query parameters sorted by key; values of a repeated key keep their order
fn sorted_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_remove_trailing_slash() {
        let result = normalize_url("https://example.com/page/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_keep_root_slash() {
        let result = normalize_url("https://example.com/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = normalize_url("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_sort_query_params() {
        let result = normalize_url("https://example.com/page?b=2&a=1").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?a=1&b=2");
    }

    #[test]
    fn test_repeated_keys_keep_relative_order() {
        let result = normalize_url("https://example.com/page?tag=b&id=7&tag=a").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?id=7&tag=b&tag=a");
    }

    #[test]
    fn test_empty_query_dropped() {
        let result = normalize_url("https://example.com/page?").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_equivalent_spellings_normalize_identically() {
        let variants = [
            "https://docs.example.io/book/alloc?x=1&y=2",
            "https://docs.example.io/book/alloc?y=2&x=1",
            "https://docs.example.io/book/alloc/?x=1&y=2",
            "https://docs.example.io/book/alloc?y=2&x=1#heap",
            "https://docs.example.io/book/alloc/?x=1&y=2#top",
        ];

        let expected = normalize_url(variants[0]).unwrap();
        for variant in variants {
            assert_eq!(normalize_url(variant).unwrap(), expected, "variant {}", variant);
        }
    }

    #[test]
    fn test_path_case_preserved() {
        let result = normalize_url("https://docs.example.io/book/Overview.html").unwrap();
        assert_eq!(result.as_str(), "https://docs.example.io/book/Overview.html");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize_url("https://example.com/a/b/?z=1&a=2#x").unwrap();
        let twice = normalize_url(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(normalize_url("not a url"), Err(UrlError::Parse(_))));
        assert!(matches!(normalize_url("/relative/path"), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_http_url_rejects_other_schemes() {
        let result = normalize_http_url("ftp://example.com/page");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
        assert!(normalize_http_url("http://127.0.0.1:8080/docs/").is_ok());
    }
}
