//! URL Normalizer & Domain Classifier (Component A).
//!
//! Canonicalizes URLs for use as the crate-wide identity key, and decides
//! same-domain membership for the crawler's link filter.

use url::Url;

/// Normalize a raw URL into its canonical form.
///
/// Rules: scheme preserved; host lowercased; fragment removed; trailing
/// slash trimmed on non-root paths; query string preserved verbatim.
/// Idempotent: `normalize(normalize(u)) == normalize(u)`.
pub fn normalize(raw: &str) -> Option<String> {
    let mut parsed = Url::parse(raw).ok()?;

    parsed.set_fragment(None);

    let host = parsed.host_str()?.to_ascii_lowercase();
    parsed.set_host(Some(&host)).ok()?;

    let path = parsed.path().to_string();
    if path != "/" && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
        parsed.set_path(trimmed);
    }

    Some(parsed.to_string())
}

/// Resolve `href` against `base` and normalize the result, or `None` if
/// either URL is unparseable.
pub fn resolve(base: &str, href: &str) -> Option<String> {
    let base_url = Url::parse(base).ok()?;
    let joined = base_url.join(href).ok()?;
    normalize(joined.as_str())
}

/// The last two dot-separated labels of `host` (e.g. `en.wikipedia.org` ->
/// `wikipedia.org`). Single-label hosts return themselves.
pub fn base_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        host.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}

/// True iff the host of `url` shares a base domain with `base`.
pub fn same_domain(url: &str, base: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    base_domain(host) == base
}

/// Filtering policy enforced by the crawler: only `http`/`https` schemes are
/// followed, and `mailto:`/`javascript:` targets are rejected outright (their
/// canonical form, if any, never reaches the frontier).
pub fn is_followable_scheme(url: &str) -> bool {
    if url.starts_with("mailto:") || url.starts_with("javascript:") {
        return false;
    }
    matches!(Url::parse(url).ok().as_ref().map(|u| u.scheme()), Some("http") | Some("https"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "HTTP://Example.com/Foo/",
            "http://example.com/Foo#top",
            "http://example.com/Foo",
            "https://a.b.com/x/y/?q=1#frag",
            "http://Example.com/",
        ];
        for s in samples {
            let once = normalize(s).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice, "not idempotent for {s}");
        }
    }

    #[test]
    fn fragment_and_case_and_slash_equivalence() {
        let a = normalize("http://H/p#x").unwrap();
        let b = normalize("http://h/p/").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn s2_three_forms_agree() {
        let a = normalize("HTTP://Example.com/Foo/").unwrap();
        let b = normalize("http://example.com/Foo#top").unwrap();
        let c = normalize("http://example.com/Foo").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn root_path_slash_preserved() {
        let n = normalize("http://example.com/").unwrap();
        assert_eq!(n, "http://example.com/");
    }

    #[test]
    fn query_string_preserved_verbatim() {
        let n = normalize("http://example.com/search/?q=rust&page=2").unwrap();
        assert!(n.ends_with("?q=rust&page=2"));
    }

    #[test]
    fn base_domain_multi_label_host() {
        assert_eq!(base_domain("en.wikipedia.org"), "wikipedia.org");
        assert_eq!(base_domain("wikipedia.org"), "wikipedia.org");
        assert_eq!(base_domain("localhost"), "localhost");
    }

    #[test]
    fn same_domain_across_subdomains() {
        assert!(same_domain("https://en.wikipedia.org/wiki/Rust", "wikipedia.org"));
        assert!(!same_domain("https://example.com/", "wikipedia.org"));
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(!is_followable_scheme("mailto:a@b.com"));
        assert!(!is_followable_scheme("javascript:void(0)"));
        assert!(is_followable_scheme("http://example.com/"));
        assert!(is_followable_scheme("https://example.com/"));
        assert!(!is_followable_scheme("ftp://example.com/file"));
    }
}
