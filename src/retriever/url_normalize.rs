//! URL normalisation for accepted results.
//!
//! Produces the scheme-qualified form a result is published under, and
//! decides which candidates are probeable at all.

use url::Url;

/// Schemes the liveness prober can reach.
const PROBEABLE_SCHEMES: &[&str] = &["http", "https"];

/// Normalise a candidate URL.
///
/// Applies the following transformations:
///
/// 1. Trim surrounding whitespace.
/// 2. Qualify protocol-relative URLs (`//host/path`) with `https:`.
/// 3. Lowercase scheme and host and drop default ports (done by [`Url::parse`]).
/// 4. Remove the fragment (`#…`).
///
/// Returns `None` for relative or malformed URLs and for schemes other than
/// http(s); such candidates are unreachable by construction.
///
/// # Examples
///
/// ```
/// use link_retriever::retriever::url_normalize::normalize_url;
///
/// let url = normalize_url("HTTPS://Example.COM:443/Path#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/Path");
/// assert!(normalize_url("/relative/path").is_none());
/// ```
pub fn normalize_url(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    let qualified = if trimmed.starts_with("//") {
        format!("https:{trimmed}")
    } else {
        trimmed.to_owned()
    };

    let mut parsed = Url::parse(&qualified).ok()?;
    if !PROBEABLE_SCHEMES.contains(&parsed.scheme()) || parsed.host_str().is_none() {
        return None;
    }
    parsed.set_fragment(None);
    Some(parsed)
}
