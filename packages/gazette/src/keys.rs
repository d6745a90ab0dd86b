//! Storage key derivation for mirrored documents.
//!
//! A document's key is its URL path without the leading `/`, so the bucket
//! mirrors the source site's directory layout and re-mirroring a URL
//! overwrites the same object.

/// Prefix for keys synthesized from URLs that have no usable path.
pub const FALLBACK_PREFIX: &str = "cgr";

/// Derives the storage key for `url`.
///
/// Never fails. The path is taken verbatim: no percent-encoding, no
/// dot-segment resolution, no separator rewriting. A URL with an empty
/// path maps to `cgr/<authority with dots replaced by underscores>.pdf`.
///
/// ```
/// use cgr_mirror_gazette::keys::build_key;
///
/// assert_eq!(
///     build_key("https://cgrfiles.cgr.go.cr/publico/docs_cgr/2025/SIGYD_D/SIGYD_D_2025026742.pdf"),
///     "publico/docs_cgr/2025/SIGYD_D/SIGYD_D_2025026742.pdf",
/// );
/// ```
#[must_use]
pub fn build_key(url: &str) -> String {
    let (authority, path) = split_url(url);

    let key = path.trim_start_matches('/');
    if key.is_empty() {
        log::debug!("'{url}' has no path, keying it by authority");
        return format!("{FALLBACK_PREFIX}/{}.pdf", authority.replace('.', "_"));
    }

    key.to_owned()
}

/// Splits `url` into its raw authority and path.
///
/// The scheme is dropped when present, the authority runs from `//` up to
/// the first `/`, `?` or `#`, and the path ends at the first `?` or `#`.
/// Input without a scheme or `//` is all path.
fn split_url(url: &str) -> (&str, &str) {
    let rest = match url.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => url,
    };

    let (authority, rest) = rest.strip_prefix("//").map_or(("", rest), |after| {
        after.split_at(after.find(['/', '?', '#']).unwrap_or(after.len()))
    });

    let path = rest.split(['?', '#']).next().unwrap_or_default();
    (authority, path)
}

/// Whether `s` is a URL scheme: a letter, then letters, digits, `+`, `-`
/// or `.`.
fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
