//! Canonical text normalization.
//!
//! Every component compares cell text through this transform, so annotation
//! content stays comparable across re-renders no matter how the source
//! markup was formatted. Both functions are pure, total, and idempotent.

/// Derive the canonical form of raw cell text: strip `<...>` markup tags,
/// drop the non-breaking-space entity, collapse whitespace runs to a single
/// space, and trim.
pub fn normalize(raw: &str) -> String {
    let stripped = strip_tags(raw).replace("&nbsp;", "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive comparison key: [`normalize`], lowercased.
pub fn normalize_for_comparison(raw: &str) -> String {
    normalize(raw).to_lowercase()
}

/// Remove `<...>` spans. An unterminated `<` is kept literally rather than
/// swallowing the rest of the string.
fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        match rest[start + 1..].find('>') {
            Some(end) => rest = &rest[start + 1 + end + 1..],
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
