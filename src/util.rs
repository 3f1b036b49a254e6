// fsgraph/src/util.rs

/// Namespace prefix carried by store identifiers.
pub const ID_PREFIX: &str = "urn:uuid:";

/// Display-only abbreviation of an identifier: namespace stripped, first 8 chars.
/// Never use the result as a lookup key.
pub fn short_id(id: &str) -> String {
    let bare = id.strip_prefix(ID_PREFIX).unwrap_or(id);
    bare.chars().take(8).collect()
}

/// Hard cutoff at `max` chars (not bytes), no ellipsis.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte, _)) => &s[..byte],
        None => s,
    }
}

/* ================================== Tests ================================== */
