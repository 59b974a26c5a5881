//! Identifier normalization.
//!
//! Source identifiers arrive as `A-01`, `a 01`, `A_01` and so on. Linkage between
//! records always goes through [`normalize_id`] so that all of them refer to `A01`.

/// Uppercases the identifier and drops every character that is not `A-Z` or `0-9`.
pub fn normalize_id(id: &str) -> String {
    id.chars()
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Returns true when both identifiers normalize to the same value.
pub fn ids_match(a: &str, b: &str) -> bool {
    normalize_id(a) == normalize_id(b)
}

/// Compares an optional link against an identifier. A missing link never matches.
pub fn link_matches(link: Option<&str>, id: &str) -> bool {
    link.is_some_and(|l| ids_match(l, id))
}
