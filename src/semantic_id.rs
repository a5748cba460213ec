//! Semantic identifier syntax
//!
//! A semantic ID is either a full IRI (`scheme://rest`) or a compact
//! `prefix:suffix` form. Scheme and prefix are ASCII word characters;
//! the remainder is non-empty and contains no whitespace.

use regex::Regex;
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:[0-9A-Za-z_]+://\S+|[0-9A-Za-z_]+:\S+)$").expect("semantic id pattern")
    })
}

/// True if `value` is a semantic ID
pub fn is_semantic_id(value: &str) -> bool {
    pattern().is_match(value)
}
