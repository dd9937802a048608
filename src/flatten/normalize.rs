//! Field-name normalization

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Normalize a field name to snake_case: lowercase, with every run of
/// non-alphanumeric characters collapsed to a single underscore.
///
/// `"Key 1 > #1"` becomes `"key_1_1"`.
pub fn normalize_name(name: &str) -> String {
    let lower = name.to_lowercase();
    NON_ALNUM
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}
