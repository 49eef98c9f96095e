//! Kubernetes resource name normalisation

use regex::Regex;
use std::sync::LazyLock;

/// Maximum length of a DNS-1123 label
pub const MAX_NAME_LENGTH: usize = 63;

static INVALID_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("name regex is valid"));

/// Convert an arbitrary string (an email address, a user name) into a valid
/// Kubernetes resource name
///
/// Lowercases, replaces every run of characters outside `[a-z0-9]` with a
/// single `-`, trims dashes from both ends and truncates to 63 characters.
pub fn to_valid_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let replaced = INVALID_RUN_RE.replace_all(&lower, "-");
    let trimmed = replaced.trim_matches('-');

    let mut result: String = trimmed.chars().take(MAX_NAME_LENGTH).collect();
    while result.ends_with('-') {
        result.pop();
    }
    result
}
