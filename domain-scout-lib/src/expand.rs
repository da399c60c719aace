//! Candidate expansion: base names × suffixes.
//!
//! Pure and synchronous. The only failure mode is malformed input, which is
//! rejected as a whole; a batch is never partially expanded.

use crate::error::ScoutError;
use crate::types::{Candidate, ProbeBatch};
use std::collections::HashSet;
use tracing::debug;

/// Normalize a suffix to the `.label` form.
///
/// Trims whitespace, lowercases, and prepends the separator when the caller
/// wrote a bare label. Returns `None` for blank input.
///
/// ```
/// use domain_scout_lib::normalize_suffix;
///
/// assert_eq!(normalize_suffix("com"), Some(".com".to_string()));
/// assert_eq!(normalize_suffix(" .CO.UK "), Some(".co.uk".to_string()));
/// assert_eq!(normalize_suffix("  "), None);
/// ```
pub fn normalize_suffix(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches('.').to_lowercase();
    if trimmed.is_empty() {
        None
    } else {
        Some(format!(".{}", trimmed))
    }
}

/// Build the ordered cross product of base names and suffixes.
///
/// Order is base-name-major, suffix-minor, following input order. Names and
/// suffixes are trimmed and lowercased; repeats are collapsed keeping the
/// first occurrence.
///
/// # Errors
///
/// Returns `ScoutError::InvalidInput` if:
/// - `base_names` is empty, or any base name is blank
/// - a base name already carries a suffix (contains a '.')
/// - `suffixes` is empty or contains only blanks
///
/// # Example
///
/// ```
/// use domain_scout_lib::expand_candidates;
///
/// let names = vec!["acme".to_string(), "beta".to_string()];
/// let suffixes = vec![".com".to_string(), ".ai".to_string()];
/// let batch = expand_candidates(&names, &suffixes).unwrap();
///
/// let domains: Vec<&str> = batch.iter().map(|c| c.as_str()).collect();
/// assert_eq!(domains, ["acme.com", "acme.ai", "beta.com", "beta.ai"]);
/// ```
pub fn expand_candidates(
    base_names: &[String],
    suffixes: &[String],
) -> Result<ProbeBatch, ScoutError> {
    if base_names.is_empty() {
        return Err(ScoutError::invalid_input("base-name list is empty"));
    }

    let mut names = Vec::with_capacity(base_names.len());
    let mut seen = HashSet::new();
    for raw in base_names {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            return Err(ScoutError::invalid_input("base names cannot be blank"));
        }
        if name.contains('.') {
            return Err(ScoutError::invalid_input(format!(
                "base name '{}' must not include a suffix",
                name
            )));
        }
        if seen.insert(name.clone()) {
            names.push(name);
        } else {
            debug!(name = %name, "Dropping repeated base name");
        }
    }

    let mut normalized = Vec::with_capacity(suffixes.len());
    let mut seen = HashSet::new();
    for suffix in suffixes.iter().filter_map(|s| normalize_suffix(s)) {
        if seen.insert(suffix.clone()) {
            normalized.push(suffix);
        }
    }
    if normalized.is_empty() {
        return Err(ScoutError::invalid_input("suffix list is empty"));
    }

    let candidates = names
        .iter()
        .flat_map(|name| normalized.iter().map(move |suffix| Candidate::new(name, suffix)))
        .collect::<Vec<_>>();

    debug!(
        names = names.len(),
        suffixes = normalized.len(),
        candidates = candidates.len(),
        "Expanded candidates"
    );

    Ok(ProbeBatch::new(candidates))
}
