use once_cell::sync::Lazy;
use regex::Regex;

static PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)%").expect("percent pattern is valid"));

/// Finds the first decimal number immediately followed by `%`.
///
/// Returns `None` when the text carries no percentage; callers then only
/// update the progress description.
pub fn extract_percent(text: &str) -> Option<f64> {
    PERCENT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
