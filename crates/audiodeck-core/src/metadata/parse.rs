//! Parsing of extractor-printed metadata fields.

/// Display limit for titles, in characters.
pub const TITLE_MAX_CHARS: usize = 100;
const ELLIPSIS: &str = "...";

/// Parse `HH:MM:SS`, `MM:SS` or plain seconds (fractions allowed) into whole
/// seconds, rounding up. Anything unparseable is `0` (unknown).
pub fn parse_duration(raw: &str) -> u64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() > 3 {
        return 0;
    }
    let mut total = 0.0f64;
    for part in parts {
        match part.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => total = total * 60.0 + v,
            _ => return 0,
        }
    }
    total.ceil() as u64
}

/// Truncate to [`TITLE_MAX_CHARS`] characters, marking the cut with `...`.
pub fn truncate_title(title: &str) -> String {
    let title = title.trim();
    if title.chars().count() <= TITLE_MAX_CHARS {
        return title.to_string();
    }
    let keep = TITLE_MAX_CHARS - ELLIPSIS.len();
    let mut out: String = title.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
