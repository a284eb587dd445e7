//! Clip filename sanitization and timestamped naming.

use std::time::{SystemTime, UNIX_EPOCH};

/// Room left for the timestamp, id prefix and extension under NAME_MAX.
const NAME_MAX: usize = 200;
const FALLBACK_NAME: &str = "clip";

/// Sanitizes a user-supplied clip name for use as a single path component.
///
/// - Replaces NUL, `/`, `\`, shell/Windows-hostile characters, whitespace
///   and control characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing spaces, dots and underscores (no hidden files,
///   no `..`)
/// - Limits length; an empty result becomes `clip`
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let replacement = match c {
            '\0' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let mut trimmed = out.trim_matches(|c| c == '.' || c == '_').to_string();
    while trimmed.contains("..") {
        trimmed = trimmed.replace("..", ".");
    }

    let mut take = trimmed.len().min(NAME_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    let cut = trimmed[..take].trim_end_matches(|c| c == '.' || c == '_');
    if cut.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cut.to_string()
    }
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn strip_ext<'a>(name: &'a str, ext: &str) -> &'a str {
    let suffix = format!(".{ext}");
    if name.len() > suffix.len() && name.to_ascii_lowercase().ends_with(&suffix) {
        &name[..name.len() - suffix.len()]
    } else {
        name
    }
}

/// `<unixMillis>_<name>_<idPrefix>.<ext>` for a fetched clip.
pub fn job_output_filename(name: &str, id_prefix: &str, ext: &str) -> String {
    let name = sanitize_filename(strip_ext(name.trim(), ext));
    format!("{}_{}_{}.{}", unix_millis(), name, id_prefix, ext)
}

/// `<unixMillis>_<name>.mp3` for a trimmed clip.
pub fn trim_output_filename(name: &str) -> String {
    let name = sanitize_filename(strip_ext(name.trim(), "mp3"));
    format!("{}_{}.mp3", unix_millis(), name)
}

/// `<unixMillis>_<original>` for an uploaded file, extension kept.
pub fn upload_filename(original: &str) -> String {
    // Browsers may send a full client path.
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    format!("{}_{}", unix_millis(), sanitize_filename(base))
}
