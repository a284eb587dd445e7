//! Classify extractor diagnostics into failure kinds.
//!
//! Drives the single cookie fallback in the resolver, the title fallback
//! labels, and the user-visible message recorded on failed jobs.

/// Coarse failure class derived from a tool's diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Sign-in wall, bot check or HTTP 403/429: the request itself was refused.
    AuthOrRateLimited,
    /// Live stream that is not currently broadcasting.
    Offline,
    NotFound,
    /// Private, deleted or otherwise unavailable media.
    Unavailable,
    /// Region or platform block.
    Blocked,
    Other,
}

const AUTH_SIGNATURES: &[&str] = &[
    "sign in to confirm",
    "login required",
    "http error 403",
    "http error 429",
    "too many requests",
    "rate-limit",
    "rate limit",
];
const OFFLINE_SIGNATURES: &[&str] = &["not currently live", "is offline", "stream offline"];
const NOT_FOUND_SIGNATURES: &[&str] = &["does not exist", "not found", "http error 404"];
const UNAVAILABLE_SIGNATURES: &[&str] = &["private", "unavailable", "deleted", "removed"];
const BLOCKED_SIGNATURES: &[&str] = &["blocked", "geo restrict", "not available in your country"];

/// Case-insensitive signature match over the diagnostic text. Order matters:
/// auth/rate-limit wins over everything since it is the only retryable kind.
pub fn classify_diagnostic(diagnostic: &str) -> FailureKind {
    let text = diagnostic.to_ascii_lowercase();
    let hit = |sigs: &[&str]| sigs.iter().any(|s| text.contains(s));

    if hit(AUTH_SIGNATURES) {
        FailureKind::AuthOrRateLimited
    } else if hit(OFFLINE_SIGNATURES) {
        FailureKind::Offline
    } else if hit(BLOCKED_SIGNATURES) {
        FailureKind::Blocked
    } else if hit(NOT_FOUND_SIGNATURES) {
        FailureKind::NotFound
    } else if hit(UNAVAILABLE_SIGNATURES) {
        FailureKind::Unavailable
    } else {
        FailureKind::Other
    }
}

impl FailureKind {
    /// Whether a cookie-bearing attempt that failed this way is retried once
    /// without cookies.
    pub fn allows_cookie_fallback(self) -> bool {
        matches!(self, FailureKind::AuthOrRateLimited)
    }

    /// Actionable sentence shown to the user.
    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::AuthOrRateLimited => {
                "The site refused the request (sign-in or rate limit). Wait a moment and try again."
            }
            FailureKind::Offline => "The stream is offline. Try a recorded video or clip instead.",
            FailureKind::NotFound => "The video was not found. Check the link and try again.",
            FailureKind::Unavailable => {
                "The video is private, deleted or unavailable. Check the link and try again."
            }
            FailureKind::Blocked => {
                "The site blocked access to this video. Try a different link."
            }
            FailureKind::Other => "Could not process this link. Check the link and try again.",
        }
    }
}
