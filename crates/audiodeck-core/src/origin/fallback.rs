//! Display labels for media the platform refuses to describe.
//!
//! Labels carry whatever identifiers the link itself exposes (streamer name,
//! video or clip id), so a refused lookup still reads as something the user
//! recognizes.

use crate::tools::FailureKind;

/// Platform-specific label builder attached to a [`super::RequestProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleFallback {
    /// Only blocked posts: `TikTok Video (<id>)`.
    TikTok,
    /// Offline channels, missing VODs and unavailable videos or clips.
    Twitch,
}

impl TitleFallback {
    /// Label for `url` after a lookup failed as `kind`, or `None` when the
    /// failure should surface as an error.
    pub fn label(self, url: &str, kind: FailureKind) -> Option<String> {
        let segments = path_segments(url);
        let segs: Vec<&str> = segments.iter().map(String::as_str).collect();
        match self {
            TitleFallback::TikTok => tiktok_label(&segs, kind),
            TitleFallback::Twitch => twitch_label(&segs, kind),
        }
    }
}

fn tiktok_label(segs: &[&str], kind: FailureKind) -> Option<String> {
    if kind != FailureKind::Blocked {
        return None;
    }
    match segs {
        [user, "video", id, ..] if user.starts_with('@') && is_numeric(id) => {
            Some(format!("TikTok Video ({id})"))
        }
        _ => Some("TikTok Video".to_string()),
    }
}

fn twitch_label(segs: &[&str], kind: FailureKind) -> Option<String> {
    match kind {
        FailureKind::Offline => Some(match segs.first() {
            Some(streamer) => format!("Twitch Stream ({streamer} - Offline)"),
            None => "Twitch Stream (Offline)".to_string(),
        }),
        FailureKind::NotFound => Some("Twitch VOD (Not Found)".to_string()),
        FailureKind::Unavailable => Some(match segs {
            ["videos", id, ..] => format!("Twitch VOD ({id})"),
            [streamer, "v", id, ..] => format!("Twitch VOD ({streamer} - {id})"),
            [streamer, "clip", id, ..] => format!("Twitch Clip ({streamer} - {id})"),
            [streamer, ..] => format!("Twitch Stream ({streamer})"),
            [] => "Twitch Video".to_string(),
        }),
        _ => None,
    }
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Non-empty path segments; empty for unparseable URLs.
fn path_segments(url: &str) -> Vec<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .map(|s| s.filter(|seg| !seg.is_empty()).map(str::to_string).collect())
        })
        .unwrap_or_default()
}
