//! Per-origin request profiles handed to the extractor.

use std::collections::HashMap;

use super::{OriginKey, TitleFallback};

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const CHROME_120_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const CHROME_91_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Whether browser cookies may be injected for an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CookiePolicy {
    /// Inject cookies when the operator enabled them.
    Allowed,
    /// Never send cookies, even if enabled globally.
    #[default]
    Never,
}

/// Extractor settings for one origin: request headers, cookie policy and the
/// format selector used for audio fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestProfile {
    pub user_agent: String,
    pub referer: Option<String>,
    /// Extra `Name: value` headers.
    pub headers: Vec<(String, String)>,
    pub cookies: CookiePolicy,
    /// Format selector passed to the fetch tool.
    pub format: String,
    /// Builds the label returned by the title lookup when the platform
    /// refuses access.
    pub fallback_title: Option<TitleFallback>,
}

impl Default for RequestProfile {
    fn default() -> Self {
        Self {
            user_agent: DESKTOP_UA.to_string(),
            referer: None,
            headers: Vec::new(),
            cookies: CookiePolicy::Never,
            format: "bestaudio/best".to_string(),
            fallback_title: None,
        }
    }
}

impl RequestProfile {
    /// Cookie source to use for this profile given the operator setting.
    pub fn cookies_for<'a>(&self, configured: Option<&'a str>) -> Option<&'a str> {
        match self.cookies {
            CookiePolicy::Allowed => configured,
            CookiePolicy::Never => None,
        }
    }
}

/// Lookup table: origin key → request profile. Unknown origins get the default.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: HashMap<OriginKey, RequestProfile>,
    default: RequestProfile,
}

impl ProfileTable {
    /// Empty table: every origin uses the default profile.
    pub fn new(default: RequestProfile) -> Self {
        Self {
            profiles: HashMap::new(),
            default,
        }
    }

    /// Built-in profiles for the platforms that need special handling.
    pub fn builtin() -> Self {
        let mut table = Self::new(RequestProfile::default());

        let authed = RequestProfile {
            cookies: CookiePolicy::Allowed,
            ..RequestProfile::default()
        };
        for family in ["youtube", "instagram", "facebook", "twitter"] {
            table.insert(OriginKey::from_host(family), authed.clone());
        }

        table.insert(
            OriginKey::from_host("twitch"),
            RequestProfile {
                user_agent: CHROME_120_UA.to_string(),
                referer: Some("https://www.twitch.tv/".to_string()),
                headers: vec![(
                    "Client-Id".to_string(),
                    "kimne78kx3ncx6brgo4mv6wki5h1ko".to_string(),
                )],
                cookies: CookiePolicy::Never,
                format: "bestaudio[ext=m4a]/bestaudio/best".to_string(),
                fallback_title: Some(TitleFallback::Twitch),
            },
        );

        table.insert(
            OriginKey::from_host("tiktok"),
            RequestProfile {
                user_agent: CHROME_91_UA.to_string(),
                format: "best[height<=720]/best".to_string(),
                cookies: CookiePolicy::Allowed,
                fallback_title: Some(TitleFallback::TikTok),
                ..RequestProfile::default()
            },
        );

        table
    }

    pub fn insert(&mut self, key: OriginKey, profile: RequestProfile) {
        self.profiles.insert(key, profile);
    }

    pub fn get(&self, key: &OriginKey) -> &RequestProfile {
        self.profiles.get(key).unwrap_or(&self.default)
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}
