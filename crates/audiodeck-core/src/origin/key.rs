use anyhow::{Context, Result};
use std::fmt;

/// Platform families whose hosts (and any subdomain of them) collapse to a
/// single key, so limits apply per logical service rather than per hostname.
const PLATFORM_FAMILIES: &[(&str, &[&str])] = &[
    (
        "youtube",
        &["youtube.com", "youtu.be", "youtube-nocookie.com", "youtube.googleapis.com"],
    ),
    ("twitch", &["twitch.tv"]),
    ("tiktok", &["tiktok.com"]),
    ("twitter", &["twitter.com", "x.com", "t.co"]),
    ("instagram", &["instagram.com", "instagr.am"]),
    ("facebook", &["facebook.com", "fb.watch", "fb.com"]),
    ("soundcloud", &["soundcloud.com", "snd.sc"]),
    ("vimeo", &["vimeo.com"]),
];

/// Key used to group extractor work for concurrency limiting and request
/// profile lookup.
///
/// Unlike a plain `(scheme, host, port)` triple this drops scheme and port:
/// rate limiting on the remote side is per service, so `m.youtube.com` and
/// `youtu.be` must share one queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct OriginKey(String);

impl OriginKey {
    /// Construct an origin key from a URL string.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed =
            url::Url::parse(url).with_context(|| format!("invalid URL for origin key: {url}"))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("URL missing host for origin key: {url}"))?;
        Ok(Self::from_host(host))
    }

    /// Canonicalize a bare host name.
    pub fn from_host(host: &str) -> Self {
        let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);

        for (family, domains) in PLATFORM_FAMILIES {
            let member = domains
                .iter()
                .any(|d| host == *d || host.ends_with(&format!(".{d}")));
            if member {
                return Self((*family).to_string());
            }
        }
        Self(host.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
