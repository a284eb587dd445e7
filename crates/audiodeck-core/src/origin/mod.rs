//! Origin identity and per-origin request profiles.
//!
//! Every source URL maps to an [`OriginKey`]: the lowercased host with `www.`
//! stripped, where well-known platforms (and their shorteners/subdomains)
//! collapse to one canonical key. The key drives two things:
//! - which limiter queue extractor work waits in
//! - which [`RequestProfile`] (headers, referrer, cookie policy, format
//!   selector, title fallback) the extractor is invoked with
//!
//! Profiles are plain data in a [`ProfileTable`]; nothing else in the crate
//! branches on URL substrings.

mod fallback;
mod key;
mod profile;

pub use fallback::TitleFallback;
pub use key::OriginKey;
pub use profile::{CookiePolicy, ProfileTable, RequestProfile};

#[cfg(test)]
mod tests {
    use super::*;

    fn key(url: &str) -> String {
        OriginKey::from_url(url).unwrap().as_str().to_string()
    }

    #[test]
    fn plain_hosts_are_lowercased_and_strip_www() {
        assert_eq!(key("https://WWW.Example.com/video"), "example.com");
        assert_eq!(key("http://media.example.org:8080/a"), "media.example.org");
    }

    #[test]
    fn youtube_family_collapses() {
        for url in [
            "https://www.youtube.com/watch?v=abc",
            "https://m.youtube.com/watch?v=abc",
            "https://music.youtube.com/watch?v=abc",
            "https://youtu.be/abc",
            "https://www.youtube-nocookie.com/embed/abc",
        ] {
            assert_eq!(key(url), "youtube", "{url}");
        }
    }

    #[test]
    fn other_platform_families_collapse() {
        assert_eq!(key("https://clips.twitch.tv/SomeClip"), "twitch");
        assert_eq!(key("https://www.twitch.tv/videos/1"), "twitch");
        assert_eq!(key("https://vm.tiktok.com/ZM123/"), "tiktok");
        assert_eq!(key("https://x.com/user/status/1"), "twitter");
        assert_eq!(key("https://t.co/abc"), "twitter");
        assert_eq!(key("https://fb.watch/xyz/"), "facebook");
        assert_eq!(key("https://player.vimeo.com/video/1"), "vimeo");
    }

    #[test]
    fn lookalike_domains_do_not_join_a_family() {
        assert_eq!(key("https://notyoutube.com/watch"), "notyoutube.com");
        assert_eq!(key("https://youtube.com.evil.example/x"), "youtube.com.evil.example");
    }

    #[test]
    fn from_url_rejects_garbage_and_hostless_urls() {
        assert!(OriginKey::from_url("not a url").is_err());
        assert!(OriginKey::from_url("file:///tmp/clip.mp3").is_err());
    }

    #[test]
    fn profile_table_resolves_builtin_and_default_profiles() {
        let table = ProfileTable::builtin();

        let twitch = table.get(&OriginKey::from_host("clips.twitch.tv"));
        assert_eq!(twitch.referer.as_deref(), Some("https://www.twitch.tv/"));
        assert!(twitch.headers.iter().any(|(name, _)| name == "Client-Id"));
        assert_eq!(twitch.cookies, CookiePolicy::Never);
        assert_eq!(twitch.fallback_title, Some(TitleFallback::Twitch));

        let youtube = table.get(&OriginKey::from_host("youtu.be"));
        assert_eq!(youtube.cookies, CookiePolicy::Allowed);
        assert_eq!(youtube.format, "bestaudio/best");

        let tiktok = table.get(&OriginKey::from_host("vm.tiktok.com"));
        assert_eq!(tiktok.fallback_title, Some(TitleFallback::TikTok));

        let unknown = table.get(&OriginKey::from_host("example.com"));
        assert_eq!(unknown, &RequestProfile::default());
    }

    #[test]
    fn cookies_only_flow_when_profile_allows() {
        let table = ProfileTable::builtin();
        let youtube = table.get(&OriginKey::from_host("youtube.com"));
        let twitch = table.get(&OriginKey::from_host("twitch.tv"));
        assert_eq!(youtube.cookies_for(Some("firefox")), Some("firefox"));
        assert_eq!(youtube.cookies_for(None), None);
        assert_eq!(twitch.cookies_for(Some("firefox")), None);
    }
}
