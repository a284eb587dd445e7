//! Submission validation.

use url::Url;

use crate::error::SubmitError;
use crate::origin::OriginKey;

/// Source URL must be absolute http(s) with a host and a non-root path.
pub fn validate_url(raw: &str) -> Result<OriginKey, SubmitError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SubmitError::Validation("missing video URL".to_string()));
    }
    let url = Url::parse(raw)
        .map_err(|e| SubmitError::Validation(format!("unparseable URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SubmitError::Validation(format!(
            "unsupported scheme: {}",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(SubmitError::Validation("URL has no host".to_string()));
    }
    if url.path().trim_matches('/').is_empty() {
        return Err(SubmitError::Validation(
            "URL does not point at a video".to_string(),
        ));
    }
    OriginKey::from_url(raw).map_err(|e| SubmitError::Validation(format!("{e:#}")))
}

/// URL plus a non-empty desired clip name.
pub fn validate_submission(url: &str, name: &str) -> Result<OriginKey, SubmitError> {
    if name.trim().is_empty() {
        return Err(SubmitError::Validation("missing clip name".to_string()));
    }
    validate_url(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_video_links() {
        let key = validate_submission("https://www.youtube.com/watch?v=abc", "song").unwrap();
        assert_eq!(key.as_str(), "youtube");
        assert!(validate_url("http://vimeo.com/123").is_ok());
    }

    #[test]
    fn rejects_bad_links() {
        for url in [
            "",
            "   ",
            "youtube.com/watch?v=abc",
            "ftp://example.com/file",
            "https://www.youtube.com/",
            "https://www.youtube.com",
            "file:///etc/passwd",
        ] {
            let err = validate_url(url).unwrap_err();
            assert!(matches!(err, SubmitError::Validation(_)), "{url:?}");
        }
    }

    #[test]
    fn rejects_missing_name() {
        let err = validate_submission("https://youtu.be/abc", "  ").unwrap_err();
        assert_eq!(err.reason(), "invalid_request");
    }
}
