//! Anti-automation challenge page detection
//!
//! Challenge interstitials are recognized by characteristic phrases in the
//! page text. Detection is keyword-based and case-insensitive; the keyword
//! list is configurable, defaulting to the phrases the target site's CDN is
//! known to serve.

/// True if the body looks like a challenge interstitial rather than content
///
/// Keywords are matched case-insensitively against the whole document, which
/// covers both the `<title>` and the visible challenge text.
pub fn is_challenge_page(body: &str, keywords: &[String]) -> bool {
    if body.is_empty() || keywords.is_empty() {
        return false;
    }
    let haystack = body.to_lowercase();
    keywords
        .iter()
        .any(|keyword| haystack.contains(keyword.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_detects_challenge_title() {
        let keywords = SiteConfig::default().challenge_keywords;
        let body = "<html><head><title>Just a moment...</title></head><body></body></html>";
        assert!(is_challenge_page(body, &keywords));
    }

    #[test]
    fn test_detects_challenge_body_text() {
        let keywords = SiteConfig::default().challenge_keywords;
        let body = "<html><body><p>Checking your browser before accessing.</p></body></html>";
        assert!(is_challenge_page(body, &keywords));
    }

    #[test]
    fn test_regular_page_passes() {
        let keywords = SiteConfig::default().challenge_keywords;
        let body = "<html><body><div class=\"dictionary-items\">entries</div></body></html>";
        assert!(!is_challenge_page(body, &keywords));
    }

    #[test]
    fn test_empty_body_is_not_a_challenge() {
        let keywords = SiteConfig::default().challenge_keywords;
        assert!(!is_challenge_page("", &keywords));
    }
}
