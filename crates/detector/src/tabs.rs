//! Active-tab abstraction and target-page check

/// Host of the webmail page the agent operates on
pub const TARGET_HOST: &str = "mail.google.com";

/// Seam for querying the currently active browser tab
pub trait TabProvider: Send + Sync {
    /// URL of the active tab, if there is one with a URL
    fn active_tab_url(&self) -> Option<String>;
}

/// Whether a URL points at the target webmail page
pub fn is_target_page(url: &str) -> bool {
    url.contains(TARGET_HOST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_page_match() {
        assert!(is_target_page("https://mail.google.com/mail/u/0/#inbox"));
        assert!(is_target_page("https://mail.google.com/"));
    }

    #[test]
    fn test_non_target_pages() {
        assert!(!is_target_page("https://example.com/"));
        assert!(!is_target_page("https://calendar.google.com/"));
        assert!(!is_target_page("about:blank"));
    }
}
