use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::automod::{CAPS_MIN_LENGTH, CAPS_RATIO, MENTION_LIMIT};

static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("link regex"));

/// All http(s) links in a message
pub fn extract_links(content: &str) -> Vec<&str> {
    LINK_RE.find_iter(content).map(|m| m.as_str()).collect()
}

pub fn has_links(content: &str) -> bool {
    !extract_links(content).is_empty()
}

/// User plus role mentions at or over the limit
pub fn is_mention_spam(user_mentions: usize, role_mentions: usize) -> bool {
    user_mentions + role_mentions >= MENTION_LIMIT
}

/// Long messages that are mostly uppercase.
/// The ratio is taken over every character, not just letters.
pub fn is_excessive_caps(content: &str) -> bool {
    let total = content.chars().count();
    if total < CAPS_MIN_LENGTH {
        return false;
    }

    let upper = content.chars().filter(|c| c.is_uppercase()).count();
    upper as f64 / total as f64 >= CAPS_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links() {
        let links = extract_links("check https://example.com/a and http://foo.bar now");
        assert_eq!(links, vec!["https://example.com/a", "http://foo.bar"]);
        assert!(!has_links("no links in www.example.com"));
    }

    #[test]
    fn test_mention_spam() {
        assert!(!is_mention_spam(3, 1));
        assert!(is_mention_spam(4, 1));
        assert!(is_mention_spam(0, 5));
    }

    #[test]
    fn test_caps() {
        assert!(!is_excessive_caps("SHORT CAPS"));
        assert!(is_excessive_caps("WHY IS NOBODY ANSWERING ME"));
        assert!(!is_excessive_caps("This is a perfectly normal sentence."));
    }
}
