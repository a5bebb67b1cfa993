/// Slur filter for message content.
/// Whole words from the list match on word boundaries; the patterns catch
/// the usual character swaps used to dodge the list.

use once_cell::sync::Lazy;
use regex::Regex;

static BANNED_WORDS: &[&str] = &[
    "nigger", "nigga", "niggers", "niggas", "n1gger", "n1gga",
    "faggot", "faggots", "f4ggot", "fag", "fags",
    "retard", "retards", "r3tard",
    "tranny", "trannies",
    "kike", "kikes",
    "chink", "chinks",
    "spic", "spics",
    "wetback", "wetbacks",
    "coon", "coons",
];

static BANNED_PATTERNS: &[&str] = &[
    r"n[i1!|]gg[ae3]r",
    r"f[a4@]gg[o0]t",
    r"r[e3]t[a4@]rd",
];

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    let alternatives = BANNED_WORDS
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives)).expect("banned word regex")
});

static PATTERN_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    BANNED_PATTERNS
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("banned pattern regex"))
        .collect()
});

/// Check if text contains profanity
/// Returns the matched text, if any
pub fn contains_profanity(text: &str) -> Option<String> {
    if let Some(m) = WORD_RE.find(text) {
        return Some(m.as_str().to_lowercase());
    }

    PATTERN_RES
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().to_lowercase())
}

/// Check if a ticket channel name is appropriate
pub fn validate_channel_name(name: &str) -> Result<(), String> {
    if contains_profanity(name).is_some() {
        return Err(
            "Channel name contains inappropriate language. Please choose a different name.".to_string()
        );
    }

    if name.trim().len() < 2 {
        return Err("Channel name must be at least 2 characters.".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert!(contains_profanity("hello there, how is the trade going?").is_none());
        // Word boundaries keep substrings from matching
        assert!(contains_profanity("scoons and spices").is_none());
    }

    #[test]
    fn test_profanity_detection() {
        assert_eq!(contains_profanity("you FAGGOT").as_deref(), Some("faggot"));
        assert!(contains_profanity("n!gger").is_some());
        assert!(contains_profanity("f@gg0t lol").is_some());
    }

    #[test]
    fn test_every_pattern_compiles() {
        assert_eq!(PATTERN_RES.len(), BANNED_PATTERNS.len());
        assert!(WORD_RE.is_match("KIKES"));
    }

    #[test]
    fn test_channel_names() {
        assert!(validate_channel_name("ticket-support-bob").is_ok());
        assert!(validate_channel_name("x").is_err());
        assert!(validate_channel_name("ticket-retard").is_err());
    }
}
