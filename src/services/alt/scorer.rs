//! Pure scoring of a new member's likelihood of being an alt account.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::alt::*;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+[0-9]+$").expect("name pattern regex"));

/// What the scorer needs to know about the joining member
#[derive(Debug, Clone)]
pub struct JoinProfile {
    pub user_id: u64,
    pub created_at: DateTime<Utc>,
    pub has_avatar: bool,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentJoin {
    pub user_id: u64,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        if score < MEDIUM_SCORE {
            RiskLevel::Low
        } else if score < HIGH_SCORE {
            RiskLevel::Medium
        } else if score < CRITICAL_SCORE {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltAction {
    None,
    LogAlert,
    Timeout,
}

impl AltAction {
    pub fn from_score(score: u32) -> Self {
        if score >= TIMEOUT_SCORE {
            AltAction::Timeout
        } else if score >= ALERT_SCORE {
            AltAction::LogAlert
        } else {
            AltAction::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AltAction::None => "none",
            AltAction::LogAlert => "alert",
            AltAction::Timeout => "timeout",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMatch {
    pub user_id: u64,
    pub name: String,
    pub similarity: f64,
}

#[derive(Debug, Clone)]
pub struct AltAssessment {
    pub score: u32,
    pub level: RiskLevel,
    pub reasons: Vec<String>,
    pub best_match: Option<SimilarMatch>,
    pub action: AltAction,
}

/// Score a joining member against the fixed heuristics and the recent joiners
pub fn assess(profile: &JoinProfile, recent: &[RecentJoin], now: DateTime<Utc>) -> AltAssessment {
    let mut score = 0;
    let mut reasons = Vec::new();

    let age = now - profile.created_at;
    if age < Duration::days(YOUNG_ACCOUNT_DAYS) {
        score += YOUNG_ACCOUNT_WEIGHT;
        reasons.push(format!("account is {} old", describe_age(age)));
    } else if age < Duration::days(NEW_ACCOUNT_DAYS) {
        score += NEW_ACCOUNT_WEIGHT;
        reasons.push(format!("account is {} old", describe_age(age)));
    }

    if !profile.has_avatar {
        score += NO_AVATAR_WEIGHT;
        reasons.push("no profile picture".to_string());
    }

    if matches_name_pattern(&profile.name) {
        score += NAME_PATTERN_WEIGHT;
        reasons.push("name looks generated (word + digits)".to_string());
    }

    let best_match = best_similar(profile, recent);
    if let Some(m) = &best_match {
        score += SIMILAR_NAME_WEIGHT;
        reasons.push(format!(
            "name is {:.0}% similar to recent joiner {}",
            m.similarity * 100.0,
            m.name
        ));
    }

    AltAssessment {
        score,
        level: RiskLevel::from_score(score),
        reasons,
        best_match,
        action: AltAction::from_score(score),
    }
}

pub fn matches_name_pattern(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Highest similarity at or above the threshold among the other recent joiners
fn best_similar(profile: &JoinProfile, recent: &[RecentJoin]) -> Option<SimilarMatch> {
    recent
        .iter()
        .filter(|join| join.user_id != profile.user_id)
        .map(|join| SimilarMatch {
            user_id: join.user_id,
            name: join.name.clone(),
            similarity: similarity(&profile.name, &join.name),
        })
        .filter(|m| m.similarity >= SIMILARITY_THRESHOLD)
        .max_by(|a, b| a.similarity.total_cmp(&b.similarity))
}

/// `1 - levenshtein / longest length` over lowercased names
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }

    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn describe_age(age: Duration) -> String {
    let days = age.num_days();
    if days >= 1 {
        format!("{} day{}", days, if days == 1 { "" } else { "s" })
    } else {
        let hours = age.num_hours().max(0);
        format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, age_days: i64, has_avatar: bool, now: DateTime<Utc>) -> JoinProfile {
        JoinProfile {
            user_id: 1,
            created_at: now - Duration::days(age_days),
            has_avatar,
            name: name.to_string(),
        }
    }

    fn joiner(user_id: u64, name: &str, now: DateTime<Utc>) -> RecentJoin {
        RecentJoin {
            user_id,
            name: name.to_string(),
            joined_at: now,
        }
    }

    #[test]
    fn test_fresh_generated_account_is_high() {
        let now = Utc::now();
        let result = assess(&profile("User482", 1, false, now), &[], now);

        assert_eq!(result.score, 5);
        assert_eq!(result.level, RiskLevel::High);
        assert_eq!(result.action, AltAction::LogAlert);
        assert_eq!(result.reasons.len(), 3);
        assert!(result.best_match.is_none());
    }

    #[test]
    fn test_established_account_scores_nothing() {
        let now = Utc::now();
        let result = assess(&profile("Marguerite", 400, true, now), &[], now);

        assert_eq!(result.score, 0);
        assert_eq!(result.level, RiskLevel::Low);
        assert_eq!(result.action, AltAction::None);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_week_old_account_scores_one() {
        let now = Utc::now();
        let result = assess(&profile("Marguerite", 5, true, now), &[], now);
        assert_eq!(result.score, 1);
    }

    #[test]
    fn test_three_day_old_account_is_only_new() {
        let now = Utc::now();
        let result = assess(&profile("Marguerite", YOUNG_ACCOUNT_DAYS, true, now), &[], now);
        assert_eq!(result.score, NEW_ACCOUNT_WEIGHT);
    }

    #[test]
    fn test_seven_day_old_account_scores_nothing() {
        let now = Utc::now();
        let result = assess(&profile("Marguerite", NEW_ACCOUNT_DAYS, true, now), &[], now);
        assert_eq!(result.score, 0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_similarity_at_threshold_counts() {
        let now = Utc::now();
        assert_eq!(similarity("abcd", "abce"), SIMILARITY_THRESHOLD);

        let recent = vec![joiner(2, "abce", now)];
        let result = assess(&profile("abcd", 400, true, now), &recent, now);

        assert_eq!(result.score, 2);
        assert_eq!(result.level, RiskLevel::Medium);
        assert_eq!(result.action, AltAction::LogAlert);
        assert_eq!(result.best_match.map(|m| m.user_id), Some(2));
    }

    #[test]
    fn test_score_three_stays_medium() {
        let now = Utc::now();
        let recent = vec![joiner(2, "abce", now)];
        let result = assess(&profile("abcd", 400, false, now), &recent, now);

        assert_eq!(result.score, 3);
        assert_eq!(result.level, RiskLevel::Medium);
        assert_eq!(result.action, AltAction::LogAlert);
    }

    #[test]
    fn test_lookalike_pushes_to_critical() {
        let now = Utc::now();
        let recent = vec![
            joiner(1, "User482", now),
            joiner(2, "User481", now),
            joiner(3, "Totally Different", now),
        ];
        let result = assess(&profile("User482", 1, false, now), &recent, now);

        assert_eq!(result.score, 7);
        assert_eq!(result.level, RiskLevel::Critical);
        assert_eq!(result.action, AltAction::Timeout);

        let best = result.best_match.expect("should match user 2");
        assert_eq!(best.user_id, 2);
    }

    #[test]
    fn test_similarity_bonus_applies_once() {
        let now = Utc::now();
        let recent = vec![joiner(2, "shadow", now), joiner(3, "shadow", now)];
        let result = assess(&profile("Shadow", 100, true, now), &recent, now);
        assert_eq!(result.score, SIMILAR_NAME_WEIGHT);
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("", ""), 0.0);
        assert_eq!(similarity("ABC", "abc"), 1.0);
        assert!((similarity("kitten", "sitting") - (1.0 - 3.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_levels() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(2), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(4), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(6), RiskLevel::Critical);
    }

    #[test]
    fn test_name_pattern() {
        assert!(matches_name_pattern("User482"));
        assert!(!matches_name_pattern("482User"));
        assert!(!matches_name_pattern("user_482"));
        assert!(!matches_name_pattern("User"));
    }
}
