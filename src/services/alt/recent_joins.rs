use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use super::scorer::RecentJoin;

/// Trailing list of joiners per guild, compared against each new member
pub struct RecentJoins {
    window: Duration,
    joins: DashMap<u64, Vec<RecentJoin>>,
}

impl RecentJoins {
    pub fn new(window_minutes: i64) -> Self {
        Self {
            window: Duration::minutes(window_minutes),
            joins: DashMap::new(),
        }
    }

    /// Record a join, dropping joiners that have aged out of the window
    pub fn record(&self, guild_id: u64, join: RecentJoin) {
        let now = join.joined_at;
        let mut joins = self.joins.entry(guild_id).or_default();
        joins.retain(|j| now - j.joined_at <= self.window);
        joins.push(join);
    }

    /// Joiners of a guild still inside the window at `now`
    pub fn snapshot(&self, guild_id: u64, now: DateTime<Utc>) -> Vec<RecentJoin> {
        self.joins
            .get(&guild_id)
            .map(|joins| {
                joins
                    .iter()
                    .filter(|j| now - j.joined_at <= self.window)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop aged-out joiners and empty guilds. Returns how many guilds remain
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        self.joins.retain(|_, joins| {
            joins.retain(|j| now - j.joined_at <= self.window);
            !joins.is_empty()
        });
        self.joins.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(user_id: u64, at: DateTime<Utc>) -> RecentJoin {
        RecentJoin {
            user_id,
            name: format!("user{}", user_id),
            joined_at: at,
        }
    }

    #[test]
    fn test_window_prunes_old_joiners() {
        let tracker = RecentJoins::new(30);
        let start = Utc::now();

        tracker.record(1, join(1, start));
        tracker.record(1, join(2, start + Duration::minutes(20)));
        tracker.record(1, join(3, start + Duration::minutes(45)));

        let ids: Vec<u64> = tracker
            .snapshot(1, start + Duration::minutes(45))
            .iter()
            .map(|j| j.user_id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_guilds_are_separate() {
        let tracker = RecentJoins::new(30);
        let now = Utc::now();

        tracker.record(1, join(1, now));
        assert!(tracker.snapshot(2, now).is_empty());
        assert_eq!(tracker.snapshot(1, now).len(), 1);
    }

    #[test]
    fn test_prune_drops_empty_guilds() {
        let tracker = RecentJoins::new(30);
        let now = Utc::now();

        tracker.record(1, join(1, now));
        tracker.record(2, join(2, now + Duration::minutes(40)));
        assert_eq!(tracker.prune(now + Duration::minutes(50)), 1);
    }
}
