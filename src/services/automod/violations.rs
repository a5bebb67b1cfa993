use std::time::{Duration, Instant};

use dashmap::DashMap;
use sqlx::PgPool;

use crate::db::queries::violations;

/// In-memory mirror of the `violations` table, keyed by (guild_id, user_id).
///
/// The table stays the source of truth; entries here are dropped once a
/// user has been quiet for a while and reloaded on the next read.
#[derive(Default)]
pub struct ViolationCache {
    counts: DashMap<(u64, u64), (u32, Instant)>,
}

impl ViolationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, guild_id: u64, user_id: u64) -> Option<u32> {
        self.counts.get(&(guild_id, user_id)).map(|entry| entry.0)
    }

    pub fn set_at(&self, guild_id: u64, user_id: u64, count: u32, now: Instant) {
        self.counts.insert((guild_id, user_id), (count, now));
    }

    /// Current count, reading the table only on a cache miss
    pub async fn count(&self, pool: &PgPool, guild_id: u64, user_id: u64) -> Result<u32, sqlx::Error> {
        if let Some(count) = self.cached(guild_id, user_id) {
            return Ok(count);
        }

        let count = violations::get(pool, guild_id as i64, user_id as i64)
            .await?
            .map(|v| v.count.max(0) as u32)
            .unwrap_or(0);
        self.set_at(guild_id, user_id, count, Instant::now());
        Ok(count)
    }

    /// Bump the stored counter and mirror the new value
    pub async fn increment(&self, pool: &PgPool, guild_id: u64, user_id: u64) -> Result<u32, sqlx::Error> {
        let violation = violations::increment(pool, guild_id as i64, user_id as i64).await?;
        let count = violation.count.max(1) as u32;
        self.set_at(guild_id, user_id, count, Instant::now());
        Ok(count)
    }

    pub async fn clear(&self, pool: &PgPool, guild_id: u64, user_id: u64) -> Result<(), sqlx::Error> {
        violations::clear(pool, guild_id as i64, user_id as i64).await?;
        self.counts.remove(&(guild_id, user_id));
        Ok(())
    }

    /// Drop entries untouched for longer than `idle`. Returns how many were dropped
    pub fn prune_idle(&self, idle: Duration) -> usize {
        self.prune_idle_at(idle, Instant::now())
    }

    pub fn prune_idle_at(&self, idle: Duration, now: Instant) -> usize {
        let before = self.counts.len();
        self.counts
            .retain(|_, (_, touched)| now.saturating_duration_since(*touched) <= idle);
        before - self.counts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_counts_are_per_guild() {
        let cache = ViolationCache::new();
        let now = Instant::now();

        cache.set_at(1, 42, 3, now);
        assert_eq!(cache.cached(1, 42), Some(3));
        assert_eq!(cache.cached(2, 42), None);

        cache.set_at(1, 42, 4, now);
        assert_eq!(cache.cached(1, 42), Some(4));
    }

    #[test]
    fn test_prune_drops_quiet_users() {
        let cache = ViolationCache::new();
        let start = Instant::now();

        cache.set_at(1, 1, 2, start);
        cache.set_at(1, 2, 5, start + Duration::from_secs(50 * 60));

        let idle = Duration::from_secs(3600);
        assert_eq!(cache.prune_idle_at(idle, start + Duration::from_secs(61 * 60)), 1);
        assert_eq!(cache.cached(1, 1), None);
        assert_eq!(cache.cached(1, 2), Some(5));
    }
}
