use std::collections::VecDeque;
use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Per-key sliding window of event timestamps.
///
/// Every `record` prunes hits older than the window before counting, so the
/// returned count is always the number of events in the trailing window.
pub struct RateWindow<K> {
    window: Duration,
    hits: DashMap<K, VecDeque<Instant>>,
}

impl<K: Eq + Hash + Clone> RateWindow<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            hits: DashMap::new(),
        }
    }

    /// Record an event now and return how many events are in the window
    pub fn record(&self, key: K) -> usize {
        self.record_at(key, Instant::now())
    }

    pub fn record_at(&self, key: K, now: Instant) -> usize {
        let mut events = self.hits.entry(key).or_default();
        prune(&mut events, now, self.window);
        events.push_back(now);
        events.len()
    }

    pub fn clear(&self, key: &K) {
        self.hits.remove(key);
    }

    /// Drop keys whose newest event is older than `idle`. Returns how many were dropped
    pub fn prune_idle(&self, idle: Duration) -> usize {
        self.prune_idle_at(idle, Instant::now())
    }

    pub fn prune_idle_at(&self, idle: Duration, now: Instant) -> usize {
        let before = self.hits.len();
        self.hits.retain(|_, events| {
            events
                .back()
                .map(|last| now.saturating_duration_since(*last) <= idle)
                .unwrap_or(false)
        });
        before - self.hits.len()
    }
}

fn prune(events: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(front) = events.front() {
        if now.saturating_duration_since(*front) > window {
            events.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_events_inside_window() {
        let window = RateWindow::new(Duration::from_secs(4));
        let start = Instant::now();

        for i in 0..6 {
            window.record_at(1u64, start + Duration::from_millis(i * 500));
        }
        assert_eq!(window.record_at(1u64, start + Duration::from_secs(3)), 7);
        // Other keys are independent
        assert_eq!(window.record_at(2u64, start), 1);
    }

    #[test]
    fn test_old_events_fall_out() {
        let window = RateWindow::new(Duration::from_secs(10));
        let start = Instant::now();

        window.record_at(7u64, start);
        window.record_at(7u64, start + Duration::from_secs(2));
        assert_eq!(window.record_at(7u64, start + Duration::from_secs(11)), 2);
        assert_eq!(window.record_at(7u64, start + Duration::from_secs(30)), 1);
    }

    #[test]
    fn test_clear_resets_key() {
        let window = RateWindow::new(Duration::from_secs(10));
        window.record(3u64);
        window.record(3u64);
        window.clear(&3u64);
        assert_eq!(window.record(3u64), 1);
    }

    #[test]
    fn test_prune_idle_drops_stale_keys() {
        let window = RateWindow::new(Duration::from_secs(4));
        let start = Instant::now();

        window.record_at((1u64, 1u64), start);
        window.record_at((1u64, 2u64), start + Duration::from_secs(50 * 60));

        let dropped = window.prune_idle_at(Duration::from_secs(3600), start + Duration::from_secs(61 * 60));
        assert_eq!(dropped, 1);
        assert_eq!(window.prune_idle_at(Duration::from_secs(3600), start + Duration::from_secs(61 * 60)), 0);
    }
}
