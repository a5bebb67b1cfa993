use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::{DashMap, DashSet};
use sqlx::PgPool;
use tokio::task::AbortHandle;

use crate::bot::error::Error;
use crate::config::Settings;
use crate::constants::automod::{LINK_WINDOW, SPAM_WINDOW};
use crate::constants::security::RAID_JOIN_WINDOW;
use crate::db::models::UserList;
use crate::db::queries::lists;
use crate::services::alt::RecentJoins;
use crate::services::automod::{RateWindow, ViolationCache};
use crate::services::giveaways::GiveawayStore;

/// Shared data available to all commands and handlers
pub struct Data {
    pub pool: PgPool,
    pub settings: Settings,
    /// Mirror of the whitelist table
    pub whitelist: DashSet<u64>,
    /// Mirror of the blacklist table
    pub blacklist: DashSet<u64>,
    /// Spam violation counts mirrored from the database
    pub violations: ViolationCache,
    /// (guild_id, user_id) -> recent message timestamps
    pub message_window: RateWindow<(u64, u64)>,
    /// (guild_id, user_id) -> recent link-bearing message timestamps
    pub link_window: RateWindow<(u64, u64)>,
    /// guild_id -> recent member joins
    pub join_window: RateWindow<u64>,
    /// Joiners compared by the alt scorer
    pub recent_joins: RecentJoins,
    pub giveaways: GiveawayStore,
    /// message_id -> pending end timer
    pub giveaway_timers: DashMap<u64, AbortHandle>,
    pub guild_count: AtomicUsize,
    pub started_at: Instant,
}

impl Data {
    pub fn new(pool: PgPool, settings: Settings) -> Self {
        let recent_joins = RecentJoins::new(settings.alt_join_window_minutes);
        let giveaways = GiveawayStore::new(&settings.giveaway_store_path);

        Self {
            pool,
            settings,
            whitelist: DashSet::new(),
            blacklist: DashSet::new(),
            violations: ViolationCache::new(),
            message_window: RateWindow::new(SPAM_WINDOW),
            link_window: RateWindow::new(LINK_WINDOW),
            join_window: RateWindow::new(RAID_JOIN_WINDOW),
            recent_joins,
            giveaways,
            giveaway_timers: DashMap::new(),
            guild_count: AtomicUsize::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn is_blacklisted(&self, user_id: u64) -> bool {
        self.blacklist.contains(&user_id)
    }

    pub fn set_guild_count(&self, count: usize) {
        self.guild_count.store(count, Ordering::Relaxed);
    }

    pub fn guild_count(&self) -> usize {
        self.guild_count.load(Ordering::Relaxed)
    }

    /// In-memory mirror of a list table
    pub fn list(&self, list: UserList) -> &DashSet<u64> {
        match list {
            UserList::Whitelist => &self.whitelist,
            UserList::Blacklist => &self.blacklist,
        }
    }

    /// Fill both list caches from the database
    pub async fn load_lists(&self) -> Result<(), Error> {
        for list in [UserList::Whitelist, UserList::Blacklist] {
            let cache = self.list(list);
            cache.clear();
            for entry in lists::all(&self.pool, list).await? {
                cache.insert(entry.user_id as u64);
            }
        }
        Ok(())
    }

    /// Cancel a pending giveaway timer, if any
    pub fn cancel_giveaway_timer(&self, message_id: u64) {
        if let Some((_, handle)) = self.giveaway_timers.remove(&message_id) {
            handle.abort();
        }
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("whitelist_count", &self.whitelist.len())
            .field("blacklist_count", &self.blacklist.len())
            .field("pending_giveaways", &self.giveaway_timers.len())
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, Error>;
