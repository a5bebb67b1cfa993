use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::draw;
use super::model::{Giveaway, GiveawayError};
use crate::bot::error::Error;

/// Flat JSON file of giveaways keyed by message id.
///
/// The whole map is read at startup and rewritten after every mutation. All
/// reads and writes go through one async lock, so entry uniqueness and the
/// `ended` flag are checked and updated atomically.
pub struct GiveawayStore {
    path: PathBuf,
    giveaways: Mutex<BTreeMap<u64, Giveaway>>,
}

impl GiveawayStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            giveaways: Mutex::new(BTreeMap::new()),
        }
    }

    /// Load the store from disk. A missing file is an empty store
    pub async fn load(&self) -> Result<usize, Error> {
        let loaded = match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice::<BTreeMap<u64, Giveaway>>(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No giveaway store at {}, starting fresh", self.path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut giveaways = self.giveaways.lock().await;
        *giveaways = loaded;
        Ok(giveaways.len())
    }

    pub async fn insert(&self, giveaway: Giveaway) -> Result<(), Error> {
        let mut giveaways = self.giveaways.lock().await;
        giveaways.insert(giveaway.message_id, giveaway);
        self.persist(&giveaways).await
    }

    pub async fn get(&self, message_id: u64) -> Option<Giveaway> {
        self.giveaways.lock().await.get(&message_id).cloned()
    }

    /// Add an entrant. Returns the updated giveaway
    pub async fn enter(&self, message_id: u64, user_id: u64) -> Result<Giveaway, Error> {
        let mut giveaways = self.giveaways.lock().await;
        let giveaway = giveaways
            .get_mut(&message_id)
            .ok_or(GiveawayError::NotFound)?;

        if giveaway.ended {
            return Err(GiveawayError::Ended.into());
        }
        if giveaway.has_entered(user_id) {
            return Err(GiveawayError::AlreadyEntered.into());
        }

        giveaway.entries.push(user_id);
        let updated = giveaway.clone();
        self.persist(&giveaways).await?;
        Ok(updated)
    }

    /// Mark a giveaway ended and draw its winners.
    /// Returns `None` when it was already ended, so ending twice is a no-op.
    pub async fn finish(&self, guild_id: u64, message_id: u64) -> Result<Option<Giveaway>, Error> {
        let mut giveaways = self.giveaways.lock().await;
        let giveaway = in_guild(&mut giveaways, guild_id, message_id)?;

        if giveaway.ended {
            return Ok(None);
        }

        let count = giveaway.winner_count as usize;
        giveaway.winners = draw::draw_winners(&giveaway.entries, count, &mut rand::thread_rng());
        giveaway.ended = true;
        let finished = giveaway.clone();

        self.persist(&giveaways).await?;
        Ok(Some(finished))
    }

    /// Draw one new winner from the entries, ended giveaways included
    pub async fn reroll(&self, guild_id: u64, message_id: u64) -> Result<(Giveaway, u64), Error> {
        let mut giveaways = self.giveaways.lock().await;
        let giveaway = in_guild(&mut giveaways, guild_id, message_id)?;

        let winner = draw::reroll_winner(&giveaway.entries, &giveaway.winners, &mut rand::thread_rng())
            .ok_or(GiveawayError::NoEntries)?;

        if !giveaway.winners.contains(&winner) {
            giveaway.winners.push(winner);
        }
        let updated = giveaway.clone();

        self.persist(&giveaways).await?;
        Ok((updated, winner))
    }

    pub async fn remove(&self, guild_id: u64, message_id: u64) -> Result<Giveaway, Error> {
        let mut giveaways = self.giveaways.lock().await;
        in_guild(&mut giveaways, guild_id, message_id)?;
        let removed = giveaways
            .remove(&message_id)
            .ok_or(GiveawayError::NotFound)?;
        self.persist(&giveaways).await?;
        Ok(removed)
    }

    /// Giveaways still running in a guild, soonest ending first
    pub async fn active_in_guild(&self, guild_id: u64) -> Vec<Giveaway> {
        let giveaways = self.giveaways.lock().await;
        let mut active: Vec<Giveaway> = giveaways
            .values()
            .filter(|g| g.guild_id == guild_id && !g.ended)
            .cloned()
            .collect();
        active.sort_by_key(|g| g.ends_at);
        active
    }

    /// Every giveaway that has not ended yet
    pub async fn pending(&self) -> Vec<Giveaway> {
        self.giveaways
            .lock()
            .await
            .values()
            .filter(|g| !g.ended)
            .cloned()
            .collect()
    }

    /// Drop ended giveaways whose end time is older than the retention period
    pub async fn prune_ended(&self, retention_days: i64, now: DateTime<Utc>) -> Result<usize, Error> {
        let cutoff = now - Duration::days(retention_days);
        let mut giveaways = self.giveaways.lock().await;
        let before = giveaways.len();
        giveaways.retain(|_, g| !(g.ended && g.ends_at < cutoff));

        let pruned = before - giveaways.len();
        if pruned > 0 {
            self.persist(&giveaways).await?;
        }
        Ok(pruned)
    }

    async fn persist(&self, giveaways: &BTreeMap<u64, Giveaway>) -> Result<(), Error> {
        let json = serde_json::to_vec_pretty(giveaways)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, &json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            warn!("Failed to move giveaway store into place: {:?}", e);
            return Err(e.into());
        }
        Ok(())
    }
}

/// A giveaway from another guild is reported as missing
fn in_guild(
    giveaways: &mut BTreeMap<u64, Giveaway>,
    guild_id: u64,
    message_id: u64,
) -> Result<&mut Giveaway, GiveawayError> {
    giveaways
        .get_mut(&message_id)
        .filter(|g| g.guild_id == guild_id)
        .ok_or(GiveawayError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "warden-giveaways-{}-{}.json",
            name,
            uuid::Uuid::new_v4()
        ))
    }

    fn giveaway(message_id: u64, guild_id: u64, winner_count: u32) -> Giveaway {
        Giveaway {
            message_id,
            channel_id: 2,
            guild_id,
            host_id: 3,
            prize: "Nitro".to_string(),
            winner_count,
            entries: Vec::new(),
            ends_at: Utc::now() + Duration::minutes(10),
            image_url: None,
            ended: false,
            winners: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_entries_are_unique() {
        let store = GiveawayStore::new(temp_path("unique"));
        store.insert(giveaway(1, 1, 1)).await.unwrap();

        store.enter(1, 42).await.unwrap();
        let err = store.enter(1, 42).await.unwrap_err();
        assert!(matches!(err, Error::Giveaway(GiveawayError::AlreadyEntered)));

        let err = store.enter(99, 42).await.unwrap_err();
        assert!(matches!(err, Error::Giveaway(GiveawayError::NotFound)));
    }

    #[tokio::test]
    async fn test_finish_is_idempotent() {
        let store = GiveawayStore::new(temp_path("finish"));
        store.insert(giveaway(1, 1, 2)).await.unwrap();
        for user in [10, 11, 12] {
            store.enter(1, user).await.unwrap();
        }

        let finished = store.finish(1, 1).await.unwrap().unwrap();
        assert!(finished.ended);
        assert_eq!(finished.winners.len(), 2);

        assert!(store.finish(1, 1).await.unwrap().is_none());

        let err = store.enter(1, 13).await.unwrap_err();
        assert!(matches!(err, Error::Giveaway(GiveawayError::Ended)));
    }

    #[tokio::test]
    async fn test_reload_from_disk() {
        let path = temp_path("reload");
        let store = GiveawayStore::new(&path);
        store.insert(giveaway(1, 1, 1)).await.unwrap();
        store.insert(giveaway(2, 5, 1)).await.unwrap();
        store.enter(2, 7).await.unwrap();

        let reloaded = GiveawayStore::new(&path);
        assert_eq!(reloaded.load().await.unwrap(), 2);
        assert_eq!(reloaded.get(2).await.unwrap().entries, vec![7]);
        assert_eq!(reloaded.active_in_guild(5).await.len(), 1);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let store = GiveawayStore::new(temp_path("missing"));
        assert_eq!(store.load().await.unwrap(), 0);
        assert!(store.pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_reroll_and_prune() {
        let store = GiveawayStore::new(temp_path("reroll"));
        let mut old = giveaway(1, 1, 1);
        old.ends_at = Utc::now() - Duration::days(10);
        store.insert(old).await.unwrap();

        let err = store.reroll(1, 1).await.unwrap_err();
        assert!(matches!(err, Error::Giveaway(GiveawayError::NoEntries)));

        store.enter(1, 5).await.unwrap();
        store.finish(1, 1).await.unwrap();
        let (_, winner) = store.reroll(1, 1).await.unwrap();
        assert_eq!(winner, 5);

        assert_eq!(store.prune_ended(7, Utc::now()).await.unwrap(), 1);
        assert!(store.get(1).await.is_none());
    }

    #[tokio::test]
    async fn test_other_guild_cannot_touch_giveaway() {
        let store = GiveawayStore::new(temp_path("guild"));
        store.insert(giveaway(1, 1, 1)).await.unwrap();
        store.enter(1, 5).await.unwrap();

        let err = store.finish(2, 1).await.unwrap_err();
        assert!(matches!(err, Error::Giveaway(GiveawayError::NotFound)));
        let err = store.reroll(2, 1).await.unwrap_err();
        assert!(matches!(err, Error::Giveaway(GiveawayError::NotFound)));
        let err = store.remove(2, 1).await.unwrap_err();
        assert!(matches!(err, Error::Giveaway(GiveawayError::NotFound)));

        let kept = store.get(1).await.unwrap();
        assert!(!kept.ended);
        assert!(kept.winners.is_empty());

        assert_eq!(store.remove(1, 1).await.unwrap().message_id, 1);
        assert!(store.get(1).await.is_none());
    }
}
