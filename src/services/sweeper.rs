use std::sync::Arc;

use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, error};

use crate::bot::data::Data;
use crate::constants::automod::{CLEANUP_IDLE, CLEANUP_INTERVAL};
use crate::constants::giveaways::RETENTION_DAYS;

/// Start the hourly task that drops idle rate windows, stale joiners
/// and old ended giveaways
pub fn spawn_sweeper(data: Arc<Data>) {
    tokio::spawn(async move {
        let mut ticker = interval(CLEANUP_INTERVAL);
        // First tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            sweep(&data).await;
        }
    });
}

async fn sweep(data: &Data) {
    let windows = data.message_window.prune_idle(CLEANUP_IDLE)
        + data.link_window.prune_idle(CLEANUP_IDLE)
        + data.join_window.prune_idle(CLEANUP_IDLE)
        + data.violations.prune_idle(CLEANUP_IDLE);
    let tracked_guilds = data.recent_joins.prune(Utc::now());

    let giveaways = match data.giveaways.prune_ended(RETENTION_DAYS, Utc::now()).await {
        Ok(count) => count,
        Err(e) => {
            error!("Failed to prune ended giveaways: {:?}", e);
            0
        }
    };

    debug!(
        "Sweep removed {} idle windows or cached violations and {} old giveaways; {} guilds still have recent joiners",
        windows, giveaways, tracked_guilds
    );
}
