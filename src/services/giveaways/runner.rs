use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serenity::all::{
    ButtonStyle, ChannelId, Context, CreateActionRow, CreateButton, CreateEmbed,
    CreateEmbedFooter, CreateMessage, EditMessage, GuildId, MessageId, UserId,
};
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{error, info, warn};

use super::model::Giveaway;
use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::constants::giveaways::ENTER_BUTTON_ID;
use crate::services::audit_log;
use crate::utils::formatting::{mention_user, relative_time};

pub fn active_embed(giveaway: &Giveaway) -> CreateEmbed {
    let mut embed = embeds::standard_embed()
        .title("🎉 GIVEAWAY 🎉")
        .description(format!(
            "Click the button below to enter!\n\n**Prize:** {}",
            giveaway.prize
        ))
        .field("⏰ Ends", relative_time(giveaway.ends_at.timestamp()), true)
        .field("🏆 Winners", format!("**{}** winner(s)", giveaway.winner_count), true)
        .field("📊 Entries", format!("**{}** participants", giveaway.entries.len()), true)
        .field("🎙️ Host", mention_user(UserId::new(giveaway.host_id)), true)
        .footer(CreateEmbedFooter::new(format!("Giveaway ID: {}", giveaway.message_id)))
        .timestamp(giveaway.ends_at);

    if let Some(url) = &giveaway.image_url {
        embed = embed.image(url);
    }
    embed
}

pub fn ended_embed(giveaway: &Giveaway) -> CreateEmbed {
    let embed = if giveaway.winners.is_empty() {
        embeds::error_embed().description(format!(
            "**Prize:** {}\n\n**No one entered the giveaway!**",
            giveaway.prize
        ))
    } else {
        embeds::success_embed()
            .description(format!(
                "**Prize:** {}\n\n**Winner(s):** {}",
                giveaway.prize,
                winner_mentions(&giveaway.winners)
            ))
            .field("🏆 Total Entries", format!("{} participants", giveaway.entries.len()), true)
            .field("🎉 Winners", format!("{} winner(s)", giveaway.winners.len()), true)
    };

    embeds::timestamped(embed.title("🎊 GIVEAWAY ENDED 🎊"))
        .footer(CreateEmbedFooter::new(format!("Giveaway ID: {}", giveaway.message_id)))
}

pub fn entry_row() -> CreateActionRow {
    CreateActionRow::Buttons(vec![CreateButton::new(ENTER_BUTTON_ID)
        .label("🎉 Enter Giveaway")
        .style(ButtonStyle::Success)])
}

pub fn winner_mentions(winners: &[u64]) -> String {
    winners
        .iter()
        .map(|id| mention_user(UserId::new(*id)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Spawn the one-shot end timer for a giveaway. Past-due giveaways end immediately
pub fn schedule(ctx: &Context, data: &Arc<Data>, giveaway: &Giveaway) {
    let message_id = giveaway.message_id;
    let guild_id = giveaway.guild_id;
    let wait = (giveaway.ends_at - Utc::now())
        .to_std()
        .unwrap_or_default();

    let ctx = ctx.clone();
    let task_data = data.clone();
    spawn_registered(&data.giveaway_timers, message_id, async move {
        tokio::time::sleep(wait).await;
        task_data.giveaway_timers.remove(&message_id);

        match task_data.giveaways.finish(guild_id, message_id).await {
            Ok(Some(giveaway)) => {
                if let Err(e) = announce(&ctx, &task_data, &giveaway).await {
                    error!("Failed to announce giveaway {}: {:?}", message_id, e);
                }
            }
            Ok(None) => {}
            Err(e) => error!("Failed to end giveaway {}: {:?}", message_id, e),
        }
    });
}

/// Spawn `task` and store its abort handle under `key`. The task only starts
/// once the handle is in the map, so it never sees a stale entry.
fn spawn_registered<F>(timers: &DashMap<u64, AbortHandle>, key: u64, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let (registered_tx, registered_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        if registered_rx.await.is_ok() {
            task.await;
        }
    });

    if let Some(previous) = timers.insert(key, handle.abort_handle()) {
        previous.abort();
    }
    let _ = registered_tx.send(());
}

/// Reschedule every unfinished giveaway after a restart
pub fn reschedule_all(ctx: &Context, data: &Arc<Data>, pending: &[Giveaway]) {
    for giveaway in pending {
        schedule(ctx, data, giveaway);
    }
    if !pending.is_empty() {
        info!("Rescheduled {} pending giveaways", pending.len());
    }
}

/// End a giveaway early: draw winners, stop its timer and announce.
/// Returns `None` if it had already ended.
pub async fn end_giveaway(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: u64,
    message_id: u64,
) -> Result<Option<Giveaway>, Error> {
    let Some(giveaway) = data.giveaways.finish(guild_id, message_id).await? else {
        return Ok(None);
    };
    data.cancel_giveaway_timer(message_id);

    announce(ctx, data, &giveaway).await?;
    Ok(Some(giveaway))
}

/// Edit the giveaway message, announce and DM the winners
async fn announce(ctx: &Context, data: &Arc<Data>, giveaway: &Giveaway) -> Result<(), Error> {
    let channel_id = ChannelId::new(giveaway.channel_id);

    if let Err(e) = channel_id
        .edit_message(
            ctx,
            MessageId::new(giveaway.message_id),
            EditMessage::new().embed(ended_embed(giveaway)).components(vec![]),
        )
        .await
    {
        warn!("Could not edit giveaway message {}: {:?}", giveaway.message_id, e);
    }

    if giveaway.winners.is_empty() {
        channel_id
            .say(ctx, "😢 The giveaway ended with no entries!")
            .await?;
    } else {
        let mentions = winner_mentions(&giveaway.winners);
        channel_id
            .say(
                ctx,
                format!("🎉 Congratulations {}! You won **{}**!", mentions, giveaway.prize),
            )
            .await?;

        dm_winners(ctx, giveaway, &giveaway.winners).await;
    }

    audit_log::log_action(
        ctx,
        data,
        GuildId::new(giveaway.guild_id),
        "Giveaway ended",
        &format!("**Prize:** {}", giveaway.prize),
        embeds::GOLD_COLOR,
        &[
            ("Entries", giveaway.entries.len().to_string()),
            ("Winners", giveaway.winners.len().to_string()),
        ],
    )
    .await;

    info!(
        "Giveaway {} ended with {} winner(s) from {} entries",
        giveaway.message_id,
        giveaway.winners.len(),
        giveaway.entries.len()
    );

    Ok(())
}

pub async fn dm_winners(ctx: &Context, giveaway: &Giveaway, winners: &[u64]) {
    let guild_name = ctx
        .cache
        .guild(GuildId::new(giveaway.guild_id))
        .map(|g| g.name.clone())
        .unwrap_or_else(|| "the server".to_string());

    for winner in winners {
        let embed = embeds::success_embed()
            .title("🎉 YOU WON A GIVEAWAY!")
            .description(format!("Congratulations! You won **{}**!", giveaway.prize))
            .field("Server", &guild_name, true)
            .field("Prize", &giveaway.prize, true)
            .field(
                "What to do?",
                format!("Contact {} to claim your prize!", mention_user(UserId::new(giveaway.host_id))),
                false,
            );

        let user_id = UserId::new(*winner);
        if let Err(e) = user_id
            .direct_message(ctx, CreateMessage::new().embed(embed))
            .await
        {
            warn!("Could not DM giveaway winner {}: {:?}", user_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timer_is_registered_before_it_runs() {
        let timers = Arc::new(DashMap::new());
        let (seen_tx, seen_rx) = oneshot::channel();

        let task_timers = timers.clone();
        spawn_registered(&timers, 7, async move {
            let _ = seen_tx.send(task_timers.contains_key(&7));
        });

        assert!(seen_rx.await.unwrap());
    }

    #[tokio::test]
    async fn test_replaced_timer_is_aborted() {
        let timers = DashMap::new();
        let (first_tx, first_rx) = oneshot::channel::<()>();
        let (second_tx, second_rx) = oneshot::channel::<()>();

        spawn_registered(&timers, 7, async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let _ = first_tx.send(());
        });
        spawn_registered(&timers, 7, async move {
            let _ = second_tx.send(());
        });

        assert!(second_rx.await.is_ok());
        assert!(first_rx.await.is_err());
        assert_eq!(timers.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_timer_never_fires() {
        let timers = DashMap::new();
        let (fired_tx, fired_rx) = oneshot::channel::<()>();

        spawn_registered(&timers, 3, async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let _ = fired_tx.send(());
        });
        if let Some((_, handle)) = timers.remove(&3) {
            handle.abort();
        }

        assert!(fired_rx.await.is_err());
    }
}
