use std::sync::Arc;

use serenity::all::{Context, Message, MessageUpdateEvent};
use tracing::debug;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::services::automod::enforcer::{self, Verdict};

pub async fn handle_message(ctx: &Context, data: &Arc<Data>, msg: &Message) -> Result<(), Error> {
    let verdict = enforcer::check_message(ctx, data, msg).await?;
    if verdict != Verdict::Clean {
        debug!("Message {} from {} caught: {:?}", msg.id, msg.author.id, verdict);
    }
    Ok(())
}

/// Re-check an edited message. The gateway does not always send the full message
pub async fn handle_message_update(
    ctx: &Context,
    data: &Arc<Data>,
    new: Option<&Message>,
    event: &MessageUpdateEvent,
) -> Result<(), Error> {
    if event.content.is_none() {
        return Ok(());
    }

    let fetched;
    let msg = match new {
        Some(msg) => msg,
        None => {
            fetched = event.channel_id.message(ctx, event.id).await?;
            &fetched
        }
    };

    enforcer::check_edit(ctx, data, msg).await?;
    Ok(())
}
