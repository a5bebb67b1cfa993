use std::sync::Arc;

use serenity::all::{
    ComponentInteraction, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
    EditMessage,
};
use tracing::{debug, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::services::giveaways::runner;

/// Enter button on a giveaway message
pub async fn handle_enter(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let message_id = component.message.id.get();
    let giveaway = data.giveaways.enter(message_id, component.user.id.get()).await?;

    debug!(
        "{} entered giveaway {} ({} entries)",
        component.user.id,
        message_id,
        giveaway.entries.len()
    );

    let embed = embeds::success_embed()
        .description(format!("🎉 You have entered the giveaway for **{}**!", giveaway.prize));
    component
        .create_response(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .ephemeral(true),
            ),
        )
        .await?;

    if let Err(e) = component
        .channel_id
        .edit_message(
            ctx,
            component.message.id,
            EditMessage::new().embed(runner::active_embed(&giveaway)),
        )
        .await
    {
        warn!("Could not refresh entry count on giveaway {}: {:?}", message_id, e);
    }

    Ok(())
}
