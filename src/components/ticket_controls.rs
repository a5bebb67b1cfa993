use std::sync::Arc;

use serenity::all::{
    ButtonStyle, ComponentInteraction, Context, CreateActionRow, CreateButton, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseMessage, Member,
};
use tracing::info;

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::db::models::Ticket;
use crate::handlers::interaction::send_component_error;
use crate::services::tickets::channels;
use crate::utils::formatting::mention_user;

pub const CONFIRM_CLOSE_ID: &str = "ticket_confirm_close";
pub const CANCEL_CLOSE_ID: &str = "ticket_cancel_close";

/// Confirmation prompt shown by the close command
pub fn close_prompt() -> (CreateEmbed, Vec<CreateActionRow>) {
    let embed = embeds::warning_embed()
        .title("Close Ticket?")
        .description("Are you sure you want to close this ticket?");

    let row = CreateActionRow::Buttons(vec![
        CreateButton::new(CONFIRM_CLOSE_ID)
            .label("Close")
            .style(ButtonStyle::Danger),
        CreateButton::new(CANCEL_CLOSE_ID)
            .label("Cancel")
            .style(ButtonStyle::Secondary),
    ]);

    (embed, vec![row])
}

/// The opener and ticket staff may close a ticket
pub async fn can_close(ctx: &Context, data: &Arc<Data>, member: &Member, ticket: &Ticket) -> Result<bool, Error> {
    if member.user.id.get() as i64 == ticket.owner_id {
        return Ok(true);
    }
    channels::is_ticket_staff(ctx, data, member, ticket.kind).await
}

pub async fn handle_claim_button(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let Some(member) = component.member.as_ref() else {
        send_component_error(ctx, component, "Tickets can only be claimed in a server").await?;
        return Ok(());
    };

    let ticket = channels::claim(ctx, data, component.channel_id, member).await?;
    info!("Ticket {} claimed by {}", ticket.channel_id, member.user.id);

    let embed = embeds::success_embed()
        .title("✅ Ticket Claimed")
        .description(format!("This ticket has been claimed by {}", mention_user(member.user.id)));

    component
        .create_response(
            ctx,
            CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().embed(embed)),
        )
        .await?;

    Ok(())
}

/// Close button on the welcome embed, and the confirm button of the close prompt
pub async fn handle_close_button(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let Some(member) = component.member.as_ref() else {
        send_component_error(ctx, component, "Tickets can only be closed in a server").await?;
        return Ok(());
    };

    let ticket = channels::ticket_for_channel(ctx, data, component.channel_id).await?;
    if !can_close(ctx, data, member, &ticket).await? {
        send_component_error(ctx, component, "Only the ticket owner or staff can close this ticket").await?;
        return Ok(());
    }

    let notice = embeds::warning_embed().description("🔒 Closing ticket...");
    let response = if component.data.custom_id == CONFIRM_CLOSE_ID {
        CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new()
                .embed(notice)
                .components(vec![]),
        )
    } else {
        CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().embed(notice))
    };
    component.create_response(ctx, response).await?;

    channels::close(ctx, data, component.channel_id, &component.user).await
}

pub async fn handle_cancel_close(
    ctx: &Context,
    _data: &Arc<Data>,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    component
        .create_response(
            ctx,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(embeds::standard_embed().description("Ticket close cancelled."))
                    .components(vec![]),
            ),
        )
        .await?;

    Ok(())
}
