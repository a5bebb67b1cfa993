use std::sync::Arc;

use serenity::all::{
    ComponentInteraction, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
    Interaction, ModalInteraction,
};
use tracing::{debug, error};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::components::{giveaway_entry, ticket_controls, ticket_panel};
use crate::constants::embeds;
use crate::constants::giveaways::ENTER_BUTTON_ID;
use crate::services::tickets::channels::{CLAIM_BUTTON_ID, CLOSE_BUTTON_ID};

pub async fn handle_interaction(
    ctx: &Context,
    data: &Arc<Data>,
    interaction: &Interaction,
) -> Result<(), Error> {
    match interaction {
        Interaction::Component(component) => {
            handle_component(ctx, data, component).await?;
        }
        Interaction::Modal(modal) => {
            handle_modal(ctx, data, modal).await?;
        }
        Interaction::Command(_) => {
            // Slash commands are handled by poise framework, not here
            // This should not be reached if poise is working correctly
            debug!("Received ApplicationCommand interaction - should be handled by poise");
        }
        _ => {
            debug!("Unhandled interaction type: {:?}", interaction.kind());
        }
    }

    Ok(())
}

async fn handle_component(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let custom_id = &component.data.custom_id;
    debug!("Component interaction: {}", custom_id);

    let result = match custom_id.as_str() {
        CLOSE_BUTTON_ID | ticket_controls::CONFIRM_CLOSE_ID => {
            ticket_controls::handle_close_button(ctx, data, component).await
        }
        ticket_controls::CANCEL_CLOSE_ID => ticket_controls::handle_cancel_close(ctx, data, component).await,
        CLAIM_BUTTON_ID => ticket_controls::handle_claim_button(ctx, data, component).await,
        ticket_panel::TIER_SELECT_ID => ticket_panel::handle_tier_select(ctx, data, component).await,
        ENTER_BUTTON_ID => giveaway_entry::handle_enter(ctx, data, component).await,
        id if id.starts_with(ticket_panel::OPEN_PREFIX) => {
            ticket_panel::handle_open_button(ctx, data, component).await
        }
        _ => {
            // Unknown component - acknowledge but do nothing
            debug!("Unknown component interaction: {}", custom_id);
            Ok(())
        }
    };

    // If handler failed, send error response
    if let Err(e) = result {
        error!("Component interaction error for {}: {:?}", custom_id, e);
        // Try to send error response, but don't fail if it doesn't work
        let _ = send_component_error(ctx, component, &e.user_message()).await;
    }

    Ok(())
}

async fn handle_modal(
    ctx: &Context,
    data: &Arc<Data>,
    modal: &ModalInteraction,
) -> Result<(), Error> {
    let custom_id = &modal.data.custom_id;
    debug!("Modal submission: {}", custom_id);

    if custom_id.starts_with(ticket_panel::MODAL_PREFIX) {
        if let Err(e) = ticket_panel::handle_trade_modal(ctx, data, modal).await {
            error!("Modal submission error for {}: {:?}", custom_id, e);
            let _ = send_modal_error(ctx, modal, &e.user_message()).await;
        }
    }

    Ok(())
}

/// Send an ephemeral error message for a component interaction
pub async fn send_component_error(
    ctx: &Context,
    component: &ComponentInteraction,
    message: &str,
) -> Result<(), Error> {
    let embed = embeds::error_embed()
        .title("Error")
        .description(message);

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

    Ok(())
}

/// Send an ephemeral error message for a modal interaction
pub async fn send_modal_error(
    ctx: &Context,
    modal: &ModalInteraction,
    message: &str,
) -> Result<(), Error> {
    let embed = embeds::error_embed()
        .title("Error")
        .description(message);

    modal
        .create_response(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .ephemeral(true),
            ),
        )
        .await?;

    Ok(())
}
