use std::sync::Arc;

use serenity::all::{
    ActionRowComponent, ButtonStyle, ChannelId, ComponentInteraction, ComponentInteractionDataKind, Context,
    CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateInputText,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateModal, CreateSelectMenu,
    CreateSelectMenuKind, CreateSelectMenuOption, EditInteractionResponse, InputTextStyle,
    ModalInteraction,
};
use tracing::{debug, error};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::db::models::{MmTier, TicketKind, TradeDetails};
use crate::handlers::interaction::{send_component_error, send_modal_error};
use crate::services::tickets::channels;
use crate::utils::formatting::mention_channel;

pub const OPEN_PREFIX: &str = "ticket_open_";
pub const TIER_SELECT_ID: &str = "ticket_tier";
pub const MODAL_PREFIX: &str = "ticket_modal_";

/// The ticket panel: one button per ticket kind
pub fn panel() -> (CreateEmbed, Vec<CreateActionRow>) {
    let mut embed = embeds::standard_embed()
        .title("🎫 Create a Ticket")
        .description("Click the button below to create a ticket based on your needs.\n\n**Available Ticket Types:**");
    for kind in TicketKind::ALL {
        embed = embed.field(format!("{} {}", kind.emoji(), kind.label()), kind.description(), true);
    }
    let embed = embeds::timestamped(embed.footer(CreateEmbedFooter::new("Select a ticket type to get started")));

    let buttons = TicketKind::ALL
        .iter()
        .map(|kind| {
            let style = match kind {
                TicketKind::Partnership => ButtonStyle::Primary,
                TicketKind::Middleman => ButtonStyle::Success,
                TicketKind::Support => ButtonStyle::Secondary,
            };
            CreateButton::new(format!("{}{}", OPEN_PREFIX, kind.as_str()))
                .label(kind.label())
                .emoji(kind.emoji())
                .style(style)
        })
        .collect();

    (embed, vec![CreateActionRow::Buttons(buttons)])
}

fn tier_select() -> CreateActionRow {
    let options = MmTier::ALL
        .iter()
        .map(|tier| {
            CreateSelectMenuOption::new(tier.name(), tier.as_str())
                .description(tier.range())
                .emoji(tier.emoji())
        })
        .collect();

    CreateActionRow::SelectMenu(
        CreateSelectMenu::new(TIER_SELECT_ID, CreateSelectMenuKind::String { options })
            .placeholder("Select the value of your trade"),
    )
}

/// Trade form for a middleman ticket of the given tier
pub fn trade_modal(tier: MmTier) -> CreateModal {
    let input = |style: InputTextStyle, label: &str, id: &str, required: bool| {
        CreateActionRow::InputText(
            CreateInputText::new(style, label, id)
                .required(required)
                .max_length(if style == InputTextStyle::Paragraph { 500 } else { 100 }),
        )
    };

    CreateModal::new(format!("{}{}", MODAL_PREFIX, tier.as_str()), "Middleman Request").components(vec![
        input(InputTextStyle::Short, "Who are you trading with?", "trader", true),
        input(InputTextStyle::Paragraph, "What are you giving?", "giving", true),
        input(InputTextStyle::Paragraph, "What are you receiving?", "receiving", true),
        input(InputTextStyle::Short, "Can both of you join links?", "both_join", true),
        input(InputTextStyle::Short, "Tip (optional)", "tip", false),
    ])
}

/// Panel button: open a ticket directly, or ask for a tier for middleman tickets
pub async fn handle_open_button(
    ctx: &Context,
    data: &Arc<Data>,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let Some(kind) = component
        .data
        .custom_id
        .strip_prefix(OPEN_PREFIX)
        .and_then(TicketKind::parse)
    else {
        send_component_error(ctx, component, "Unknown ticket type").await?;
        return Ok(());
    };
    let Some(guild_id) = component.guild_id else {
        send_component_error(ctx, component, "Tickets can only be opened in a server").await?;
        return Ok(());
    };

    if kind == TicketKind::Middleman {
        let embed = embeds::warning_embed()
            .title("⚖ Middleman Request")
            .description("Pick the tier that matches the value of your trade.");
        component
            .create_response(
                ctx,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .embed(embed)
                        .components(vec![tier_select()])
                        .ephemeral(true),
                ),
            )
            .await?;
        return Ok(());
    }

    component.defer_ephemeral(ctx).await?;
    let result = channels::open_ticket(ctx, data, guild_id, &component.user, kind, None, None).await;
    let embed = opened_embed(result);
    component
        .edit_response(ctx, EditInteractionResponse::new().embed(embed))
        .await?;

    Ok(())
}

/// Tier chosen: show the trade form
pub async fn handle_tier_select(
    ctx: &Context,
    _data: &Arc<Data>,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    let tier = match &component.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => {
            values.first().and_then(|v| MmTier::parse(v))
        }
        _ => None,
    };

    let Some(tier) = tier else {
        send_component_error(ctx, component, "Please pick a tier").await?;
        return Ok(());
    };

    debug!("{} picked middleman tier {}", component.user.id, tier.as_str());
    component
        .create_response(ctx, CreateInteractionResponse::Modal(trade_modal(tier)))
        .await?;

    Ok(())
}

fn input_value(modal: &ModalInteraction, id: &str) -> Option<String> {
    modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == id => input.value.clone(),
            _ => None,
        })
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trade form submitted: open the middleman ticket
pub async fn handle_trade_modal(ctx: &Context, data: &Arc<Data>, modal: &ModalInteraction) -> Result<(), Error> {
    let Some(tier) = modal
        .data
        .custom_id
        .strip_prefix(MODAL_PREFIX)
        .and_then(MmTier::parse)
    else {
        send_modal_error(ctx, modal, "Invalid form state").await?;
        return Ok(());
    };
    let Some(guild_id) = modal.guild_id else {
        send_modal_error(ctx, modal, "Tickets can only be opened in a server").await?;
        return Ok(());
    };

    let trade = TradeDetails {
        trader: input_value(modal, "trader").unwrap_or_default(),
        giving: input_value(modal, "giving").unwrap_or_default(),
        receiving: input_value(modal, "receiving").unwrap_or_default(),
        both_join: input_value(modal, "both_join").unwrap_or_default(),
        tip: input_value(modal, "tip"),
    };

    modal.defer_ephemeral(ctx).await?;
    let result = channels::open_ticket(
        ctx,
        data,
        guild_id,
        &modal.user,
        TicketKind::Middleman,
        Some(tier),
        Some(trade),
    )
    .await;
    modal
        .edit_response(ctx, EditInteractionResponse::new().embed(opened_embed(result)))
        .await?;

    Ok(())
}

fn opened_embed(result: Result<ChannelId, Error>) -> CreateEmbed {
    match result {
        Ok(channel_id) => embeds::success_embed()
            .title("✅ Ticket Created")
            .description(format!("Your ticket has been created: {}", mention_channel(channel_id.get()))),
        Err(e) => {
            error!("Failed to open ticket: {:?}", e);
            embeds::error_embed()
                .title("Error")
                .description(format!("Failed to create ticket: {}", e.user_message()))
        }
    }
}
