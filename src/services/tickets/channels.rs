use std::sync::Arc;

use serenity::all::{
    ButtonStyle, ChannelId, ChannelType, Context, CreateActionRow, CreateAllowedMentions,
    CreateButton, CreateChannel, CreateEmbed, CreateEmbedFooter, CreateMessage, EditChannel,
    GuildId, Member, PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, User,
    UserId,
};
use tracing::{info, warn};

use super::lifecycle::{self, ClaimActor, TicketError};
use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::constants::tickets::{CLOSE_DELAY, TICKET_CATEGORY_NAME};
use crate::db::models::{MmTier, Ticket, TicketKind, TradeDetails};
use crate::db::queries::{guild_settings, ticket_roles, tickets};
use crate::services::audit_log;
use crate::utils::formatting::{mention_role, mention_user};
use crate::utils::permissions;

pub const CLOSE_BUTTON_ID: &str = "ticket_close";
pub const CLAIM_BUTTON_ID: &str = "ticket_claim";

fn member_access() -> Permissions {
    Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY
}

fn member_overwrite(user_id: UserId, allow: Permissions) -> PermissionOverwrite {
    PermissionOverwrite {
        allow,
        deny: Permissions::empty(),
        kind: PermissionOverwriteType::Member(user_id),
    }
}

fn role_overwrite(role_id: RoleId, allow: Permissions, deny: Permissions) -> PermissionOverwrite {
    PermissionOverwrite {
        allow,
        deny,
        kind: PermissionOverwriteType::Role(role_id),
    }
}

/// Look up the ticket stored for a channel. Channels whose name lost the
/// `ticket-` prefix are not tickets, whatever the table says
pub async fn ticket_for_channel(ctx: &Context, data: &Arc<Data>, channel_id: ChannelId) -> Result<Ticket, Error> {
    let name = ctx.cache.channel(channel_id).map(|c| c.name.clone());
    if name.is_some_and(|name| !lifecycle::is_ticket_channel(&name)) {
        return Err(Error::NotATicket);
    }

    tickets::get(&data.pool, channel_id.get() as i64)
        .await?
        .ok_or(Error::NotATicket)
}

/// Roles that staff a ticket: the kind's ping role, plus every tier role for middleman tickets
pub async fn staff_roles(data: &Arc<Data>, guild_id: GuildId, kind: TicketKind) -> Result<Vec<RoleId>, Error> {
    let gid = guild_id.get() as i64;
    let mut roles = Vec::new();

    if let Some(role) = ticket_roles::get_kind_role(&data.pool, gid, kind).await? {
        roles.push(RoleId::new(role as u64));
    }

    if kind == TicketKind::Middleman {
        for (_, role) in ticket_roles::tier_roles(&data.pool, gid).await? {
            let role = RoleId::new(role as u64);
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
    }

    Ok(roles)
}

/// Admin, bot owner, manage-channels, the guild staff role, or one of the ticket's staff roles
pub async fn is_ticket_staff(
    ctx: &Context,
    data: &Arc<Data>,
    member: &Member,
    kind: TicketKind,
) -> Result<bool, Error> {
    if data.settings.is_owner(member.user.id.get())
        || permissions::member_has(ctx, member, Permissions::MANAGE_CHANNELS)
    {
        return Ok(true);
    }

    let settings = guild_settings::get_or_default(&data.pool, member.guild_id.get() as i64).await?;
    let staff_role = settings
        .staff_role_id
        .map(|id| id as u64)
        .or(data.settings.staff_role_id);
    if let Some(role) = staff_role {
        if member.roles.contains(&RoleId::new(role)) {
            return Ok(true);
        }
    }

    let roles = staff_roles(data, member.guild_id, kind).await?;
    Ok(member.roles.iter().any(|r| roles.contains(r)))
}

async fn ticket_category(ctx: &Context, guild_id: GuildId) -> Result<ChannelId, Error> {
    let channels = guild_id.channels(ctx).await?;
    if let Some(category) = channels
        .values()
        .find(|c| c.kind == ChannelType::Category && c.name.eq_ignore_ascii_case(TICKET_CATEGORY_NAME))
    {
        return Ok(category.id);
    }

    let category = guild_id
        .create_channel(
            ctx,
            CreateChannel::new(TICKET_CATEGORY_NAME).kind(ChannelType::Category),
        )
        .await?;
    Ok(category.id)
}

/// Create a ticket channel, persist it, ping its staff and post the welcome embed
pub async fn open_ticket(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: GuildId,
    opener: &User,
    kind: TicketKind,
    tier: Option<MmTier>,
    trade: Option<TradeDetails>,
) -> Result<ChannelId, Error> {
    let category = ticket_category(ctx, guild_id).await?;
    let bot_id = ctx.cache.current_user().id;
    let roles = staff_roles(data, guild_id, kind).await?;

    let mut overwrites = vec![
        role_overwrite(guild_id.everyone_role(), Permissions::empty(), Permissions::VIEW_CHANNEL),
        member_overwrite(opener.id, member_access() | Permissions::MENTION_EVERYONE),
        member_overwrite(
            bot_id,
            Permissions::VIEW_CHANNEL
                | Permissions::SEND_MESSAGES
                | Permissions::MANAGE_CHANNELS
                | Permissions::MANAGE_MESSAGES,
        ),
    ];
    for role in &roles {
        overwrites.push(role_overwrite(*role, member_access(), Permissions::empty()));
    }

    let channel = guild_id
        .create_channel(
            ctx,
            CreateChannel::new(lifecycle::channel_name(&opener.name, kind))
                .kind(ChannelType::Text)
                .category(category)
                .permissions(overwrites),
        )
        .await?;

    let ticket = tickets::create(
        &data.pool,
        channel.id.get() as i64,
        guild_id.get() as i64,
        opener.id.get() as i64,
        kind,
        tier,
        trade.as_ref(),
    )
    .await?;

    if let Some(role) = ping_role(data, guild_id, kind, tier).await? {
        let label = tier.map(|t| t.name()).unwrap_or_else(|| kind.label());
        channel
            .id
            .send_message(
                ctx,
                CreateMessage::new()
                    .content(format!("{} - New {} ticket opened!", mention_role(role.get()), label))
                    .allowed_mentions(CreateAllowedMentions::new().roles(vec![role])),
            )
            .await?;
    }

    channel
        .id
        .send_message(
            ctx,
            CreateMessage::new()
                .content(mention_user(opener.id))
                .embed(welcome_embed(opener, &ticket))
                .components(vec![ticket_buttons(kind)]),
        )
        .await?;

    audit_log::log_action(
        ctx,
        data,
        guild_id,
        "Ticket opened",
        &format!("{} opened <#{}>", mention_user(opener.id), channel.id),
        kind.color(),
        &[("Type", kind.label().to_string())],
    )
    .await;

    info!("Opened {} ticket {} for {}", kind.as_str(), channel.id, opener.id);
    Ok(channel.id)
}

/// Middleman tickets ping the chosen tier's role when one is set
async fn ping_role(
    data: &Arc<Data>,
    guild_id: GuildId,
    kind: TicketKind,
    tier: Option<MmTier>,
) -> Result<Option<RoleId>, Error> {
    let gid = guild_id.get() as i64;

    if let Some(tier) = tier {
        let tier_role = ticket_roles::tier_roles(&data.pool, gid)
            .await?
            .into_iter()
            .find(|(t, _)| *t == tier)
            .map(|(_, role)| RoleId::new(role as u64));
        if tier_role.is_some() {
            return Ok(tier_role);
        }
    }

    Ok(ticket_roles::get_kind_role(&data.pool, gid, kind)
        .await?
        .map(|role| RoleId::new(role as u64)))
}

fn welcome_embed(opener: &User, ticket: &Ticket) -> CreateEmbed {
    let kind = ticket.kind;
    let mut embed = embeds::standard_embed()
        .title(format!("{} {} Ticket", kind.emoji(), kind.label()))
        .description(format!(
            "Welcome {}!\n\n**Ticket Type:** {}\n\nOur team will be with you shortly. Please describe your inquiry in detail.",
            mention_user(opener.id),
            kind.description()
        ))
        .color(kind.color());

    if let (Some(tier), Some(trade)) = (ticket.tier, ticket.trade()) {
        embed = embed
            .field("Selected Tier", format!("{} {} ({})", tier.emoji(), tier.name(), tier.range()), false)
            .field("Trading With", trade.trader, false)
            .field("Requester Giving", trade.giving, false)
            .field("Requester Receiving", trade.receiving, false)
            .field("Both Can Join Links?", trade.both_join, false)
            .field("Tip", trade.tip.unwrap_or_else(|| "None".to_string()), false);
    }

    embeds::timestamped(
        embed
            .field(
                "📌 Commands",
                "`close` - Close this ticket\n`claim` - Claim this ticket\n`add <user>` - Add a user\n`remove <user>` - Remove a user",
                false,
            )
            .footer(CreateEmbedFooter::new(format!("Ticket created by {}", opener.name)).icon_url(opener.face())),
    )
}

fn ticket_buttons(kind: TicketKind) -> CreateActionRow {
    let mut buttons = Vec::new();
    if kind == TicketKind::Middleman {
        buttons.push(
            CreateButton::new(CLAIM_BUTTON_ID)
                .label("✅ Claim Ticket")
                .style(ButtonStyle::Success),
        );
    }
    buttons.push(
        CreateButton::new(CLOSE_BUTTON_ID)
            .label("🔒 Close Ticket")
            .style(ButtonStyle::Danger),
    );
    CreateActionRow::Buttons(buttons)
}

/// Claim a ticket for `claimer`, locking the staff roles to read-only
pub async fn claim(
    ctx: &Context,
    data: &Arc<Data>,
    channel_id: ChannelId,
    claimer: &Member,
) -> Result<Ticket, Error> {
    let ticket = ticket_for_channel(ctx, data, channel_id).await?;
    let roles = staff_roles(data, claimer.guild_id, ticket.kind).await?;

    let is_admin = data.settings.is_owner(claimer.user.id.get())
        || permissions::member_has(ctx, claimer, Permissions::ADMINISTRATOR);
    let tier_roles: Vec<RoleId> = ticket_roles::tier_roles(&data.pool, claimer.guild_id.get() as i64)
        .await?
        .into_iter()
        .map(|(_, role)| RoleId::new(role as u64))
        .collect();

    let actor = ClaimActor {
        is_admin,
        is_staff: is_ticket_staff(ctx, data, claimer, ticket.kind).await?,
        holds_middleman_role: claimer.roles.iter().any(|r| tier_roles.contains(r)),
    };
    lifecycle::check_claim(&ticket, actor)?;

    let claimed = match tickets::claim(&data.pool, channel_id.get() as i64, claimer.user.id.get() as i64).await? {
        Some(ticket) => ticket,
        None => {
            // Someone else claimed it between the check and the update
            let current = ticket_for_channel(ctx, data, channel_id).await?;
            return Err(match current.claimed_by {
                Some(by) => TicketError::AlreadyClaimed { by: by as u64 }.into(),
                None => Error::custom("The ticket changed while claiming, try again"),
            });
        }
    };

    channel_id
        .create_permission(ctx, member_overwrite(claimer.user.id, member_access()))
        .await?;
    channel_id
        .create_permission(ctx, member_overwrite(UserId::new(ticket.owner_id as u64), member_access()))
        .await?;
    for role in roles {
        channel_id
            .create_permission(
                ctx,
                role_overwrite(
                    role,
                    Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY,
                    Permissions::SEND_MESSAGES,
                ),
            )
            .await?;
    }

    rename_channel(ctx, channel_id, lifecycle::claimed_name).await;

    audit_log::log_action(
        ctx,
        data,
        claimer.guild_id,
        "Ticket claimed",
        &format!("{} claimed <#{}>", mention_user(claimer.user.id), channel_id),
        embeds::SUCCESS_COLOR,
        &[],
    )
    .await;

    Ok(claimed)
}

/// Release a claimed ticket and restore staff send rights
pub async fn unclaim(
    ctx: &Context,
    data: &Arc<Data>,
    channel_id: ChannelId,
    actor: &Member,
) -> Result<Ticket, Error> {
    let ticket = ticket_for_channel(ctx, data, channel_id).await?;
    let is_admin = data.settings.is_owner(actor.user.id.get())
        || permissions::member_has(ctx, actor, Permissions::ADMINISTRATOR);
    let claimer = lifecycle::check_unclaim(&ticket, actor.user.id.get(), is_admin)?;

    let released = tickets::unclaim(&data.pool, channel_id.get() as i64)
        .await?
        .ok_or(TicketError::NotClaimed)?;

    if claimer != ticket.owner_id as u64 {
        channel_id
            .delete_permission(ctx, PermissionOverwriteType::Member(UserId::new(claimer)))
            .await?;
    }
    for role in staff_roles(data, actor.guild_id, ticket.kind).await? {
        channel_id
            .create_permission(ctx, role_overwrite(role, member_access(), Permissions::empty()))
            .await?;
    }

    rename_channel(ctx, channel_id, lifecycle::unclaimed_name).await;

    Ok(released)
}

pub async fn add_member(
    ctx: &Context,
    data: &Arc<Data>,
    channel_id: ChannelId,
    user_id: UserId,
) -> Result<(), Error> {
    ticket_for_channel(ctx, data, channel_id).await?;
    channel_id
        .create_permission(ctx, member_overwrite(user_id, member_access()))
        .await?;
    Ok(())
}

pub async fn remove_member(
    ctx: &Context,
    data: &Arc<Data>,
    channel_id: ChannelId,
    user_id: UserId,
) -> Result<(), Error> {
    ticket_for_channel(ctx, data, channel_id).await?;
    channel_id
        .delete_permission(ctx, PermissionOverwriteType::Member(user_id))
        .await?;
    Ok(())
}

/// Rename a ticket, keeping the `-claimed` suffix while it is claimed
pub async fn rename(
    ctx: &Context,
    data: &Arc<Data>,
    channel_id: ChannelId,
    requested: &str,
) -> Result<String, Error> {
    let ticket = ticket_for_channel(ctx, data, channel_id).await?;
    crate::utils::profanity::validate_channel_name(requested).map_err(TicketError::InvalidName)?;

    let mut name = lifecycle::renamed(requested)?;
    if ticket.is_claimed() {
        name = lifecycle::claimed_name(&name);
    }

    channel_id
        .edit(ctx, EditChannel::new().name(&name))
        .await?;
    Ok(name)
}

/// Post the closed notice, drop the row, and delete the channel after a short delay
pub async fn close(
    ctx: &Context,
    data: &Arc<Data>,
    channel_id: ChannelId,
    closer: &User,
) -> Result<(), Error> {
    let ticket = ticket_for_channel(ctx, data, channel_id).await?;
    let guild_id = GuildId::new(ticket.guild_id as u64);

    let embed = embeds::timestamped(
        embeds::error_embed()
            .title("🔒 Ticket Closed")
            .description(format!(
                "This ticket was closed by {}.\nThe channel will be deleted in {} seconds.",
                mention_user(closer.id),
                CLOSE_DELAY.as_secs()
            )),
    );
    channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;

    audit_log::log_action(
        ctx,
        data,
        guild_id,
        "Ticket closed",
        &format!(
            "Ticket of {} closed by {}",
            mention_user(UserId::new(ticket.owner_id as u64)),
            mention_user(closer.id)
        ),
        embeds::ERROR_COLOR,
        &[("Type", ticket.kind.label().to_string())],
    )
    .await;

    tickets::delete(&data.pool, channel_id.get() as i64).await?;

    tokio::time::sleep(CLOSE_DELAY).await;
    if let Err(e) = channel_id.delete(ctx).await {
        warn!("Failed to delete ticket channel {}: {:?}", channel_id, e);
    }

    info!("Closed ticket {} (closed by {})", channel_id, closer.id);
    Ok(())
}

/// Post a "Trade Completed" embed for a middleman ticket to the proof channel
pub async fn send_proof(
    ctx: &Context,
    data: &Arc<Data>,
    channel_id: ChannelId,
    channel_name: &str,
    middleman: &User,
) -> Result<ChannelId, Error> {
    let ticket = ticket_for_channel(ctx, data, channel_id).await?;
    if ticket.kind != TicketKind::Middleman {
        return Err(TicketError::NotMiddlemanTicket.into());
    }

    let settings = guild_settings::get_or_default(&data.pool, ticket.guild_id).await?;
    let proof_channel = settings
        .proof_channel_id
        .map(|id| ChannelId::new(id as u64))
        .ok_or(TicketError::NoProofChannel)?;

    let trade = ticket.trade().unwrap_or_default();
    let unknown = |s: String| if s.is_empty() { "Unknown".to_string() } else { s };

    let mut embed = embeds::success_embed()
        .title("✅ Trade Completed")
        .field("Middleman", mention_user(middleman.id), false)
        .field("Type", "MM", false);
    if let Some(tier) = ticket.tier {
        embed = embed.field("Tier", format!("{} ({})", tier.name(), tier.range()), false);
    }
    embed = embed
        .field("Requester", mention_user(UserId::new(ticket.owner_id as u64)), false)
        .field("Trader", unknown(trade.trader), false)
        .field("Gave", unknown(trade.giving), false)
        .field("Received", unknown(trade.receiving), false);
    if !trade.both_join.is_empty() {
        embed = embed.field("Both Could Join Links", trade.both_join, false);
    }
    if let Some(tip) = trade.tip {
        embed = embed.field("Tip", tip, false);
    }

    let embed = embeds::timestamped(
        embed.footer(CreateEmbedFooter::new(format!("Ticket #{}", lifecycle::ticket_label(channel_name)))),
    );

    proof_channel
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;
    Ok(proof_channel)
}

async fn rename_channel<F>(ctx: &Context, channel_id: ChannelId, rename: F)
where
    F: Fn(&str) -> String,
{
    let current = match channel_id.to_channel(ctx).await.map(|c| c.guild()) {
        Ok(Some(channel)) => channel.name,
        Ok(None) => return,
        Err(e) => {
            warn!("Could not fetch ticket channel {}: {:?}", channel_id, e);
            return;
        }
    };

    let name = rename(&current);
    if name == current {
        return;
    }
    if let Err(e) = channel_id.edit(ctx, EditChannel::new().name(name)).await {
        // Discord limits channel renames to two per ten minutes
        warn!("Could not rename ticket channel {}: {:?}", channel_id, e);
    }
}
