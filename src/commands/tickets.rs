use poise::serenity_prelude::{CreateMessage, Member, Role};
use poise::CreateReply;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::commands::checks::owner_or_admin;
use crate::components::{ticket_controls, ticket_panel};
use crate::constants::embeds;
use crate::db::models::{MmTier, Ticket, TicketKind};
use crate::db::queries::{ticket_roles, tickets};
use crate::services::tickets::{channels, TicketError};
use crate::utils::formatting::{mention_channel, mention_role, mention_user};

/// The ticket of the current channel, if the author is staff for it
async fn staff_ticket(ctx: Context<'_>) -> Result<Ticket, Error> {
    let ticket = channels::ticket_for_channel(ctx.serenity_context(), ctx.data(), ctx.channel_id()).await?;
    let member = ctx
        .author_member()
        .await
        .ok_or(Error::custom("Could not load your member data"))?;

    if channels::is_ticket_staff(ctx.serenity_context(), ctx.data(), &member, ticket.kind).await? {
        Ok(ticket)
    } else {
        Err(TicketError::NotStaff.into())
    }
}

/// Open a new ticket
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn new(ctx: Context<'_>, #[description = "Ticket type"] kind: TicketKind) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    ctx.defer_ephemeral().await?;

    let channel_id = channels::open_ticket(
        ctx.serenity_context(),
        ctx.data(),
        guild_id,
        ctx.author(),
        kind,
        None,
        None,
    )
    .await?;

    let embed = embeds::success_embed()
        .title("✅ Ticket Created")
        .description(format!("Your ticket has been created: {}", mention_channel(channel_id.get())));
    ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await?;
    Ok(())
}

/// Close this ticket
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn close(ctx: Context<'_>) -> Result<(), Error> {
    let ticket = channels::ticket_for_channel(ctx.serenity_context(), ctx.data(), ctx.channel_id()).await?;
    let member = ctx
        .author_member()
        .await
        .ok_or(Error::custom("Could not load your member data"))?;

    if !ticket_controls::can_close(ctx.serenity_context(), ctx.data(), &member, &ticket).await? {
        return Err(Error::denied("only the ticket owner or staff can close this ticket"));
    }

    let (embed, components) = ticket_controls::close_prompt();
    ctx.send(CreateReply::default().embed(embed).components(components)).await?;
    Ok(())
}

/// Claim this ticket
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn claim(ctx: Context<'_>) -> Result<(), Error> {
    let member = ctx
        .author_member()
        .await
        .ok_or(Error::custom("Could not load your member data"))?;

    channels::claim(ctx.serenity_context(), ctx.data(), ctx.channel_id(), &member).await?;

    let embed = embeds::success_embed()
        .title("✅ Ticket Claimed")
        .description(format!("This ticket has been claimed by {}", mention_user(member.user.id)));
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Release your claim on this ticket
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn unclaim(ctx: Context<'_>) -> Result<(), Error> {
    let member = ctx
        .author_member()
        .await
        .ok_or(Error::custom("Could not load your member data"))?;

    channels::unclaim(ctx.serenity_context(), ctx.data(), ctx.channel_id(), &member).await?;

    let embed = embeds::warning_embed()
        .title("Ticket Unclaimed")
        .description("This ticket is open for other staff again.");
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Add a member to this ticket
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn add(ctx: Context<'_>, #[description = "Member to add"] member: Member) -> Result<(), Error> {
    staff_ticket(ctx).await?;
    channels::add_member(ctx.serenity_context(), ctx.data(), ctx.channel_id(), member.user.id).await?;

    let embed = embeds::success_embed().description(format!("✅ Added {} to the ticket", mention_user(member.user.id)));
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Remove a member from this ticket
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn remove(ctx: Context<'_>, #[description = "Member to remove"] member: Member) -> Result<(), Error> {
    let ticket = staff_ticket(ctx).await?;
    if member.user.id.get() as i64 == ticket.owner_id {
        return Err(Error::InvalidOperation("The ticket owner cannot be removed".to_string()));
    }

    channels::remove_member(ctx.serenity_context(), ctx.data(), ctx.channel_id(), member.user.id).await?;

    let embed = embeds::success_embed()
        .description(format!("✅ Removed {} from the ticket", mention_user(member.user.id)));
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Rename this ticket
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn rename(
    ctx: Context<'_>,
    #[description = "New name"]
    #[rest]
    name: String,
) -> Result<(), Error> {
    staff_ticket(ctx).await?;
    let name = channels::rename(ctx.serenity_context(), ctx.data(), ctx.channel_id(), &name).await?;

    let embed = embeds::success_embed().description(format!("✅ Ticket renamed to `{}`", name));
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Post proof of a completed middleman trade
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn proof(ctx: Context<'_>) -> Result<(), Error> {
    staff_ticket(ctx).await?;
    let channel_name = ctx
        .guild_channel()
        .await
        .map(|c| c.name)
        .unwrap_or_default();

    let proof_channel = channels::send_proof(
        ctx.serenity_context(),
        ctx.data(),
        ctx.channel_id(),
        &channel_name,
        ctx.author(),
    )
    .await?;

    let embed = embeds::success_embed()
        .description(format!("✅ Proof sent to {}", mention_channel(proof_channel.get())));
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Set the role pinged for a ticket type
#[poise::command(prefix_command, slash_command, guild_only, check = "owner_or_admin")]
pub async fn ticketrole(
    ctx: Context<'_>,
    #[description = "Ticket type"] kind: TicketKind,
    #[description = "Role to ping"] role: Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    ticket_roles::set_kind_role(&ctx.data().pool, guild_id.get() as i64, kind, role.id.get() as i64).await?;

    let embed = embeds::success_embed().description(format!(
        "✅ {} tickets will ping {}",
        kind.label(),
        mention_role(role.id.get())
    ));
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Set the role for a middleman tier
#[poise::command(prefix_command, slash_command, guild_only, check = "owner_or_admin")]
pub async fn mmrole(
    ctx: Context<'_>,
    #[description = "Middleman tier"] tier: MmTier,
    #[description = "Role for this tier"] role: Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    ticket_roles::set_tier_role(&ctx.data().pool, guild_id.get() as i64, tier, role.id.get() as i64).await?;

    let embed = embeds::success_embed().description(format!(
        "✅ {} {} is now {}",
        tier.emoji(),
        tier.name(),
        mention_role(role.id.get())
    ));
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show the configured ticket and middleman roles
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn ticketroles(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let pool = &ctx.data().pool;
    let gid = guild_id.get() as i64;

    let kinds = ticket_roles::kind_roles(pool, gid).await?;
    let tiers = ticket_roles::tier_roles(pool, gid).await?;

    let kind_lines: Vec<String> = TicketKind::ALL
        .iter()
        .map(|kind| {
            let role = kinds
                .iter()
                .find(|(k, _)| k == kind)
                .map(|(_, r)| mention_role(*r as u64))
                .unwrap_or_else(|| "Not set".to_string());
            format!("{} **{}:** {}", kind.emoji(), kind.label(), role)
        })
        .collect();

    let tier_lines: Vec<String> = MmTier::ALL
        .iter()
        .map(|tier| {
            let role = tiers
                .iter()
                .find(|(t, _)| t == tier)
                .map(|(_, r)| mention_role(*r as u64))
                .unwrap_or_else(|| "Not set".to_string());
            format!("{} **{}:** {}", tier.emoji(), tier.name(), role)
        })
        .collect();

    let embed = embeds::standard_embed()
        .title("🎫 Ticket Roles")
        .field("Ticket Types", kind_lines.join("\n"), false)
        .field("Middleman Tiers", tier_lines.join("\n"), false);
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Ticket counts for this server
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn ticketstats(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let (active, claimed) = tickets::counts(&ctx.data().pool, guild_id.get() as i64).await?;

    let embed = embeds::timestamped(
        embeds::standard_embed()
            .title("📊 Ticket Statistics")
            .field("Active Tickets", active.to_string(), true)
            .field("Claimed", claimed.to_string(), true)
            .field("Unclaimed", (active - claimed).to_string(), true),
    );
    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Post the ticket panel in this channel
#[poise::command(prefix_command, slash_command, guild_only, check = "owner_or_admin")]
pub async fn ticketpanel(ctx: Context<'_>) -> Result<(), Error> {
    let (embed, components) = ticket_panel::panel();
    ctx.channel_id()
        .send_message(
            ctx,
            CreateMessage::new()
                .embed(embed)
                .components(components),
        )
        .await?;

    ctx.send(
        CreateReply::default()
            .content("✅ Ticket panel created successfully!")
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
