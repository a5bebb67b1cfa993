use std::time::Instant;

use poise::serenity_prelude::{Member, Mentionable};
use poise::CreateReply;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds::{self, BULLET};
use crate::utils::formatting::{format_duration, format_number, mention_user, relative_time, truncate};

/// Check the bot's latency
#[poise::command(prefix_command, slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let started = Instant::now();
    let reply = ctx.send(CreateReply::default().content("🏓 Pinging...")).await?;
    let round_trip = started.elapsed().as_millis();

    let gateway = ctx.ping().await;
    let embed = embeds::standard_embed().title("🏓 Pong!").description(format!(
        "{} Gateway: **{}ms**\n{} Round trip: **{}ms**\n{} Uptime: **{}**",
        BULLET,
        gateway.as_millis(),
        BULLET,
        round_trip,
        BULLET,
        format_duration(ctx.data().started_at.elapsed())
    ));

    reply.edit(ctx, CreateReply::default().content("").embed(embed)).await?;
    Ok(())
}

/// Show information about this server
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn serverinfo(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    // Cache refs can't be held across an await
    let embed = {
        let guild = ctx.guild().ok_or(Error::custom("Server is not cached yet"))?;

        let mut embed = embeds::standard_embed()
            .title(&guild.name)
            .field("Owner", mention_user(guild.owner_id), true)
            .field("Members", format_number(guild.member_count as i64), true)
            .field("Channels", guild.channels.len().to_string(), true)
            .field("Roles", guild.roles.len().to_string(), true)
            .field("Boosts", guild.premium_subscription_count.unwrap_or(0).to_string(), true)
            .field("Verification", format!("{:?}", guild.verification_level), true)
            .field("Created", relative_time(guild_id.created_at().unix_timestamp()), true)
            .footer(poise::serenity_prelude::CreateEmbedFooter::new(format!("ID: {}", guild_id)));

        if let Some(icon) = guild.icon_url() {
            embed = embed.thumbnail(icon);
        }
        embed
    };

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show information about a member
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn userinfo(
    ctx: Context<'_>,
    #[description = "Member to look up (defaults to yourself)"] member: Option<Member>,
) -> Result<(), Error> {
    let member = match member {
        Some(member) => member,
        None => ctx
            .author_member()
            .await
            .ok_or(Error::custom("Couldn't find you in this server"))?
            .into_owned(),
    };
    let user = &member.user;

    let roles = member
        .roles
        .iter()
        .map(|role| role.mention().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let roles = if roles.is_empty() { "None".to_string() } else { truncate(&roles, 1000) };

    let mut embed = embeds::standard_embed()
        .title(user.tag())
        .thumbnail(member.face())
        .field("User", mention_user(user.id), true)
        .field("Bot", if user.bot { "Yes" } else { "No" }, true)
        .field("Created", relative_time(user.id.created_at().unix_timestamp()), true)
        .field(format!("Roles ({})", member.roles.len()), roles, false);

    if let Some(joined) = member.joined_at {
        embed = embed.field("Joined", relative_time(joined.unix_timestamp()), true);
    }
    if let Some(until) = member.communication_disabled_until {
        if until.unix_timestamp() > chrono::Utc::now().timestamp() {
            embed = embed.field("Timed out", relative_time(until.unix_timestamp()), true);
        }
    }

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show a member's avatar
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn avatar(
    ctx: Context<'_>,
    #[description = "Member (defaults to yourself)"] member: Option<Member>,
) -> Result<(), Error> {
    let (name, url) = match &member {
        Some(member) => (member.display_name().to_string(), member.face()),
        None => (ctx.author().name.clone(), ctx.author().face()),
    };

    let embed = embeds::standard_embed()
        .title(format!("{}'s avatar", name))
        .image(&url)
        .url(url);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show the command list, or help for one command
#[poise::command(prefix_command, slash_command)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to show help for"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> Result<(), Error> {
    let footer = format!("Prefix: {} | Slash commands work everywhere too", ctx.data().settings.prefix);
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: &footer,
            ephemeral: true,
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}
