use poise::serenity_prelude::{User, UserId};
use poise::CreateReply;
use tracing::info;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::commands::checks::owner_only;
use crate::constants::embeds;
use crate::db::models::UserList;
use crate::db::queries::lists;
use crate::utils::formatting::{mention_user, relative_time};

async fn add_entry(ctx: Context<'_>, list: UserList, user: User, reason: Option<String>) -> Result<(), Error> {
    let data = ctx.data();
    lists::add(
        &data.pool,
        list,
        user.id.get() as i64,
        reason.as_deref(),
        ctx.author().id.get() as i64,
    )
    .await?;

    data.list(list).insert(user.id.get());
    data.list(list.opposite()).remove(&user.id.get());
    info!("{} added {} to the {}", ctx.author().id, user.id, list.table());

    let mut embed = embeds::success_embed()
        .description(format!("Added {} to the {}.", mention_user(user.id), list.table()));
    if let Some(reason) = reason {
        embed = embed.field("Reason", reason, false);
    }
    ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await?;
    Ok(())
}

async fn remove_entry(ctx: Context<'_>, list: UserList, user: User) -> Result<(), Error> {
    let data = ctx.data();
    let removed = lists::remove(&data.pool, list, user.id.get() as i64).await?;
    data.list(list).remove(&user.id.get());

    let embed = if removed {
        embeds::success_embed().description(format!("Removed {} from the {}.", mention_user(user.id), list.table()))
    } else {
        embeds::warning_embed().description(format!("{} is not on the {}.", mention_user(user.id), list.table()))
    };
    ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await?;
    Ok(())
}

async fn show_entries(ctx: Context<'_>, list: UserList) -> Result<(), Error> {
    let entries = lists::all(&ctx.data().pool, list).await?;

    let description = if entries.is_empty() {
        format!("The {} is empty.", list.table())
    } else {
        entries
            .iter()
            .map(|e| {
                let user = mention_user(UserId::new(e.user_id as u64));
                match &e.reason {
                    Some(reason) => format!("{} - {} ({})", user, reason, relative_time(e.added_at.timestamp())),
                    None => format!("{} ({})", user, relative_time(e.added_at.timestamp())),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let embed = embeds::standard_embed()
        .title(format!("{} ({})", list.table(), entries.len()))
        .description(description);
    ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await?;
    Ok(())
}

/// Users exempt from auto-moderation and trusted by anti-nuke
#[poise::command(
    prefix_command,
    slash_command,
    subcommands("whitelist_add", "whitelist_remove", "whitelist_list"),
    check = "owner_only"
)]
pub async fn whitelist(ctx: Context<'_>) -> Result<(), Error> {
    show_entries(ctx, UserList::Whitelist).await
}

/// Add a user to the whitelist
#[poise::command(prefix_command, slash_command, rename = "add", check = "owner_only")]
pub async fn whitelist_add(
    ctx: Context<'_>,
    #[description = "User to whitelist"] user: User,
    #[description = "Reason"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    add_entry(ctx, UserList::Whitelist, user, reason).await
}

/// Remove a user from the whitelist
#[poise::command(prefix_command, slash_command, rename = "remove", check = "owner_only")]
pub async fn whitelist_remove(ctx: Context<'_>, #[description = "User"] user: User) -> Result<(), Error> {
    remove_entry(ctx, UserList::Whitelist, user).await
}

/// Show the whitelist
#[poise::command(prefix_command, slash_command, rename = "list", check = "owner_only")]
pub async fn whitelist_list(ctx: Context<'_>) -> Result<(), Error> {
    show_entries(ctx, UserList::Whitelist).await
}

/// Users kicked on join and muted on sight
#[poise::command(
    prefix_command,
    slash_command,
    subcommands("blacklist_add", "blacklist_remove", "blacklist_list"),
    check = "owner_only"
)]
pub async fn blacklist(ctx: Context<'_>) -> Result<(), Error> {
    show_entries(ctx, UserList::Blacklist).await
}

/// Add a user to the blacklist
#[poise::command(prefix_command, slash_command, rename = "add", check = "owner_only")]
pub async fn blacklist_add(
    ctx: Context<'_>,
    #[description = "User to blacklist"] user: User,
    #[description = "Reason"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    add_entry(ctx, UserList::Blacklist, user, reason).await
}

/// Remove a user from the blacklist
#[poise::command(prefix_command, slash_command, rename = "remove", check = "owner_only")]
pub async fn blacklist_remove(ctx: Context<'_>, #[description = "User"] user: User) -> Result<(), Error> {
    remove_entry(ctx, UserList::Blacklist, user).await
}

/// Show the blacklist
#[poise::command(prefix_command, slash_command, rename = "list", check = "owner_only")]
pub async fn blacklist_list(ctx: Context<'_>) -> Result<(), Error> {
    show_entries(ctx, UserList::Blacklist).await
}
