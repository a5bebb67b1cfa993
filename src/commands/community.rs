use poise::serenity_prelude::Member;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::constants::embeds;
use crate::db::queries::invites;
use crate::utils::formatting::{mention_user, plural, relative_time};

/// Show how many members someone has invited
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn invites(
    ctx: Context<'_>,
    #[description = "Member to check (defaults to yourself)"] member: Option<Member>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;
    let user = member.as_ref().map(|m| &m.user).unwrap_or_else(|| ctx.author());

    let count = invites::count_by_inviter(&ctx.data().pool, guild_id.get() as i64, user.id.get() as i64).await?;

    let embed = embeds::standard_embed()
        .title("📨 Invites")
        .thumbnail(user.face())
        .description(format!("{} has invited **{}**", mention_user(user.id), plural(count, "member")));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show who invited a member
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn whoinvited(
    ctx: Context<'_>,
    #[description = "Member to look up"] member: Member,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(Error::custom("Not in a guild"))?;

    let join = invites::latest_join(&ctx.data().pool, guild_id.get() as i64, member.user.id.get() as i64).await?;

    let description = match join {
        Some(join) => {
            let inviter = join
                .inviter_id
                .map(|id| mention_user((id as u64).into()))
                .unwrap_or_else(|| "Unknown".to_string());
            format!(
                "{} was invited by {} with `{}` {}",
                mention_user(member.user.id),
                inviter,
                join.invite_code,
                relative_time(join.joined_at.timestamp())
            )
        }
        None => format!("No invite was recorded for {}", mention_user(member.user.id)),
    };

    let embed = embeds::standard_embed().title("🔍 Who Invited").description(description);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
