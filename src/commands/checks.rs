use serenity::all::Permissions;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::utils::permissions;

/// Bot owner only
pub async fn owner_only(ctx: Context<'_>) -> Result<bool, Error> {
    if ctx.data().settings.is_owner(ctx.author().id.get()) {
        Ok(true)
    } else {
        Err(Error::denied("only the bot owner can use this command"))
    }
}

/// Bot owner or a server administrator
pub async fn owner_or_admin(ctx: Context<'_>) -> Result<bool, Error> {
    if ctx.data().settings.is_owner(ctx.author().id.get()) {
        return Ok(true);
    }

    let member = ctx
        .author_member()
        .await
        .ok_or_else(|| Error::denied("this command only works in a server"))?;

    if permissions::member_has(ctx.serenity_context(), &member, Permissions::ADMINISTRATOR) {
        Ok(true)
    } else {
        Err(Error::denied("administrator permission required"))
    }
}
