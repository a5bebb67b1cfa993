use std::sync::Arc;

use serenity::all::{ChannelId, Context, CreateMessage, GuildId, Member, UserId};
use tracing::{debug, error};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::db::models::{GuildSettings, InviteJoin, InviteSnapshot};
use crate::db::queries::invites;
use crate::utils::formatting::mention_user;

/// Current invites of a guild as snapshot rows
pub async fn fetch_current(ctx: &Context, guild_id: GuildId) -> Result<Vec<InviteSnapshot>, Error> {
    let invites = guild_id.invites(ctx).await?;

    Ok(invites
        .into_iter()
        .map(|invite| InviteSnapshot {
            guild_id: guild_id.get() as i64,
            code: invite.code,
            inviter_id: invite.inviter.map(|u| u.id.get() as i64),
            uses: invite.uses as i64,
        })
        .collect())
}

/// Replace the stored snapshot with the guild's live invites
pub async fn refresh(ctx: &Context, data: &Arc<Data>, guild_id: GuildId) -> Result<usize, Error> {
    let current = fetch_current(ctx, guild_id).await?;
    invites::replace_snapshot(&data.pool, guild_id.get() as i64, &current).await?;
    debug!("Cached {} invites for {}", current.len(), guild_id);
    Ok(current.len())
}

/// The invite whose use count grew since the last snapshot.
/// An invite missing from the snapshot counts if it has been used at all.
pub fn find_used<'a>(previous: &[InviteSnapshot], current: &'a [InviteSnapshot]) -> Option<&'a InviteSnapshot> {
    current.iter().find(|invite| {
        match previous.iter().find(|p| p.code == invite.code) {
            Some(before) => invite.uses > before.uses,
            None => invite.uses > 0,
        }
    })
}

/// Work out which invite a new member used, record it and announce it.
/// Returns None when tracking is off or the invite could not be determined.
pub async fn track_join(
    ctx: &Context,
    data: &Arc<Data>,
    settings: &GuildSettings,
    member: &Member,
) -> Result<Option<InviteJoin>, Error> {
    if !settings.invite_tracking_enabled {
        return Ok(None);
    }

    let guild_id = member.guild_id;
    let previous = invites::snapshot(&data.pool, guild_id.get() as i64).await?;
    let current = fetch_current(ctx, guild_id).await?;

    let join = match find_used(&previous, &current) {
        Some(used) => Some(
            invites::record_join(
                &data.pool,
                guild_id.get() as i64,
                member.user.id.get() as i64,
                used.inviter_id,
                &used.code,
            )
            .await?,
        ),
        None => None,
    };

    invites::replace_snapshot(&data.pool, guild_id.get() as i64, &current).await?;

    if let (Some(join), Some(channel)) = (&join, settings.invite_tracker_channel_id) {
        if let Some(inviter) = join.inviter_id {
            let content = format!(
                "{} joined! Invited by {}",
                mention_user(member.user.id),
                mention_user(UserId::new(inviter as u64))
            );
            if let Err(e) = ChannelId::new(channel as u64)
                .send_message(ctx, CreateMessage::new().content(content))
                .await
            {
                error!("Failed to send invite tracker message: {:?}", e);
            }
        }
    }

    Ok(join)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invite(code: &str, uses: i64) -> InviteSnapshot {
        InviteSnapshot {
            guild_id: 1,
            code: code.to_string(),
            inviter_id: Some(42),
            uses,
        }
    }

    #[test]
    fn test_finds_invite_with_more_uses() {
        let previous = vec![invite("abc", 3), invite("def", 1)];
        let current = vec![invite("abc", 3), invite("def", 2)];
        assert_eq!(find_used(&previous, &current).map(|i| i.code.as_str()), Some("def"));
    }

    #[test]
    fn test_new_invite_counts_once_used() {
        let previous = vec![invite("abc", 3)];
        let current = vec![invite("abc", 3), invite("new", 1)];
        assert_eq!(find_used(&previous, &current).map(|i| i.code.as_str()), Some("new"));

        let unused = vec![invite("abc", 3), invite("new", 0)];
        assert!(find_used(&previous, &unused).is_none());
    }

    #[test]
    fn test_nothing_changed() {
        let previous = vec![invite("abc", 3)];
        assert!(find_used(&previous, &previous.clone()).is_none());
    }
}
