use std::sync::Arc;

use chrono::{DateTime, Utc};
use serenity::all::{Context, GuildId, Member};
use tracing::{error, info};

use super::scorer::{self, AltAction, AltAssessment, JoinProfile, RecentJoin};
use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::constants::alt::TIMEOUT_HOURS;
use crate::constants::embeds::{ALERT_COLOR, ERROR_COLOR};
use crate::db::queries::alt_detection;
use crate::services::audit_log;
use crate::services::moderation::actions;
use crate::utils::formatting::{mention_user, relative_time};

/// Score a new member against recent joiners and act on the result.
/// The member is recorded as a recent joiner afterwards either way.
pub async fn screen_member(ctx: &Context, data: &Arc<Data>, member: &Member) -> Result<AltAssessment, Error> {
    let guild_id = member.guild_id;
    let now = Utc::now();

    let profile = join_profile(
        member.user.id.get(),
        member.user.created_at().unix_timestamp(),
        member.user.avatar.is_some(),
        member.display_name(),
        now,
    );

    let recent = data.recent_joins.snapshot(guild_id.get(), now);
    let assessment = scorer::assess(&profile, &recent, now);

    data.recent_joins.record(
        guild_id.get(),
        RecentJoin {
            user_id: profile.user_id,
            name: profile.name.clone(),
            joined_at: now,
        },
    );

    if assessment.action != AltAction::None {
        respond(ctx, data, guild_id, member, &assessment).await?;
    }

    Ok(assessment)
}

/// Scoring input for a joiner. `name` is the server display name, which is
/// also what later joiners are compared against.
fn join_profile(
    user_id: u64,
    created_unix: i64,
    has_avatar: bool,
    display_name: &str,
    now: DateTime<Utc>,
) -> JoinProfile {
    JoinProfile {
        user_id,
        created_at: DateTime::from_timestamp(created_unix, 0).unwrap_or(now),
        has_avatar,
        name: display_name.to_string(),
    }
}

async fn respond(
    ctx: &Context,
    data: &Arc<Data>,
    guild_id: GuildId,
    member: &Member,
    assessment: &AltAssessment,
) -> Result<(), Error> {
    let user_id = member.user.id;

    let mut action = assessment.action;
    if action == AltAction::Timeout {
        if let Err(e) = actions::timeout_member(
            ctx,
            guild_id,
            user_id,
            TIMEOUT_HOURS * 60,
            &format!("Suspected alt account (score {})", assessment.score),
        )
        .await
        {
            error!("Failed to time out suspected alt {}: {:?}", user_id, e);
            action = AltAction::LogAlert;
        }
    }

    alt_detection::record(
        &data.pool,
        guild_id.get() as i64,
        user_id.get() as i64,
        assessment.score as i32,
        assessment.level.as_str(),
        &assessment.reasons,
        assessment.best_match.as_ref().map(|m| m.user_id as i64),
        action.as_str(),
    )
    .await?;

    info!(
        "Alt check for {} in {}: score {} ({}), action {}",
        user_id,
        guild_id,
        assessment.score,
        assessment.level.as_str(),
        action.as_str()
    );

    let mut fields = vec![
        ("Score", assessment.score.to_string()),
        ("Risk", assessment.level.as_str().to_string()),
        ("Created", relative_time(member.user.created_at().unix_timestamp())),
        ("Reasons", assessment.reasons.join("\n")),
    ];
    if let Some(m) = &assessment.best_match {
        fields.push((
            "Similar To",
            format!("{} ({:.0}%)", m.name, m.similarity * 100.0),
        ));
    }
    if action == AltAction::Timeout {
        fields.push(("Action", format!("Timed out for {} hours", TIMEOUT_HOURS)));
    }

    let color = if action == AltAction::Timeout { ERROR_COLOR } else { ALERT_COLOR };
    audit_log::log_action(
        ctx,
        data,
        guild_id,
        "Possible Alt Account",
        &format!("{} joined and looks like an alt", mention_user(user_id)),
        color,
        &fields,
    )
    .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_profile_uses_display_name() {
        let now = Utc::now();
        let created = (now - Duration::days(400)).timestamp();
        let profile = join_profile(9, created, true, "User482", now);

        assert_eq!(profile.name, "User482");
        let result = scorer::assess(&profile, &[], now);
        assert_eq!(result.score, 1);
        assert_eq!(result.reasons.len(), 1);
    }

    #[test]
    fn test_bad_timestamp_falls_back_to_now() {
        let now = Utc::now();
        let profile = join_profile(9, i64::MAX, true, "Marguerite", now);
        assert_eq!(profile.created_at, now);
    }
}
