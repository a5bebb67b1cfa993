use std::time::Duration;

use poise::serenity_prelude::Member;
use poise::CreateReply;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::services::coinflip::{CoinflipMatch, Player};

const FLIP_INTERVAL: Duration = Duration::from_secs(1);

fn player(member: &Member) -> Player {
    Player {
        id: member.user.id,
        name: member.display_name().to_string(),
    }
}

/// Best-of-N coinflip battle between two members
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn gambleflip(
    ctx: Context<'_>,
    #[description = "First player"] user1: Member,
    #[description = "Second player"] user2: Member,
    #[description = "Number of flips (1-100)"] flips: u32,
) -> Result<(), Error> {
    let mut game = CoinflipMatch::new(player(&user1), player(&user2), flips).map_err(Error::Custom)?;

    let reply = ctx.send(CreateReply::default().embed(game.progress_embed(None))).await?;

    let mut rng = StdRng::from_entropy();
    while let Some(side) = game.flip(&mut rng) {
        tokio::time::sleep(FLIP_INTERVAL).await;
        if let Err(e) = reply.edit(ctx, CreateReply::default().embed(game.progress_embed(Some(side)))).await {
            tracing::warn!("Coinflip message vanished mid-match: {:?}", e);
            return Ok(());
        }
    }

    tokio::time::sleep(FLIP_INTERVAL).await;
    reply.edit(ctx, CreateReply::default().embed(game.result_embed())).await?;

    Ok(())
}
