use std::collections::HashSet;
use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, GatewayIntents, GuildId, UserId};
use poise::CreateReply;
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::bot::data::{Context, Data};
use crate::bot::error::Error;
use crate::commands;
use crate::config::Settings;
use crate::constants::embeds;
use crate::handlers::event_handler::event_handler;
use crate::services::giveaways::runner;
use crate::services::sweeper;
use crate::web;

fn all_commands() -> Vec<poise::Command<Arc<Data>, Error>> {
    vec![
        // Tickets
        commands::tickets::new(),
        commands::tickets::close(),
        commands::tickets::claim(),
        commands::tickets::unclaim(),
        commands::tickets::add(),
        commands::tickets::remove(),
        commands::tickets::rename(),
        commands::tickets::proof(),
        commands::tickets::ticketrole(),
        commands::tickets::mmrole(),
        commands::tickets::ticketroles(),
        commands::tickets::ticketstats(),
        commands::tickets::ticketpanel(),
        // Moderation
        commands::moderation::kick(),
        commands::moderation::ban(),
        commands::moderation::unban(),
        commands::moderation::softban(),
        commands::moderation::timeout(),
        commands::moderation::untimeout(),
        commands::moderation::warn(),
        commands::moderation::warnings(),
        commands::moderation::clearwarnings(),
        commands::moderation::purge(),
        commands::moderation::purgeuser(),
        commands::moderation::slowmode(),
        commands::moderation::lock(),
        commands::moderation::unlock(),
        commands::moderation::lockdown(),
        commands::moderation::unlockdown(),
        // Lists and security
        commands::lists::whitelist(),
        commands::lists::blacklist(),
        commands::security::automod(),
        commands::security::antiraid(),
        commands::security::antinuke(),
        commands::security::invitetracking(),
        commands::config::config(),
        // Giveaways
        commands::giveaways::gcreate(),
        commands::giveaways::gend(),
        commands::giveaways::greroll(),
        commands::giveaways::glist(),
        commands::giveaways::gdelete(),
        // Community and info
        commands::community::invites(),
        commands::community::whoinvited(),
        commands::coinflip::gambleflip(),
        commands::info::ping(),
        commands::info::serverinfo(),
        commands::info::userinfo(),
        commands::info::avatar(),
        commands::info::help(),
    ]
}

async fn reply_error(ctx: Context<'_>, message: impl Into<String>) {
    let embed = embeds::error_embed().description(format!("❌ {}", message.into()));
    if let Err(e) = ctx.send(CreateReply::default().embed(embed).ephemeral(true)).await {
        warn!("Failed to send error reply: {:?}", e);
    }
}

async fn on_error(error: poise::FrameworkError<'_, Arc<Data>, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            match &error {
                Error::Database(_) | Error::Io(_) | Error::Json(_) => {
                    error!("Command /{} failed: {:?}", ctx.command().qualified_name, error)
                }
                _ => warn!("Command /{} failed: {}", ctx.command().qualified_name, error),
            }
            reply_error(ctx, error.user_message()).await;
        }
        poise::FrameworkError::ArgumentParse { error, input, ctx, .. } => {
            let message = match input {
                Some(input) => format!("Invalid argument `{}`: {}", input, error),
                None => format!("Invalid argument: {}", error),
            };
            reply_error(ctx, format!("{}\nUse `{}help {}` for usage.", message, ctx.prefix(), ctx.command().qualified_name)).await;
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            let message = error
                .map(|e| e.user_message())
                .unwrap_or_else(|| "You can't use this command.".to_string());
            reply_error(ctx, message).await;
        }
        poise::FrameworkError::MissingUserPermissions { missing_permissions, ctx, .. } => {
            let message = match missing_permissions {
                Some(permissions) => format!("You need the {} permission to use this command.", permissions),
                None => "You don't have permission to use this command.".to_string(),
            };
            reply_error(ctx, message).await;
        }
        poise::FrameworkError::MissingBotPermissions { missing_permissions, ctx, .. } => {
            reply_error(ctx, format!("I need the {} permission to do that.", missing_permissions)).await;
        }
        poise::FrameworkError::GuildOnly { ctx, .. } => {
            reply_error(ctx, "This command only works in a server.").await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            // Unknown prefix commands are ignored
        }
        err => {
            if let Err(e) = poise::builtins::on_error(err).await {
                error!("Framework error: {:?}", e);
            }
        }
    }
}

async fn register_commands(
    ctx: &serenity::Context,
    commands: &[poise::Command<Arc<Data>, Error>],
    guild_id: Option<u64>,
) -> Result<(), Error> {
    match guild_id {
        Some(guild_id) => {
            let guild_id = GuildId::new(guild_id);
            info!("Registering {} commands in guild {}", commands.len(), guild_id);

            // Stale global commands would show up twice next to the guild ones
            match ctx.http.get_global_commands().await {
                Ok(global_commands) => {
                    for cmd in &global_commands {
                        if let Err(e) = ctx.http.delete_global_command(cmd.id).await {
                            warn!("Failed to delete global command {}: {:?}", cmd.name, e);
                        }
                    }
                }
                Err(e) => warn!("Could not check for global commands: {:?}", e),
            }

            poise::builtins::register_in_guild(ctx, commands, guild_id).await?;

            match ctx.http.get_guild_commands(guild_id).await {
                Ok(registered) => info!("Discord reports {} guild commands for {}", registered.len(), guild_id),
                Err(e) => error!("Could not verify guild commands (missing applications.commands scope?): {:?}", e),
            }
        }
        None => {
            info!("Registering {} commands globally", commands.len());
            poise::builtins::register_globally(ctx, commands).await?;
            info!("Global commands can take up to 1 hour to appear in all servers");
        }
    }

    Ok(())
}

pub async fn run(settings: Settings, pool: PgPool) -> Result<(), Error> {
    let data = Arc::new(Data::new(pool, settings.clone()));

    let owners: HashSet<UserId> = settings.owner_id.map(UserId::new).into_iter().collect();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(settings.prefix.clone()),
                mention_as_prefix: true,
                ..Default::default()
            },
            owners,
            skip_checks_for_owners: true,
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as {}", ready.user.name);
                data.set_guild_count(ready.guilds.len());

                if let Err(e) = data.load_lists().await {
                    warn!("Failed to load white/blacklists: {:?}", e);
                }
                info!(
                    "Loaded {} whitelisted and {} blacklisted users",
                    data.whitelist.len(),
                    data.blacklist.len()
                );

                match data.giveaways.load().await {
                    Ok(count) => {
                        let pending = data.giveaways.pending().await;
                        runner::reschedule_all(ctx, &data, &pending);
                        info!("Loaded {} giveaways, {} still running", count, pending.len());
                    }
                    Err(e) => warn!("Failed to load giveaways: {:?}", e),
                }

                sweeper::spawn_sweeper(data.clone());
                info!("Started cleanup sweeper");

                tokio::spawn(web::run_http_server(data.settings.port, data.clone()));

                register_commands(ctx, &framework.options().commands, data.settings.guild_id).await?;

                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_INVITES
        | GatewayIntents::GUILD_MODERATION;

    let mut client = serenity::ClientBuilder::new(&settings.discord_token, intents)
        .framework(framework)
        .await
        .map_err(Error::Serenity)?;

    info!("Starting Discord client...");
    client.start().await.map_err(Error::Serenity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names_are_unique() {
        let commands = all_commands();
        let mut names = HashSet::new();
        for command in &commands {
            assert!(names.insert(command.name.clone()), "duplicate command {}", command.name);
        }
        assert!(names.contains("gambleflip"));
        assert!(names.contains("whitelist"));
    }

    #[test]
    fn test_subcommands_are_attached() {
        let commands = all_commands();
        let config = commands.iter().find(|c| c.name == "config").map(|c| c.subcommands.len());
        assert_eq!(config, Some(10));
        let whitelist = commands.iter().find(|c| c.name == "whitelist").map(|c| c.subcommands.len());
        assert_eq!(whitelist, Some(3));
    }
}
