mod bot;

use serenity::http::Http;
use serenity::model::application::Command;
use serenity::prelude::*;
use tracing::info;

pub use bot::{BACKUP_COMMAND, Bot};

/// Start the Discord bot and connect it to the gateway.
pub async fn start_discord_bot(token: &str, bot: Bot) -> Result<Client, DiscordError> {
    info!("Starting Discord bot...");

    // Context menu interactions arrive without any privileged intent;
    // this bot never reads message content.
    let client = Client::builder(token, GatewayIntents::empty())
        .event_handler(bot)
        .await
        .map_err(|e| DiscordError::ClientError(e.to_string()))?;

    Ok(client)
}

/// Delete the global commands this bot registered.
///
/// Run on shutdown so a retired bot does not leave a dead context menu
/// entry behind on every server it was invited to.
pub async fn remove_global_commands(http: &Http) -> Result<(), DiscordError> {
    let commands = Command::get_global_commands(http)
        .await
        .map_err(|e| DiscordError::CommandCleanup(e.to_string()))?;

    for command in commands {
        if command.name == BACKUP_COMMAND {
            Command::delete_global_command(http, command.id)
                .await
                .map_err(|e| DiscordError::CommandCleanup(e.to_string()))?;
            info!("Deleted global command {}", command.name);
        }
    }

    Ok(())
}

/// Discord-related errors
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("Failed to create Discord client: {0}")]
    ClientError(String),
    #[error("Failed to clean up global commands: {0}")]
    CommandCleanup(String),
}
