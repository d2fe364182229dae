use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shoebox_gateway::asset::AssetClient;
use shoebox_gateway::discord::{Bot, remove_global_commands, start_discord_bot};
use shoebox_gateway::transfer::TransferPipeline;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = shoebox_core::Config::load()?;
    info!(
        "Configuration loaded (asset endpoint: {})",
        config.asset_endpoint()
    );

    // Config::load already rejected missing secrets; these cannot fail
    let api_key = config.asset_api_key().ok_or("ASSET_API_KEY is not set")?;
    let token = config
        .discord_bot_token()
        .ok_or("DISCORD_BOT_TOKEN is not set")?;

    // Uploads carry the host name so the asset service can tell this
    // uploader apart from other devices on the same account
    let device_id = hostname::get()?.to_string_lossy().into_owned();
    let asset_client = AssetClient::new(config.asset_endpoint(), api_key, device_id);

    // Surface an unreachable service or a rejected key now, not on the
    // first backup attempt
    asset_client.ping().await?;
    let user = asset_client.current_user().await?;
    info!("Asset service reachable, uploading as {}", user.name);

    let staging_dir = config.staging_dir();
    tokio::fs::create_dir_all(&staging_dir).await?;
    let pipeline = TransferPipeline::new(staging_dir, asset_client);

    // Start the Discord bot
    let bot = Bot::new(config.authorized_user_ids(), Arc::new(pipeline));
    let mut client = start_discord_bot(token, bot).await?;
    info!("Discord bot started");

    let http = Arc::clone(&client.http);
    let shard_manager = client.shard_manager.clone();

    // Run the Discord client in the background
    let gateway_task = tokio::spawn(async move {
        if let Err(e) = client.start().await {
            error!("Discord client error: {}", e);
        }
    });

    shutdown_signal().await;

    // Deregister the command so servers are not left with a dead
    // context menu entry
    if let Err(e) = remove_global_commands(&http).await {
        error!("Failed to remove global commands: {}", e);
    }

    shard_manager.shutdown_all().await;
    let _ = gateway_task.await;
    info!("Bot is down");

    Ok(())
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
