//! Seedbot binary.
//!
//! Start the bot with:
//! ```bash
//! TG_BOT_TOKEN=xxx AUTHORIZED_CHAT_ID=123 cargo run -p seedbot-telegram
//! ```

use std::path::PathBuf;

use clap::Parser;
use seedbot_core::{config, BotConfig};
use seedbot_telegram::TorrentBot;
use tracing_subscriber::EnvFilter;

/// Seedbot - control Transmission from Telegram
#[derive(Parser, Debug)]
#[command(name = "seedbot")]
#[command(about = "Telegram bot for a Transmission download box")]
struct Args {
    /// Extra env file to load before the defaults
    #[arg(short, long)]
    env_file: Option<PathBuf>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Variables already set in the environment always win.
    if let Some(path) = &args.env_file {
        dotenvy::from_path(path)?;
    }
    if let Some(path) = config::env_file().filter(|p| p.exists()) {
        let _ = dotenvy::from_path(&path);
    }
    let _ = dotenvy::dotenv();

    let filter = match args.verbose {
        0 => "seedbot=info,seedbot_core=info,seedbot_telegram=info,seedbot_transmission=info,teloxide=warn",
        1 => "seedbot=debug,seedbot_core=debug,seedbot_telegram=debug,seedbot_transmission=debug,teloxide=info",
        2 => "seedbot=trace,seedbot_core=trace,seedbot_telegram=trace,seedbot_transmission=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BotConfig::from_env()?;
    let bot = TorrentBot::new(&config)?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[robot] Seedbot");
            println!("   Bot: @{}", username);
            println!("   Authorized chat: {}", config.authorized_chat_id);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n   Press Ctrl+C to stop\n");

    bot.run().await?;

    Ok(())
}
