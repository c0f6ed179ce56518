//! Chill CLI - Terminal front end for Chill Points

mod commands;
mod state;

use anyhow::Context;
use chill_rewards::ClientConfig;
use clap::{Parser, Subcommand};
use state::AppState;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chill", version, about = "Check and spend your Chill Points")]
struct Cli {
    /// Config file (defaults to <config dir>/ChillStay/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show balance, tier progress and expiring points
    Card,
    /// List reward transactions
    History {
        /// all, earn, redeem or transfer
        #[arg(long = "type")]
        kind: Option<String>,
        /// Case-insensitive text to look for in descriptions
        #[arg(long)]
        search: Option<String>,
    },
    /// Redeem points
    Redeem { points: i64, description: String },
    /// Send points to another member
    Transfer {
        points: i64,
        recipient_email: String,
        description: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chill=info,chill_rewards=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => ClientConfig::load(path)?,
        None => match ClientConfig::default_path() {
            Some(path) => ClientConfig::load_or_default(&path)?,
            None => ClientConfig::default(),
        },
    }
    .with_env_overrides()?;

    let state = AppState::new(config)
        .await
        .context("Failed to start the rewards client (is CHILL_SESSION_TOKEN set?)")?;

    match cli.command {
        Command::Card => {
            println!("{}", commands::show_card(&state).await.to_text());
        }
        Command::History { kind, search } => {
            let text = commands::show_history(&state, kind.as_deref(), search.as_deref()).await?;
            println!("{}", text);
        }
        Command::Redeem { points, description } => {
            let report = commands::redeem(&state, points, &description).await;
            println!("{}", report.to_text());
            if !report.succeeded() {
                std::process::exit(1);
            }
        }
        Command::Transfer {
            points,
            recipient_email,
            description,
        } => {
            let report = commands::transfer(&state, points, &recipient_email, &description).await;
            println!("{}", report.to_text());
            if !report.succeeded() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
