//! osbot
//!
//! Relays OpenSea collection activity into Discord channels.

mod backend;
mod config;
mod poller;
mod shutdown;

use backend::{DiscordBackend, OpenSeaNames};
use clap::Parser;
use config::ConfigLoader;
use osbot_core::events::from_feed;
use osbot_core::processors::DeliveryPipeline;
use osbot_core::render::Renderer;
use osbot_sdk::client::{DiscordClient, OpenSeaClient};
use poller::EventPoller;
use shutdown::shutdown_signal;
use std::path::PathBuf;
use std::time::Duration;
use time::OffsetDateTime;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// osbot - OpenSea activity to Discord relay
#[derive(Parser, Debug)]
#[command(name = "osbot")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "OSBOT_CONFIG", default_value = "./osbot.toml")]
    config: PathBuf,

    /// Poll and deliver a single batch, then exit
    #[arg(long, default_value = "false")]
    once: bool,

    /// Override how far back the first poll reaches, in seconds
    #[arg(long)]
    lookback: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.json_logs);

    tracing::info!("Starting osbot v{}", env!("CARGO_PKG_VERSION"));

    let loaded_config = ConfigLoader::new(&args.config).load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    if loaded_config.subscriptions.is_empty() {
        tracing::warn!("No channel subscriptions configured (DISCORD_EVENTS), nothing to do");
        return Ok(());
    }
    for subscription in loaded_config.subscriptions.entries() {
        tracing::info!("Channel {} subscribed to {}", subscription.channel_id, subscription);
    }

    let opensea = OpenSeaClient::new(loaded_config.opensea_api_key.clone())?;
    let discord = DiscordClient::new(loaded_config.discord_token.clone())?;

    let renderer = Renderer::new(
        OpenSeaNames::new(opensea.clone()),
        opensea.collection_url(&loaded_config.collection_slug),
    );

    let lookback = args
        .lookback
        .map(Duration::from_secs)
        .unwrap_or(loaded_config.lookback);
    let mut poller = EventPoller::new(
        opensea,
        loaded_config.collection_slug.clone(),
        &loaded_config.subscriptions,
        loaded_config.max_pages,
        OffsetDateTime::now_utc() - lookback,
    );

    let mut pipeline = DeliveryPipeline::new(
        DiscordBackend::new(discord),
        renderer,
        loaded_config.subscriptions,
        loaded_config.delivery,
    );

    tracing::info!(
        "Watching collection {} every {:?}",
        loaded_config.collection_slug,
        loaded_config.poll_interval
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        match poller.poll().await {
            Ok(raw_events) => {
                let events = from_feed(raw_events);
                let result = pipeline.run(events).await;
                if args.once {
                    result?;
                }
            }
            Err(e) => {
                tracing::warn!(cursor = poller.cursor(), "Failed to poll event feed: {}", e);
                if args.once {
                    return Err(e.into());
                }
            }
        }

        if args.once {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(loaded_config.poll_interval) => {}
            _ = &mut shutdown => break,
        }
    }

    tracing::info!("osbot shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,osbot_core=info,reqwest=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
