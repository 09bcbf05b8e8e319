mod analysis;
mod api;
mod config;
mod display;
mod error;
mod rate_limit;

use analysis::champion_stats::{aggregate, ranked_by_games, ChampionStats};
use anyhow::Context;
use api::client::RiotApiClient;
use clap::Parser;
use config::Config;
use display::output::{display_champion_stats, display_error, display_info, display_success};
use display::progress::BusyIndicator;
use error::AppError;
use rate_limit::Throttle;
use std::collections::HashMap;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "Champ Stats")]
#[command(about = "Per-champion win rate and KDA from recent League matches", long_about = None)]
struct Args {
    /// Summoner name, or Riot ID as Name#TAG
    summoner: String,

    /// Platform id such as euw1 or na1 (default: RIOT_PLATFORM_URL / euw1)
    #[arg(short, long)]
    region: Option<String>,

    /// Skip the N most recent matches
    #[arg(long, default_value = "0")]
    start: u32,

    /// Number of matches to analyze (max: 100)
    #[arg(short, long, default_value = "50")]
    count: u32,

    /// Delay between match detail requests in milliseconds (default: RIOT_THROTTLE_MS / 500)
    #[arg(long)]
    interval_ms: Option<u64>,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(region) = &args.region {
        config = config.with_region(region)?;
    }
    if let Some(ms) = args.interval_ms {
        config.throttle_interval = Duration::from_millis(ms);
    }

    display_info(&format!(
        "Fetching up to {} matches for {} via {}",
        args.count,
        args.summoner,
        config.platform_url.host_str().unwrap_or("?")
    ));

    let client = RiotApiClient::new(config);

    let stats = {
        let busy = BusyIndicator::start("Resolving player");
        most_played_champions(&client, &args.summoner, args.start, args.count, &busy)
    }
    .with_context(|| format!("Could not load champion statistics for {}", args.summoner))?;

    display_success(&format!("Aggregated stats for {} champions", stats.len()));
    display_champion_stats(&ranked_by_games(stats), &args.summoner);

    Ok(())
}

/// Name → PUUID → recent match ids → throttled, sequential match fetches → stats.
fn most_played_champions(
    client: &RiotApiClient,
    display_name: &str,
    start: u32,
    count: u32,
    busy: &BusyIndicator,
) -> Result<HashMap<String, ChampionStats>, AppError> {
    let identity = client.resolve_identity(display_name)?;
    info!(puuid = identity.short(), "resolved player");

    busy.set_message("Listing recent matches");
    let match_ids = client.list_recent_match_ids(&identity, start, count)?;
    info!(matches = match_ids.len(), "listed recent matches");

    busy.set_message("Fetching match details");
    busy.set_total(match_ids.len() as u64);

    let fetch_match = Throttle::new(
        |match_id: &str| {
            let detail = client.fetch_match(match_id);
            busy.advance();
            detail
        },
        client.config().throttle_interval,
    );

    aggregate(&identity, &match_ids, &fetch_match)
}
