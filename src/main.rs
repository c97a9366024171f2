//! pitchside - cached API-Football lookups from the command line
//!
//! Runs one operation against the cache-aside service and prints the JSON
//! response envelope on stdout.

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use pitchside::cache::Store;
use pitchside::cli::{Cli, Command};
use pitchside::config::Config;
use pitchside::data::ApiFootballClient;
use pitchside::logging::init_logging;
use pitchside::{ApiResponse, Cached, ServiceError, StatsService};

/// Serializes an operation result, reporting whether it carries data
fn render<T: Serialize>(
    result: Result<Cached<T>, ServiceError>,
) -> Result<(String, bool), serde_json::Error> {
    let response = ApiResponse::from(result);
    let ok = response.is_data();
    Ok((serde_json::to_string_pretty(&response)?, ok))
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // .env values feed the env fallbacks of the CLI
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;
    init_logging(config.log_json);

    // The store must be up before any request is served
    let store = Store::connect(&config.store).await?;

    let fetcher = ApiFootballClient::with_timeout(config.api_key.clone(), config.timeout)?
        .with_base_url(config.api_url.clone())
        .with_key_header(config.api_key_header.clone());

    let service = StatsService::new(store, fetcher).with_display_timezone(config.display_timezone);
    info!(command = ?cli.command, "Handling request");

    let (json, ok) = match cli.command {
        Command::Table { league, season } => render(service.table(league, season).await)?,
        Command::TopScorers { league, season } => {
            render(service.top_scorers(league, season).await)?
        }
        Command::Matches {
            league,
            season,
            date: Some(date),
        } => render(service.matches_on_date(league, season, date).await)?,
        Command::Matches {
            league,
            season,
            date: None,
        } => render(service.matches(league, season).await)?,
        Command::Events { fixture } => render(service.match_events(fixture).await)?,
        Command::Stats { fixture } => render(service.match_statistics(fixture).await)?,
        Command::Lineups { fixture } => render(service.match_lineups(fixture).await)?,
    };

    println!("{}", json);

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
