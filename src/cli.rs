//! Command-line interface parsing for pitchside
//!
//! Each subcommand maps to one caller-facing operation of the cache-aside
//! service. Settings fall back to environment variables, which may come from a
//! `.env` file.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::data::api_football::{API_FOOTBALL_BASE_URL, API_KEY_HEADER};

/// pitchside - cached API-Football tables, fixtures and match details
#[derive(Parser, Debug)]
#[command(name = "pitchside")]
#[command(about = "Cached API-Football league tables, fixtures and match details")]
#[command(version)]
pub struct Cli {
    /// API-Football key
    #[arg(long, env = "API_FOOTBALL_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the API-Football v3 API
    #[arg(long, env = "API_FOOTBALL_URL", default_value = API_FOOTBALL_BASE_URL)]
    pub api_url: String,

    /// Header carrying the API key (x-rapidapi-key when going through RapidAPI)
    #[arg(long, env = "API_FOOTBALL_KEY_HEADER", default_value = API_KEY_HEADER)]
    pub api_key_header: String,

    /// Cache store: memory, file, file:<dir> or redis://host:port
    #[arg(long, env = "PITCHSIDE_STORE", default_value = "file")]
    pub store: String,

    /// IANA timezone for kickoff dates and times
    #[arg(long, env = "PITCHSIDE_TIMEZONE", default_value = "America/New_York")]
    pub timezone: String,

    /// Upstream request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// One operation per resource kind
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// League table
    Table { league: u32, season: u16 },

    /// Top scorers of a league season
    TopScorers { league: u32, season: u16 },

    /// Fixtures and rounds of a league season
    Matches {
        league: u32,
        season: u16,
        /// Only fixtures on this date (YYYY-MM-DD, display timezone)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Events of a fixture (goals, cards, substitutions)
    Events { fixture: u64 },

    /// Team statistics of a fixture
    Stats { fixture: u64 },

    /// Lineups of a fixture
    Lineups { fixture: u64 },
}
