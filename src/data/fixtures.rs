//! Fixture list normalizer
//!
//! Flattens a `fixtures` response into display-ready match summaries and
//! collects the distinct rounds. Kickoff date and time are rendered in a fixed
//! display timezone from the fixture's Unix timestamp, so the daylight-saving
//! offset is the one in force at kickoff, not on the server's clock.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;

use super::{
    unwrap_envelope, IsoKickoff, MatchList, MatchSummary, NormalizeError, Score, TeamBadge,
};

/// Default display timezone for kickoff times
pub const DEFAULT_DISPLAY_TIMEZONE: Tz = chrono_tz::America::New_York;

#[derive(Debug, Deserialize)]
struct RawMatch {
    fixture: RawFixture,
    league: RawLeague,
    teams: RawTeams,
    score: RawScore,
}

#[derive(Debug, Deserialize)]
struct RawFixture {
    id: u64,
    #[serde(default)]
    timezone: String,
    date: String,
    timestamp: i64,
    status: Option<RawStatus>,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    short: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLeague {
    round: String,
}

#[derive(Debug, Deserialize)]
struct RawTeams {
    home: RawTeam,
    away: RawTeam,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    name: String,
    #[serde(default)]
    logo: String,
}

#[derive(Debug, Deserialize)]
struct RawScore {
    fulltime: RawScoreLine,
}

#[derive(Debug, Deserialize)]
struct RawScoreLine {
    home: Option<u32>,
    away: Option<u32>,
}

/// Normalizes a `fixtures` response into matches plus their round set
///
/// # Arguments
/// * `body` - Raw API-Football response body
/// * `display_tz` - Timezone used for `date`, `dateForMatching` and `time`
pub fn normalize(body: Value, display_tz: Tz) -> Result<MatchList, NormalizeError> {
    let raw: Vec<RawMatch> = unwrap_envelope(body)?;

    let mut matches = Vec::with_capacity(raw.len());
    let mut rounds = Vec::new();
    let mut seen = HashSet::new();

    for entry in raw {
        if seen.insert(entry.league.round.clone()) {
            rounds.push(entry.league.round.clone());
        }
        matches.push(to_summary(entry, display_tz)?);
    }

    Ok(MatchList { matches, rounds })
}

fn to_summary(entry: RawMatch, display_tz: Tz) -> Result<MatchSummary, NormalizeError> {
    let kickoff = kickoff_in(entry.fixture.timestamp, display_tz).ok_or_else(|| {
        NormalizeError::MissingField(format!("valid timestamp for fixture {}", entry.fixture.id))
    })?;

    Ok(MatchSummary {
        round: entry.league.round,
        date: kickoff.format("%B %-d, %Y").to_string(),
        date_for_matching: kickoff.format("%Y-%m-%d").to_string(),
        time: kickoff.format("%H:%M").to_string(),
        date_iso_format: IsoKickoff {
            timezone: entry.fixture.timezone,
            iso_string: entry.fixture.date,
        },
        id: entry.fixture.id,
        status: entry
            .fixture
            .status
            .and_then(|status| status.short)
            .unwrap_or_default(),
        home_team: TeamBadge {
            logo: entry.teams.home.logo,
            name: entry.teams.home.name,
        },
        away_team: TeamBadge {
            logo: entry.teams.away.logo,
            name: entry.teams.away.name,
        },
        score: Score {
            home: entry.score.fulltime.home.unwrap_or(0),
            away: entry.score.fulltime.away.unwrap_or(0),
        },
    })
}

/// Converts a Unix timestamp (seconds) into the given timezone
pub fn kickoff_in(timestamp: i64, display_tz: Tz) -> Option<DateTime<Tz>> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|utc| utc.with_timezone(&display_tz))
}

/// Keeps the matches whose display date equals `date`
pub fn on_date(matches: &[MatchSummary], date: NaiveDate) -> Vec<MatchSummary> {
    let key = date.format("%Y-%m-%d").to_string();
    matches
        .iter()
        .filter(|summary| summary.date_for_matching == key)
        .cloned()
        .collect()
}
