//! League table normalizer
//!
//! API-Football returns standings as `response[0].league.standings`, a list of
//! groups. Domestic leagues have a single group; the first group is the table.

use serde::Deserialize;
use serde_json::Value;

use super::{unwrap_envelope, NormalizeError, StandingRow};

#[derive(Debug, Deserialize)]
struct LeagueEntry {
    league: LeagueStandings,
}

#[derive(Debug, Deserialize)]
struct LeagueStandings {
    standings: Vec<Vec<RawStanding>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStanding {
    rank: u32,
    team: RawTeam,
    points: Option<u32>,
    goals_diff: Option<i32>,
    form: Option<String>,
    all: RawRecord,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    id: u64,
    name: String,
    #[serde(default)]
    logo: String,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    played: Option<u32>,
    win: Option<u32>,
    draw: Option<u32>,
    lose: Option<u32>,
    goals: RawGoals,
}

#[derive(Debug, Deserialize)]
struct RawGoals {
    #[serde(rename = "for")]
    scored: Option<u32>,
    against: Option<u32>,
}

/// Normalizes a `standings` response into table rows
///
/// # Returns
/// * `Ok(Vec<StandingRow>)` - Rows in upstream rank order
/// * `Err(NormalizeError)` - If the payload has no league or no standings group
pub fn normalize(body: Value) -> Result<Vec<StandingRow>, NormalizeError> {
    let leagues: Vec<LeagueEntry> = unwrap_envelope(body)?;

    let table = leagues
        .into_iter()
        .next()
        .ok_or_else(|| NormalizeError::MissingField("response[0].league".to_string()))?
        .league
        .standings
        .into_iter()
        .next()
        .ok_or_else(|| NormalizeError::MissingField("league.standings[0]".to_string()))?;

    Ok(table.into_iter().map(to_row).collect())
}

fn to_row(entry: RawStanding) -> StandingRow {
    StandingRow {
        team_id: entry.team.id,
        team_rank: entry.rank,
        team_name: entry.team.name,
        total_games_played: entry.all.played.unwrap_or(0),
        total_games_won: entry.all.win.unwrap_or(0),
        total_games_draw: entry.all.draw.unwrap_or(0),
        total_games_lose: entry.all.lose.unwrap_or(0),
        total_goals_for: entry.all.goals.scored.unwrap_or(0),
        total_goals_against: entry.all.goals.against.unwrap_or(0),
        total_goals_diff: entry.goals_diff.unwrap_or(0),
        total_points: entry.points.unwrap_or(0),
        team_form: entry.form.unwrap_or_default(),
        team_logo: entry.team.logo,
    }
}
