//! Normalized football records and the normalizers that build them
//!
//! Every upstream payload shape gets its own module with a typed input schema.
//! The schema is the validation boundary: a payload missing a required field
//! fails to deserialize and surfaces as [`NormalizeError::Schema`] instead of
//! producing a half-empty record.

pub mod api_football;
pub mod events;
pub mod fixtures;
pub mod lineups;
pub mod scorers;
pub mod standings;
pub mod statistics;

pub use api_football::{ApiFootballClient, FetchError, UpstreamFetcher, UpstreamResponse};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while turning an upstream payload into records
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Payload does not match the expected input schema
    #[error("Unexpected upstream payload shape: {0}")]
    Schema(#[from] serde_json::Error),

    /// Upstream answered 200 but reported errors in the envelope
    #[error("Upstream rejected the request: {0}")]
    Rejected(String),

    /// Missing expected element in an otherwise valid payload
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// Home and away statistics cannot be paired positionally
    #[error("Home and away statistics do not line up: {0}")]
    StatisticsMismatch(String),
}

/// Common API-Football response wrapper
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    errors: Value,
    response: T,
}

/// Unwraps the `response` member of an API-Football envelope into `T`
///
/// API-Football reports bad keys and bad parameters with HTTP 200 and a
/// non-empty `errors` member (either an array or an object), so that case is
/// rejected before the response is looked at.
pub(crate) fn unwrap_envelope<T: DeserializeOwned>(body: Value) -> Result<T, NormalizeError> {
    let envelope: Envelope<T> = serde_json::from_value(body)?;

    let has_errors = match &envelope.errors {
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::String(text) => !text.is_empty(),
        _ => false,
    };
    if has_errors {
        return Err(NormalizeError::Rejected(envelope.errors.to_string()));
    }

    Ok(envelope.response)
}

/// One row of a league table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub team_id: u64,
    pub team_rank: u32,
    pub team_name: String,
    pub total_games_played: u32,
    pub total_games_won: u32,
    pub total_games_draw: u32,
    pub total_games_lose: u32,
    pub total_goals_for: u32,
    pub total_goals_against: u32,
    pub total_goals_diff: i32,
    pub total_points: u32,
    /// Recent results, most recent last (e.g. "WWDLW")
    pub team_form: String,
    pub team_logo: String,
}

/// One row of a top scorers list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopScorerRow {
    pub id: u64,
    /// 1-based position in the upstream ordering
    pub rank: u32,
    pub name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub total_goals: u32,
    pub total_assists: u32,
}

/// Team identity as shown next to a fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamBadge {
    pub logo: String,
    pub name: String,
}

/// Fulltime score of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

/// Kickoff instant as reported upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsoKickoff {
    pub timezone: String,
    #[serde(rename = "ISOString")]
    pub iso_string: String,
}

/// A fixture flattened for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub round: String,
    /// Long date in the display timezone, e.g. "August 11, 2023"
    pub date: String,
    /// `YYYY-MM-DD` in the display timezone
    pub date_for_matching: String,
    /// `HH:MM` kickoff in the display timezone
    pub time: String,
    #[serde(rename = "dateISOFormat")]
    pub date_iso_format: IsoKickoff,
    pub id: u64,
    /// Upstream short status ("NS", "1H", "FT", ...)
    pub status: String,
    pub home_team: TeamBadge,
    pub away_team: TeamBadge,
    pub score: Score,
}

/// Distinct round labels in first-seen order
pub type RoundSet = Vec<String>;

/// Fixtures of a league season together with their rounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchList {
    pub matches: Vec<MatchSummary>,
    pub rounds: RoundSet,
}

/// A match event with every upstream field preserved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub detail: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// A statistic value: a count, a ratio or a label such as "55%"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(serde_json::Number),
    Text(String),
}

impl Default for StatValue {
    fn default() -> Self {
        StatValue::Number(0.into())
    }
}

/// One statistic compared between home and away
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    #[serde(rename = "type")]
    pub label: String,
    #[serde(rename = "hVal")]
    pub home: StatValue,
    #[serde(rename = "aVal")]
    pub away: StatValue,
}

/// Team lineups exactly as upstream reports them
pub type Lineups = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_envelope_returns_response() {
        let body = json!({ "errors": [], "results": 1, "response": [1, 2, 3] });
        let response: Vec<u32> = unwrap_envelope(body).expect("Should unwrap");
        assert_eq!(response, vec![1, 2, 3]);
    }

    #[test]
    fn test_unwrap_envelope_rejects_error_object() {
        let body = json!({
            "errors": { "token": "Error/Missing application key." },
            "response": []
        });
        let result: Result<Vec<u32>, _> = unwrap_envelope(body);
        match result {
            Err(NormalizeError::Rejected(message)) => assert!(message.contains("application key")),
            other => panic!("Expected Rejected error, got {:?}", other),
        }
    }

    #[test]
    fn test_unwrap_envelope_requires_response() {
        let result: Result<Vec<u32>, _> = unwrap_envelope(json!({ "errors": [] }));
        assert!(matches!(result, Err(NormalizeError::Schema(_))));
    }

    #[test]
    fn test_stat_value_serializes_untagged() {
        let row = StatRow {
            label: "Ball Possession".to_string(),
            home: StatValue::Text("55%".to_string()),
            away: StatValue::default(),
        };
        let value = serde_json::to_value(&row).expect("Should serialize");
        assert_eq!(value, json!({ "type": "Ball Possession", "hVal": "55%", "aVal": 0 }));
    }

    #[test]
    fn test_top_scorer_row_field_names() {
        let row = TopScorerRow {
            id: 1100,
            rank: 1,
            name: "E. Haaland".to_string(),
            photo_url: "https://media.api-sports.io/football/players/1100.png".to_string(),
            total_goals: 36,
            total_assists: 8,
        };
        let value = serde_json::to_value(&row).expect("Should serialize");
        assert_eq!(value["photoURL"], "https://media.api-sports.io/football/players/1100.png");
        assert_eq!(value["totalGoals"], 36);
        assert_eq!(value["totalAssists"], 8);
    }
}
