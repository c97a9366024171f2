//! Match statistics normalizer
//!
//! API-Football reports one statistics list per team. Rows are paired by
//! position, which only holds if both lists carry the same labels in the same
//! order, so that is checked and a mismatch is an error.

use serde::Deserialize;
use serde_json::Value;

use super::{unwrap_envelope, NormalizeError, StatRow, StatValue};

#[derive(Debug, Deserialize)]
struct RawTeamStatistics {
    statistics: Vec<RawStatistic>,
}

#[derive(Debug, Deserialize)]
struct RawStatistic {
    #[serde(rename = "type")]
    label: String,
    value: Option<StatValue>,
}

/// Normalizes a `fixtures/statistics` response into home/away rows
///
/// # Returns
/// * `Ok(Vec<StatRow>)` - One row per statistic, in the home team's order
/// * `Err(NormalizeError::StatisticsMismatch)` - If there are not exactly two
///   teams, or their statistics differ in length or labels
pub fn normalize(body: Value) -> Result<Vec<StatRow>, NormalizeError> {
    let teams: Vec<RawTeamStatistics> = unwrap_envelope(body)?;

    let [home, away]: [RawTeamStatistics; 2] = teams.try_into().map_err(|teams: Vec<_>| {
        NormalizeError::StatisticsMismatch(format!("expected 2 teams, got {}", teams.len()))
    })?;

    if home.statistics.len() != away.statistics.len() {
        return Err(NormalizeError::StatisticsMismatch(format!(
            "home has {} statistics, away has {}",
            home.statistics.len(),
            away.statistics.len()
        )));
    }

    home.statistics
        .into_iter()
        .zip(away.statistics)
        .map(|(h, a)| {
            if h.label != a.label {
                return Err(NormalizeError::StatisticsMismatch(format!(
                    "'{}' paired with '{}'",
                    h.label, a.label
                )));
            }
            Ok(StatRow {
                label: title_case(&h.label),
                home: or_zero(h.value),
                away: or_zero(a.value),
            })
        })
        .collect()
}

/// Uppercases the first letter of every word, leaving the rest untouched
pub fn title_case(label: &str) -> String {
    label
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn or_zero(value: Option<StatValue>) -> StatValue {
    match value {
        Some(StatValue::Text(text)) if text.is_empty() => StatValue::default(),
        Some(value) => value,
        None => StatValue::default(),
    }
}
