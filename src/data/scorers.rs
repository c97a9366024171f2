//! Top scorers normalizer

use serde::Deserialize;
use serde_json::Value;

use super::{unwrap_envelope, NormalizeError, TopScorerRow};

#[derive(Debug, Deserialize)]
struct RawScorer {
    player: RawPlayer,
    statistics: Vec<RawPlayerStats>,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    id: u64,
    name: String,
    #[serde(default)]
    photo: String,
}

#[derive(Debug, Deserialize)]
struct RawPlayerStats {
    goals: RawGoals,
}

#[derive(Debug, Deserialize)]
struct RawGoals {
    total: Option<u32>,
    assists: Option<u32>,
}

/// Normalizes a `players/topscorers` response
///
/// Rank is the 1-based position in the upstream list. Goals and assists come
/// from the player's first statistics block; absent values count as 0.
pub fn normalize(body: Value) -> Result<Vec<TopScorerRow>, NormalizeError> {
    let scorers: Vec<RawScorer> = unwrap_envelope(body)?;

    scorers
        .into_iter()
        .zip(1u32..)
        .map(|(scorer, rank)| {
            let goals = scorer
                .statistics
                .into_iter()
                .next()
                .map(|stats| stats.goals)
                .ok_or_else(|| {
                    NormalizeError::MissingField(format!(
                        "statistics[0] for player {}",
                        scorer.player.id
                    ))
                })?;

            Ok(TopScorerRow {
                id: scorer.player.id,
                rank,
                name: scorer.player.name,
                photo_url: scorer.player.photo,
                total_goals: goals.total.unwrap_or(0),
                total_assists: goals.assists.unwrap_or(0),
            })
        })
        .collect()
}
