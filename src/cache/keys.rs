//! Cache-key scheme
//!
//! Keys are a short tag followed by `-name=value` segments, e.g.
//! `table-league=39-season=2023` or `events-id=1035037`. Parameter values are
//! integers, so they can never contain the `-` separator and two distinct
//! (artifact, params) pairs never share a key.

use crate::request::{ResourceKind, ResourceParams};

/// A separately cached piece of a resource
///
/// Matches are stored as two artifacts, the match list and its round set,
/// sharing one parameter suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Table,
    TopScorers,
    Matches,
    Rounds,
    Events,
    Statistics,
    Lineups,
}

impl Artifact {
    pub fn tag(self) -> &'static str {
        match self {
            Artifact::Table => "table",
            Artifact::TopScorers => "topscorers",
            Artifact::Matches => "matches",
            Artifact::Rounds => "rounds",
            Artifact::Events => "events",
            Artifact::Statistics => "stats",
            Artifact::Lineups => "lineups",
        }
    }

    /// Artifacts cached for a resource kind
    pub fn for_kind(kind: ResourceKind) -> &'static [Artifact] {
        match kind {
            ResourceKind::Table => &[Artifact::Table],
            ResourceKind::TopScorers => &[Artifact::TopScorers],
            ResourceKind::Matches => &[Artifact::Matches, Artifact::Rounds],
            ResourceKind::Events => &[Artifact::Events],
            ResourceKind::Statistics => &[Artifact::Statistics],
            ResourceKind::Lineups => &[Artifact::Lineups],
        }
    }
}

/// Derives the key for one artifact
pub fn cache_key(artifact: Artifact, params: ResourceParams) -> String {
    match params {
        ResourceParams::Season { league, season } => {
            format!("{}-league={}-season={}", artifact.tag(), league, season)
        }
        ResourceParams::Fixture { id } => format!("{}-id={}", artifact.tag(), id),
    }
}
