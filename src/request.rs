//! Resource requests: what a caller asks for and how it maps upstream

use std::fmt;

/// The six kinds of data served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Table,
    TopScorers,
    Matches,
    Events,
    Statistics,
    Lineups,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Table => "table",
            ResourceKind::TopScorers => "top scorers",
            ResourceKind::Matches => "matches",
            ResourceKind::Events => "match events",
            ResourceKind::Statistics => "match statistics",
            ResourceKind::Lineups => "match lineups",
        };
        f.write_str(name)
    }
}

/// Identifying parameters of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceParams {
    /// A league season, e.g. league 39 (Premier League), season 2023
    Season { league: u32, season: u16 },
    /// A single fixture
    Fixture { id: u64 },
}

/// One inbound request for a resource
///
/// Only constructible through the per-kind constructors, so league resources
/// always carry season parameters and match resources a fixture id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceRequest {
    kind: ResourceKind,
    params: ResourceParams,
}

impl ResourceRequest {
    pub fn table(league: u32, season: u16) -> Self {
        Self::season(ResourceKind::Table, league, season)
    }

    pub fn top_scorers(league: u32, season: u16) -> Self {
        Self::season(ResourceKind::TopScorers, league, season)
    }

    pub fn matches(league: u32, season: u16) -> Self {
        Self::season(ResourceKind::Matches, league, season)
    }

    pub fn events(fixture: u64) -> Self {
        Self::fixture(ResourceKind::Events, fixture)
    }

    pub fn statistics(fixture: u64) -> Self {
        Self::fixture(ResourceKind::Statistics, fixture)
    }

    pub fn lineups(fixture: u64) -> Self {
        Self::fixture(ResourceKind::Lineups, fixture)
    }

    fn season(kind: ResourceKind, league: u32, season: u16) -> Self {
        Self {
            kind,
            params: ResourceParams::Season { league, season },
        }
    }

    fn fixture(kind: ResourceKind, id: u64) -> Self {
        Self {
            kind,
            params: ResourceParams::Fixture { id },
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn params(&self) -> ResourceParams {
        self.params
    }

    /// API-Football endpoint serving this resource
    pub fn endpoint(&self) -> &'static str {
        match self.kind {
            ResourceKind::Table => "standings",
            ResourceKind::TopScorers => "players/topscorers",
            ResourceKind::Matches => "fixtures",
            ResourceKind::Events => "fixtures/events",
            ResourceKind::Statistics => "fixtures/statistics",
            ResourceKind::Lineups => "fixtures/lineups",
        }
    }

    /// Query parameters for [`endpoint`](Self::endpoint)
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self.params {
            ResourceParams::Season { league, season } => {
                vec![("league", league.to_string()), ("season", season.to_string())]
            }
            ResourceParams::Fixture { id } => vec![("fixture", id.to_string())],
        }
    }
}
