//! TTL policy per resource kind
//!
//! League tables and fixture lists follow the provider's daily refresh, which
//! resets at UTC midnight: everything written on one UTC day expires together
//! at the next day boundary. Everything else lives one day from the write.

use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, Utc};

use crate::request::ResourceKind;

/// One calendar day in seconds
pub const ONE_DAY_SECS: u64 = 86_400;

/// How long a cache entry lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlPolicy {
    /// Constant lifetime from the moment of write
    FixedWindow(Duration),
    /// Expires at the next 00:00:00 UTC after the write
    UtcMidnight,
}

impl TtlPolicy {
    pub fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Table | ResourceKind::Matches => TtlPolicy::UtcMidnight,
            ResourceKind::TopScorers
            | ResourceKind::Events
            | ResourceKind::Statistics
            | ResourceKind::Lineups => TtlPolicy::FixedWindow(Duration::from_secs(ONE_DAY_SECS)),
        }
    }

    /// TTL for an entry written at `now`
    pub fn ttl_at(self, now: DateTime<Utc>) -> Duration {
        match self {
            TtlPolicy::FixedWindow(ttl) => ttl,
            TtlPolicy::UtcMidnight => until_next_utc_midnight(now),
        }
    }
}

/// Time from `now` to the start of the next UTC day, millisecond precision
pub fn until_next_utc_midnight(now: DateTime<Utc>) -> Duration {
    let next_midnight = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .map(|day| day.and_time(NaiveTime::MIN).and_utc());

    match next_midnight {
        Some(midnight) => (midnight - now)
            .to_std()
            .map(|left| Duration::from_millis(left.as_millis() as u64))
            .unwrap_or(Duration::ZERO),
        // Only reachable at chrono's maximum date
        None => Duration::from_secs(ONE_DAY_SECS),
    }
}

/// Whole seconds left in `ttl`, rounded up so a live entry never reports 0
pub fn whole_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
