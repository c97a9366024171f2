//! Cache-aside orchestration
//!
//! [`StatsService`] answers every resource request from the cache store when
//! all of its entries are present. On a miss it fetches from upstream,
//! normalizes, writes each artifact with set-if-absent under the kind's TTL
//! policy, and returns what it just computed. A rejected write means a racing
//! request populated the key first; the caller still gets its own fresh data.
//!
//! Nothing here retries, updates or deletes: entries are created once and
//! left to expire.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::cache::ttl::whole_seconds;
use crate::cache::{cache_key, Artifact, CacheError, CacheStore, TtlPolicy};
use crate::data::fixtures::{self, DEFAULT_DISPLAY_TIMEZONE};
use crate::data::{
    events, lineups, scorers, standings, statistics, FetchError, Lineups, MatchEvent, MatchList,
    MatchSummary, NormalizeError, StandingRow, StatRow, TopScorerRow, UpstreamFetcher,
};
use crate::request::{ResourceKind, ResourceRequest};

/// Errors surfaced by the service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The provider could not be reached or answered garbage
    #[error("Upstream request failed: {0}")]
    Transport(#[from] FetchError),

    /// The provider answered with a non-success status
    #[error("Upstream returned HTTP status {0}")]
    UpstreamStatus(u16),

    /// The cache store failed a get or set
    #[error("Cache store failed: {0}")]
    Cache(#[from] CacheError),

    /// The upstream payload did not have the expected shape
    #[error("Could not normalize upstream data: {0}")]
    Normalize(#[from] NormalizeError),

    /// A value could not be encoded for, or decoded from, the store
    #[error("Cache value for {key} is not valid: {source}")]
    Codec {
        key: String,
        source: serde_json::Error,
    },
}

/// Where a response's data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Upstream,
}

/// Data returned by an operation, with freshness metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub data: T,
    /// Seconds until the entry expires; only set for table and matches
    pub expiration: Option<u64>,
    pub origin: Origin,
}

impl<T> Cached<T> {
    fn map<U>(self, f: impl FnOnce(T) -> U) -> Cached<U> {
        Cached {
            data: f(self.data),
            expiration: self.expiration,
            origin: self.origin,
        }
    }
}

/// Caller-facing response envelope
///
/// Serializes as `{"data": .., "expiration": ..}` or `{"error": ".."}`. The
/// error form carries a message only; callers cannot tell a transport failure
/// from a bad status or a cache failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Data {
        data: T,
        #[serde(skip_serializing_if = "Option::is_none")]
        expiration: Option<u64>,
    },
    Error {
        error: String,
    },
}

impl<T> ApiResponse<T> {
    pub fn is_data(&self) -> bool {
        matches!(self, ApiResponse::Data { .. })
    }
}

impl<T> From<Result<Cached<T>, ServiceError>> for ApiResponse<T> {
    fn from(result: Result<Cached<T>, ServiceError>) -> Self {
        match result {
            Ok(cached) => ApiResponse::Data {
                data: cached.data,
                expiration: cached.expiration,
            },
            Err(e) => {
                error!(error = ?e, "Request failed");
                ApiResponse::Error {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Whether an operation reports the remaining TTL to its caller
fn reports_expiration(kind: ResourceKind) -> bool {
    matches!(kind, ResourceKind::Table | ResourceKind::Matches)
}

/// Cache-aside front for the football statistics provider
#[derive(Debug)]
pub struct StatsService<S, F> {
    store: S,
    fetcher: F,
    display_tz: Tz,
    clock: fn() -> DateTime<Utc>,
}

impl<S: CacheStore, F: UpstreamFetcher> StatsService<S, F> {
    pub fn new(store: S, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            display_tz: DEFAULT_DISPLAY_TIMEZONE,
            clock: Utc::now,
        }
    }

    /// Render kickoff dates and times in `tz`
    pub fn with_display_timezone(mut self, tz: Tz) -> Self {
        self.display_tz = tz;
        self
    }

    /// Use another clock for TTL computation
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// League table, expiring at the next UTC midnight
    pub async fn table(
        &self,
        league: u32,
        season: u16,
    ) -> Result<Cached<Vec<StandingRow>>, ServiceError> {
        self.single(ResourceRequest::table(league, season), standings::normalize)
            .await
    }

    /// Top scorers of a league season
    pub async fn top_scorers(
        &self,
        league: u32,
        season: u16,
    ) -> Result<Cached<Vec<TopScorerRow>>, ServiceError> {
        self.single(ResourceRequest::top_scorers(league, season), scorers::normalize)
            .await
    }

    /// Events of a fixture
    pub async fn match_events(
        &self,
        fixture: u64,
    ) -> Result<Cached<Vec<MatchEvent>>, ServiceError> {
        self.single(ResourceRequest::events(fixture), events::normalize)
            .await
    }

    /// Home and away statistics of a fixture
    pub async fn match_statistics(
        &self,
        fixture: u64,
    ) -> Result<Cached<Vec<StatRow>>, ServiceError> {
        self.single(ResourceRequest::statistics(fixture), statistics::normalize)
            .await
    }

    /// Lineups of a fixture, unmodified
    pub async fn match_lineups(&self, fixture: u64) -> Result<Cached<Lineups>, ServiceError> {
        self.single(ResourceRequest::lineups(fixture), lineups::normalize)
            .await
    }

    /// Fixtures and rounds of a league season
    ///
    /// Matches and rounds are separate entries written with the same TTL. Both
    /// must be present for a hit; if either is missing the pair is refetched
    /// and whichever entry is absent gets written.
    pub async fn matches(
        &self,
        league: u32,
        season: u16,
    ) -> Result<Cached<MatchList>, ServiceError> {
        let request = ResourceRequest::matches(league, season);
        let matches_key = cache_key(Artifact::Matches, request.params());
        let rounds_key = cache_key(Artifact::Rounds, request.params());

        let (cached_matches, cached_rounds) = futures::try_join!(
            self.store.get(&matches_key),
            self.store.get(&rounds_key)
        )?;

        if let (Some(raw_matches), Some(raw_rounds)) = (cached_matches, cached_rounds) {
            debug!(key = %matches_key, "Serving matches from cache");
            let list = MatchList {
                matches: decode(&matches_key, &raw_matches)?,
                rounds: decode(&rounds_key, &raw_rounds)?,
            };
            let expiration = self.remaining_secs(&matches_key).await?;
            return Ok(Cached {
                data: list,
                expiration: Some(expiration),
                origin: Origin::Cache,
            });
        }

        let body = self.fetch(&request).await?;
        let list = fixtures::normalize(body, self.display_tz)?;

        let ttl = self.ttl_for(request.kind());
        // Not atomic: a failure between the two writes leaves the pair split
        // until the written entry expires
        self.populate(&matches_key, &list.matches, ttl).await?;
        self.populate(&rounds_key, &list.rounds, ttl).await?;

        Ok(Cached {
            data: list,
            expiration: Some(whole_seconds(ttl)),
            origin: Origin::Upstream,
        })
    }

    /// Fixtures of a league season played on `date` (display timezone)
    pub async fn matches_on_date(
        &self,
        league: u32,
        season: u16,
        date: NaiveDate,
    ) -> Result<Cached<Vec<MatchSummary>>, ServiceError> {
        let cached = self.matches(league, season).await?;
        Ok(cached.map(|list| fixtures::on_date(&list.matches, date)))
    }

    /// Cache-aside flow for resources stored under a single key
    async fn single<T, N>(
        &self,
        request: ResourceRequest,
        normalize: N,
    ) -> Result<Cached<T>, ServiceError>
    where
        T: Serialize + DeserializeOwned,
        N: FnOnce(Value) -> Result<T, NormalizeError>,
    {
        let kind = request.kind();
        let key = cache_key(Artifact::for_kind(kind)[0], request.params());

        if let Some(raw) = self.store.get(&key).await? {
            debug!(key = %key, "Serving {} from cache", kind);
            let data = decode(&key, &raw)?;
            let expiration = if reports_expiration(kind) {
                Some(self.remaining_secs(&key).await?)
            } else {
                None
            };
            return Ok(Cached {
                data,
                expiration,
                origin: Origin::Cache,
            });
        }

        let body = self.fetch(&request).await?;
        let data = normalize(body)?;

        let ttl = self.ttl_for(kind);
        self.populate(&key, &data, ttl).await?;

        Ok(Cached {
            data,
            expiration: reports_expiration(kind).then(|| whole_seconds(ttl)),
            origin: Origin::Upstream,
        })
    }

    async fn fetch(&self, request: &ResourceRequest) -> Result<Value, ServiceError> {
        info!(
            resource = %request.kind(),
            endpoint = request.endpoint(),
            "Cache miss, fetching from upstream"
        );

        let response = self
            .fetcher
            .fetch(request.endpoint(), &request.query())
            .await?;

        if !response.is_success() {
            warn!(
                resource = %request.kind(),
                status = response.status,
                "Upstream returned non-success status, not caching"
            );
            return Err(ServiceError::UpstreamStatus(response.status));
        }

        Ok(response.body)
    }

    fn ttl_for(&self, kind: ResourceKind) -> Duration {
        TtlPolicy::for_kind(kind).ttl_at((self.clock)())
    }

    /// Writes `data` unless the key is already populated
    async fn populate<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        ttl: Duration,
    ) -> Result<(), ServiceError> {
        let value = serde_json::to_string(data).map_err(|source| ServiceError::Codec {
            key: key.to_string(),
            source,
        })?;

        let created = self.store.set_if_absent(key, &value, ttl).await?;
        if created {
            debug!(key, ttl_secs = whole_seconds(ttl), "Cache populated");
        } else {
            debug!(key, "Entry already populated by a concurrent request");
        }
        Ok(())
    }

    async fn remaining_secs(&self, key: &str) -> Result<u64, ServiceError> {
        // The entry can expire between the read and this lookup
        Ok(self
            .store
            .ttl_remaining(key)
            .await?
            .map(whole_seconds)
            .unwrap_or(0))
    }
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, ServiceError> {
    serde_json::from_str(raw).map_err(|source| ServiceError::Codec {
        key: key.to_string(),
        source,
    })
}
