//! Match lineups pass-through
//!
//! Lineups are served exactly as upstream reports them. Only the envelope is
//! checked: `response` must be a list of team lineups.

use serde_json::Value;

use super::{unwrap_envelope, Lineups, NormalizeError};

/// Extracts the team lineups from a `fixtures/lineups` response
pub fn normalize(body: Value) -> Result<Lineups, NormalizeError> {
    unwrap_envelope(body)
}
