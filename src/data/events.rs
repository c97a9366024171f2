//! Match events normalizer
//!
//! Events are passed through field for field. The only rewrite is the event
//! type of substitutions: API-Football reports them as type "subst" with a
//! detail such as "Substitution 1", and clients group on "Substitution".

use serde_json::Value;

use super::{unwrap_envelope, MatchEvent, NormalizeError};

const SUBSTITUTION: &str = "Substitution";

/// Normalizes a `fixtures/events` response
pub fn normalize(body: Value) -> Result<Vec<MatchEvent>, NormalizeError> {
    let events: Vec<MatchEvent> = unwrap_envelope(body)?;
    Ok(events.into_iter().map(relabel_substitution).collect())
}

fn relabel_substitution(mut event: MatchEvent) -> MatchEvent {
    if event.detail.contains(SUBSTITUTION) {
        event.kind = SUBSTITUTION.to_string();
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(kind: &str, detail: &str) -> Value {
        json!({
            "time": { "elapsed": 63, "extra": null },
            "team": { "id": 42, "name": "Arsenal", "logo": "arsenal.png" },
            "player": { "id": 1460, "name": "B. Saka" },
            "assist": { "id": 643, "name": "Gabriel Jesus" },
            "type": kind,
            "detail": detail,
            "comments": null
        })
    }

    #[test]
    fn test_substitution_detail_overrides_type() {
        let body = json!({
            "errors": [],
            "response": [event("subst", "Player X replaces Player Y (Substitution)")]
        });
        let events = normalize(body).expect("Should normalize");

        assert_eq!(events[0].kind, "Substitution");
        assert_eq!(events[0].detail, "Player X replaces Player Y (Substitution)");
    }

    #[test]
    fn test_other_events_keep_their_type_and_fields() {
        let body = json!({
            "errors": [],
            "response": [event("Goal", "Normal Goal"), event("Card", "Yellow Card")]
        });
        let events = normalize(body).expect("Should normalize");

        assert_eq!(events[0].kind, "Goal");
        assert_eq!(events[1].kind, "Card");
        assert_eq!(events[0].rest["time"]["elapsed"], 63);
        assert_eq!(events[0].rest["player"]["name"], "B. Saka");
        assert_eq!(events[0].rest["comments"], Value::Null);
    }

    #[test]
    fn test_pass_through_serializes_back_to_upstream_shape() {
        let raw = event("subst", "Substitution 2");
        let body = json!({ "errors": [], "response": [raw.clone()] });
        let events = normalize(body).expect("Should normalize");

        let mut expected = raw;
        expected["type"] = json!("Substitution");
        assert_eq!(serde_json::to_value(&events[0]).expect("Should serialize"), expected);
    }

    #[test]
    fn test_event_without_detail_is_rejected() {
        let body = json!({ "errors": [], "response": [{ "type": "Goal" }] });
        assert!(matches!(normalize(body), Err(NormalizeError::Schema(_))));
    }
}
