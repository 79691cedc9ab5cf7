//! Parser for live-sync change notifications
//!
//! The backend streams JSON messages describing changes to the candle
//! collection. Only `"change"` messages matter here; connection chatter
//! ("connected", "subscribed", periodic stats) is ignored.

use serde_json::Value;
use tracing::{trace, warn};

use super::candle::Candle;

/// A change against the keyed candle collection.
#[derive(Debug, Clone)]
pub enum CandleChange {
    Added { id: String, candle: Candle },
    Modified { id: String, candle: Candle },
    Removed { id: String },
}

/// Parse one feed message into a change, or None if the message is not a
/// well-formed change notification.
pub fn parse_change(msg: &str) -> Option<CandleChange> {
    trace!(len = msg.len(), "Parsing feed message");

    let json: Value = serde_json::from_str(msg)
        .map_err(|e| {
            warn!(error = %e, "Failed to parse feed JSON");
        })
        .ok()?;

    let msg_type = json["type"].as_str()?;
    if msg_type != "change" {
        // Not a collection change (could be "connected", "subscribed", "stats")
        return None;
    }

    let data = &json["data"];
    let id = data["id"].as_str()?.to_string();
    let kind = data["kind"].as_str()?;

    match kind {
        "removed" => Some(CandleChange::Removed { id }),
        "added" | "modified" => {
            let candle: Candle = serde_json::from_value(data["candle"].clone())
                .map_err(|e| {
                    warn!(error = %e, id, kind, "Failed to parse candle record");
                })
                .ok()?;
            if kind == "added" {
                Some(CandleChange::Added { id, candle })
            } else {
                Some(CandleChange::Modified { id, candle })
            }
        }
        other => {
            warn!(kind = other, id, "Unknown change kind");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::candle::Visibility;

    const CANDLE_JSON: &str = r#"{
        "intention": "safe travels",
        "category": "peace",
        "visibility": "anonymous",
        "location": {"lat": 48.85, "lng": 2.35},
        "createdAt": 1700000000000.0,
        "expiresAt": 1700604800000.0,
        "prayerCount": 3
    }"#;

    #[test]
    fn test_parse_added() {
        let msg = format!(
            r#"{{"type":"change","data":{{"kind":"added","id":"c-17","candle":{}}}}}"#,
            CANDLE_JSON
        );
        match parse_change(&msg) {
            Some(CandleChange::Added { id, candle }) => {
                assert_eq!(id, "c-17");
                assert_eq!(candle.visibility, Visibility::Anonymous);
                assert_eq!(candle.category_or_default(), "peace");
            }
            other => panic!("expected Added, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_modified() {
        let msg = format!(
            r#"{{"type":"change","data":{{"kind":"modified","id":"c-17","candle":{}}}}}"#,
            CANDLE_JSON
        );
        assert!(matches!(
            parse_change(&msg),
            Some(CandleChange::Modified { .. })
        ));
    }

    #[test]
    fn test_parse_removed_has_no_record() {
        let msg = r#"{"type":"change","data":{"kind":"removed","id":"c-17"}}"#;
        match parse_change(msg) {
            Some(CandleChange::Removed { id }) => assert_eq!(id, "c-17"),
            other => panic!("expected Removed, got {:?}", other),
        }
    }

    #[test]
    fn test_ignore_non_change() {
        assert!(parse_change(r#"{"type":"connected","data":{}}"#).is_none());
        assert!(parse_change(r#"{"type":"stats","data":{"total":4}}"#).is_none());
    }

    #[test]
    fn test_malformed_input() {
        assert!(parse_change("not json").is_none());
        assert!(parse_change(r#"{"type":"change","data":{"kind":"added","id":"x"}}"#).is_none());
        assert!(parse_change(r#"{"type":"change","data":{"kind":"upserted","id":"x"}}"#).is_none());
    }
}
