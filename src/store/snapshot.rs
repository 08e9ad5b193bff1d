//! The persisted session snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::inbox::Message;

/// Everything the agent persists, written and cleared as one unit:
/// address, session id, creation time, dedup watermark and message log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    pub address: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_seen_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_through_json() {
        let state = PersistedState {
            address: "x@tmp.test".into(),
            session_id: "em_1".into(),
            created_at: Utc::now(),
            last_seen_id: Some("m9".into()),
            messages: vec![Message {
                id: "m9".into(),
                subject: "hi".into(),
                sender: "a@b.c".into(),
                body_text: Some("text".into()),
                body_html: None,
            }],
        };

        let json = serde_json::to_string(&state).unwrap();
        let back: PersistedState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.address, state.address);
        assert_eq!(back.last_seen_id, state.last_seen_id);
        assert_eq!(back.messages.len(), 1);
        assert_eq!(back.created_at, state.created_at);
    }

    #[test]
    fn older_snapshot_without_optional_fields_parses() {
        let raw = r#"{
            "address": "x@tmp.test",
            "session_id": "em_1",
            "created_at": "2026-08-01T10:00:00Z"
        }"#;
        let state: PersistedState = serde_json::from_str(raw).unwrap();
        assert_eq!(state.last_seen_id, None);
        assert!(state.messages.is_empty());
    }
}
