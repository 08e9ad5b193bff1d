//! Panel protocol — the request/response and notification shapes exchanged
//! with the presentation layer.

use serde::{Deserialize, Serialize};

use crate::inbox::Message;
use crate::session::StateSnapshot;

/// Response to a generate request.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    pub fn ok(email: impl Into<String>) -> Self {
        Self {
            success: true,
            email: Some(email.into()),
            error: None,
        }
    }

    pub fn err(error: impl ToString) -> Self {
        Self {
            success: false,
            email: None,
            error: Some(error.to_string()),
        }
    }
}

/// Response to a state request.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub email: Option<String>,
    pub email_id: Option<String>,
    pub messages: Vec<Message>,
}

impl From<StateSnapshot> for StateResponse {
    fn from(snapshot: StateSnapshot) -> Self {
        Self {
            email: snapshot.address,
            email_id: snapshot.session_id,
            messages: snapshot.messages,
        }
    }
}

/// Response to a delete request. Deleting when idle still succeeds.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// One-way notification: the full message log, newest first, sent whenever
/// a new message is stored.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Notification {
    AllMessages { data: Vec<Message> },
}
