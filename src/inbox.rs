//! Message log — newest-first, id-deduplicated record of inbound mail.

use serde::{Deserialize, Serialize};

/// A single message as returned by the mail provider.
///
/// Immutable once stored. Field aliases cover the provider's inconsistent
/// wire names (`body_text` vs `text_body`, `from_email` vs `sender`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Provider-assigned opaque id.
    pub id: String,
    #[serde(default)]
    pub subject: String,
    /// Sender address.
    #[serde(default, alias = "from_email", alias = "from")]
    pub sender: String,
    /// Plain-text body, if the provider supplied one.
    #[serde(default, alias = "text_body", skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    /// HTML body, if the provider supplied one.
    #[serde(default, alias = "html_body", skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
}

impl Message {
    /// Subject, text body and html body joined by newlines — the haystack
    /// for code extraction.
    pub fn combined_content(&self) -> String {
        format!(
            "{}\n{}\n{}",
            self.subject,
            self.body_text.as_deref().unwrap_or(""),
            self.body_html.as_deref().unwrap_or(""),
        )
    }
}

/// Newest-first log of messages for the active session.
///
/// Append-only within a session (no removal except a full clear). The id of
/// the newest entry doubles as the dedup watermark: a poll whose newest id
/// matches it carries nothing new.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
    last_seen_id: Option<String>,
}

impl MessageLog {
    /// An empty log with no watermark.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from a persisted snapshot.
    pub fn from_parts(messages: Vec<Message>, last_seen_id: Option<String>) -> Self {
        Self {
            messages,
            last_seen_id,
        }
    }

    /// Offer the newest entry of a poll response.
    ///
    /// Returns the message when its id differs from the watermark — the
    /// watermark advances and the message is prepended. Returns `None` when
    /// the id matches (already seen) and leaves the log untouched.
    ///
    /// Only the single newest id is compared: if the provider delivered more
    /// than one new message between polls, the earlier ones are never
    /// surfaced as "new". Accepted trade-off, not a capture guarantee.
    pub fn accept(&mut self, newest: Message) -> Option<&Message> {
        if self.last_seen_id.as_deref() == Some(newest.id.as_str()) {
            return None;
        }
        self.last_seen_id = Some(newest.id.clone());
        self.messages.insert(0, newest);
        Some(&self.messages[0])
    }

    /// All messages, newest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The dedup watermark — id of the most recently observed message.
    pub fn last_seen_id(&self) -> Option<&str> {
        self.last_seen_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str) -> Message {
        Message {
            id: id.into(),
            subject: format!("subject {id}"),
            sender: "sender@example.com".into(),
            body_text: Some("body".into()),
            body_html: None,
        }
    }

    #[test]
    fn empty_log_has_no_watermark() {
        let log = MessageLog::new();
        assert!(log.is_empty());
        assert_eq!(log.last_seen_id(), None);
    }

    #[test]
    fn accept_advances_watermark_and_prepends() {
        let mut log = MessageLog::new();
        assert!(log.accept(msg("m1")).is_some());
        assert!(log.accept(msg("m2")).is_some());

        assert_eq!(log.len(), 2);
        assert_eq!(log.messages()[0].id, "m2");
        assert_eq!(log.messages()[1].id, "m1");
        assert_eq!(log.last_seen_id(), Some("m2"));
    }

    #[test]
    fn accept_same_id_is_noop() {
        let mut log = MessageLog::new();
        assert!(log.accept(msg("m1")).is_some());
        assert!(log.accept(msg("m1")).is_none());
        assert_eq!(log.len(), 1);
        assert_eq!(log.last_seen_id(), Some("m1"));
    }

    #[test]
    fn watermark_survives_round_trip_through_parts() {
        let mut log = MessageLog::new();
        log.accept(msg("m1"));
        log.accept(msg("m2"));

        let rebuilt =
            MessageLog::from_parts(log.messages().to_vec(), log.last_seen_id().map(String::from));
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt.last_seen_id(), Some("m2"));

        // A repeat of the persisted newest id still dedups after rehydration.
        let mut rebuilt = rebuilt;
        assert!(rebuilt.accept(msg("m2")).is_none());
    }

    #[test]
    fn message_wire_aliases() {
        let raw = r#"{
            "id": "abc",
            "subject": "Hi",
            "from_email": "a@x.com",
            "text_body": "plain",
            "html_body": "<p>hi</p>"
        }"#;
        let m: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(m.sender, "a@x.com");
        assert_eq!(m.body_text.as_deref(), Some("plain"));
        assert_eq!(m.body_html.as_deref(), Some("<p>hi</p>"));
    }

    #[test]
    fn message_missing_bodies_default_to_none() {
        let m: Message = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert_eq!(m.body_text, None);
        assert_eq!(m.body_html, None);
        assert_eq!(m.subject, "");
    }

    #[test]
    fn combined_content_joins_with_newlines() {
        let m = Message {
            id: "1".into(),
            subject: "Sub".into(),
            sender: "s@x.com".into(),
            body_text: Some("text".into()),
            body_html: Some("<b>html</b>".into()),
        };
        assert_eq!(m.combined_content(), "Sub\ntext\n<b>html</b>");
    }
}
