//! Change notifications — best-effort broadcast to any listening panel.

use tokio::sync::broadcast;

use crate::inbox::Message;

/// Buffered events per subscriber before lagging ones drop old entries.
const EVENT_BUFFER: usize = 64;

/// A session or inbox change, published by the session manager.
#[derive(Debug, Clone)]
pub enum Event {
    /// A fresh disposable address went live.
    SessionCreated { address: String },
    /// The session was deleted, replaced or expired; all state is gone.
    SessionCleared,
    /// A new message was stored; carries the full log, newest first.
    Inbox { messages: Vec<Message> },
}

/// Publish side of the notification channel.
///
/// Delivery is fire-and-forget: a publish with no live subscriber is not an
/// error, it is the normal state whenever no panel is open.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Event>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_BUFFER);
        Self { tx }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publish an event to whoever is listening, if anyone.
    pub fn publish(&self, event: Event) {
        // send only fails when there are zero receivers; ignorable.
        let _ = self.tx.send(event);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
