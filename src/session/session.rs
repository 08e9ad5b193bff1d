//! Session value type and lifecycle states.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the disposable mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No address provisioned.
    Idle,
    /// Address live, polling running.
    Active,
    /// TTL elapsed; collapses to `Idle` once persisted state is purged.
    Expired,
}

impl SessionState {
    /// Check if this state allows transitioning to another state.
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, target),
            (Idle, Active)
                | (Active, Active)
                | (Active, Idle)
                | (Active, Expired)
                | (Expired, Idle)
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

/// One live disposable mailbox.
///
/// Lifetime is exclusively owned by the session manager: created on
/// generate, destroyed on delete, expiry or replacement.
#[derive(Debug, Clone)]
pub struct Session {
    /// The disposable address itself.
    pub address: String,
    /// Provider-assigned opaque id, used for polling.
    pub id: String,
    /// When the address was provisioned.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// A session provisioned right now.
    pub fn new(address: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            id: id.into(),
            created_at: Utc::now(),
        }
    }

    /// Rebuild a session from a persisted snapshot.
    pub fn from_parts(
        address: impl Into<String>,
        id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            address: address.into(),
            id: id.into(),
            created_at,
        }
    }

    /// When this session stops being valid.
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.created_at + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero())
    }

    /// Whether the TTL has elapsed as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now >= self.expires_at(ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SESSION_TTL;

    #[test]
    fn state_transitions_valid() {
        assert!(SessionState::Idle.can_transition_to(SessionState::Active));
        assert!(SessionState::Active.can_transition_to(SessionState::Active));
        assert!(SessionState::Active.can_transition_to(SessionState::Idle));
        assert!(SessionState::Active.can_transition_to(SessionState::Expired));
        assert!(SessionState::Expired.can_transition_to(SessionState::Idle));
    }

    #[test]
    fn state_transitions_invalid() {
        assert!(!SessionState::Idle.can_transition_to(SessionState::Expired));
        assert!(!SessionState::Expired.can_transition_to(SessionState::Active));
        assert!(!SessionState::Idle.can_transition_to(SessionState::Idle));
    }

    #[test]
    fn fresh_session_is_not_expired() {
        let s = Session::new("x@tmp.test", "em_1");
        assert!(!s.is_expired(Utc::now(), SESSION_TTL));
    }

    #[test]
    fn session_past_ttl_is_expired() {
        let created = Utc::now() - chrono::Duration::milliseconds(600_001);
        let s = Session::from_parts("x@tmp.test", "em_1", created);
        assert!(s.is_expired(Utc::now(), SESSION_TTL));
    }

    #[test]
    fn session_exactly_at_ttl_is_expired() {
        let now = Utc::now();
        let created = now - chrono::Duration::milliseconds(600_000);
        let s = Session::from_parts("x@tmp.test", "em_1", created);
        assert!(s.is_expired(now, SESSION_TTL));
    }

    #[test]
    fn session_just_under_ttl_is_live() {
        let now = Utc::now();
        let created = now - chrono::Duration::milliseconds(599_999);
        let s = Session::from_parts("x@tmp.test", "em_1", created);
        assert!(!s.is_expired(now, SESSION_TTL));
    }

    #[test]
    fn expires_at_is_created_plus_ttl() {
        let s = Session::new("x@tmp.test", "em_1");
        let expected = s.created_at + chrono::Duration::milliseconds(600_000);
        assert_eq!(s.expires_at(SESSION_TTL), expected);
    }
}
