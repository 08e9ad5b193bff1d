//! Best-effort form autofill capability.
//!
//! Placing a value into "the right" field of an arbitrary third-party page
//! cannot be guaranteed, so the contract is deliberately thin: attempt to
//! place value V into the best-matching field given keyword set K, report
//! nothing. The session manager fires these requests and forgets them.

use async_trait::async_trait;
use tracing::info;

/// Keywords that identify an email address field.
pub const EMAIL_KEYWORDS: &[&str] = &["email", "e-mail", "mail"];

/// Keywords that identify a verification code field.
pub const CODE_KEYWORDS: &[&str] = &["code", "verification", "otp", "pin"];

/// The abstract fill capability.
#[async_trait]
pub trait Autofill: Send + Sync {
    /// Try to place `value` into the best-matching field for `keywords`.
    /// Best-effort: no return contract beyond "it was attempted".
    async fn request_fill(&self, value: &str, keywords: &[&str]);
}

/// Default sink — logs the request instead of driving a page.
///
/// Stands in wherever no real page-driving collaborator is attached.
pub struct LogAutofill;

#[async_trait]
impl Autofill for LogAutofill {
    async fn request_fill(&self, value: &str, keywords: &[&str]) {
        info!(value, keywords = ?keywords, "Autofill requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records fill requests for assertions.
    pub struct RecordingAutofill {
        pub calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    #[async_trait]
    impl Autofill for RecordingAutofill {
        async fn request_fill(&self, value: &str, keywords: &[&str]) {
            self.calls.lock().unwrap().push((
                value.to_string(),
                keywords.iter().map(|k| k.to_string()).collect(),
            ));
        }
    }

    #[tokio::test]
    async fn log_autofill_is_callable() {
        LogAutofill.request_fill("4821", CODE_KEYWORDS).await;
    }

    #[tokio::test]
    async fn recording_autofill_captures_request() {
        let fill = RecordingAutofill {
            calls: Mutex::new(Vec::new()),
        };
        fill.request_fill("x@y.com", EMAIL_KEYWORDS).await;

        let calls = fill.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "x@y.com");
        assert!(calls[0].1.iter().any(|k| k == "email"));
    }
}
