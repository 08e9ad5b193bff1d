//! Mail provider client — create addresses, list messages.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{PollError, ProvisionError};
use crate::inbox::Message;

/// A freshly provisioned disposable address.
#[derive(Debug, Clone)]
pub struct ProvisionedAddress {
    pub address: String,
    pub id: String,
}

/// Boundary to the remote mailbox provider.
///
/// The session manager only talks to this trait; tests plug in stubs.
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Provision a new disposable address.
    async fn create_address(&self) -> Result<ProvisionedAddress, ProvisionError>;

    /// List messages for an address, newest first.
    async fn fetch_messages(&self, address_id: &str) -> Result<Vec<Message>, PollError>;
}

// ── HTTP implementation ─────────────────────────────────────────────

/// Success body of the create call.
#[derive(Debug, Deserialize)]
struct CreateResponse {
    email: CreatedEmail,
}

#[derive(Debug, Deserialize)]
struct CreatedEmail {
    address: String,
    id: String,
}

/// The message list arrives either bare or wrapped in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageListResponse {
    Bare(Vec<Message>),
    Wrapped { messages: Vec<Message> },
}

impl MessageListResponse {
    fn into_messages(self) -> Vec<Message> {
        match self {
            Self::Bare(messages) | Self::Wrapped { messages } => messages,
        }
    }
}

/// reqwest-backed provider client.
pub struct HttpMailProvider {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl HttpMailProvider {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }
}

#[async_trait]
impl MailProvider for HttpMailProvider {
    async fn create_address(&self) -> Result<ProvisionedAddress, ProvisionError> {
        let resp = self
            .client
            .post(self.api_url("emails/create"))
            .header("X-API-Key", self.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ProvisionError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ProvisionError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: CreateResponse = resp
            .json()
            .await
            .map_err(|e| ProvisionError::MalformedResponse(e.to_string()))?;

        Ok(ProvisionedAddress {
            address: body.email.address,
            id: body.email.id,
        })
    }

    async fn fetch_messages(&self, address_id: &str) -> Result<Vec<Message>, PollError> {
        let resp = self
            .client
            .get(self.api_url(&format!("emails/{address_id}/messages")))
            .header("X-API-Key", self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| PollError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(PollError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: MessageListResponse = resp
            .json()
            .await
            .map_err(|e| PollError::MalformedResponse(e.to_string()))?;

        Ok(body.into_messages())
    }
}

// ── Tests ───────────────────────────────────────────────────────────
