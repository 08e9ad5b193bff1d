//! burnbox — disposable mailbox session agent.
//!
//! Provisions a throwaway email address, polls the provider for inbound
//! mail, dedups and stores messages for the life of the session, extracts
//! verification codes, and hands sanitized markup to the presentation
//! layer.

pub mod autofill;
pub mod config;
pub mod error;
pub mod extract;
pub mod inbox;
pub mod notify;
pub mod protocol;
pub mod provider;
pub mod sanitize;
pub mod session;
pub mod store;
