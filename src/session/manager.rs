//! Session manager — single-owner actor for the disposable mailbox.
//!
//! The manager task exclusively owns the live session, its message log and
//! the dedup watermark. Everything else talks to it over a command channel
//! and reads snapshots; nothing mutates session state from outside. Poll
//! results come back through the same channel, tagged with the epoch they
//! were issued under, so anything from a stopped or replaced session is
//! discarded instead of applied.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use super::poller::spawn_poller;
use super::session::{Session, SessionState};
use crate::autofill::{Autofill, CODE_KEYWORDS, EMAIL_KEYWORDS};
use crate::error::{Error, PollError, Result};
use crate::extract::extract_code;
use crate::inbox::{Message, MessageLog};
use crate::notify::{Event, Notifier};
use crate::provider::MailProvider;
use crate::store::{PersistedState, StateStore};

const COMMAND_BUFFER: usize = 32;

/// Everything the manager needs to run.
pub struct ManagerDeps {
    pub provider: Arc<dyn MailProvider>,
    pub store: Arc<dyn StateStore>,
    pub autofill: Arc<dyn Autofill>,
    pub poll_interval: Duration,
    pub session_ttl: Duration,
}

/// Commands served by the manager task.
pub(crate) enum Command {
    Generate {
        reply: oneshot::Sender<Result<String>>,
    },
    GetState {
        reply: oneshot::Sender<StateSnapshot>,
    },
    Delete {
        reply: oneshot::Sender<()>,
    },
    FillAddress {
        reply: oneshot::Sender<bool>,
    },
    PollSettled {
        epoch: u64,
        outcome: std::result::Result<Vec<Message>, PollError>,
    },
}

/// Read-only view of the current state, handed to the panel.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub state: SessionState,
    pub address: Option<String>,
    pub session_id: Option<String>,
    pub messages: Vec<Message>,
}

/// Client side of the manager: request/response plus event subscription.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
    notifier: Notifier,
}

impl SessionHandle {
    /// Provision a fresh disposable address, replacing any live session.
    pub async fn generate(&self) -> Result<String> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Generate { reply })
            .await
            .map_err(|_| Error::ManagerGone)?;
        rx.await.map_err(|_| Error::ManagerGone)?
    }

    /// Snapshot of the current session and message log.
    pub async fn state(&self) -> Result<StateSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::GetState { reply })
            .await
            .map_err(|_| Error::ManagerGone)?;
        rx.await.map_err(|_| Error::ManagerGone)
    }

    /// Delete the live session. Succeeds even when already idle.
    pub async fn delete(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Delete { reply })
            .await
            .map_err(|_| Error::ManagerGone)?;
        rx.await.map_err(|_| Error::ManagerGone)
    }

    /// Ask for the current address to be autofilled into the active page.
    /// Returns whether there was an address to fill.
    pub async fn fill_address(&self) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::FillAddress { reply })
            .await
            .map_err(|_| Error::ManagerGone)?;
        rx.await.map_err(|_| Error::ManagerGone)
    }

    /// Subscribe to session/inbox change events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.notifier.subscribe()
    }
}

struct ActiveSession {
    session: Session,
    log: MessageLog,
    stop: watch::Sender<bool>,
}

/// The actor. Owns all mutable session state; see module docs.
pub struct SessionManager {
    deps: ManagerDeps,
    notifier: Notifier,
    cmd_tx: mpsc::Sender<Command>,
    active: Option<ActiveSession>,
    /// Bumped on every session start and teardown; poll results from older
    /// epochs are dropped on receipt.
    epoch: u64,
}

impl SessionManager {
    /// Run restart recovery, then spawn the actor task.
    pub async fn spawn(deps: ManagerDeps) -> SessionHandle {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let notifier = Notifier::new();

        let mut manager = SessionManager {
            deps,
            notifier: notifier.clone(),
            cmd_tx: tx.clone(),
            active: None,
            epoch: 0,
        };
        manager.recover().await;

        tokio::spawn(async move { manager.run(rx).await });

        SessionHandle { tx, notifier }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            match cmd {
                Command::Generate { reply } => {
                    let _ = reply.send(self.handle_generate().await);
                }
                Command::GetState { reply } => {
                    let _ = reply.send(self.handle_state().await);
                }
                Command::Delete { reply } => {
                    self.expire_if_due().await;
                    self.clear_session().await;
                    let _ = reply.send(());
                }
                Command::FillAddress { reply } => {
                    let _ = reply.send(self.handle_fill_address().await);
                }
                Command::PollSettled { epoch, outcome } => {
                    self.handle_poll_settled(epoch, outcome).await;
                }
            }
        }

        // All handles dropped: make sure the poll loop dies with us.
        if let Some(active) = self.active.take() {
            let _ = active.stop.send(true);
        }
    }

    /// Rehydrate a persisted session at startup, or purge it if stale.
    async fn recover(&mut self) {
        let snapshot = match self.deps.store.load().await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "Failed to load persisted session; starting idle");
                None
            }
        };
        let Some(snap) = snapshot else {
            return;
        };

        let session = Session::from_parts(snap.address, snap.session_id, snap.created_at);
        if session.is_expired(Utc::now(), self.deps.session_ttl) {
            info!(address = %session.address, "Persisted session expired; purging");
            if let Err(e) = self.deps.store.clear().await {
                warn!(error = %e, "Failed to purge expired session");
            }
            return;
        }

        let log = MessageLog::from_parts(snap.messages, snap.last_seen_id);
        info!(
            address = %session.address,
            messages = log.len(),
            "Resuming session from snapshot"
        );
        self.start_session(session, log);
    }

    async fn handle_generate(&mut self) -> Result<String> {
        self.expire_if_due().await;
        // Replacement semantics: any live session is deleted first.
        self.clear_session().await;

        let provisioned = self.deps.provider.create_address().await.map_err(|e| {
            warn!(error = %e, "Provisioning failed");
            Error::Provision(e)
        })?;

        let session = Session::new(provisioned.address, provisioned.id);
        let log = MessageLog::new();
        self.deps
            .store
            .save(&snapshot_of(&session, &log))
            .await
            .map_err(Error::Store)?;

        let address = session.address.clone();
        self.start_session(session, log);
        self.notifier.publish(Event::SessionCreated {
            address: address.clone(),
        });
        self.spawn_fill(address.clone(), EMAIL_KEYWORDS);
        info!(address = %address, "Disposable address provisioned");
        Ok(address)
    }

    async fn handle_state(&mut self) -> StateSnapshot {
        self.expire_if_due().await;
        match &self.active {
            Some(active) => StateSnapshot {
                state: SessionState::Active,
                address: Some(active.session.address.clone()),
                session_id: Some(active.session.id.clone()),
                messages: active.log.messages().to_vec(),
            },
            None => StateSnapshot {
                state: SessionState::Idle,
                address: None,
                session_id: None,
                messages: Vec::new(),
            },
        }
    }

    async fn handle_fill_address(&mut self) -> bool {
        self.expire_if_due().await;
        match &self.active {
            Some(active) => {
                self.spawn_fill(active.session.address.clone(), EMAIL_KEYWORDS);
                true
            }
            None => false,
        }
    }

    async fn handle_poll_settled(
        &mut self,
        epoch: u64,
        outcome: std::result::Result<Vec<Message>, PollError>,
    ) {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "Discarding stale poll result");
            return;
        }
        self.expire_if_due().await;
        if self.active.is_none() {
            return;
        }

        let messages = match outcome {
            Ok(messages) => messages,
            Err(e) => {
                // A failed tick never stops polling.
                warn!(error = %e, "Poll tick failed");
                return;
            }
        };
        let Some(newest) = messages.into_iter().next() else {
            return;
        };
        let Some((snapshot, content)) = self.store_new_message(newest) else {
            return;
        };

        // Persist before notifying; a failed background write is logged,
        // the in-memory log stays authoritative for this session.
        if let Err(e) = self.deps.store.save(&snapshot).await {
            warn!(error = %e, "Failed to persist session snapshot");
        }
        self.notifier.publish(Event::Inbox {
            messages: snapshot.messages,
        });

        if let Some(code) = extract_code(&content) {
            info!(code, "Verification code extracted");
            self.spawn_fill(code.to_string(), CODE_KEYWORDS);
        }
    }

    /// Run the newest poll entry through the dedup watermark. Returns the
    /// updated snapshot and the stored message's content, or `None` when the
    /// message was already seen.
    fn store_new_message(&mut self, newest: Message) -> Option<(PersistedState, String)> {
        let active = self.active.as_mut()?;
        let stored = active.log.accept(newest)?;
        info!(id = %stored.id, sender = %stored.sender, "New message stored");
        let content = stored.combined_content();
        Some((snapshot_of(&active.session, &active.log), content))
    }

    fn start_session(&mut self, session: Session, log: MessageLog) {
        self.epoch += 1;
        let stop = spawn_poller(
            Arc::clone(&self.deps.provider),
            session.id.clone(),
            self.epoch,
            self.deps.poll_interval,
            self.cmd_tx.clone(),
        );
        self.active = Some(ActiveSession { session, log, stop });
    }

    /// Tear down the live session, if any: stop polling, purge the store,
    /// notify. No-op when already idle.
    async fn clear_session(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let _ = active.stop.send(true);
        self.epoch += 1;
        if let Err(e) = self.deps.store.clear().await {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.notifier.publish(Event::SessionCleared);
        info!(address = %active.session.address, "Session cleared");
    }

    async fn expire_if_due(&mut self) {
        let expired = self
            .active
            .as_ref()
            .is_some_and(|a| a.session.is_expired(Utc::now(), self.deps.session_ttl));
        if expired {
            info!("Session TTL elapsed");
            self.clear_session().await;
        }
    }

    fn spawn_fill(&self, value: String, keywords: &'static [&'static str]) {
        let autofill = Arc::clone(&self.deps.autofill);
        tokio::spawn(async move {
            autofill.request_fill(&value, keywords).await;
        });
    }
}

fn snapshot_of(session: &Session, log: &MessageLog) -> PersistedState {
    PersistedState {
        address: session.address.clone(),
        session_id: session.id.clone(),
        created_at: session.created_at,
        last_seen_id: log.last_seen_id().map(String::from),
        messages: log.messages().to_vec(),
    }
}
