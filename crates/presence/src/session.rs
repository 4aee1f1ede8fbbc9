//! Per-connection session state machine.
//!
//! Lifecycle: `Connecting -> Authenticating -> Active -> Disconnected`.
//! [`Session::connect`] covers the first three states; a `Session` value
//! only exists once the connection is `Active` and registered. Inbound
//! events drive [`Session::handle_event`], and [`Session::disconnect`] is
//! the terminal transition, safe to call more than once.
//!
//! Identity is resolved exactly once, during `connect`; every handler
//! reads the same immutable [`Identity`] for the life of the connection.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use courier_auth::TokenVerifier;

use crate::connection::ConnectionHandle;
use crate::error::{ConnectError, EventError};
use crate::events::{ClientEvent, ServerEvent};
use crate::registry::ConnectionRegistry;
use crate::store::{Directory, HistoryStore, StoreError};

/// Upper bound on one history write. Elapsing surfaces as a non-fatal
/// persistence error; there are no retries.
pub const HISTORY_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// The authenticated user behind one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub handle: String,
}

/// An active, registered connection.
#[derive(Debug)]
pub struct Session<D, H> {
    identity: Identity,
    contacts: Vec<String>,
    connection: ConnectionHandle,
    registry: ConnectionRegistry,
    directory: Arc<D>,
    history: Arc<H>,
    disconnected: bool,
}

impl<D, H> Session<D, H>
where
    D: Directory,
    H: HistoryStore,
{
    /// Take a fresh connection through authentication and registration.
    ///
    /// On success the connection is registered under the resolved handle
    /// and presence has been announced both ways to every online contact.
    /// On failure the caller emits one `error` event and closes; nothing
    /// was registered.
    pub async fn connect(
        registry: ConnectionRegistry,
        directory: Arc<D>,
        history: Arc<H>,
        verifier: &TokenVerifier,
        token: Option<&str>,
        connection: ConnectionHandle,
    ) -> Result<Self, ConnectError> {
        // Connecting -> Authenticating
        let claims = verifier.verify(token)?;

        let record = directory
            .find_identity(&claims.sub)
            .await
            .map_err(|e| ConnectError::Directory(e.to_string()))?
            .ok_or(ConnectError::UnknownUser)?;

        if record.disabled {
            return Err(ConnectError::AccountDisabled);
        }

        // Contacts are a snapshot taken at connect time; group rosters are
        // read fresh per send.
        let contacts = directory
            .contacts_of(&record.user_id)
            .await
            .map_err(|e| ConnectError::Directory(e.to_string()))?;

        // Authenticating -> Active. All directory I/O is done; only now is
        // the registry touched.
        if let Some(old) = registry.register(&record.handle, connection.clone()).await {
            debug!(handle = %record.handle, "closing replaced connection");
            old.close();
        }

        for contact in &contacts {
            if let Some(peer) = registry.lookup(contact).await {
                peer.send(ServerEvent::UserConnected(record.handle.clone()));
                connection.send(ServerEvent::UserConnected(contact.clone()));
            }
        }

        info!(handle = %record.handle, contacts = contacts.len(), "user connected");

        Ok(Self {
            identity: Identity {
                user_id: record.user_id,
                handle: record.handle,
            },
            contacts,
            connection,
            registry,
            directory,
            history,
            disconnected: false,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    /// Handle one inbound event. Errors are reported to the sender only
    /// and leave the connection active.
    pub async fn handle_event(&self, event: ClientEvent) -> Result<(), EventError> {
        if self.disconnected {
            return Ok(());
        }

        match event {
            ClientEvent::ChatMessage {
                message,
                message_type,
                receiver,
            } => self.handle_direct_message(&message, &message_type, &receiver).await,
            ClientEvent::GroupMessage {
                message,
                message_type,
                chat,
            } => self.handle_group_message(&message, &message_type, &chat).await,
        }
    }

    /// Report an event failure back to this connection.
    pub fn emit_error(&self, error: &EventError) {
        self.connection.send(ServerEvent::Error(error.to_string()));
    }

    async fn handle_direct_message(
        &self,
        message: &str,
        message_type: &str,
        receiver: &str,
    ) -> Result<(), EventError> {
        require_non_blank(message)?;
        require_non_blank(message_type)?;
        require_non_blank(receiver)?;

        // A user has no direct chat with themselves; letting this through
        // would resolve to some other conversation they are a member of.
        if receiver == self.identity.handle {
            return Err(EventError::Lookup("receiver not found".to_string()));
        }

        // One timestamp per message: delivery, persistence, and the ack
        // all carry this value.
        let timestamp = Utc::now().to_rfc3339();

        if let Some(peer) = self.registry.lookup(receiver).await {
            peer.send(ServerEvent::ChatMessage {
                message: message.to_string(),
                message_type: message_type.to_string(),
                sender: self.identity.handle.clone(),
                timestamp: timestamp.clone(),
            });
        }

        // Persist regardless of whether the receiver was online, creating
        // the direct chat on first contact.
        let chat_id = self
            .history
            .direct_chat_between(&self.identity.user_id, receiver)
            .await
            .map_err(|e| EventError::Persistence(e.to_string()))?
            .ok_or_else(|| EventError::Lookup("receiver not found".to_string()))?;

        self.persist(&chat_id, message, message_type, &timestamp).await?;

        self.connection.send(ServerEvent::MessageSent {
            message: message.to_string(),
            message_type: message_type.to_string(),
            receiver: Some(receiver.to_string()),
            chat: None,
            timestamp,
        });
        Ok(())
    }

    async fn handle_group_message(
        &self,
        message: &str,
        message_type: &str,
        chat: &str,
    ) -> Result<(), EventError> {
        require_non_blank(message)?;
        require_non_blank(message_type)?;
        require_non_blank(chat)?;

        // Roster is read fresh for every send.
        let roster = self
            .directory
            .group_roster_of(chat)
            .await
            .map_err(|e| EventError::Lookup(e.to_string()))?
            .ok_or_else(|| EventError::Lookup("group not found".to_string()))?;

        if !roster.members.iter().any(|m| m == &self.identity.handle) {
            return Err(EventError::AccessDenied(
                "not a member of this group".to_string(),
            ));
        }

        let timestamp = Utc::now().to_rfc3339();

        for member in roster.members.iter().filter(|m| *m != &self.identity.handle) {
            if let Some(peer) = self.registry.lookup(member).await {
                peer.send(ServerEvent::GroupMessage {
                    message: message.to_string(),
                    message_type: message_type.to_string(),
                    sender: self.identity.handle.clone(),
                    chat: chat.to_string(),
                    timestamp: timestamp.clone(),
                });
            }
        }

        // One history row per message, referencing the group chat itself.
        self.persist(chat, message, message_type, &timestamp).await?;

        self.connection.send(ServerEvent::MessageSent {
            message: message.to_string(),
            message_type: message_type.to_string(),
            receiver: None,
            chat: Some(chat.to_string()),
            timestamp,
        });
        Ok(())
    }

    async fn persist(
        &self,
        chat_id: &str,
        content: &str,
        message_type: &str,
        timestamp: &str,
    ) -> Result<(), EventError> {
        let write = self.history.append_message(
            chat_id,
            content,
            message_type,
            &self.identity.handle,
            timestamp,
        );

        match tokio::time::timeout(HISTORY_WRITE_TIMEOUT, write).await {
            Ok(Ok(_message_id)) => Ok(()),
            Ok(Err(StoreError(reason))) => {
                warn!(chat_id, %reason, "history write failed");
                Err(EventError::Persistence(reason))
            }
            Err(_) => {
                warn!(chat_id, "history write timed out");
                Err(EventError::Persistence("history write timed out".to_string()))
            }
        }
    }

    /// `Active -> Disconnected`. Removes the registry entry (unless a
    /// newer connection already took the handle over) and announces the
    /// departure to online contacts. Calling this twice is a no-op.
    pub async fn disconnect(&mut self) {
        if self.disconnected {
            return;
        }
        self.disconnected = true;

        let removed = self
            .registry
            .unregister(&self.identity.handle, &self.connection)
            .await;

        if !removed {
            // A newer session owns the handle now; it announces its own
            // departure when it ends.
            debug!(handle = %self.identity.handle, "stale disconnect, registry untouched");
            return;
        }

        for contact in &self.contacts {
            if let Some(peer) = self.registry.lookup(contact).await {
                peer.send(ServerEvent::UserDisconnected(self.identity.handle.clone()));
            }
        }

        info!(handle = %self.identity.handle, "user disconnected");
    }
}

/// Reject fields that are empty or all whitespace. The field itself is
/// passed on untouched; message content may carry significant leading or
/// trailing whitespace.
fn require_non_blank(field: &str) -> Result<(), EventError> {
    if field.trim().is_empty() {
        return Err(EventError::Validation);
    }
    Ok(())
}
