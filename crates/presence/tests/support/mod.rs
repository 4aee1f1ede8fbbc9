//! In-memory collaborators for exercising the routing core without a
//! database, plus small helpers shared by the session tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::RwLock;

use courier_auth::TokenVerifier;
use courier_config::AuthConfig;
use courier_presence::{
    Directory, Frame, GroupRoster, HistoryStore, ServerEvent, StoreError, UserRecord,
};

/// In-memory user/contact/group directory.
#[derive(Debug, Default)]
pub struct FakeDirectory {
    users: RwLock<HashMap<String, UserRecord>>,
    contacts: RwLock<HashMap<String, Vec<String>>>,
    groups: RwLock<HashMap<String, GroupRoster>>,
}

impl FakeDirectory {
    pub async fn add_user(&self, user_id: &str, handle: &str, disabled: bool) {
        self.users.write().await.insert(
            user_id.to_string(),
            UserRecord {
                user_id: user_id.to_string(),
                handle: handle.to_string(),
                disabled,
            },
        );
    }

    pub async fn set_contacts(&self, user_id: &str, handles: &[&str]) {
        self.contacts.write().await.insert(
            user_id.to_string(),
            handles.iter().map(|h| h.to_string()).collect(),
        );
    }

    pub async fn add_group(&self, group_id: &str, members: &[&str], admins: &[&str]) {
        self.groups.write().await.insert(
            group_id.to_string(),
            GroupRoster {
                members: members.iter().map(|m| m.to_string()).collect(),
                admins: admins.iter().map(|a| a.to_string()).collect(),
            },
        );
    }
}

impl Directory for FakeDirectory {
    async fn find_identity(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn contacts_of(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .contacts
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn group_roster_of(&self, group_id: &str) -> Result<Option<GroupRoster>, StoreError> {
        Ok(self.groups.read().await.get(group_id).cloned())
    }
}

/// One message row as recorded by the fake history store.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMessage {
    pub chat_id: String,
    pub content: String,
    pub message_type: String,
    pub sender: String,
    pub timestamp: String,
}

/// In-memory append-only history with lazy direct chat creation.
#[derive(Debug, Default)]
pub struct FakeHistory {
    /// handle -> user id, mirroring the user store's unique-handle index.
    handles: RwLock<HashMap<String, String>>,
    /// sorted (user id, user id) pair -> chat id.
    direct_chats: RwLock<HashMap<(String, String), String>>,
    messages: RwLock<Vec<RecordedMessage>>,
    fail_writes: AtomicBool,
}

impl FakeHistory {
    pub async fn add_handle(&self, handle: &str, user_id: &str) {
        self.handles
            .write()
            .await
            .insert(handle.to_string(), user_id.to_string());
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub async fn messages(&self) -> Vec<RecordedMessage> {
        self.messages.read().await.clone()
    }

    pub async fn direct_chat_count(&self) -> usize {
        self.direct_chats.read().await.len()
    }
}

impl HistoryStore for FakeHistory {
    async fn direct_chat_between(
        &self,
        user_id: &str,
        peer_handle: &str,
    ) -> Result<Option<String>, StoreError> {
        let peer_id = match self.handles.read().await.get(peer_handle) {
            Some(id) => id.clone(),
            None => return Ok(None),
        };

        let mut pair = [user_id.to_string(), peer_id];
        pair.sort();
        let key = (pair[0].clone(), pair[1].clone());

        let mut chats = self.direct_chats.write().await;
        let next_id = format!("direct{}", chats.len() + 1);
        Ok(Some(chats.entry(key).or_insert(next_id).clone()))
    }

    async fn append_message(
        &self,
        chat_id: &str,
        content: &str,
        message_type: &str,
        sender: &str,
        timestamp: &str,
    ) -> Result<String, StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError("disk full".to_string()));
        }

        let mut messages = self.messages.write().await;
        messages.push(RecordedMessage {
            chat_id: chat_id.to_string(),
            content: content.to_string(),
            message_type: message_type.to_string(),
            sender: sender.to_string(),
            timestamp: timestamp.to_string(),
        });
        Ok(format!("msg{}", messages.len()))
    }
}

pub fn test_verifier() -> TokenVerifier {
    TokenVerifier::new(&AuthConfig {
        secret: "presence_test_secret_long_enough_for_hs256".to_string(),
        issuer: "courier-test".to_string(),
        audience: "courier-test-clients".to_string(),
        token_ttl_seconds: 3600,
    })
}

/// A world with three users: alice and bob are mutual contacts, carol has
/// no contacts. No groups.
pub async fn seed_world() -> (Arc<FakeDirectory>, Arc<FakeHistory>) {
    let directory = Arc::new(FakeDirectory::default());
    directory.add_user("u-alice", "alice", false).await;
    directory.add_user("u-bob", "bob", false).await;
    directory.add_user("u-carol", "carol", false).await;
    directory.set_contacts("u-alice", &["bob"]).await;
    directory.set_contacts("u-bob", &["alice"]).await;
    directory.set_contacts("u-carol", &[]).await;

    let history = Arc::new(FakeHistory::default());
    history.add_handle("alice", "u-alice").await;
    history.add_handle("bob", "u-bob").await;
    history.add_handle("carol", "u-carol").await;

    (directory, history)
}

/// Drain every event currently queued on a connection's receiver,
/// stopping at (and swallowing) a close frame.
pub fn drain_events(rx: &mut UnboundedReceiver<Frame>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        match frame {
            Frame::Event(event) => events.push(event),
            Frame::Close => break,
        }
    }
    events
}

/// Whether a close frame is queued on the receiver.
pub fn saw_close(rx: &mut UnboundedReceiver<Frame>) -> bool {
    while let Ok(frame) = rx.try_recv() {
        if frame == Frame::Close {
            return true;
        }
    }
    false
}
