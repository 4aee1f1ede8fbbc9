//! Trait seams for the persistent collaborators the router consults.
//!
//! The core never owns persistent state: user lookups, contact lists, and
//! group rosters come from a [`Directory`]; chat rows and message history
//! go through a [`HistoryStore`]. Both are read through generics, so the
//! session code runs unchanged against SQLite in production and in-memory
//! fakes in tests.

use thiserror::Error;

/// Backend failure in a directory or history operation. "Not found" is not
/// an error at this seam; absent rows come back as `None`.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// A user row as the router sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    /// Stable opaque user id (the token subject).
    pub user_id: String,
    /// Unique human-readable handle, the registry's routing key.
    pub handle: String,
    /// Disabled accounts authenticate but may not connect.
    pub disabled: bool,
}

/// Membership of one group chat, by handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupRoster {
    pub members: Vec<String>,
    pub admins: Vec<String>,
}

/// Read-only access to users, contacts, and group rosters.
pub trait Directory {
    /// Resolve a stable user id to its record.
    async fn find_identity(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Contact handles of a user. Errors if the user id is unknown.
    async fn contacts_of(&self, user_id: &str) -> Result<Vec<String>, StoreError>;

    /// Membership of a group chat, or `None` if the id does not name a group.
    async fn group_roster_of(&self, group_id: &str) -> Result<Option<GroupRoster>, StoreError>;
}

/// Append-only chat history.
pub trait HistoryStore {
    /// Chat id of the direct conversation between `user_id` and the user
    /// with handle `peer_handle`, creating the two-member chat if this is
    /// their first message. `None` if no user has that handle.
    async fn direct_chat_between(
        &self,
        user_id: &str,
        peer_handle: &str,
    ) -> Result<Option<String>, StoreError>;

    /// Append one message to a chat. Returns the new message id.
    async fn append_message(
        &self,
        chat_id: &str,
        content: &str,
        message_type: &str,
        sender: &str,
        timestamp: &str,
    ) -> Result<String, StoreError>;
}
