//! SQLite-backed implementations of the routing core's trait seams.

use sqlx::SqlitePool;

use courier_database::{
    ChatRepository, DatabaseError, MessageRepository, MessageType, UserRepository,
};
use courier_presence::{Directory, GroupRoster, HistoryStore, StoreError, UserRecord};

fn to_store(err: DatabaseError) -> StoreError {
    StoreError(err.to_string())
}

/// User, contact, and group-roster lookups over the user store.
pub struct SqliteDirectory {
    users: UserRepository,
    chats: ChatRepository,
}

impl SqliteDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            chats: ChatRepository::new(pool),
        }
    }
}

impl Directory for SqliteDirectory {
    async fn find_identity(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = self
            .users
            .find_by_public_id(user_id)
            .await
            .map_err(to_store)?;

        Ok(user.map(|u| UserRecord {
            user_id: u.public_id,
            handle: u.username,
            disabled: u.disabled,
        }))
    }

    async fn contacts_of(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        self.users.contacts_of(user_id).await.map_err(to_store)
    }

    async fn group_roster_of(&self, group_id: &str) -> Result<Option<GroupRoster>, StoreError> {
        let roster = self
            .chats
            .group_roster_of(group_id)
            .await
            .map_err(to_store)?;

        Ok(roster.map(|r| GroupRoster {
            members: r.members,
            admins: r.admins,
        }))
    }
}

/// Chat resolution and message appends over the history tables.
pub struct SqliteHistory {
    users: UserRepository,
    chats: ChatRepository,
    messages: MessageRepository,
}

impl SqliteHistory {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            chats: ChatRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
        }
    }
}

impl HistoryStore for SqliteHistory {
    async fn direct_chat_between(
        &self,
        user_id: &str,
        peer_handle: &str,
    ) -> Result<Option<String>, StoreError> {
        let me = self
            .users
            .find_by_public_id(user_id)
            .await
            .map_err(to_store)?
            .ok_or_else(|| StoreError(format!("sender {user_id} not in user store")))?;

        let peer = match self
            .users
            .find_by_username(peer_handle)
            .await
            .map_err(to_store)?
        {
            Some(peer) => peer,
            None => return Ok(None),
        };

        if let Some(chat) = self
            .chats
            .find_direct_between(me.id, peer.id)
            .await
            .map_err(to_store)?
        {
            return Ok(Some(chat.public_id));
        }

        // first message between the two: create the chat lazily
        let chat = self
            .chats
            .create_direct(me.id, peer.id)
            .await
            .map_err(to_store)?;
        Ok(Some(chat.public_id))
    }

    async fn append_message(
        &self,
        chat_id: &str,
        content: &str,
        message_type: &str,
        sender: &str,
        timestamp: &str,
    ) -> Result<String, StoreError> {
        let chat = self
            .chats
            .find_by_public_id(chat_id)
            .await
            .map_err(to_store)?
            .ok_or_else(|| StoreError(format!("chat {chat_id} not found")))?;

        let stored = self
            .messages
            .append(
                chat.id,
                sender,
                content,
                MessageType::from(message_type),
                timestamp,
            )
            .await
            .map_err(to_store)?;

        Ok(stored.public_id)
    }
}
