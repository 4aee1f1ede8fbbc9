//! Wire protocol events.
//!
//! JSON over the websocket, enveloped as `{"event": <name>, "data": ...}`.
//! Event names and payload fields mirror the client protocol: inbound
//! `chat-message`/`group-message`, outbound presence, delivery, and
//! acknowledgment events.

use serde::{Deserialize, Serialize};

/// Events received from a connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Send a direct message to another user.
    ChatMessage {
        message: String,
        #[serde(rename = "type")]
        message_type: String,
        receiver: String,
    },
    /// Send a message to a group chat.
    GroupMessage {
        message: String,
        #[serde(rename = "type")]
        message_type: String,
        chat: String,
    },
}

/// Events emitted to a connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Something about the last request was wrong; the connection stays up
    /// unless it was an authentication failure.
    Error(String),
    /// A contact came online.
    UserConnected(String),
    /// A contact went offline.
    UserDisconnected(String),
    /// Direct message delivery.
    ChatMessage {
        message: String,
        #[serde(rename = "type")]
        message_type: String,
        sender: String,
        timestamp: String,
    },
    /// Group message delivery.
    GroupMessage {
        message: String,
        #[serde(rename = "type")]
        message_type: String,
        sender: String,
        chat: String,
        timestamp: String,
    },
    /// Acknowledgment to the sender, echoing the accepted message and the
    /// timestamp used for delivery and persistence.
    MessageSent {
        message: String,
        #[serde(rename = "type")]
        message_type: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        receiver: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        chat: Option<String>,
        timestamp: String,
    },
}
