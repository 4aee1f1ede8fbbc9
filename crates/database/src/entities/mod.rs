//! Entity definitions for the Courier schema.

pub mod chat;
pub mod message;
pub mod user;

pub use chat::{Chat, ChatRoster};
pub use message::{MessageType, StoredMessage};
pub use user::User;
