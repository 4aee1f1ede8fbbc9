//! Data access layer.
//!
//! Repositories are the only code that touches SQL. The user repository
//! backs identity lookups and contact lists, the chat repository backs
//! direct-chat resolution and group rosters, and the message repository
//! is the append-only history.

pub mod chat_repository;
pub mod message_repository;
pub mod user_repository;

pub use chat_repository::ChatRepository;
pub use message_repository::MessageRepository;
pub use user_repository::UserRepository;
