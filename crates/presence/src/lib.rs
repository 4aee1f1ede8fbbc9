//! Courier Presence Crate
//!
//! The realtime core of the Courier backend: an in-memory registry of
//! online handles mapped to live connections, and the per-connection
//! session state machine that authenticates clients, announces presence,
//! and routes direct and group chat messages.
//!
//! The crate is transport-agnostic. A connection is an outbound frame
//! channel; the gateway owns the actual WebSocket and feeds inbound events
//! into [`Session::handle_event`]. Persistent collaborators (the user and
//! relationship directory, the chat history store) are trait seams
//! implemented over SQLite in the gateway crate and by in-memory fakes in
//! tests.

pub mod connection;
pub mod error;
pub mod events;
pub mod registry;
pub mod session;
pub mod store;

pub use connection::{connection_channel, ConnectionHandle, Frame};
pub use error::{ConnectError, EventError};
pub use events::{ClientEvent, ServerEvent};
pub use registry::ConnectionRegistry;
pub use session::{Identity, Session, HISTORY_WRITE_TIMEOUT};
pub use store::{Directory, GroupRoster, HistoryStore, StoreError, UserRecord};
