//! Error taxonomy for the routing core.
//!
//! Connection-fatal failures happen only while authenticating; everything
//! after that is scoped to the offending event. The `Display` text of
//! these errors is what clients see in `error` events.

use thiserror::Error;

use courier_auth::AuthError;

/// Failure while taking a connection from `Connecting` to `Active`.
/// Always terminal: the client gets one `error` event, then the
/// connection closes.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Token(#[from] AuthError),
    #[error("user not found")]
    UnknownUser,
    #[error("account disabled")]
    AccountDisabled,
    #[error("directory unavailable: {0}")]
    Directory(String),
}

/// Failure while handling one inbound event on an active connection.
/// Never terminal: the sender gets an `error` event and the connection
/// stays up.
#[derive(Debug, Error)]
pub enum EventError {
    /// Malformed payload: a required field was empty after trimming.
    #[error("invalid request")]
    Validation,
    /// The recipient or group does not exist.
    #[error("{0}")]
    Lookup(String),
    /// The sender may not address this target.
    #[error("{0}")]
    AccessDenied(String),
    /// The history write failed or timed out. Any delivery already made
    /// stands; nothing is rolled back.
    #[error("failed to record message: {0}")]
    Persistence(String),
}
