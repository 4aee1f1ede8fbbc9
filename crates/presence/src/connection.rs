//! Live connection handles.
//!
//! A [`ConnectionHandle`] is the registry's view of one connected client:
//! a fire-and-forget sender of outbound frames plus a process-unique id.
//! The id is what makes stale-disconnect detection possible: two handles
//! for the same username are never "the same connection" unless they share
//! an id.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::events::ServerEvent;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Frames travelling from the core to the transport task of one client.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Deliver an event to the client.
    Event(ServerEvent),
    /// Ask the transport task to close the connection.
    Close,
}

/// Sending half of one client connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: u64,
    sender: mpsc::UnboundedSender<Frame>,
}

impl ConnectionHandle {
    pub fn new(sender: mpsc::UnboundedSender<Frame>) -> Self {
        Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            sender,
        }
    }

    /// Process-unique id of this connection.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Deliver an event, best-effort. Returns false if the client side is
    /// already gone; callers treat that as a no-op.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.sender.send(Frame::Event(event)).is_ok()
    }

    /// Signal the owning transport task to shut the connection down.
    pub fn close(&self) {
        let _ = self.sender.send(Frame::Close);
    }

    /// Whether two handles refer to the same underlying connection.
    pub fn same_connection(&self, other: &ConnectionHandle) -> bool {
        self.id == other.id
    }
}

/// Create a connection handle together with the receiving half the
/// transport task drains.
pub fn connection_channel() -> (ConnectionHandle, mpsc::UnboundedReceiver<Frame>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ConnectionHandle::new(tx), rx)
}
