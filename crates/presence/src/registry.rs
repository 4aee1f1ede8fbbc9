//! The connection registry: online handles mapped to live connections.
//!
//! One shared mutable map for the whole process, owned behind a lock and
//! cloned into every session. Critical sections only touch the map; no
//! directory or history I/O ever runs under the lock, so operations on the
//! same handle are ordered and operations on different handles contend
//! only for the brief map access itself.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::connection::ConnectionHandle;

/// Concurrency-safe map from online handle to live connection.
#[derive(Clone, Debug, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<String, ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the entry for `handle`. Returns the connection
    /// that was previously registered, if any; the caller decides whether
    /// to close it.
    pub async fn register(&self, handle: &str, connection: ConnectionHandle) -> Option<ConnectionHandle> {
        let mut map = self.inner.write().await;
        let previous = map.insert(handle.to_string(), connection);
        if previous.is_some() {
            debug!(handle, "replaced existing registry entry");
        }
        previous
    }

    /// Current connection for `handle`, if online.
    pub async fn lookup(&self, handle: &str) -> Option<ConnectionHandle> {
        let map = self.inner.read().await;
        map.get(handle).cloned()
    }

    /// Remove the entry for `handle`, but only if it still is
    /// `connection`. A disconnect racing a re-register must not evict the
    /// newer connection; in that case this is a no-op and returns false.
    pub async fn unregister(&self, handle: &str, connection: &ConnectionHandle) -> bool {
        let mut map = self.inner.write().await;
        match map.get(handle) {
            Some(current) if current.same_connection(connection) => {
                map.remove(handle);
                true
            }
            _ => false,
        }
    }

    /// Handles currently online. Diagnostics and tests only.
    pub async fn snapshot(&self) -> Vec<String> {
        let map = self.inner.read().await;
        let mut handles: Vec<String> = map.keys().cloned().collect();
        handles.sort();
        handles
    }

    /// Number of online connections.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
