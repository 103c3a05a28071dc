//! WebSocket connection manager
//!
//! Manages active WebSocket connections using DashMap for concurrent
//! access. The channel is broadcast-only: there is no per-user routing,
//! every published event goes to every connected client, at most once,
//! with no delivery guarantee. A disconnected client simply misses the
//! event until its next refetch.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use super::messages::WsMessage;

/// WebSocket sender channel type
pub type WsSender = mpsc::UnboundedSender<WsMessage>;

/// Unique connection identifier
pub type ConnectionId = u64;

/// Thread-safe registry of live WebSocket connections.
pub struct ConnectionManager {
    /// connection_id -> sender
    connections: DashMap<ConnectionId, WsSender>,
    /// Next connection ID
    next_conn_id: AtomicU64,
}

impl ConnectionManager {
    /// Create a new connection manager
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Register a new connection, returning its unique ID.
    pub fn add_connection(&self, tx: WsSender) -> ConnectionId {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        self.connections.insert(conn_id, tx);

        tracing::info!(
            conn_id,
            total_connections = self.connections.len(),
            "WebSocket connection added"
        );
        conn_id
    }

    /// Remove a connection by ID. Called when the socket closes.
    pub fn remove_connection(&self, conn_id: ConnectionId) {
        if self.connections.remove(&conn_id).is_some() {
            tracing::info!(
                conn_id,
                remaining_connections = self.connections.len(),
                "WebSocket connection removed"
            );
        }
    }

    /// Fan a message out to every connected client, fire-and-forget.
    ///
    /// Send failures mean the client already disconnected; the handler
    /// task removes the registration when it notices the closed socket.
    pub fn broadcast(&self, message: &WsMessage) {
        let mut recipients = 0usize;
        for entry in self.connections.iter() {
            if entry.value().send(message.clone()).is_ok() {
                recipients += 1;
            } else {
                tracing::warn!(conn_id = *entry.key(), "Failed to send - client disconnected");
            }
        }
        tracing::debug!(recipients, message = ?message, "Broadcast sent");
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_manager_add_remove() {
        let manager = ConnectionManager::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let conn_id = manager.add_connection(tx);
        assert_eq!(manager.connection_count(), 1);

        manager.remove_connection(conn_id);
        assert_eq!(manager.connection_count(), 0);
    }

    #[test]
    fn test_broadcast_reaches_every_connection() {
        let manager = ConnectionManager::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        manager.add_connection(tx1);
        manager.add_connection(tx2);

        manager.broadcast(&WsMessage::RefreshBalance {
            user_id: "user".to_string(),
        });

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_survives_dead_receiver() {
        let manager = ConnectionManager::new();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        manager.add_connection(tx1);
        manager.add_connection(tx2);
        drop(rx1); // client went away without unregistering yet

        manager.broadcast(&WsMessage::Pong);

        // Live client still receives; registry untouched until the
        // handler task cleans up.
        assert_eq!(rx2.try_recv().unwrap(), WsMessage::Pong);
        assert_eq!(manager.connection_count(), 2);
    }
}
