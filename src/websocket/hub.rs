//! Connection Hub
//!
//! Tracks open WebSocket connections and fans generation events out to all
//! of them. Events go through a `broadcast` channel so the solver thread can
//! publish without touching the async runtime.

use super::messages::ServerMessage;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, RwLock};

pub type ConnectionId = String;

#[derive(Debug, Clone)]
pub struct HubConfig {
    pub max_connections: usize,
    /// Events buffered per slow receiver before it starts lagging
    pub broadcast_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 256,
            broadcast_capacity: 512,
        }
    }
}

struct ConnectionHandle {
    sender: mpsc::UnboundedSender<ServerMessage>,
}

pub struct ConnectionHub {
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
    broadcast_tx: broadcast::Sender<ServerMessage>,
    config: HubConfig,
}

impl ConnectionHub {
    pub fn new(config: HubConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Self {
            connections: RwLock::new(HashMap::new()),
            broadcast_tx,
            config,
        }
    }

    /// Register a connection's direct channel and return its id
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = uuid::Uuid::new_v4().to_string();
        connections.insert(id.clone(), ConnectionHandle { sender });
        tracing::debug!(connection_id = %id, total = connections.len(), "WebSocket connection registered");
        Ok(id)
    }

    pub async fn unregister(&self, id: &str) {
        let mut connections = self.connections.write().await;
        if connections.remove(id).is_some() {
            tracing::debug!(connection_id = %id, total = connections.len(), "WebSocket connection closed");
        }
    }

    /// Publish an event to every connection.
    ///
    /// Safe to call from blocking threads. Returns the number of receivers;
    /// zero when nobody is listening.
    pub fn publish(&self, message: ServerMessage) -> usize {
        self.broadcast_tx.send(message).unwrap_or(0)
    }

    /// Receiver for published events, one per connection
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.broadcast_tx.subscribe()
    }

    /// Send a message to a single connection
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        let handle = connections.get(id).ok_or(HubError::ConnectionNotFound)?;
        handle.sender.send(message).map_err(|_| HubError::SendFailed)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(hub.connection_count().await, 1);

        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let hub = ConnectionHub::new(HubConfig {
            max_connections: 1,
            broadcast_capacity: 8,
        });
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        hub.register(tx1).await.unwrap();
        assert!(matches!(hub.register(tx2).await, Err(HubError::TooManyConnections(1))));
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let hub = ConnectionHub::new(HubConfig::default());
        assert_eq!(hub.publish(ServerMessage::Pong), 0);

        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        assert_eq!(hub.publish(ServerMessage::Pong), 2);

        assert!(matches!(first.recv().await.unwrap(), ServerMessage::Pong));
        assert!(matches!(second.recv().await.unwrap(), ServerMessage::Pong));
    }

    #[tokio::test]
    async fn test_send_to() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();

        hub.send_to(&id, ServerMessage::Pong).await.unwrap();
        assert!(matches!(rx.recv().await.unwrap(), ServerMessage::Pong));

        assert!(matches!(
            hub.send_to("missing", ServerMessage::Pong).await,
            Err(HubError::ConnectionNotFound)
        ));
    }
}
