//! Error types for the gateway and store layers.

use thiserror::Error;

/// Errors surfaced by a persistence gateway.
///
/// Gateway errors are message-shaped: the store wraps them with a fixed
/// English prefix per operation before exposing them to consumers.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Plain message from the backing store.
    #[error("{0}")]
    Message(String),

    /// Could not reach the server.
    #[error("connection error: {0}")]
    Connection(String),

    /// Server answered with a non-success status.
    #[error("server returned status {0}")]
    Status(u16),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// WebSocket transport failure on the snapshot stream.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// No record with the given id in the user's collection.
    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: String },
}

impl GatewayError {
    pub fn message(msg: impl Into<String>) -> Self {
        GatewayError::Message(msg.into())
    }
}

/// Errors returned by collection store operations.
///
/// Every mutation returns one of these per call; the store additionally
/// keeps the formatted message in its shared `error` projection so
/// fire-and-forget callers can still observe the last failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A mutation was attempted without an attached user.
    #[error("User not authenticated")]
    NotAuthenticated,

    /// A gateway call failed. Display matches the store's error
    /// projection, e.g. "Failed to add ingredient: ...".
    #[error("Failed to {action} {subject}: {source}")]
    Gateway {
        action: &'static str,
        subject: &'static str,
        source: GatewayError,
    },

    /// A store extension could not find the record it was asked to edit.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}
