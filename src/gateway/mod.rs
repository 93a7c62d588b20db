//! Persistence gateway contract and strategies.
//!
//! A gateway owns the remote collection for each entity type: one-shot
//! CRUD calls plus a push-based subscription delivering full snapshots.
//! Two strategies exist: [`RemoteGateway`] talks to a sync server over
//! HTTP and WebSocket; [`InMemoryGateway`] keeps everything in process
//! for offline and sample-data scenarios. The store never branches on
//! which one it was given.

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::error::GatewayError;
use crate::models::Entity;

mod memory;
mod remote;

pub use memory::InMemoryGateway;
pub use remote::RemoteGateway;

/// One event on a collection subscription.
#[derive(Debug, Clone)]
pub enum CollectionEvent<E> {
    /// Full snapshot of the user's collection. Always replaces local
    /// state wholesale, never merged.
    Snapshot(Vec<E>),
    /// The subscription failed. Terminal: no further snapshots arrive
    /// until someone re-subscribes.
    Lost(GatewayError),
}

/// Cancels a subscription's upstream exactly once.
///
/// Cancelling is idempotent from the caller's side; the underlying
/// teardown closure runs at most once, whether triggered explicitly or
/// by drop.
pub struct CancelGuard {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl CancelGuard {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A live subscription to one user's collection.
///
/// Explicit handle decoupled from any UI framework's effect-cleanup
/// convention: consume events from `recv`, stop with `cancel` or drop.
pub struct Subscription<E> {
    events: mpsc::UnboundedReceiver<CollectionEvent<E>>,
    cancel: CancelGuard,
}

impl<E> Subscription<E> {
    pub fn new(
        events: mpsc::UnboundedReceiver<CollectionEvent<E>>,
        cancel: CancelGuard,
    ) -> Self {
        Self { events, cancel }
    }

    /// Waits for the next event. Returns `None` once the upstream is
    /// gone (cancelled, or closed after a terminal error).
    pub async fn recv(&mut self) -> Option<CollectionEvent<E>> {
        self.events.recv().await
    }

    pub fn cancel(&mut self) {
        self.cancel.cancel();
    }

    /// Splits the handle so the event loop and the canceller can live
    /// on different tasks.
    pub fn split(self) -> (mpsc::UnboundedReceiver<CollectionEvent<E>>, CancelGuard) {
        (self.events, self.cancel)
    }
}

/// The per-entity persistence contract.
///
/// All calls are scoped to a user id; entities are exclusively owned by
/// a single user. Implementations must deliver a snapshot promptly after
/// `subscribe` so new listeners start from current state.
pub trait EntityGateway<E: Entity>: Send + Sync + 'static {
    /// Creates a record from a draft and returns its assigned id.
    fn create<'a>(
        &'a self,
        user_id: &'a str,
        draft: E::Draft,
    ) -> BoxFuture<'a, Result<String, GatewayError>>;

    /// One-shot read of the full collection.
    fn get_all<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Vec<E>, GatewayError>>;

    /// Applies a partial update to one record.
    fn update<'a>(
        &'a self,
        user_id: &'a str,
        id: &'a str,
        patch: E::Patch,
    ) -> BoxFuture<'a, Result<(), GatewayError>>;

    /// Deletes one record.
    fn delete<'a>(
        &'a self,
        user_id: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), GatewayError>>;

    /// Opens a live snapshot subscription for the user's collection.
    fn subscribe<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, Result<Subscription<E>, GatewayError>>;
}
