//! In-memory persistence strategy.
//!
//! Replaces the old ambient "demo mode": the same gateway contract as
//! the remote strategy, but backed by a per-user map in process memory.
//! Mutations apply synchronously and push a fresh snapshot to every
//! live subscriber, so stores behave identically on either strategy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::models::Entity;

use super::{CancelGuard, CollectionEvent, EntityGateway, Subscription};

struct Subscriber<E> {
    id: u64,
    user_id: String,
    tx: mpsc::UnboundedSender<CollectionEvent<E>>,
}

struct Inner<E> {
    collections: HashMap<String, Vec<E>>,
    subscribers: Vec<Subscriber<E>>,
    next_subscriber_id: u64,
}

/// In-memory gateway for one entity type.
///
/// Cloning is cheap; clones share the same underlying state.
pub struct InMemoryGateway<E: Entity> {
    inner: Arc<Mutex<Inner<E>>>,
}

impl<E: Entity> Clone for InMemoryGateway<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: Entity> Default for InMemoryGateway<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryGateway<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                collections: HashMap::new(),
                subscribers: Vec::new(),
                next_subscriber_id: 0,
            })),
        }
    }

    /// Pre-populates a user's collection without notifying subscribers.
    /// Intended for composing offline sample data before stores attach.
    pub fn seed(&self, user_id: impl Into<String>, items: Vec<E>) {
        let mut inner = self.inner.lock().expect("gateway lock poisoned");
        inner.collections.insert(user_id.into(), items);
    }

    /// Number of live subscriptions for a user.
    pub fn subscriber_count(&self, user_id: &str) -> usize {
        let inner = self.inner.lock().expect("gateway lock poisoned");
        inner
            .subscribers
            .iter()
            .filter(|s| s.user_id == user_id)
            .count()
    }

    /// Simulates a backend failure: delivers a terminal error to every
    /// live subscriber for the user and closes their streams.
    pub fn emit_error(&self, user_id: &str, error: GatewayError) {
        let mut inner = self.inner.lock().expect("gateway lock poisoned");
        inner.subscribers.retain(|s| {
            if s.user_id == user_id {
                let _ = s.tx.send(CollectionEvent::Lost(error.clone()));
                false
            } else {
                true
            }
        });
    }

    fn broadcast(inner: &mut Inner<E>, user_id: &str) {
        let snapshot = inner
            .collections
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        inner.subscribers.retain(|s| {
            if s.user_id != user_id {
                return true;
            }
            s.tx.send(CollectionEvent::Snapshot(snapshot.clone())).is_ok()
        });
    }
}

impl<E: Entity> EntityGateway<E> for InMemoryGateway<E> {
    fn create<'a>(
        &'a self,
        user_id: &'a str,
        draft: E::Draft,
    ) -> BoxFuture<'a, Result<String, GatewayError>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().expect("gateway lock poisoned");
            let id = Uuid::new_v4().to_string();
            let entity = E::from_draft(id.clone(), draft);
            inner
                .collections
                .entry(user_id.to_string())
                .or_default()
                .push(entity);
            Self::broadcast(&mut inner, user_id);
            Ok(id)
        })
    }

    fn get_all<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Vec<E>, GatewayError>> {
        Box::pin(async move {
            let inner = self.inner.lock().expect("gateway lock poisoned");
            Ok(inner.collections.get(user_id).cloned().unwrap_or_default())
        })
    }

    fn update<'a>(
        &'a self,
        user_id: &'a str,
        id: &'a str,
        patch: E::Patch,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().expect("gateway lock poisoned");
            let found = inner
                .collections
                .get_mut(user_id)
                .and_then(|items| items.iter_mut().find(|e| e.id() == id))
                .map(|entity| entity.apply_patch(&patch))
                .is_some();
            if !found {
                return Err(GatewayError::NotFound {
                    kind: E::NOUN,
                    id: id.to_string(),
                });
            }
            Self::broadcast(&mut inner, user_id);
            Ok(())
        })
    }

    fn delete<'a>(
        &'a self,
        user_id: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), GatewayError>> {
        Box::pin(async move {
            let mut inner = self.inner.lock().expect("gateway lock poisoned");
            let removed = match inner.collections.get_mut(user_id) {
                Some(items) => {
                    let len_before = items.len();
                    items.retain(|e| e.id() != id);
                    items.len() != len_before
                }
                None => false,
            };
            if !removed {
                return Err(GatewayError::NotFound {
                    kind: E::NOUN,
                    id: id.to_string(),
                });
            }
            Self::broadcast(&mut inner, user_id);
            Ok(())
        })
    }

    fn subscribe<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, Result<Subscription<E>, GatewayError>> {
        Box::pin(async move {
            let (tx, rx) = mpsc::unbounded_channel();
            let subscriber_id;
            {
                let mut inner = self.inner.lock().expect("gateway lock poisoned");
                subscriber_id = inner.next_subscriber_id;
                inner.next_subscriber_id += 1;

                // New listeners start from current state.
                let snapshot = inner
                    .collections
                    .get(user_id)
                    .cloned()
                    .unwrap_or_default();
                let _ = tx.send(CollectionEvent::Snapshot(snapshot));

                inner.subscribers.push(Subscriber {
                    id: subscriber_id,
                    user_id: user_id.to_string(),
                    tx,
                });
            }

            let shared = self.inner.clone();
            let cancel = CancelGuard::new(move || {
                let mut inner = shared.lock().expect("gateway lock poisoned");
                inner.subscribers.retain(|s| s.id != subscriber_id);
            });

            Ok(Subscription::new(rx, cancel))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, IngredientDraft, IngredientPatch};

    #[tokio::test]
    async fn test_create_and_get_all() {
        let gateway: InMemoryGateway<Ingredient> = InMemoryGateway::new();
        let id = gateway
            .create("u1", IngredientDraft::new("flour", 500.0, "g"))
            .await
            .unwrap();

        let items = gateway.get_all("u1").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].name, "flour");

        // Other users see nothing.
        assert!(gateway.get_all("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_id() {
        let gateway: InMemoryGateway<Ingredient> = InMemoryGateway::new();
        let err = gateway
            .update("u1", "nope", IngredientPatch::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no ingredient with id nope"));
    }

    #[tokio::test]
    async fn test_subscription_pushes_snapshots() {
        let gateway: InMemoryGateway<Ingredient> = InMemoryGateway::new();
        let mut sub = gateway.subscribe("u1").await.unwrap();

        // Initial snapshot is empty.
        match sub.recv().await.unwrap() {
            CollectionEvent::Snapshot(items) => assert!(items.is_empty()),
            other => panic!("unexpected event: {:?}", other),
        }

        gateway
            .create("u1", IngredientDraft::new("milk", 1.0, "l"))
            .await
            .unwrap();
        match sub.recv().await.unwrap() {
            CollectionEvent::Snapshot(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].name, "milk");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_removes_subscriber() {
        let gateway: InMemoryGateway<Ingredient> = InMemoryGateway::new();
        let mut sub = gateway.subscribe("u1").await.unwrap();
        assert_eq!(gateway.subscriber_count("u1"), 1);

        sub.cancel();
        assert_eq!(gateway.subscriber_count("u1"), 0);

        // Stream ends after the buffered initial snapshot.
        assert!(matches!(
            sub.recv().await,
            Some(CollectionEvent::Snapshot(_))
        ));
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_emit_error_is_terminal() {
        let gateway: InMemoryGateway<Ingredient> = InMemoryGateway::new();
        let mut sub = gateway.subscribe("u1").await.unwrap();
        let _ = sub.recv().await;

        gateway.emit_error("u1", GatewayError::message("boom"));
        match sub.recv().await.unwrap() {
            CollectionEvent::Lost(err) => assert_eq!(err.to_string(), "boom"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(sub.recv().await.is_none());
        assert_eq!(gateway.subscriber_count("u1"), 0);
    }
}
