//! Generic live collection store.
//!
//! One store instance mirrors a single user's collection of one entity
//! type: it subscribes to the gateway, replaces its items wholesale on
//! every snapshot, and derives a filtered/sorted view on demand. The
//! same generic is instantiated for ingredients, recipes, meal plans
//! and shopping lists instead of duplicating the pattern per entity.
//!
//! Mutations issue exactly one gateway write and never update items
//! optimistically; the next snapshot from the subscription is
//! authoritative, so there is nothing to roll back. Every mutation
//! returns its own `Result`, and the store keeps the last failure
//! message as a convenience projection for fire-and-forget callers.

use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{GatewayError, StoreError};
use crate::gateway::{CancelGuard, CollectionEvent, EntityGateway};
use crate::models::Entity;

use super::view::{filter_and_sort, FilterSpec, SortKey, SortOptions};

/// Subscription lifecycle of a store.
///
/// A lost subscription stays `Live` with stale or empty data and an
/// error recorded; recovery is manual (re-attach or `load`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Unsubscribed,
    Loading,
    Live,
}

struct Shared<E> {
    items: Vec<E>,
    phase: SyncPhase,
    last_error: Option<String>,
    generation: u64,
}

impl<E> Shared<E> {
    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

struct ViewCache<E, F, K> {
    generation: u64,
    filters: F,
    sort: SortOptions<K>,
    result: Vec<E>,
}

/// Live mirror of one user's collection with derived views.
pub struct CollectionStore<E, G, F, K>
where
    E: Entity,
    G: EntityGateway<E>,
    F: FilterSpec<E>,
    K: SortKey<E>,
{
    gateway: Arc<G>,
    user_id: Option<String>,
    shared: Arc<RwLock<Shared<E>>>,
    filters: F,
    sort: SortOptions<K>,
    changed_tx: watch::Sender<u64>,
    cancel: Option<CancelGuard>,
    task: Option<JoinHandle<()>>,
    view_cache: Mutex<Option<ViewCache<E, F, K>>>,
}

impl<E, G, F, K> CollectionStore<E, G, F, K>
where
    E: Entity,
    G: EntityGateway<E>,
    F: FilterSpec<E>,
    K: SortKey<E>,
{
    pub fn new(gateway: Arc<G>) -> Self {
        let (changed_tx, _) = watch::channel(0);
        Self {
            gateway,
            user_id: None,
            shared: Arc::new(RwLock::new(Shared {
                items: Vec::new(),
                phase: SyncPhase::Unsubscribed,
                last_error: None,
                generation: 0,
            })),
            filters: F::default(),
            sort: SortOptions::default(),
            changed_tx,
            cancel: None,
            task: None,
            view_cache: Mutex::new(None),
        }
    }

    /// Attaches the store to a user and opens the live subscription.
    ///
    /// Replaces any previous attachment: the old subscription is
    /// cancelled and state is reset before the new one starts.
    pub async fn attach(&mut self, user_id: impl Into<String>) -> Result<(), StoreError> {
        let user_id = user_id.into();
        self.detach();
        self.user_id = Some(user_id.clone());

        {
            let mut state = self.lock_write();
            state.phase = SyncPhase::Loading;
            state.last_error = None;
            let generation = state.bump();
            drop(state);
            let _ = self.changed_tx.send(generation);
        }

        tracing::debug!(collection = E::COLLECTION, user = %user_id, "subscribing");
        let subscription = match self.gateway.subscribe(&user_id).await {
            Ok(sub) => sub,
            Err(e) => {
                let err = StoreError::Gateway {
                    action: "load",
                    subject: E::COLLECTION,
                    source: e,
                };
                let mut state = self.lock_write();
                state.phase = SyncPhase::Unsubscribed;
                state.last_error = Some(err.to_string());
                let generation = state.bump();
                drop(state);
                let _ = self.changed_tx.send(generation);
                return Err(err);
            }
        };

        let (mut events, cancel) = subscription.split();
        self.cancel = Some(cancel);

        let shared = self.shared.clone();
        let changed = self.changed_tx.clone();
        self.task = Some(tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let generation = {
                    let mut state = shared.write().expect("store lock poisoned");
                    match event {
                        CollectionEvent::Snapshot(items) => {
                            tracing::debug!(
                                collection = E::COLLECTION,
                                count = items.len(),
                                "snapshot applied"
                            );
                            state.items = items;
                            state.phase = SyncPhase::Live;
                            state.last_error = None;
                        }
                        CollectionEvent::Lost(error) => {
                            tracing::warn!(
                                collection = E::COLLECTION,
                                %error,
                                "subscription lost"
                            );
                            // Stale data stays visible; loading clears.
                            state.phase = SyncPhase::Live;
                            state.last_error = Some(format!(
                                "Failed to load {}: {}",
                                E::COLLECTION,
                                error
                            ));
                        }
                    }
                    state.bump()
                };
                let _ = changed.send(generation);
            }
        }));

        Ok(())
    }

    /// Tears down the subscription (exactly once) and resets to the
    /// unsubscribed state. No further updates can land after this
    /// returns, even from snapshots already in flight.
    pub fn detach(&mut self) {
        if let Some(mut cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if self.user_id.take().is_some() {
            tracing::debug!(collection = E::COLLECTION, "detached");
        }
        let mut state = self.lock_write();
        state.items.clear();
        state.phase = SyncPhase::Unsubscribed;
        state.last_error = None;
        let generation = state.bump();
        drop(state);
        let _ = self.changed_tx.send(generation);
    }

    /// One-shot snapshot fetch replacing items, independent of the live
    /// subscription. Used for pull-to-refresh.
    pub async fn load(&self) -> Result<(), StoreError> {
        let user = self.require_user()?;
        {
            let mut state = self.lock_write();
            state.phase = SyncPhase::Loading;
            let generation = state.bump();
            drop(state);
            let _ = self.changed_tx.send(generation);
        }
        match self.gateway.get_all(&user).await {
            Ok(items) => {
                let mut state = self.lock_write();
                state.items = items;
                state.phase = SyncPhase::Live;
                state.last_error = None;
                let generation = state.bump();
                drop(state);
                let _ = self.changed_tx.send(generation);
                Ok(())
            }
            Err(e) => {
                {
                    let mut state = self.lock_write();
                    state.phase = SyncPhase::Live;
                    drop(state);
                }
                Err(self.fail("load", E::COLLECTION, e))
            }
        }
    }

    pub async fn refresh(&self) -> Result<(), StoreError> {
        self.load().await
    }

    /// Creates a record from a draft. Returns the assigned id; the
    /// in-memory list is updated by the next snapshot, not here.
    pub async fn add(&self, draft: E::Draft) -> Result<String, StoreError> {
        let user = self.require_user()?;
        match self.gateway.create(&user, draft).await {
            Ok(id) => {
                self.clear_error();
                Ok(id)
            }
            Err(e) => Err(self.fail("add", E::NOUN, e)),
        }
    }

    /// Applies a partial update to one record.
    pub async fn update(&self, id: &str, patch: E::Patch) -> Result<(), StoreError> {
        let user = self.require_user()?;
        match self.gateway.update(&user, id, patch).await {
            Ok(()) => {
                self.clear_error();
                Ok(())
            }
            Err(e) => Err(self.fail("update", E::NOUN, e)),
        }
    }

    /// Deletes one record.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let user = self.require_user()?;
        match self.gateway.delete(&user, id).await {
            Ok(()) => {
                self.clear_error();
                Ok(())
            }
            Err(e) => Err(self.fail("delete", E::NOUN, e)),
        }
    }

    /// Raw mirrored items, unfiltered.
    pub fn items(&self) -> Vec<E> {
        self.lock_read().items.clone()
    }

    /// The derived view: filtered conjunctively, stable-sorted.
    /// Memoized on (items generation, filters, sort).
    pub fn filtered_items(&self) -> Vec<E> {
        let state = self.lock_read();
        let mut cache = self.view_cache.lock().expect("view cache poisoned");
        if let Some(cached) = cache.as_ref() {
            if cached.generation == state.generation
                && cached.filters == self.filters
                && cached.sort == self.sort
            {
                return cached.result.clone();
            }
        }
        let result = filter_and_sort(&state.items, &self.filters, &self.sort);
        *cache = Some(ViewCache {
            generation: state.generation,
            filters: self.filters.clone(),
            sort: self.sort,
            result: result.clone(),
        });
        result
    }

    pub fn phase(&self) -> SyncPhase {
        self.lock_read().phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == SyncPhase::Loading
    }

    /// Last-seen error projection. Mutations also return their own
    /// `Result`; this is the shared convenience view of the most recent
    /// failure, cleared by the next success or snapshot.
    pub fn error(&self) -> Option<String> {
        self.lock_read().last_error.clone()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn filters(&self) -> &F {
        &self.filters
    }

    /// Partially edits the filter configuration in place.
    pub fn set_filters(&mut self, edit: impl FnOnce(&mut F)) {
        edit(&mut self.filters);
        self.notify();
    }

    /// Resets every filter dimension to its inactive sentinel.
    pub fn clear_filters(&mut self) {
        self.filters = F::default();
        self.notify();
    }

    pub fn sort_options(&self) -> &SortOptions<K> {
        &self.sort
    }

    pub fn set_sort_options(&mut self, sort: SortOptions<K>) {
        self.sort = sort;
        self.notify();
    }

    /// Change notifications: the watched value increases whenever items,
    /// phase, error, filters or sort change.
    pub fn changed(&self) -> watch::Receiver<u64> {
        self.changed_tx.subscribe()
    }

    pub(crate) fn gateway(&self) -> &G {
        &self.gateway
    }

    pub(crate) fn require_user(&self) -> Result<String, StoreError> {
        match &self.user_id {
            Some(user) => Ok(user.clone()),
            None => {
                let err = StoreError::NotAuthenticated;
                let mut state = self.lock_write();
                state.last_error = Some(err.to_string());
                let generation = state.bump();
                drop(state);
                let _ = self.changed_tx.send(generation);
                Err(err)
            }
        }
    }

    pub(crate) fn fail(
        &self,
        action: &'static str,
        subject: &'static str,
        source: GatewayError,
    ) -> StoreError {
        let err = StoreError::Gateway {
            action,
            subject,
            source,
        };
        tracing::warn!(collection = E::COLLECTION, error = %err, "mutation failed");
        let mut state = self.lock_write();
        state.last_error = Some(err.to_string());
        let generation = state.bump();
        drop(state);
        let _ = self.changed_tx.send(generation);
        err
    }

    pub(crate) fn clear_error(&self) {
        let mut state = self.lock_write();
        if state.last_error.is_some() {
            state.last_error = None;
            let generation = state.bump();
            drop(state);
            let _ = self.changed_tx.send(generation);
        }
    }

    fn notify(&self) {
        let mut state = self.lock_write();
        let generation = state.bump();
        drop(state);
        let _ = self.changed_tx.send(generation);
    }

    fn lock_read(&self) -> std::sync::RwLockReadGuard<'_, Shared<E>> {
        self.shared.read().expect("store lock poisoned")
    }

    fn lock_write(&self) -> std::sync::RwLockWriteGuard<'_, Shared<E>> {
        self.shared.write().expect("store lock poisoned")
    }
}

impl<E, G, F, K> Drop for CollectionStore<E, G, F, K>
where
    E: Entity,
    G: EntityGateway<E>,
    F: FilterSpec<E>,
    K: SortKey<E>,
{
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        // CancelGuard tears the subscription down when it drops.
    }
}
