//! Subscription registry keyed by event type.

use std::collections::HashMap;
use std::fmt;
use std::ptr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::error::{RegistryResult, SubscriptionError};
use crate::handle::{Owner, SlotRemoval, Subscription, SubscriptionHandle};
use crate::slots::Slots;

/// Identity of a registry instance, recorded on every handle built against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryId(Uuid);

impl RegistryId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct RegistryInner<S: ?Sized> {
    id: RegistryId,
    config: RegistryConfig,
    buckets: RwLock<HashMap<String, Slots<S>>>,
}

impl<S: ?Sized> RegistryInner<S> {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Slots<S>>> {
        self.buckets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Slots<S>>> {
        self.buckets.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> SlotRemoval for RegistryInner<S>
where
    S: Subscription + ?Sized,
{
    fn remove_slot(&self, handle: &SubscriptionHandle) -> bool {
        let Some(binding) = handle.binding() else {
            return false;
        };
        let (event_type, slot_key) = (binding.event_type.as_str(), binding.slot_key);

        let removed = {
            let mut buckets = self.write();
            let Some(bucket) = buckets.get_mut(event_type) else {
                trace!(
                    registry = %self.config.name,
                    event_type,
                    slot_key,
                    "No bucket for event type, nothing to remove"
                );
                return false;
            };
            bucket.clear_if(slot_key, |occupant| ptr::eq(occupant.handle(), handle))
        };

        // Dropped outside the lock.
        let cleared = removed.is_some();
        drop(removed);

        if cleared {
            debug!(
                registry = %self.config.name,
                event_type,
                slot_key,
                "Subscription removed"
            );
        } else {
            trace!(
                registry = %self.config.name,
                event_type,
                slot_key,
                "Slot not held by this subscription, nothing to remove"
            );
        }
        cleared
    }
}

/// Registry of subscriptions grouped by event type.
///
/// Each event type maps to a sparse [`Slots`] collection. A subscription's
/// slot key is its position at registration time; removals leave holes and
/// never renumber surviving entries.
///
/// Cloning a registry yields another handle to the same shared state.
pub struct SubscriptionRegistry<S: ?Sized = dyn Subscription> {
    inner: Arc<RegistryInner<S>>,
}

impl<S: ?Sized> Clone for SubscriptionRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Default for SubscriptionRegistry<S>
where
    S: Subscription + ?Sized + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> fmt::Debug for SubscriptionRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buckets = self.inner.read();
        let live: usize = buckets.values().map(Slots::live_count).sum();
        f.debug_struct("SubscriptionRegistry")
            .field("id", &self.inner.id)
            .field("name", &self.inner.config.name)
            .field("event_type_count", &buckets.len())
            .field("subscription_count", &live)
            .finish()
    }
}

impl<S> SubscriptionRegistry<S>
where
    S: Subscription + ?Sized + 'static,
{
    /// Create an empty registry with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with the given configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                id: RegistryId::new(),
                config,
                buckets: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// This registry's identity.
    #[must_use]
    pub fn id(&self) -> RegistryId {
        self.inner.id
    }

    /// The configuration this registry was built with.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    pub(crate) fn owner(&self) -> Owner {
        let inner: Weak<RegistryInner<S>> = Arc::downgrade(&self.inner);
        let registry: Weak<dyn SlotRemoval> = inner;
        Owner {
            id: self.inner.id,
            registry,
        }
    }

    /// Add a subscription under `event_type`.
    ///
    /// The subscription is appended to the event type's bucket and stamped
    /// with its event type and slot key. The same `Arc` is returned.
    ///
    /// # Errors
    ///
    /// - [`SubscriptionError::OwnershipMismatch`] if the subscription was not
    ///   constructed against this registry, or has already been removed.
    /// - [`SubscriptionError::AlreadyRegistered`] if the subscription already
    ///   holds a slot.
    ///
    /// The registry is left untouched when an error is returned.
    pub fn add_subscription(
        &self,
        event_type: impl Into<String>,
        subscription: Arc<S>,
    ) -> RegistryResult<Arc<S>> {
        let event_type = event_type.into();
        let handle = subscription.handle();

        // Held until the slot is stored so a concurrent remove() sees the binding.
        let owner = handle.lock_owner();
        let actual = owner.as_ref().map(|o| o.id);
        if actual != Some(self.inner.id) {
            warn!(
                registry = %self.inner.config.name,
                event_type = %event_type,
                expected = %self.inner.id,
                actual = ?actual,
                "Subscription owner mismatch"
            );
            return Err(SubscriptionError::OwnershipMismatch {
                expected: self.inner.id,
                actual,
            });
        }

        let mut buckets = self.inner.write();
        let slot_key = buckets.get(&event_type).map_or(0, Slots::len);
        if let Err(existing) = handle.bind(event_type.clone(), slot_key) {
            return Err(SubscriptionError::AlreadyRegistered {
                event_type: existing.event_type.clone(),
                slot_key: existing.slot_key,
            });
        }

        let capacity = self.inner.config.slot_capacity;
        buckets
            .entry(event_type)
            .or_insert_with(|| Slots::with_capacity(capacity))
            .push(Arc::clone(&subscription));
        drop(buckets);
        drop(owner);

        debug!(
            registry = %self.inner.config.name,
            event_type = handle.event_type().unwrap_or_default(),
            slot_key,
            "Subscription added"
        );
        Ok(subscription)
    }

    /// Clear the slot held by `subscription`.
    ///
    /// Prefer [`Subscription::remove`]: calling this directly leaves the
    /// handle's back-reference in place. Returns `true` if a live slot was
    /// cleared. A missing bucket, an unregistered handle, or a slot that now
    /// holds a different subscription is a no-op.
    pub fn remove_subscription(&self, subscription: &S) -> bool {
        self.inner.remove_slot(subscription.handle())
    }

    /// Discard subscriptions in bulk.
    ///
    /// With `Some(event_type)` only that type's bucket is dropped; with `None`
    /// every bucket is. Handles of discarded subscriptions keep their
    /// back-reference, and calling `remove()` on them afterwards is a no-op.
    pub fn remove_all_subscriptions(&self, event_type: Option<&str>) {
        let discarded: Vec<Slots<S>> = {
            let mut buckets = self.inner.write();
            match event_type {
                Some(event_type) => buckets.remove(event_type).into_iter().collect(),
                None => buckets.drain().map(|(_, slots)| slots).collect(),
            }
        };

        let count: usize = discarded.iter().map(Slots::live_count).sum();
        debug!(
            registry = %self.inner.config.name,
            event_type = event_type.unwrap_or("*"),
            discarded = count,
            "Subscriptions removed in bulk"
        );
    }

    /// Snapshot of the bucket for `event_type`, or `None` if it has none.
    ///
    /// Entries are the registered `Arc`s themselves and holes keep their
    /// positions, so slot keys index directly into the result. Emitters that
    /// must read the live bucket without copying it should use
    /// [`with_subscriptions_for_type`](Self::with_subscriptions_for_type).
    #[must_use]
    pub fn get_subscriptions_for_type(&self, event_type: &str) -> Option<Slots<S>> {
        self.inner.read().get(event_type).cloned()
    }

    /// Run `f` against the live bucket for `event_type` without copying it.
    ///
    /// The registry's read lock is held while `f` runs, so `f` must not add
    /// or remove subscriptions on this registry.
    pub fn with_subscriptions_for_type<R>(
        &self,
        event_type: &str,
        f: impl FnOnce(Option<&Slots<S>>) -> R,
    ) -> R {
        let buckets = self.inner.read();
        f(buckets.get(event_type))
    }

    /// Event types that currently have a bucket, sorted.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.inner.read().keys().cloned().collect();
        types.sort_unstable();
        types
    }

    /// Number of live subscriptions under `event_type`.
    #[must_use]
    pub fn subscription_count(&self, event_type: &str) -> usize {
        self.inner
            .read()
            .get(event_type)
            .map_or(0, Slots::live_count)
    }

    /// Number of live subscriptions across all event types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().values().map(Slots::live_count).sum()
    }

    /// Whether no live subscription is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
