//! Sparse, index-addressed subscription storage.
//!
//! Removal clears a slot in place instead of shifting later entries, so the
//! key handed out at registration stays valid for every surviving entry.

use std::fmt;
use std::sync::Arc;

/// The ordered, holed collection of subscriptions for one event type.
pub struct Slots<S: ?Sized> {
    entries: Vec<Option<Arc<S>>>,
}

impl<S: ?Sized> Slots<S> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a subscription and return the key of its slot.
    pub(crate) fn push(&mut self, subscription: Arc<S>) -> usize {
        let key = self.entries.len();
        self.entries.push(Some(subscription));
        key
    }

    /// Clear the slot at `key` if its occupant satisfies `matches`, leaving a hole.
    pub(crate) fn clear_if(
        &mut self,
        key: usize,
        matches: impl FnOnce(&Arc<S>) -> bool,
    ) -> Option<Arc<S>> {
        let slot = self.entries.get_mut(key)?;
        if slot.as_ref().is_some_and(matches) {
            slot.take()
        } else {
            None
        }
    }

    /// Number of slots ever handed out, holes included.
    ///
    /// This is also the key the next registration will receive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no slot has been handed out yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of slots still holding a subscription.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|slot| slot.is_some()).count()
    }

    /// Subscription stored at `key`, if the slot exists and is not a hole.
    #[must_use]
    pub fn get(&self, key: usize) -> Option<&Arc<S>> {
        self.entries.get(key).and_then(Option::as_ref)
    }

    /// Whether `key` was handed out and has since been cleared.
    #[must_use]
    pub fn is_hole(&self, key: usize) -> bool {
        matches!(self.entries.get(key), Some(None))
    }

    /// Live subscriptions with their slot keys, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Arc<S>)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(key, slot)| slot.as_ref().map(|sub| (key, sub)))
    }

    /// Every slot, holes included.
    pub fn iter_slots(&self) -> impl Iterator<Item = Option<&Arc<S>>> {
        self.entries.iter().map(Option::as_ref)
    }
}

impl<S: ?Sized> Clone for Slots<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for Slots<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slots")
            .field("len", &self.len())
            .field("live", &self.live_count())
            .finish()
    }
}
