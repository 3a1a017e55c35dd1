//! Self-removing subscription handles.

use std::fmt;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use tracing::trace;

use crate::registry::{RegistryId, SubscriptionRegistry};

/// Capability of a subscription to remove itself from its registry.
///
/// Anything stored in a [`SubscriptionRegistry`] implements this trait by
/// exposing the [`SubscriptionHandle`] it embeds.
pub trait Subscription: Send + Sync {
    /// The handle carrying this subscription's registry binding.
    fn handle(&self) -> &SubscriptionHandle;

    /// Remove this subscription from the registry that owns it.
    ///
    /// Calling this more than once has no further effect.
    fn remove(&self) {
        self.handle().remove();
    }
}

/// Registry-side removal entry point a handle reaches through its back-reference.
pub(crate) trait SlotRemoval: Send + Sync {
    /// Clear the slot `handle` was bound to, if that slot still holds `handle`.
    fn remove_slot(&self, handle: &SubscriptionHandle) -> bool;
}

/// Non-owning reference from a handle to the registry it was built against.
pub(crate) struct Owner {
    pub(crate) id: RegistryId,
    pub(crate) registry: Weak<dyn SlotRemoval>,
}

/// Event type and slot assigned at registration.
#[derive(Debug)]
pub(crate) struct Binding {
    pub(crate) event_type: String,
    pub(crate) slot_key: usize,
}

/// Where a handle is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionState {
    /// Constructed against a registry but not yet added to it.
    Unregistered,
    /// Holds a slot in its registry.
    Registered,
    /// `remove()` was called; terminal.
    Removed,
}

/// Opaque token returned on registration that can remove itself exactly once.
pub struct SubscriptionHandle {
    owner: Mutex<Option<Owner>>,
    binding: OnceLock<Binding>,
}

impl SubscriptionHandle {
    /// Create a handle bound to `registry`.
    ///
    /// The event type and slot key stay unset until the handle is passed to
    /// [`SubscriptionRegistry::add_subscription`].
    #[must_use]
    pub fn new<S>(registry: &SubscriptionRegistry<S>) -> Self
    where
        S: Subscription + ?Sized + 'static,
    {
        Self {
            owner: Mutex::new(Some(registry.owner())),
            binding: OnceLock::new(),
        }
    }

    /// Remove this handle's slot from its owning registry.
    ///
    /// The back-reference is cleared afterwards, so repeated calls are no-ops.
    /// If the registry has been dropped, or its slot was discarded by a bulk
    /// removal (even if the slot key has since been handed out again), nothing
    /// happens.
    pub fn remove(&self) {
        let Some(owner) = self.lock_owner().take() else {
            trace!(event_type = ?self.event_type(), "Handle already removed");
            return;
        };

        let Some(binding) = self.binding.get() else {
            trace!(registry_id = %owner.id, "Removed handle that was never registered");
            return;
        };

        match owner.registry.upgrade() {
            Some(registry) => {
                registry.remove_slot(self);
            }
            None => {
                trace!(
                    registry_id = %owner.id,
                    event_type = %binding.event_type,
                    "Owning registry dropped before removal"
                );
            }
        }
    }

    /// Event type assigned at registration.
    #[must_use]
    pub fn event_type(&self) -> Option<&str> {
        self.binding.get().map(|b| b.event_type.as_str())
    }

    /// Slot key assigned at registration.
    #[must_use]
    pub fn slot_key(&self) -> Option<usize> {
        self.binding.get().map(|b| b.slot_key)
    }

    /// Identity of the owning registry, `None` once removed.
    #[must_use]
    pub fn owner_id(&self) -> Option<RegistryId> {
        self.lock_owner().as_ref().map(|owner| owner.id)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        if self.lock_owner().is_none() {
            SubscriptionState::Removed
        } else if self.binding.get().is_some() {
            SubscriptionState::Registered
        } else {
            SubscriptionState::Unregistered
        }
    }

    /// Whether the handle holds a slot and has not been removed.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.state() == SubscriptionState::Registered
    }

    /// Whether `remove()` has been called.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.state() == SubscriptionState::Removed
    }

    pub(crate) fn lock_owner(&self) -> MutexGuard<'_, Option<Owner>> {
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn binding(&self) -> Option<&Binding> {
        self.binding.get()
    }

    /// Fix the event type and slot key, or return the binding already in place.
    pub(crate) fn bind(&self, event_type: String, slot_key: usize) -> Result<&Binding, &Binding> {
        let mut fresh = false;
        let binding = self.binding.get_or_init(|| {
            fresh = true;
            Binding {
                event_type,
                slot_key,
            }
        });
        if fresh { Ok(binding) } else { Err(binding) }
    }
}

impl Subscription for SubscriptionHandle {
    fn handle(&self) -> &SubscriptionHandle {
        self
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("state", &self.state())
            .field("owner_id", &self.owner_id())
            .field("event_type", &self.event_type())
            .field("slot_key", &self.slot_key())
            .finish()
    }
}
