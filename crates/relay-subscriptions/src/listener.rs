//! Subscriptions that carry a listener for the emitter to invoke.

use std::fmt;

use crate::handle::{Subscription, SubscriptionHandle};
use crate::registry::SubscriptionRegistry;

/// A subscription holding a listener and an optional invocation context.
///
/// The registry never calls the listener; it only stores the subscription so
/// an emitter can fetch it with
/// [`SubscriptionRegistry::get_subscriptions_for_type`] and dispatch.
pub struct ListenerSubscription<L, C = ()> {
    handle: SubscriptionHandle,
    listener: L,
    context: Option<C>,
}

impl<L, C> ListenerSubscription<L, C>
where
    L: Send + Sync,
    C: Send + Sync,
{
    /// Create a listener subscription bound to `registry`.
    #[must_use]
    pub fn new<S>(registry: &SubscriptionRegistry<S>, listener: L, context: Option<C>) -> Self
    where
        S: Subscription + ?Sized + 'static,
    {
        Self {
            handle: SubscriptionHandle::new(registry),
            listener,
            context,
        }
    }

    /// The registered listener.
    #[must_use]
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// The context to pass when invoking the listener.
    #[must_use]
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }
}

impl<L, C> Subscription for ListenerSubscription<L, C>
where
    L: Send + Sync,
    C: Send + Sync,
{
    fn handle(&self) -> &SubscriptionHandle {
        &self.handle
    }
}

impl<L, C> fmt::Debug for ListenerSubscription<L, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSubscription")
            .field("handle", &self.handle)
            .field("has_context", &self.context.is_some())
            .finish_non_exhaustive()
    }
}
