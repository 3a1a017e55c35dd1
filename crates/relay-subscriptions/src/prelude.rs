//! Prelude module - commonly used types for convenient import.
//!
//! Use `use relay_subscriptions::prelude::*;` to import all essential types.

// Registry
pub use crate::{RegistryConfig, RegistryId, Slots, SubscriptionRegistry};

// Subscriptions
pub use crate::{ListenerSubscription, Subscription, SubscriptionHandle, SubscriptionState};

// Errors
pub use crate::{RegistryResult, SubscriptionError};
