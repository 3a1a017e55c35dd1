//! Relay Subscriptions - Subscription bookkeeping for event emitters.
//!
//! This crate provides:
//! - A registry mapping event types to the subscriptions registered under them
//! - Handles that remove their own subscription without knowing the registry layout
//! - Listener subscriptions carrying the callback and context an emitter dispatches
//!
//! # Architecture
//!
//! A [`SubscriptionRegistry`] stores one sparse [`Slots`] collection per event
//! type. Adding a subscription appends it and stamps its handle with the event
//! type and slot key. Removing it clears the slot and leaves a hole, so slot
//! keys of surviving subscriptions never change.
//!
//! Handles hold a non-owning reference back to their registry. Calling
//! [`Subscription::remove`] clears the slot once; later calls do nothing.
//!
//! Firing events and invoking listeners is left to the emitter built on top.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use relay_subscriptions::{ListenerSubscription, Subscription, SubscriptionRegistry};
//!
//! type Listener = fn(&str);
//!
//! # fn main() -> Result<(), relay_subscriptions::SubscriptionError> {
//! let registry = SubscriptionRegistry::<ListenerSubscription<Listener>>::new();
//!
//! let on_click: Listener = |event| println!("{event}");
//! let sub = registry.add_subscription(
//!     "click",
//!     Arc::new(ListenerSubscription::new(&registry, on_click, None)),
//! )?;
//! assert_eq!(sub.handle().slot_key(), Some(0));
//!
//! // An emitter fetches the listeners for a fired event, skipping holes.
//! if let Some(slots) = registry.get_subscriptions_for_type("click") {
//!     for (_, sub) in slots.iter() {
//!         (sub.listener())("click");
//!     }
//! }
//!
//! sub.remove();
//! assert_eq!(registry.subscription_count("click"), 0);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod config;
mod error;
mod handle;
mod listener;
mod registry;
mod slots;

pub use config::RegistryConfig;
pub use error::{RegistryResult, SubscriptionError};
pub use handle::{Subscription, SubscriptionHandle, SubscriptionState};
pub use listener::ListenerSubscription;
pub use registry::{RegistryId, SubscriptionRegistry};
pub use slots::Slots;
