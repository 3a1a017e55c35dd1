//! Shared helpers for integration tests.

use std::sync::Arc;

use relay_subscriptions::{SubscriptionHandle, SubscriptionRegistry};
use tracing_subscriber::EnvFilter;

pub type Registry = SubscriptionRegistry<SubscriptionHandle>;

/// Route registry logs to the test writer. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Build a handle against `registry` and add it under `event_type`.
pub fn subscribe(registry: &Registry, event_type: &str) -> Arc<SubscriptionHandle> {
    registry
        .add_subscription(event_type, Arc::new(SubscriptionHandle::new(registry)))
        .unwrap()
}
