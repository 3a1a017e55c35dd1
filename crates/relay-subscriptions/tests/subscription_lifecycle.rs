//! End-to-end subscription lifecycle: add, self-removal, bulk removal, lookup.

mod common;

use std::sync::Arc;

use common::{Registry, init_tracing, subscribe};
use relay_subscriptions::{
    ListenerSubscription, RegistryConfig, Subscription, SubscriptionError, SubscriptionHandle,
    SubscriptionRegistry, SubscriptionState,
};

fn live_keys(registry: &Registry, event_type: &str) -> Vec<usize> {
    registry
        .get_subscriptions_for_type(event_type)
        .map(|slots| slots.iter().map(|(key, _)| key).collect())
        .unwrap_or_default()
}

#[test]
fn test_click_scenario() {
    init_tracing();
    let registry = Registry::new();

    let h1 = subscribe(&registry, "click");
    assert_eq!(h1.event_type(), Some("click"));
    assert_eq!(h1.slot_key(), Some(0));

    let h2 = subscribe(&registry, "click");
    assert_eq!(h2.slot_key(), Some(1));

    h1.remove();

    let slots = registry.get_subscriptions_for_type("click").unwrap();
    assert!(slots.is_hole(0));
    assert!(Arc::ptr_eq(slots.get(1).unwrap(), &h2));
    assert_eq!(live_keys(&registry, "click"), vec![1]);

    let h3 = subscribe(&registry, "click");
    assert_eq!(h3.slot_key(), Some(2));
}

#[test]
fn test_slot_keys_count_every_prior_add() {
    init_tracing();
    let registry = Registry::new();

    let handles: Vec<_> = (0..6).map(|_| subscribe(&registry, "tick")).collect();
    for handle in handles.iter().step_by(2) {
        handle.remove();
    }
    let late = subscribe(&registry, "tick");

    for (i, handle) in handles.iter().enumerate() {
        assert_eq!(handle.slot_key(), Some(i));
    }
    assert_eq!(late.slot_key(), Some(6));
    assert_eq!(live_keys(&registry, "tick"), vec![1, 3, 5, 6]);
}

#[test]
fn test_remove_leaves_other_subscriptions() {
    init_tracing();
    let registry = Registry::new();
    let a = subscribe(&registry, "click");
    let b = subscribe(&registry, "click");
    let c = subscribe(&registry, "click");

    b.remove();

    let slots = registry.get_subscriptions_for_type("click").unwrap();
    assert!(Arc::ptr_eq(slots.get(0).unwrap(), &a));
    assert!(slots.get(1).is_none());
    assert!(Arc::ptr_eq(slots.get(2).unwrap(), &c));
    assert!(a.is_registered());
    assert!(c.is_registered());
}

#[test]
fn test_double_remove_is_idempotent() {
    init_tracing();
    let registry = Registry::new();
    let a = subscribe(&registry, "click");
    let b = subscribe(&registry, "click");

    a.remove();
    let after_first = live_keys(&registry, "click");
    a.remove();

    assert_eq!(live_keys(&registry, "click"), after_first);
    assert_eq!(a.state(), SubscriptionState::Removed);
    assert!(b.is_registered());
}

#[test]
fn test_bulk_removal_scoped_to_type() {
    init_tracing();
    let registry = Registry::new();
    subscribe(&registry, "A");
    subscribe(&registry, "A");
    let b1 = subscribe(&registry, "B");
    let b2 = subscribe(&registry, "B");

    registry.remove_all_subscriptions(Some("A"));

    assert!(registry.get_subscriptions_for_type("A").is_none());
    let b_slots = registry.get_subscriptions_for_type("B").unwrap();
    assert!(Arc::ptr_eq(b_slots.get(0).unwrap(), &b1));
    assert!(Arc::ptr_eq(b_slots.get(1).unwrap(), &b2));
}

#[test]
fn test_global_reset() {
    init_tracing();
    let registry = Registry::new();
    let orphans = [
        subscribe(&registry, "A"),
        subscribe(&registry, "B"),
        subscribe(&registry, "C"),
    ];

    registry.remove_all_subscriptions(None);

    for event_type in ["A", "B", "C"] {
        assert!(registry.get_subscriptions_for_type(event_type).is_none());
    }

    // Orphaned handles keep their binding; removing them is a harmless no-op.
    for handle in &orphans {
        assert!(handle.is_registered());
        handle.remove();
        assert!(handle.is_removed());
    }
    assert!(registry.is_empty());
}

#[test]
fn test_stale_handle_after_reset_keeps_new_subscription() {
    init_tracing();
    for scope in [Some("click"), None] {
        let registry = Registry::new();
        let stale = subscribe(&registry, "click");

        registry.remove_all_subscriptions(scope);
        let fresh = subscribe(&registry, "click");
        assert_eq!(fresh.slot_key(), stale.slot_key());

        stale.remove();

        assert!(stale.is_removed());
        assert!(fresh.is_registered());
        assert_eq!(registry.subscription_count("click"), 1);
        let slots = registry.get_subscriptions_for_type("click").unwrap();
        assert!(Arc::ptr_eq(slots.get(0).unwrap(), &fresh));

        // The stale handle must not have consumed the fresh one's removal.
        fresh.remove();
        assert_eq!(registry.subscription_count("click"), 0);
    }
}

#[test]
fn test_foreign_handle_rejected_without_mutation() {
    init_tracing();
    let r1 = Registry::new();
    let r2 = Registry::new();
    subscribe(&r2, "click");
    let before = r2.get_subscriptions_for_type("click").unwrap().len();

    let handle = Arc::new(SubscriptionHandle::new(&r1));
    let err = r2.add_subscription("click", handle).unwrap_err();

    assert!(matches!(err, SubscriptionError::OwnershipMismatch { .. }));
    assert_eq!(r2.get_subscriptions_for_type("click").unwrap().len(), before);

    // A fresh type must not get an empty bucket either.
    let handle = Arc::new(SubscriptionHandle::new(&r1));
    assert!(r2.add_subscription("scroll", handle).is_err());
    assert!(r2.get_subscriptions_for_type("scroll").is_none());
}

#[test]
fn test_unknown_type_lookup_is_absent() {
    let registry = Registry::new();
    assert!(registry.get_subscriptions_for_type("never").is_none());
    assert_eq!(registry.subscription_count("never"), 0);
}

#[test]
fn test_emitter_dispatch_over_dyn_registry() {
    init_tracing();
    let registry: SubscriptionRegistry =
        SubscriptionRegistry::with_config(RegistryConfig::new("emitter"));

    let plain = registry
        .add_subscription("load", Arc::new(SubscriptionHandle::new(&registry)))
        .unwrap();
    let listener = Arc::new(ListenerSubscription::new(
        &registry,
        |payload: &str| payload.len(),
        Some(7_u32),
    ));
    registry
        .add_subscription("load", Arc::clone(&listener) as Arc<dyn Subscription>)
        .unwrap();

    plain.remove();

    let slots = registry.get_subscriptions_for_type("load").unwrap();
    let keys: Vec<usize> = slots.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec![1]);
    assert_eq!((listener.listener())("hello"), 5);
    assert_eq!(listener.context(), Some(&7));
    assert_eq!(registry.event_types(), vec!["load".to_owned()]);
}
