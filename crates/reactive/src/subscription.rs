//! Subscription management for change notifications.
//!
//! This module provides subscription IDs and an ordered registry of the
//! handlers attached to a notifier.

use rowwatch_diff::ChangeSet;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Unique identifier for a subscription.
///
/// IDs are assigned in increasing order, so ordering by ID is registration order.
pub type SubscriptionId = u64;

/// Callback type for change notifications.
pub type ChangeCallback = Box<dyn Fn(&ChangeSet) + Send + Sync>;

/// A subscription to change notifications.
pub struct Subscription {
    /// Unique identifier
    id: SubscriptionId,
    /// Callback to invoke on changes
    callback: ChangeCallback,
    /// Cleared on unsubscribe; checked before every invocation
    active: AtomicBool,
}

impl Subscription {
    /// Creates a new subscription.
    pub fn new<F>(id: SubscriptionId, callback: F) -> Self
    where
        F: Fn(&ChangeSet) + Send + Sync + 'static,
    {
        Self {
            id,
            callback: Box::new(callback),
            active: AtomicBool::new(true),
        }
    }

    /// Returns the subscription ID.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns whether this subscription is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Deactivates this subscription.
    #[inline]
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Invokes the callback if the subscription is still active.
    ///
    /// Returns whether the callback ran.
    pub fn notify(&self, changes: &ChangeSet) -> bool {
        if self.is_active() {
            (self.callback)(changes);
            true
        } else {
            false
        }
    }
}

/// Ordered registry of subscriptions.
pub struct SubscriptionManager {
    /// Active subscriptions, in registration order
    subscriptions: BTreeMap<SubscriptionId, Arc<Subscription>>,
    /// Next subscription ID to assign
    next_id: SubscriptionId,
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionManager {
    /// Creates a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Subscribes to changes with the given callback.
    ///
    /// Returns the subscription ID that can be used to unsubscribe.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeSet) + Send + Sync + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;

        self.subscriptions
            .insert(id, Arc::new(Subscription::new(id, callback)));

        id
    }

    /// Unsubscribes by ID.
    ///
    /// The subscription is deactivated as well as removed, so a dispatch that
    /// already holds it will skip it. Returns true if it was found.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.subscriptions.remove(&id) {
            Some(sub) => {
                sub.deactivate();
                true
            }
            None => false,
        }
    }

    /// Returns the current subscriptions in registration order.
    ///
    /// The returned list is detached from the registry, so callbacks invoked
    /// from it may freely subscribe or unsubscribe.
    pub fn snapshot(&self) -> Vec<Arc<Subscription>> {
        self.subscriptions.values().cloned().collect()
    }

    /// Returns the number of active subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if there are no subscriptions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Returns all subscription IDs in registration order.
    pub fn subscription_ids(&self) -> Vec<SubscriptionId> {
        self.subscriptions.keys().copied().collect()
    }

    /// Clears all subscriptions.
    pub fn clear(&mut self) {
        for sub in self.subscriptions.values() {
            sub.deactivate();
        }
        self.subscriptions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowwatch_core::row;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn changes() -> ChangeSet {
        ChangeSet::from_rows(vec![row!["1", "a"]])
    }

    #[test]
    fn test_subscription_new() {
        let sub = Subscription::new(1, |_| {});
        assert_eq!(sub.id(), 1);
        assert!(sub.is_active());
    }

    #[test]
    fn test_subscription_notify() {
        let called = Arc::new(AtomicUsize::new(0));
        let called_clone = called.clone();

        let sub = Subscription::new(1, move |cs| {
            called_clone.fetch_add(cs.count(), Ordering::SeqCst);
        });

        assert!(sub.notify(&changes()));
        assert_eq!(called.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_notify_inactive() {
        let called = Arc::new(AtomicUsize::new(0));
        let called_clone = called.clone();

        let sub = Subscription::new(1, move |_| {
            called_clone.fetch_add(1, Ordering::SeqCst);
        });
        sub.deactivate();

        assert!(!sub.notify(&changes()));
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_manager_subscribe() {
        let mut manager = SubscriptionManager::new();

        let id1 = manager.subscribe(|_| {});
        let id2 = manager.subscribe(|_| {});

        assert_eq!(id1, 1);
        assert_eq!(id2, 2);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.subscription_ids(), vec![1, 2]);
    }

    #[test]
    fn test_subscription_manager_unsubscribe() {
        let mut manager = SubscriptionManager::new();

        let id = manager.subscribe(|_| {});
        assert_eq!(manager.len(), 1);

        assert!(manager.unsubscribe(id));
        assert_eq!(manager.len(), 0);

        assert!(!manager.unsubscribe(id)); // Already removed
    }

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let mut manager = SubscriptionManager::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in 0..5u32 {
            let order = order.clone();
            manager.subscribe(move |_| order.lock().unwrap().push(tag));
        }
        // Removing from the middle must not disturb the rest.
        manager.unsubscribe(3);

        for sub in manager.snapshot() {
            sub.notify(&changes());
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_unsubscribe_deactivates_detached_snapshot() {
        let mut manager = SubscriptionManager::new();
        let id = manager.subscribe(|_| {});

        let detached = manager.snapshot();
        manager.unsubscribe(id);

        assert!(!detached[0].is_active());
    }

    #[test]
    fn test_subscription_manager_clear() {
        let mut manager = SubscriptionManager::new();

        manager.subscribe(|_| {});
        manager.subscribe(|_| {});
        let detached = manager.snapshot();

        assert_eq!(manager.len(), 2);
        manager.clear();
        assert!(manager.is_empty());
        assert!(detached.iter().all(|s| !s.is_active()));
    }
}
