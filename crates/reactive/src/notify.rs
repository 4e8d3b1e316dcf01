//! Change notifier.
//!
//! `ChangeNotifier` is the shared front end over a [`SubscriptionManager`]:
//! handlers can be registered from any thread while the polling worker
//! dispatches change sets to them.

use crate::subscription::{SubscriptionId, SubscriptionManager};
use rowwatch_core::Row;
use rowwatch_diff::ChangeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Outcome of one dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Handlers that ran to completion.
    pub delivered: usize,
    /// Handlers that panicked.
    pub failed: Vec<SubscriptionId>,
}

impl Delivery {
    /// Returns true if every invoked handler completed.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A cloneable, thread-safe handle to a set of change handlers.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    subscriptions: Arc<Mutex<SubscriptionManager>>,
}

impl ChangeNotifier {
    /// Creates a notifier with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    // Handlers never run under this lock, so poisoning can only come from a
    // panic inside the registry itself; the registry stays consistent anyway.
    fn registry(&self) -> MutexGuard<'_, SubscriptionManager> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a handler. Returns the ID to unsubscribe with.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeSet) + Send + Sync + 'static,
    {
        let id = self.registry().subscribe(handler);
        debug!(subscription = id, "change handler registered");
        id
    }

    /// Registers a handler taking the change count and the changed rows.
    pub fn subscribe_rows<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(usize, &[Row]) + Send + Sync + 'static,
    {
        self.subscribe(move |changes: &ChangeSet| handler(changes.count(), changes.rows()))
    }

    /// Removes a handler. Returns true if it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.registry().unsubscribe(id);
        if removed {
            debug!(subscription = id, "change handler removed");
        }
        removed
    }

    /// Removes every handler.
    pub fn clear(&self) {
        self.registry().clear();
    }

    /// Returns the number of registered handlers.
    pub fn subscription_count(&self) -> usize {
        self.registry().len()
    }

    /// Delivers `changes` to every handler in registration order.
    ///
    /// Runs on the caller's thread. Each handler is isolated: a panic is
    /// logged and recorded in the returned [`Delivery`], and the remaining
    /// handlers still run. Handlers removed while the dispatch is in progress
    /// are skipped.
    pub fn notify(&self, changes: &ChangeSet) -> Delivery {
        let targets = self.registry().snapshot();
        let mut delivery = Delivery::default();

        for sub in targets {
            match panic::catch_unwind(AssertUnwindSafe(|| sub.notify(changes))) {
                Ok(true) => delivery.delivered += 1,
                Ok(false) => {}
                Err(payload) => {
                    warn!(
                        subscription = sub.id(),
                        reason = panic_message(payload.as_ref()),
                        "change handler panicked"
                    );
                    delivery.failed.push(sub.id());
                }
            }
        }

        delivery
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
