//! rowwatch reactive - change notification.
//!
//! Delivers each non-empty `ChangeSet` to every registered handler,
//! synchronously and in registration order.
//!
//! - `SubscriptionManager`: ordered registry of handlers keyed by `SubscriptionId`
//! - `ChangeNotifier`: thread-safe front end that dispatches outside the registry lock
//!   and isolates handler panics
//!
//! # Example
//!
//! ```rust
//! use rowwatch_core::row;
//! use rowwatch_diff::ChangeSet;
//! use rowwatch_reactive::ChangeNotifier;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let notifier = ChangeNotifier::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let seen_clone = seen.clone();
//!
//! notifier.subscribe_rows(move |count, _rows| {
//!     seen_clone.fetch_add(count, Ordering::SeqCst);
//! });
//!
//! notifier.notify(&ChangeSet::from_rows(vec![row!["3", "c"]]));
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

pub mod notify;
pub mod subscription;

pub use notify::{ChangeNotifier, Delivery};
pub use subscription::{ChangeCallback, Subscription, SubscriptionId, SubscriptionManager};

// Re-export commonly used types from dependencies
pub use rowwatch_core::Row;
pub use rowwatch_diff::ChangeSet;
