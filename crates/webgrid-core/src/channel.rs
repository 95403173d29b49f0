//! Typed, synchronous event channels.
//!
//! A [`Channel<T>`] holds any number of subscriber callbacks for one payload
//! type. Firing calls every subscriber on the caller's thread, in subscription
//! order, with the same payload reference.
//!
//! # Re-entrancy
//!
//! Subscriber lists are copy-on-write. `fire` works on the snapshot taken when
//! it starts, so:
//!
//! - a subscriber added during a fire is first called by the next fire,
//! - a subscriber removed during a fire still receives the current one,
//! - callbacks may subscribe, unsubscribe or fire other channels freely.
//!
//! # Failures
//!
//! The first subscriber returning `Err` stops the fire. Remaining subscribers
//! are skipped and the failure is returned to the caller as
//! [`ChannelError::SubscriberFailed`]. Nothing is retried.
//!
//! # Example
//!
//! ```
//! use webgrid_core::Channel;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let clicks = Channel::<usize>::new("rowClicked");
//! let seen = Arc::new(AtomicUsize::new(0));
//! let sink = Arc::clone(&seen);
//! let id = clicks.subscribe(move |row: &usize| {
//!     sink.store(*row, Ordering::SeqCst);
//!     Ok(())
//! });
//!
//! assert_eq!(clicks.fire(&7).unwrap(), 1);
//! assert_eq!(seen.load(Ordering::SeqCst), 7);
//! assert!(clicks.unsubscribe(id));
//! assert_eq!(clicks.fire(&8).unwrap(), 0);
//! ```

use crate::error::ChannelError;
use parking_lot::RwLock;
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Boxed error returned by failing subscribers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by subscriber callbacks.
pub type HandlerResult = Result<(), BoxError>;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type Entries<F> = Arc<Vec<(SubscriptionId, Arc<F>)>>;

/// Ordered, copy-on-write subscriber list.
///
/// This is the storage behind [`Channel`]; it is public so channels with a
/// different callback shape (for example one taking `&mut` payloads) can
/// share the same ordering and failure policy.
pub struct Subscribers<F: ?Sized> {
    next_id: AtomicU64,
    entries: RwLock<Entries<F>>,
}

impl<F: ?Sized> Subscribers<F> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Append a callback; it runs after every callback already present.
    pub fn insert(&self, callback: Arc<F>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.write();
        Arc::make_mut(&mut *entries).push((id, callback));
        id
    }

    /// Remove a callback. Returns false if the id is unknown.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        let Some(pos) = entries.iter().position(|(entry, _)| *entry == id) else {
            return false;
        };
        Arc::make_mut(&mut *entries).remove(pos);
        true
    }

    pub fn clear(&self) {
        *self.entries.write() = Arc::new(Vec::new());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Current subscribers in firing order.
    #[must_use]
    pub fn snapshot(&self) -> Entries<F> {
        Arc::clone(&*self.entries.read())
    }

    /// Call `invoke` for each subscriber of the current snapshot, in order.
    ///
    /// Stops at the first failure. Returns how many subscribers ran.
    pub fn dispatch<C>(&self, channel: &str, mut invoke: C) -> Result<usize, ChannelError>
    where
        C: FnMut(&F) -> HandlerResult,
    {
        // The read guard is released here, before any callback runs.
        let snapshot = self.snapshot();
        for (id, callback) in snapshot.iter() {
            if let Err(source) = invoke(callback) {
                tracing::debug!(channel, subscription = %id, error = %source, "subscriber failed");
                return Err(ChannelError::SubscriberFailed {
                    channel: channel.to_string(),
                    subscription: *id,
                    source,
                });
            }
        }
        Ok(snapshot.len())
    }
}

impl<F: ?Sized> Default for Subscribers<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> fmt::Debug for Subscribers<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

type Handler<T> = dyn Fn(&T) -> HandlerResult + Send + Sync;

/// A named, typed publish/subscribe slot.
pub struct Channel<T: ?Sized> {
    name: Cow<'static, str>,
    subscribers: Subscribers<Handler<T>>,
}

impl<T: ?Sized> Channel<T> {
    /// Create a channel with no subscribers.
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            subscribers: Subscribers::new(),
        }
    }

    /// Channel name, used in errors and logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a callback to run on every subsequent fire.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribers.insert(Arc::new(callback))
    }

    /// Remove a callback. Returns false if it was not subscribed here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    /// Remove all callbacks.
    pub fn clear(&self) {
        self.subscribers.clear();
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Invoke every subscriber with `payload`.
    ///
    /// Returns the number of subscribers invoked, or the first failure.
    pub fn fire(&self, payload: &T) -> Result<usize, ChannelError> {
        tracing::trace!(channel = %self.name, subscribers = self.subscribers.len(), "fire");
        self.subscribers.dispatch(&self.name, |callback| callback(payload))
    }
}

impl<T: ?Sized> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use proptest::prelude::*;

    type Log = Arc<Mutex<Vec<String>>>;

    fn push_to(log: &Log, channel: &Channel<u32>, tag: &'static str) -> SubscriptionId {
        let log = Arc::clone(log);
        channel.subscribe(move |v: &u32| {
            log.lock().push(format!("{tag}{v}"));
            Ok(())
        })
    }

    // ===== Subscribe / Fire Tests =====

    #[test]
    fn test_fire_without_subscribers_is_noop() {
        let channel = Channel::<u32>::new("empty");
        assert!(channel.is_empty());
        assert_eq!(channel.fire(&1).unwrap(), 0);
    }

    #[test]
    fn test_fire_in_subscription_order() {
        let channel = Channel::<u32>::new("ordered");
        let log = Log::default();
        for tag in ["a", "b", "c"] {
            push_to(&log, &channel, tag);
        }

        assert_eq!(channel.fire(&1).unwrap(), 3);
        assert_eq!(*log.lock(), vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn test_unsubscribe_excludes_later_fires_only() {
        let channel = Channel::<u32>::new("unsub");
        let log = Log::default();
        let a = push_to(&log, &channel, "a");
        push_to(&log, &channel, "b");

        channel.fire(&1).unwrap();
        assert!(channel.unsubscribe(a));
        assert!(!channel.unsubscribe(a));
        channel.fire(&2).unwrap();

        assert_eq!(*log.lock(), vec!["a1", "b1", "b2"]);
        assert_eq!(channel.subscriber_count(), 1);
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        let channel = Channel::<()>::new("ids");
        let a = channel.subscribe(|()| Ok(()));
        let b = channel.subscribe(|()| Ok(()));
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn test_clear_drops_all() {
        let channel = Channel::<()>::new("clear");
        channel.subscribe(|()| Ok(()));
        channel.subscribe(|()| Ok(()));
        channel.clear();
        assert_eq!(channel.fire(&()).unwrap(), 0);
    }

    // ===== Failure Policy Tests =====

    #[test]
    fn test_failure_stops_remaining_subscribers() {
        let channel = Channel::<u32>::new("failing");
        let log = Log::default();
        push_to(&log, &channel, "first");
        let failing = channel.subscribe(|_: &u32| Err("nope".into()));
        push_to(&log, &channel, "last");

        let err = channel.fire(&0).unwrap_err();
        let ChannelError::SubscriberFailed {
            channel: name,
            subscription,
            source,
        } = err;
        assert_eq!(name, "failing");
        assert_eq!(subscription, failing);
        assert_eq!(source.to_string(), "nope");
        assert_eq!(*log.lock(), vec!["first0"]);
    }

    // ===== Re-entrancy Tests =====

    #[test]
    fn test_subscribe_during_fire_runs_next_time() {
        let channel = Arc::new(Channel::<u32>::new("reentrant"));
        let hits = Arc::new(Mutex::new(0u32));
        let inner_channel = Arc::downgrade(&channel);
        let inner_hits = Arc::clone(&hits);
        channel.subscribe(move |_: &u32| {
            if let Some(channel) = inner_channel.upgrade() {
                let hits = Arc::clone(&inner_hits);
                channel.subscribe(move |_: &u32| {
                    *hits.lock() += 1;
                    Ok(())
                });
            }
            Ok(())
        });

        assert_eq!(channel.fire(&0).unwrap(), 1);
        assert_eq!(*hits.lock(), 0);
        assert_eq!(channel.fire(&0).unwrap(), 2);
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_unsubscribe_during_fire_keeps_current_snapshot() {
        let channel = Arc::new(Channel::<u32>::new("self-removing"));
        let calls = Arc::new(Mutex::new(0u32));
        let victim_calls = Arc::clone(&calls);
        let slot = Arc::new(Mutex::new(None::<SubscriptionId>));

        let remover_channel = Arc::downgrade(&channel);
        let remover_slot = Arc::clone(&slot);
        channel.subscribe(move |_: &u32| {
            if let (Some(channel), Some(id)) = (remover_channel.upgrade(), *remover_slot.lock()) {
                channel.unsubscribe(id);
            }
            Ok(())
        });
        let victim = channel.subscribe(move |_: &u32| {
            *victim_calls.lock() += 1;
            Ok(())
        });
        *slot.lock() = Some(victim);

        channel.fire(&0).unwrap();
        channel.fire(&0).unwrap();
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn test_channel_debug() {
        let channel = Channel::<u8>::new("dbg");
        channel.subscribe(|_: &u8| Ok(()));
        let debug = format!("{channel:?}");
        assert!(debug.contains("dbg"));
        assert!(debug.contains("subscribers: 1"));
    }

    // ===== Property Tests =====

    proptest! {
        #[test]
        fn prop_all_subscribers_called_in_order(n in 0usize..24, payload in any::<i64>()) {
            let channel = Channel::<i64>::new("prop");
            let log = Arc::new(Mutex::new(Vec::new()));
            for i in 0..n {
                let log = Arc::clone(&log);
                channel.subscribe(move |v: &i64| {
                    log.lock().push((i, *v));
                    Ok(())
                });
            }
            prop_assert_eq!(channel.fire(&payload).unwrap(), n);
            let expected: Vec<(usize, i64)> = (0..n).map(|i| (i, payload)).collect();
            prop_assert_eq!(&*log.lock(), &expected);
        }
    }
}
