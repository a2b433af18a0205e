//! Synchronous observer lists with scoped subscriptions

use std::sync::{Arc, Mutex, Weak};

type Callback<E> = Box<dyn FnMut(&E) + Send>;

struct Registry<E> {
    next_id: u64,
    entries: Vec<(u64, Callback<E>)>,
}

/// A list of callbacks notified in registration order.
///
/// Callbacks run on the caller's thread, inside `notify`, so they must not
/// subscribe to or notify the same list.
pub struct Observers<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E: 'static> Observers<E> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a callback. Delivery stops when the returned guard is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&E) + Send + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Box::new(callback)));

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    lock(&registry).entries.retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    pub fn notify(&self, event: &E) {
        let mut registry = lock(&self.registry);
        for (_, callback) in registry.entries.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

// A panicking observer must not wedge the transcript forever.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Guard returned by `subscribe`; unsubscribes on drop
#[must_use = "dropping the subscription immediately unsubscribes"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Keep the callback registered for as long as the observed list lives
    pub fn detach(mut self) {
        self.release = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_order_until_dropped() {
        let observers: Observers<u32> = Observers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let subscription = observers.subscribe(move |n| sink.lock().unwrap().push(*n));

        observers.notify(&1);
        observers.notify(&2);
        drop(subscription);
        observers.notify(&3);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert!(observers.is_empty());
    }

    #[test]
    fn subscriptions_are_independent() {
        let observers: Observers<&'static str> = Observers::new();
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));

        let a = first.clone();
        let _keep = observers.subscribe(move |_| *a.lock().unwrap() += 1);
        let b = second.clone();
        let dropped = observers.subscribe(move |_| *b.lock().unwrap() += 1);

        observers.notify(&"x");
        drop(dropped);
        observers.notify(&"y");

        assert_eq!(*first.lock().unwrap(), 2);
        assert_eq!(*second.lock().unwrap(), 1);
        assert_eq!(observers.len(), 1);
    }

    #[test]
    fn dropping_after_list_is_gone_is_harmless() {
        let observers: Observers<u8> = Observers::new();
        let subscription = observers.subscribe(|_| {});
        drop(observers);
        drop(subscription);
    }
}
