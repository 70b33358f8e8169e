//! Minimal publish/subscribe bus for state-change fan-out.
//!
//! A component exposes an [`EventBus`], callers attach listeners with
//! [`EventBus::subscribe`], and a single publish path delivers to every live
//! listener. Each delivery is isolated: a panicking listener is caught and
//! logged so it cannot break delivery to the others.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tracing::warn;

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Inner<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

pub struct EventBus<E> {
    inner: Arc<Mutex<Inner<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> EventBus<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Attach a listener. Dropping the returned [`Subscription`] (or calling
    /// [`Subscription::unsubscribe`]) detaches it.
    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> Subscription<E> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        Subscription {
            inner: Arc::clone(&self.inner),
            id,
        }
    }

    /// Deliver `event` to every live listener.
    ///
    /// Listeners run outside the bus lock, so a listener may subscribe or
    /// unsubscribe without deadlocking.
    pub fn publish(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = {
            let inner = self.inner.lock().unwrap();
            inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                warn!("event listener panicked; continuing delivery");
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().unwrap().listeners.len()
    }
}

/// Handle keeping one listener attached; detaches on drop.
pub struct Subscription<E> {
    inner: Arc<Mutex<Inner<E>>>,
    id: u64,
}

impl<E> Subscription<E> {
    pub fn unsubscribe(self) {}
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
