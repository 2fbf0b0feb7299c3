//! Explicit callback registration.
//!
//! Every subscription hands back a [`Subscription`] that unregisters the
//! callback when disposed or dropped, so nothing stays wired to a view or a
//! map layer after its owner goes away.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A set of callbacks receiving `&E`.
pub struct CallbackRegistry<E> {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, Callback<E>)>>,
}

impl<E: 'static> CallbackRegistry<E> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            callbacks: Mutex::new(Vec::new()),
        })
    }

    /// Register `callback`; it stays registered until the returned subscription is disposed.
    pub fn subscribe(self: &Arc<Self>, callback: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks.lock().push((id, Arc::new(callback)));

        let registry: Weak<Self> = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.callbacks.lock().retain(|(cid, _)| *cid != id);
            }
        })
    }

    /// Invoke every registered callback.
    ///
    /// Callbacks are cloned out first so a callback may subscribe or dispose
    /// without deadlocking the registry.
    pub fn emit(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = self
            .callbacks
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.lock().is_empty()
    }
}

/// Disposer returned by every registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A subscription with nothing to undo.
    pub fn noop() -> Self {
        Self { dispose: None }
    }

    /// Unsubscribe now. Calling this more than once has no further effect.
    pub fn dispose(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }

    pub fn is_active(&self) -> bool {
        self.dispose.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
