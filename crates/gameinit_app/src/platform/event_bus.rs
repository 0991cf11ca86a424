//! Publish/subscribe for connection-state events.
//!
//! Publishers may live on any thread. Each subscriber gets its own queue and
//! drains it on the UI thread, so delivery order per subscriber is the
//! publish order.
use std::collections::BTreeMap;
use std::sync::{mpsc, Arc, Mutex, Weak};

use engine_logging::engine_debug;
use gameinit_core::ConnectionEvent;

struct Subscribers<E> {
    next_id: u64,
    senders: BTreeMap<u64, mpsc::Sender<E>>,
}

pub struct EventBus<E> {
    inner: Arc<Mutex<Subscribers<E>>>,
}

pub type ConnectionBus = EventBus<ConnectionEvent>;

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Subscribers {
                next_id: 1,
                senders: BTreeMap::new(),
            })),
        }
    }
}

impl<E: Clone + Send + 'static> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription<E> {
        let (tx, rx) = mpsc::channel();
        let mut guard = self.lock();
        let id = guard.next_id;
        guard.next_id += 1;
        guard.senders.insert(id, tx);
        engine_debug!("bus subscriber {} added", id);
        Subscription {
            id,
            rx,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every live subscriber and returns how many got it.
    pub fn publish(&self, event: E) -> usize {
        let mut guard = self.lock();
        guard
            .senders
            .retain(|_, tx| tx.send(event.clone()).is_ok());
        guard.senders.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().senders.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Subscribers<E>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Receiving end of a bus subscription. Dropping it unsubscribes.
pub struct Subscription<E> {
    id: u64,
    rx: mpsc::Receiver<E>,
    bus: Weak<Mutex<Subscribers<E>>>,
}

impl<E> Subscription<E> {
    pub fn try_recv(&self) -> Option<E> {
        self.rx.try_recv().ok()
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            let mut guard = bus.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.senders.remove(&self.id);
            engine_debug!("bus subscriber {} removed", self.id);
        }
    }
}
