use std::collections::HashMap;

use tracing::trace;

/// Handle returned by [`EventBus::subscribe`]; pass it back to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Callback<E> = Box<dyn FnMut(&E)>;

/// Typed callback registry. Delivery order between subscribers is unspecified.
pub struct EventBus<E> {
    next_id: u64,
    subscribers: HashMap<u64, Callback<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: HashMap::new(),
        }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&E) + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(id, Box::new(callback));
        Subscription(id)
    }

    /// Returns `false` when the handle was already removed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.subscribers.remove(&subscription.0).is_some()
    }

    pub fn publish(&mut self, event: &E) {
        trace!(subscribers = self.subscribers.len(), "publishing event");
        for callback in self.subscribers.values_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
