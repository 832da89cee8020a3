//! Cancellable event emitter.
//!
//! Listeners are registered per event kind and invoked in registration
//! order. A listener returning [`EventFlow::Cancel`] stops the remaining
//! listeners and tells the emitter to abort the action.

use std::sync::Arc;
use std::sync::RwLock;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Outcome returned by a listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventFlow {
    /// Keep going.
    #[default]
    Continue,
    /// Abort the action and skip the remaining listeners.
    Cancel,
}

impl EventFlow {
    /// Whether the action was cancelled.
    pub fn is_cancelled(self) -> bool {
        self == EventFlow::Cancel
    }
}

/// Events that can be routed by kind.
pub trait Event {
    /// Discriminant used for listener registration.
    type Kind: Copy + Eq + Send + Sync + 'static;

    /// Kind of this event.
    fn kind(&self) -> Self::Kind;
}

/// Handle returned by [`Emitter::on`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Arc<dyn Fn(&E) -> EventFlow + Send + Sync>;

/// Ordered listener list keyed by event kind.
pub struct Emitter<E: Event> {
    listeners: RwLock<Vec<(ListenerId, E::Kind, Listener<E>)>>,
    next_id: AtomicU64,
}

impl<E: Event> Emitter<E> {
    /// Creates an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers a listener for one event kind.
    pub fn on<F>(&self, kind: E::Kind, listener: F) -> ListenerId
    where
        F: Fn(&E) -> EventFlow + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        if let Ok(mut guard) = self.listeners.write() {
            guard.push((id, kind, Arc::new(listener)));
        }
        id
    }

    /// Removes a listener. Returns `true` if it was registered.
    pub fn off(&self, id: ListenerId) -> bool {
        self.listeners
            .write()
            .map(|mut guard| {
                let before = guard.len();
                guard.retain(|(listener_id, _, _)| *listener_id != id);
                guard.len() != before
            })
            .unwrap_or(false)
    }

    /// Invokes every listener for the event's kind.
    ///
    /// Listeners run without the registry lock held, so they may register
    /// or remove listeners themselves.
    pub fn emit(&self, event: &E) -> EventFlow {
        let kind = event.kind();
        let matching: Vec<Listener<E>> = self
            .listeners
            .read()
            .map(|guard| {
                guard
                    .iter()
                    .filter(|(_, k, _)| *k == kind)
                    .map(|(_, _, listener)| Arc::clone(listener))
                    .collect()
            })
            .unwrap_or_default();

        for listener in matching {
            if listener(event).is_cancelled() {
                return EventFlow::Cancel;
            }
        }
        EventFlow::Continue
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.read().map(|g| g.len()).unwrap_or(0)
    }

    /// Returns `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Event> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> std::fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter").field("listeners", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[derive(Debug)]
    enum Ping {
        A,
        B,
    }

    impl Event for Ping {
        type Kind = u8;

        fn kind(&self) -> u8 {
            match self {
                Ping::A => 0,
                Ping::B => 1,
            }
        }
    }

    #[test]
    fn test_cancel_short_circuits() {
        let emitter = Emitter::<Ping>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        emitter.on(0, |_| EventFlow::Cancel);
        emitter.on(0, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            EventFlow::Continue
        });

        assert_eq!(emitter.emit(&Ping::A), EventFlow::Cancel);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(emitter.emit(&Ping::B), EventFlow::Continue);
    }

    #[test]
    fn test_off_removes_listener() {
        let emitter = Emitter::<Ping>::new();
        let id = emitter.on(1, |_| EventFlow::Cancel);
        assert!(emitter.off(id));
        assert!(!emitter.off(id));
        assert_eq!(emitter.emit(&Ping::B), EventFlow::Continue);
    }
}
