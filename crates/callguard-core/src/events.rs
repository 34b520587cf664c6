//! Event system shared by all callguard components.
//!
//! Each component defines its own event enum, implements [`GuardEvent`] for
//! it, and fans events out through an [`EventListeners`] collection owned by
//! its configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// An observable occurrence inside a callguard component.
pub trait GuardEvent: Send + Sync + fmt::Debug {
    /// Short, stable name of the event kind (e.g. `"permitted"`, `"circuit_opened"`).
    fn event_type(&self) -> &'static str;

    /// When the event happened.
    fn timestamp(&self) -> Instant;

    /// Name of the component instance that emitted the event.
    fn source(&self) -> &str;

    /// The logical key the event concerns, if any.
    fn key(&self) -> Option<&str> {
        None
    }
}

/// Receives events of type `E`.
pub trait EventListener<E: GuardEvent>: Send + Sync {
    /// Called synchronously on the emitting task.
    fn on_event(&self, event: &E);
}

/// Ordered set of listeners for one event type.
#[derive(Clone)]
pub struct EventListeners<E: GuardEvent> {
    listeners: Vec<Arc<dyn EventListener<E>>>,
}

impl<E: GuardEvent> EventListeners<E> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers a listener. Listeners are called in registration order.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Delivers `event` to every listener.
    ///
    /// A panicking listener is isolated: the panic is caught and delivery
    /// continues with the next listener.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: GuardEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: GuardEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// Adapts a closure into an [`EventListener`].
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _event: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _event: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: GuardEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}
