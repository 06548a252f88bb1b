//=========================================================================
// Event Listener
//=========================================================================
//
// Scoped subscription guard for event bus listeners.
//
// An owner composes an EventListener to subscribe through it; the guard
// records every kind it subscribed and releases them together when the
// owner goes away. Release is idempotent and safe with no bus attached.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{Event, EventBus};

//=== Event Listener ======================================================

/// Ties subscription lifetime to the owning component's lifetime.
///
/// Every kind subscribed via [`listen_to`](EventListener::listen_to) is
/// recorded; [`release`](EventListener::release) (or drop) unsubscribes
/// exactly those kinds and leaves handlers other components registered
/// for different kinds untouched. Note that unsubscription is per kind:
/// releasing a guard removes *all* handlers for each recorded kind,
/// including any a different owner registered for the same kind.
///
/// # Example
///
/// ```
/// # use std::sync::Arc;
/// # use proscenium::core::event_bus::{EventBus, EventListener};
/// struct Pause;
///
/// let bus = Arc::new(EventBus::new());
/// let mut listener = EventListener::attached(Arc::clone(&bus));
/// listener.listen_to::<Pause, _>(|_| { /* react */ });
///
/// drop(listener); // unsubscribes Pause
/// assert!(!bus.has_handlers::<Pause>());
/// ```
pub struct EventListener {
    bus: Option<Arc<EventBus>>,
    kinds: HashSet<TypeId>,
}

impl EventListener {
    //--- Construction -----------------------------------------------------

    /// Creates a guard with no bus attached.
    ///
    /// All operations are no-ops until [`attach`](EventListener::attach)
    /// is called.
    pub fn detached() -> Self {
        Self {
            bus: None,
            kinds: HashSet::new(),
        }
    }

    /// Creates a guard attached to `bus`.
    pub fn attached(bus: Arc<EventBus>) -> Self {
        Self {
            bus: Some(bus),
            kinds: HashSet::new(),
        }
    }

    /// Attaches the guard to `bus`, releasing any prior subscriptions first.
    pub fn attach(&mut self, bus: Arc<EventBus>) {
        self.release();
        self.bus = Some(bus);
    }

    /// Returns the attached bus, if any.
    pub fn bus(&self) -> Option<&Arc<EventBus>> {
        self.bus.as_ref()
    }

    //--- Subscription Proxies ---------------------------------------------

    /// Subscribes `handler` for type `E` and records the kind for release.
    pub fn listen_to<E, F>(&mut self, handler: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        match self.bus.as_ref() {
            Some(bus) => {
                bus.subscribe::<E, F>(handler);
                self.kinds.insert(TypeId::of::<E>());
            }
            None => warn!("listen_to called on a detached listener; handler dropped"),
        }
    }

    /// Unsubscribes all handlers for type `E` and forgets the kind.
    pub fn stop_listening<E: Event>(&mut self) {
        if self.kinds.remove(&TypeId::of::<E>()) {
            if let Some(bus) = self.bus.as_ref() {
                bus.unsubscribe::<E>();
            }
        }
    }

    //--- Emission Proxies -------------------------------------------------

    /// Publishes `event` immediately through the attached bus.
    ///
    /// No-op when detached.
    pub fn emit<E: Event>(&self, event: &E) {
        if let Some(bus) = self.bus.as_ref() {
            bus.publish(event);
        }
    }

    /// Queues `event` for deferred delivery through the attached bus.
    ///
    /// No-op when detached.
    pub fn emit_queued<E: Event>(&self, event: E) {
        if let Some(bus) = self.bus.as_ref() {
            bus.queue(event);
        }
    }

    //--- Teardown ---------------------------------------------------------

    /// Unsubscribes every recorded kind and detaches from the bus.
    ///
    /// Idempotent: calling with nothing recorded, or with no bus attached,
    /// is a documented no-op.
    pub fn release(&mut self) {
        if let Some(bus) = self.bus.take() {
            if !self.kinds.is_empty() {
                debug!("Releasing {} subscribed kind(s)", self.kinds.len());
            }
            for kind in self.kinds.drain() {
                bus.unsubscribe_kind(kind);
            }
        }
        self.kinds.clear();
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.release();
    }
}

//=========================================================================
// Tests
//=========================================================================
