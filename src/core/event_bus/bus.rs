//=========================================================================
// Event Bus
//=========================================================================
//
// Type-keyed publish/subscribe with immediate and deferred delivery.
//
// The handler table follows a read-many/write-one discipline: publishes
// take a read lock, subscribe/unsubscribe take the write lock. The
// deferred queue sits behind its own mutex, held only long enough to
// swap the whole queue out, so handlers invoked during a drain may
// freely publish or queue again.
//
// Pattern: subscribe → publish (immediate) / queue → process_events
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use log::{debug, error};

//=== Internal Dependencies ===============================================

use super::Event;

//=== Handler Storage =====================================================

/// Type-erased handler closure.
///
/// Handlers are stored behind `Arc` so dispatch can clone them out of the
/// table and invoke them without holding the table lock. A handler that
/// publishes or subscribes re-entrantly therefore cannot deadlock.
type ErasedHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Per-kind handler list, insertion order = invocation order.
struct KindEntry {
    /// Payload type name, kept for diagnostics and fault logs.
    kind_name: &'static str,
    handlers: Vec<ErasedHandler>,
}

/// A deferred event awaiting the next drain.
struct QueuedEvent {
    kind: TypeId,
    kind_name: &'static str,
    payload: Box<dyn Any + Send>,
}

//=== Metrics =============================================================

/// Monotonic dispatch counters, updated on every bus operation.
#[derive(Default)]
struct BusCounters {
    published: AtomicU64,
    delivered: AtomicU64,
    queued: AtomicU64,
    drained: AtomicU64,
    unhandled: AtomicU64,
    handler_faults: AtomicU64,
}

/// Point-in-time snapshot of the bus dispatch counters.
///
/// `unhandled` counts publishes and drains that found no handler for the
/// event's kind; such dispatches are documented no-ops, but they are
/// still recorded here. `handler_faults` counts handlers that panicked
/// and were contained at the dispatch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusMetrics {
    pub published: u64,
    pub delivered: u64,
    pub queued: u64,
    pub drained: u64,
    pub unhandled: u64,
    pub handler_faults: u64,
}

//=== Event Bus ===========================================================

/// Typed publish/subscribe bus with immediate and deferred delivery.
///
/// Events are keyed by their concrete type. Handlers subscribed for a
/// type are invoked in subscription order, on the thread that called
/// [`publish`](EventBus::publish) or
/// [`process_events`](EventBus::process_events).
///
/// A panicking handler is caught at the dispatch boundary, logged, and
/// counted; the remaining handlers for that dispatch still run and the
/// publisher never observes the panic.
pub struct EventBus {
    handlers: RwLock<HashMap<TypeId, KindEntry>>,
    deferred: Mutex<Vec<QueuedEvent>>,
    counters: BusCounters,
}

impl EventBus {
    /// Creates a new bus with no handlers and an empty deferred queue.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            deferred: Mutex::new(Vec::new()),
            counters: BusCounters::default(),
        }
    }

    //--- Subscription -----------------------------------------------------

    /// Registers `handler` for events of type `E`.
    ///
    /// Handlers for a kind are invoked in subscription order. Subscribing
    /// takes the table's write lock; publishes for other kinds proceed
    /// concurrently under read locks.
    pub fn subscribe<E, F>(&self, handler: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let erased: ErasedHandler = Arc::new(move |payload: &dyn Any| {
            if let Some(event) = payload.downcast_ref::<E>() {
                handler(event);
            }
        });

        // Lock poisoning is recoverable here: handlers run outside the
        // lock, so a poisoned guard never protects partial state.
        let mut table = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        table
            .entry(TypeId::of::<E>())
            .or_insert_with(|| KindEntry {
                kind_name: type_name::<E>(),
                handlers: Vec::new(),
            })
            .handlers
            .push(erased);
    }

    /// Removes **all** handlers registered for type `E`.
    ///
    /// Removal is per kind, not per handler: every handler subscribed for
    /// `E` goes away in one call. Callers sharing one event type across
    /// unrelated listeners must accept this coarse granularity.
    pub fn unsubscribe<E: Event>(&self) {
        self.unsubscribe_kind(TypeId::of::<E>());
    }

    /// Removes all handlers for the given kind id.
    ///
    /// Untyped variant of [`unsubscribe`](EventBus::unsubscribe), used by
    /// [`EventListener`](super::EventListener) teardown which records kind
    /// ids rather than types. Unknown kinds are a no-op.
    pub fn unsubscribe_kind(&self, kind: TypeId) {
        let mut table = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = table.remove(&kind) {
            debug!(
                "Unsubscribed {} handler(s) for {}",
                entry.handlers.len(),
                entry.kind_name
            );
        }
    }

    //--- Immediate Delivery -----------------------------------------------

    /// Delivers `event` to every handler for its type, synchronously.
    ///
    /// Handlers run in subscription order on the calling thread, before
    /// this method returns. Publishing with no handlers registered is a
    /// no-op, still counted in [`metrics`](EventBus::metrics).
    pub fn publish<E: Event>(&self, event: &E) {
        self.counters.published.fetch_add(1, Ordering::Relaxed);

        let handlers = self.handlers_for(TypeId::of::<E>());
        if handlers.is_empty() {
            self.counters.unhandled.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.dispatch(&handlers, event, type_name::<E>());
    }

    //--- Deferred Delivery ------------------------------------------------

    /// Takes ownership of `event` and appends it to the deferred queue.
    ///
    /// Returns immediately; no handler is invoked until the next
    /// [`process_events`](EventBus::process_events) call.
    pub fn queue<E: Event>(&self, event: E) {
        self.counters.queued.fetch_add(1, Ordering::Relaxed);

        let item = QueuedEvent {
            kind: TypeId::of::<E>(),
            kind_name: type_name::<E>(),
            payload: Box::new(event),
        };

        let mut queue = self.deferred.lock().unwrap_or_else(|e| e.into_inner());
        queue.push(item);
    }

    /// Drains the deferred queue and dispatches every item in enqueue order.
    ///
    /// The whole queue is swapped out under the lock first, then dispatched
    /// with no lock held: events queued by handlers *during* the drain land
    /// in the next batch, and re-entrant `publish` calls execute
    /// immediately as usual.
    pub fn process_events(&self) {
        let batch = {
            let mut queue = self.deferred.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *queue)
        };

        for item in batch {
            self.counters.drained.fetch_add(1, Ordering::Relaxed);

            let handlers = self.handlers_for(item.kind);
            if handlers.is_empty() {
                self.counters.unhandled.fetch_add(1, Ordering::Relaxed);
                continue;
            }

            self.dispatch(&handlers, &*item.payload, item.kind_name);
        }
    }

    //--- Maintenance ------------------------------------------------------

    /// Drops all handlers and all pending queued events.
    pub fn clear(&self) {
        let mut table = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        let kinds = table.len();
        table.clear();
        drop(table);

        let mut queue = self.deferred.lock().unwrap_or_else(|e| e.into_inner());
        let pending = queue.len();
        queue.clear();

        debug!("Bus cleared ({} kinds, {} pending events)", kinds, pending);
    }

    //--- Query API --------------------------------------------------------

    /// Returns the number of handlers registered for type `E`.
    pub fn handler_count<E: Event>(&self) -> usize {
        let table = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        table
            .get(&TypeId::of::<E>())
            .map(|entry| entry.handlers.len())
            .unwrap_or(0)
    }

    /// Returns true if any handler is registered for type `E`.
    pub fn has_handlers<E: Event>(&self) -> bool {
        self.handler_count::<E>() > 0
    }

    /// Returns the number of events awaiting the next drain.
    pub fn pending_events(&self) -> usize {
        let queue = self.deferred.lock().unwrap_or_else(|e| e.into_inner());
        queue.len()
    }

    /// Returns a snapshot of the dispatch counters.
    pub fn metrics(&self) -> BusMetrics {
        BusMetrics {
            published: self.counters.published.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            queued: self.counters.queued.load(Ordering::Relaxed),
            drained: self.counters.drained.load(Ordering::Relaxed),
            unhandled: self.counters.unhandled.load(Ordering::Relaxed),
            handler_faults: self.counters.handler_faults.load(Ordering::Relaxed),
        }
    }

    //--- Internal Helpers -------------------------------------------------

    /// Clones the handler list for a kind out of the table.
    ///
    /// The read guard is dropped before returning, so dispatch never holds
    /// the table lock while handlers run.
    fn handlers_for(&self, kind: TypeId) -> Vec<ErasedHandler> {
        let table = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        table
            .get(&kind)
            .map(|entry| entry.handlers.clone())
            .unwrap_or_default()
    }

    /// Invokes each handler, containing panics at the dispatch boundary.
    fn dispatch(&self, handlers: &[ErasedHandler], payload: &dyn Any, kind_name: &str) {
        for handler in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(payload))) {
                Ok(()) => {
                    self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(_) => {
                    self.counters.handler_faults.fetch_add(1, Ordering::Relaxed);
                    error!(
                        "Handler for {} panicked; remaining handlers still run",
                        kind_name
                    );
                }
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
