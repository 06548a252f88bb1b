//=========================================================================
// Event Bus
//=========================================================================
//
// Typed publish/subscribe for decoupled inter-system communication.
//
// Architecture:
//   EventBus
//     ├─ handlers: RwLock<HashMap<TypeId, Vec<handler>>>   (immediate)
//     └─ deferred: Mutex<Vec<QueuedEvent>>                 (batched)
//
// Flow:
//   publish(&e)        → handlers for e's exact type, in order, now
//   queue(e)           → deferred FIFO, nothing invoked
//   process_events()   → swap queue out, dispatch batch in order
//
// EventListener ties subscription lifetime to its owner's lifetime.
//
//=========================================================================

//=== Module Declarations =================================================

mod bus;
mod listener;

//=== Public API ==========================================================

pub use bus::{BusMetrics, EventBus};
pub use listener::EventListener;

//=== Event Trait =========================================================

/// Marker trait for types that can be dispatched through the [`EventBus`].
///
/// Automatically implemented for all types that are Send + 'static.
/// Dispatch is by exact type: a handler subscribed for `E` only ever
/// receives instances of `E`, never of some related type.
pub trait Event: Send + 'static {}

// Blanket implementation
impl<T: Send + 'static> Event for T {}
