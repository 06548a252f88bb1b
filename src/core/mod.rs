//=========================================================================
// Core Systems
//=========================================================================
//
// Internal systems that make up the interactive core:
//
// - `event_bus`: typed publish/subscribe with immediate and deferred
//   delivery, plus the scoped subscription guard
// - `scene`: scene lifecycle, stack scheduling, and transitions
// - `services`: the capability bundle scenes reach collaborators through
// - `input`: platform-independent input messages
//
// Composition: the root constructs one EventBus and one SceneScheduler,
// threads the bus into the scheduler's Services, and drives both from
// the host loop. Teardown is bus-last: scenes release their
// subscriptions before the bus they depend on goes away.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event_bus;
pub mod input;
pub mod scene;
pub mod services;

//=== Public API ==========================================================

pub use event_bus::{BusMetrics, Event, EventBus, EventListener};
pub use input::{InputMessage, KeyCode, MouseButton};
pub use scene::{
    Scene, SceneRegistry, SceneScheduler, SceneState, TransitionKind, TransitionParams,
};
pub use services::Services;
