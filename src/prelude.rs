//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use proscenium::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Runtime facade
pub use crate::{InputPump, PumpMessage, Runtime, RuntimeBuilder};

// Scene system
pub use crate::core::scene::{
    Scene, SceneRegistry, SceneScheduler, SceneState, TransitionKind, TransitionParams,
};

// Event bus
pub use crate::core::event_bus::{BusMetrics, Event, EventBus, EventListener};

// Capability bundle
pub use crate::core::services::{
    AssetHandle, AssetLoader, CameraController, ConfigStore, RenderDevice, Services, UiSurface,
};

// Input messages
pub use crate::core::input::{InputMessage, KeyCode, MouseButton};
