//=========================================================================
// Scene System
//=========================================================================
//
// Scene lifecycle and stack-based scene scheduling.
//
// Architecture:
//   SceneScheduler
//     ├─ registry: SceneRegistry (name → factory)
//     ├─ stack: Vec<StackEntry>  (owned scenes, last = top)
//     └─ transition: Option<ActiveTransition>
//
// Flow:
//   update(dt) → transition bookkeeping | per-entry Scene::update
//   render()   → visible span, bottom to top
//   handle_input(msg) → top to bottom until consumed or opaque
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::InputMessage;
use crate::core::services::Services;

//=== Module Declarations =================================================

mod registry;
mod scheduler;
mod transition;

//=== Public API ==========================================================

pub use registry::{SceneFactory, SceneRegistry};
pub use scheduler::SceneScheduler;
pub use transition::{TransitionKind, TransitionParams};

//=== Scene State =========================================================

/// Lifecycle state of a scheduled scene.
///
/// The scheduler is the single writer: state advances as the scheduler
/// drives the scene through construction, activation, pause cycles, and
/// teardown. `update`/`render` are only invoked while Running or Paused
/// (render also while Paused); input only while Running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// Constructed, `initialize` not yet called.
    Uninitialized,

    /// `initialize` in progress.
    Initializing,

    /// On the stack and receiving updates.
    Running,

    /// On the stack beneath a newer scene; updates suspended.
    Paused,

    /// Initialized and held by an in-flight transition, not yet entered.
    Transitioning,

    /// `cleanup` in progress; the scene is about to be destroyed.
    Cleanup,
}

//=== Scene Trait =========================================================

/// A named, polymorphic unit of interactive behavior.
///
/// Scenes are constructed by a factory registered in the
/// [`SceneRegistry`], initialized exactly once against the capability
/// bundle, then driven by the [`SceneScheduler`] until `cleanup` runs
/// exactly once before destruction.
///
/// # Minimal Implementation
///
/// Only `name()` and `update()` are required. Lifecycle hooks default to
/// empty and `is_transparent` defaults to opaque:
///
/// ```
/// # use proscenium::core::scene::Scene;
/// struct TitleScreen;
///
/// impl Scene for TitleScreen {
///     fn name(&self) -> &str {
///         "Title"
///     }
///
///     fn update(&mut self, _dt: f32) {
///         // per-tick behavior
///     }
/// }
/// ```
pub trait Scene: Send {
    /// Immutable string identity, fixed at construction.
    fn name(&self) -> &str;

    /// Acquires required capabilities from `services`.
    ///
    /// Called exactly once, before the scene first enters a stack.
    /// Returning `false` aborts the operation that constructed the scene;
    /// a scene must return `false` for any capability it requires that
    /// `services` reports absent. The default implementation requires
    /// nothing and succeeds.
    fn initialize(&mut self, _services: &Services) -> bool {
        true
    }

    /// Called every tick while on the stack and not paused.
    fn update(&mut self, dt: f32);

    /// Draws the scene. Invoked while Running or Paused, bottom of the
    /// visible span first.
    fn render(&mut self) {}

    /// Releases everything acquired in `initialize`, including all
    /// capability references. Called exactly once, while the capability
    /// bundle is still valid, before the scene is destroyed.
    fn cleanup(&mut self) {}

    /// Called when the scene becomes part of the active stack.
    fn on_enter(&mut self) {}

    /// Called when the scene leaves the active stack.
    fn on_exit(&mut self) {}

    /// Called when a newer scene is pushed on top of this one.
    fn on_pause(&mut self) {}

    /// Called when this scene becomes the top again after a pop.
    fn on_resume(&mut self) {}

    /// Offers an input message to the scene.
    ///
    /// Returning `true` consumes the message; scenes further down the
    /// stack will not see it. The default implementation consumes
    /// nothing.
    fn handle_input(&mut self, _msg: &InputMessage) -> bool {
        false
    }

    /// Whether scenes beneath this one remain visible and reachable by
    /// input. Transparent scenes (pause overlays, dialogs) compose over
    /// the scene below; opaque scenes end the visible span. Fixed at
    /// construction.
    fn is_transparent(&self) -> bool {
        false
    }
}
