//=========================================================================
// Scene Transitions
//=========================================================================
//
// Timed replacement of the active scene stack.
//
// A transition is requested alongside a scene switch; the scheduler
// holds the already-initialized target until the duration elapses, then
// replaces the stack in one step. At most one transition is in flight;
// starting another force-completes the current one first.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

//=== Internal Dependencies ===============================================

use super::Scene;

//=== Transition Kind =====================================================

/// Compositing policy applied while a transition is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// No transition; the switch applies instantly.
    None,

    /// Outgoing scene fades out, target fades in after the swap.
    Fade,

    /// Outgoing scene slides off, target slides in after the swap.
    Slide,

    /// Outgoing scene and held target render together while blending.
    CrossFade,

    /// Caller-defined; progress is reported through the callback only.
    Custom,
}

impl Default for TransitionKind {
    fn default() -> Self {
        Self::None
    }
}

//=== Transition Params ===================================================

/// Per-tick progress observer, called with progress in `[0, 1]`.
pub type ProgressCallback = Box<dyn FnMut(f32) + Send>;

/// Describes the transition a scene switch should run.
///
/// A `None` kind or non-positive duration makes the switch instant.
///
/// # Example
///
/// ```
/// # use proscenium::core::scene::{TransitionKind, TransitionParams};
/// let instant = TransitionParams::none();
/// assert!(instant.is_instant());
///
/// let fade = TransitionParams::fade(0.5);
/// assert!(!fade.is_instant());
/// assert_eq!(fade.kind, TransitionKind::Fade);
/// ```
#[derive(Default)]
pub struct TransitionParams {
    pub kind: TransitionKind,
    pub duration: f32,
    pub on_progress: Option<ProgressCallback>,
}

impl TransitionParams {
    /// An instant switch; no transition runs.
    pub fn none() -> Self {
        Self::default()
    }

    /// A fade over `duration` seconds.
    pub fn fade(duration: f32) -> Self {
        Self::timed(TransitionKind::Fade, duration)
    }

    /// A slide over `duration` seconds.
    pub fn slide(duration: f32) -> Self {
        Self::timed(TransitionKind::Slide, duration)
    }

    /// A cross-fade over `duration` seconds; outgoing and target scenes
    /// both render while it runs.
    pub fn cross_fade(duration: f32) -> Self {
        Self::timed(TransitionKind::CrossFade, duration)
    }

    /// A caller-defined transition over `duration` seconds.
    pub fn custom(duration: f32) -> Self {
        Self::timed(TransitionKind::Custom, duration)
    }

    fn timed(kind: TransitionKind, duration: f32) -> Self {
        Self {
            kind,
            duration,
            on_progress: None,
        }
    }

    /// Attaches a per-tick progress observer.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(f32) + Send + 'static,
    {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// True when these parameters describe an instant switch.
    pub fn is_instant(&self) -> bool {
        matches!(self.kind, TransitionKind::None) || self.duration <= 0.0
    }
}

impl fmt::Debug for TransitionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionParams")
            .field("kind", &self.kind)
            .field("duration", &self.duration)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

//=== Active Transition ===================================================

/// An in-flight transition owned by the scheduler.
///
/// Holds the already-initialized target scene until completion; the
/// stack replacement itself is deferred to the tick on which `elapsed`
/// reaches `duration`.
pub(super) struct ActiveTransition {
    pub kind: TransitionKind,
    pub duration: f32,
    pub elapsed: f32,
    /// Name of the top scene when the transition started, if any.
    pub from: Option<String>,
    pub to: String,
    pub on_progress: Option<ProgressCallback>,
    pub target: Box<dyn Scene>,
}

impl ActiveTransition {
    /// Advances the clock and reports clamped progress for this tick.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        let progress = self.progress();
        if let Some(callback) = self.on_progress.as_mut() {
            callback(progress);
        }
        progress
    }

    /// Elapsed fraction of the duration, clamped to `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// True once the full duration has elapsed.
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}

//=========================================================================
// Tests
//=========================================================================
