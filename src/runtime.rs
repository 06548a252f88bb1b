//=========================================================================
// Runtime
//
// Host loop facade driving the scheduler and the event bus.
//
// Architecture:
// ```text
//     RuntimeBuilder ──build()──> (Runtime, InputPump)
//          │                          │
//          ├─ with_tps()              └─ run(): per tick
//          └─ with_channel_capacity()      1. drain input pump
//                                          2. scheduler.update(dt)
//                                          3. bus.process_events()
//                                          4. scheduler.render()
// ```
//
// The windowing layer stays outside this crate: whoever pumps the OS
// feeds InputMessages through the InputPump handle, one per message.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::core::event_bus::EventBus;
use crate::core::input::InputMessage;
use crate::core::scene::SceneScheduler;

//=== Pump Messages =======================================================

/// Messages the host's input pump feeds into the runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PumpMessage {
    /// A single input message for the scene stack.
    Input(InputMessage),

    /// Stop the runtime loop at the next tick boundary.
    Shutdown,
}

//=== Tick Control ========================================================
//
// Control flow for the runtime loop. Each tick's input drain signals
// either to continue or terminate the loop.
//
enum TickControl {
    Continue,
    Exit,
}

//=== Input Pump ==========================================================

/// Cloneable, thread-safe handle feeding input into the runtime.
///
/// Each module that produces input holds its own pump; cloning is cheap.
/// Dropping every pump disconnects the channel and stops the runtime, so
/// keep at least one alive for as long as the loop should run.
#[derive(Clone)]
pub struct InputPump {
    sender: Sender<PumpMessage>,
}

impl InputPump {
    /// Sends one input message; returns false once the runtime is gone.
    pub fn send_input(&self, msg: InputMessage) -> bool {
        self.sender.send(PumpMessage::Input(msg)).is_ok()
    }

    /// Asks the runtime to stop at the next tick boundary.
    pub fn shutdown(&self) {
        let _ = self.sender.send(PumpMessage::Shutdown);
    }
}

//=== RuntimeBuilder ======================================================

/// Builder for configuring and constructing a [`Runtime`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (ticks per second)
/// - **Channel capacity**: 128 pump messages
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use proscenium::core::event_bus::EventBus;
/// use proscenium::core::scene::{Scene, SceneScheduler};
/// use proscenium::core::services::Services;
/// use proscenium::RuntimeBuilder;
///
/// struct Game;
/// impl Scene for Game {
///     fn name(&self) -> &str { "Game" }
///     fn update(&mut self, _dt: f32) {}
/// }
///
/// let bus = Arc::new(EventBus::new());
/// let services = Services::new().with_event_bus(Arc::clone(&bus));
///
/// let mut scheduler = SceneScheduler::new(services);
/// scheduler.register_scene("Game", || Box::new(Game));
/// scheduler.load_scene("Game");
///
/// let (runtime, pump) = RuntimeBuilder::new()
///     .with_tps(120.0)
///     .build(scheduler, bus);
///
/// // Hand `pump` to the windowing layer, then block here:
/// runtime.run();
/// # drop(pump);
/// ```
pub struct RuntimeBuilder {
    tps: f64,
    channel_capacity: usize,
}

impl RuntimeBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
        }
    }

    /// Sets the target ticks per second for the loop.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the input pump channel capacity.
    ///
    /// Larger values buffer more input during frame spikes; smaller
    /// values reduce latency but may block fast producers.
    ///
    /// Default: 128
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Builds the runtime around an already-composed scheduler and bus.
    ///
    /// The scheduler arrives fully configured by the composition root
    /// (scenes registered, initial scene loaded); the returned
    /// [`InputPump`] is the handle the windowing layer feeds.
    pub fn build(self, scheduler: SceneScheduler, bus: Arc<EventBus>) -> (Runtime, InputPump) {
        info!(
            "Building runtime (TPS: {}, channel: {})",
            self.tps, self.channel_capacity
        );

        let (tx, rx) = bounded(self.channel_capacity);

        let runtime = Runtime {
            scheduler,
            bus,
            tps: self.tps,
            receiver: rx,
        };
        (runtime, InputPump { sender: tx })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Runtime =============================================================

/// Fixed-timestep host loop over one scheduler and one event bus.
///
/// Each tick: drain the input pump (one `handle_input` per message),
/// advance the scheduler, drain the bus's deferred events, render. The
/// loop exits on [`PumpMessage::Shutdown`], on pump disconnect, or when
/// the scene stack empties; teardown then runs bus-last so scenes
/// release subscriptions before the bus goes away.
pub struct Runtime {
    scheduler: SceneScheduler,
    bus: Arc<EventBus>,
    tps: f64,
    receiver: Receiver<PumpMessage>,
}

impl Runtime {
    //--- Execution --------------------------------------------------------

    /// Runs the loop on the calling thread until shutdown.
    pub fn run(mut self) {
        info!("Runtime started (TPS: {})", self.tps);

        let tick = Duration::from_secs_f64(1.0 / self.tps);
        let dt = tick.as_secs_f32();

        loop {
            let tick_start = Instant::now();

            //--- 1. Input --------------------------------------------------
            if let TickControl::Exit = self.drain_input() {
                info!("Runtime loop exiting");
                break;
            }

            //--- 2. Simulation ---------------------------------------------
            self.scheduler.update(dt);

            //--- 3. Deferred events ----------------------------------------
            self.bus.process_events();

            //--- 4. Presentation -------------------------------------------
            self.scheduler.render();

            if self.scheduler.is_empty() && !self.scheduler.in_transition() {
                info!("Scene stack empty; runtime stopping");
                break;
            }

            //--- 5. Pacing -------------------------------------------------
            let elapsed = tick_start.elapsed();
            if elapsed < tick {
                thread::sleep(tick - elapsed);
            }
        }

        //--- Teardown: scenes first, bus last ----------------------------
        self.scheduler.pop_all_scenes();
        self.bus.clear();
        info!("Runtime shutdown complete");
    }

    //--- Internal Helpers -------------------------------------------------

    /// Forwards every pending pump message to the scene stack.
    ///
    /// Messages queued after this drain wait for the next tick.
    fn drain_input(&mut self) -> TickControl {
        loop {
            match self.receiver.try_recv() {
                Ok(PumpMessage::Input(msg)) => {
                    self.scheduler.handle_input(&msg);
                }
                Ok(PumpMessage::Shutdown) => {
                    debug!("Shutdown requested through input pump");
                    return TickControl::Exit;
                }
                Err(TryRecvError::Empty) => return TickControl::Continue,
                Err(TryRecvError::Disconnected) => {
                    debug!("Input pump disconnected");
                    return TickControl::Exit;
                }
            }
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
