//=========================================================================
// Proscenium — Library Root
//
// This crate coordinates which interactive scene is active at any
// moment, how scenes stack and compose, and how independent subsystems
// notify each other without direct coupling.
//
// Responsibilities:
// - Expose the scene stack scheduler and the typed event bus
// - Keep the host-loop facade (`Runtime`) as the single entry point for
//   applications that want a ready-made tick loop
// - Stay out of rendering, asset, UI, and windowing concerns; those
//   are reached only through the narrow capability bundle
//
// Typical usage:
// ```no_run
// use std::sync::Arc;
// use proscenium::core::event_bus::EventBus;
// use proscenium::core::scene::{Scene, SceneScheduler};
// use proscenium::core::services::Services;
// use proscenium::RuntimeBuilder;
//
// struct Game;
// impl Scene for Game {
//     fn name(&self) -> &str { "Game" }
//     fn update(&mut self, _dt: f32) {}
// }
//
// fn main() {
//     let bus = Arc::new(EventBus::new());
//     let services = Services::new().with_event_bus(Arc::clone(&bus));
//
//     let mut scheduler = SceneScheduler::new(services);
//     scheduler.register_scene("Game", || Box::new(Game));
//     scheduler.load_scene("Game");
//
//     let (runtime, _pump) = RuntimeBuilder::new().build(scheduler, bus);
//     runtime.run();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the scene system, the event bus, the capability
// bundle, and the input message types. It is exposed publicly so hosts
// can compose the pieces directly; applications that just want a tick
// loop use the top-level `Runtime` facade instead.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `runtime` defines the host-loop facade and its builder.
//
mod runtime;

//--- Public Exports ------------------------------------------------------
//
// Re-exports the runtime facade as the main entry point for
// applications, so users can simply `use proscenium::RuntimeBuilder;`
// without knowing the internal module structure.
//
pub use runtime::{InputPump, PumpMessage, Runtime, RuntimeBuilder};
