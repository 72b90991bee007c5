//! Mote Runtime - Frame loop infrastructure
//!
//! Provides the host-facing building blocks the simulation runs on:
//! - `FrameClock`: frame delta, fps ceiling and the global frame counter
//! - `TaskQueue`: owner-keyed deferred tasks with cancellation
//! - `PointerState`: last known pointer position and whether it is over the surface
//! - `DrawSurface` / `RecordingSurface`: the drawing collaborator contract
//! - `RuntimeSystem`: trait for systems ticked by the host loop

mod clock;
mod pointer;
mod surface;
mod system;
mod timer;

pub use clock::FrameClock;
pub use pointer::PointerState;
pub use surface::{DrawCommand, DrawSurface, RecordingSurface};
pub use system::RuntimeSystem;
pub use timer::TaskQueue;
