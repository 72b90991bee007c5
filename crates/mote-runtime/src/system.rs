//! Runtime system trait

use crate::surface::DrawSurface;
use mote_core::Result;

/// A system that can be ticked by the host's animation-frame loop
pub trait RuntimeSystem {
    /// Called once before the first frame
    fn initialize(&mut self, now: f64) -> Result<()>;

    /// Called once per animation frame with the host timestamp in seconds.
    /// Returns whether a frame was actually executed (fps ceilings may skip).
    fn update(&mut self, surface: &mut dyn DrawSurface, now: f64) -> Result<bool>;

    /// Called when the system is being torn down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
