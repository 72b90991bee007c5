//! Mote Core - Foundational types for the Mote particle engine
//!
//! This crate provides the core types that all other Mote crates depend on:
//! - `ParticleId` - Unique particle identifiers
//! - `Vec2`, `Canvas` - 2D spatial types in device pixels
//! - `Color` - RGBA colour with CSS-style parsing
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{MoteError, Result};
pub use id::ParticleId;
pub use types::{parse_size, Canvas, Color, Vec2};
