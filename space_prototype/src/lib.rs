//! Space prototype: fly a ship around a bounded map while an automatic beam
//! mines the asteroids drifting past.
//!
//! The asteroid field (pixel-mask collision, spawn band, damage numbers)
//! lives in [`asteroids`] and runs without a GPU; everything else is the
//! scene around it.

pub mod asteroids;
pub mod background;
pub mod beam;
pub mod config;
pub mod error;
pub mod game;
pub mod planet;
pub mod player;

pub use crate::config::GameConfig;
pub use crate::game::SpacePrototype;
