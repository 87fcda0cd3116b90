//! Space engine - the window, input and sprite layer under the space prototype.
//!
//! Provides a frame loop driven by winit, a wgpu textured-quad renderer with
//! glyph text, a follow camera and sprite sheet animation.

pub mod assets;
pub mod engine;
pub mod input;
pub mod math;
pub mod render;

pub use crate::assets::AssetManager;
pub use crate::engine::{Engine, EngineConfig, EngineContext, Game};
pub use crate::input::InputState;
pub use crate::math::{Camera2D, Rect, Transform2D, Vec2};
pub use crate::render::{
    FontHandle, Frame, Renderer, SpriteAnim, SpriteSheet, TextureHandle, TextureSink,
};
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
