mod animation;
mod gpu;
mod quad;
mod renderer;
mod sprite;
mod text;
mod textures;

pub use animation::{SpriteAnim, SpriteSheet};
pub use renderer::{Frame, Renderer};
pub use sprite::{TextureHandle, TextureSink};
pub use text::FontHandle;
