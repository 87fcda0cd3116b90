/// Opaque handle used to reference textures owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

impl TextureHandle {
    /// Wrap a raw id. Only renderers hand out ids that resolve to real
    /// textures; this exists for headless code paths and tests.
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

/// Anything that can turn decoded RGBA8 pixels into a texture handle.
///
/// The renderer implements this; asset loaders take it so they can run
/// without a GPU.
pub trait TextureSink {
    fn upload_rgba(&mut self, rgba: &[u8], width: u32, height: u32) -> anyhow::Result<TextureHandle>;
}
