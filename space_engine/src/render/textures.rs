use std::collections::HashMap;

use anyhow::{bail, Context, Result};

use crate::render::quad::QuadPipeline;
use crate::render::sprite::TextureHandle;

/// Texture sampling. Glyph bitmaps use `Nearest` so small text stays crisp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Filtering {
    Smooth,
    Nearest,
}

struct StoredTexture {
    _texture: wgpu::Texture,
    bindings: wgpu::BindGroup,
    size: (u32, u32),
}

/// Every texture the renderer owns, with the bind group it is drawn through.
pub(crate) struct TextureStore {
    entries: HashMap<TextureHandle, StoredTexture>,
    next_id: u32,
}

impl TextureStore {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_id: 1,
        }
    }

    /// Decode a PNG (or anything `image` understands) and upload it.
    pub(crate) fn decode(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        quads: &QuadPipeline,
        encoded: &[u8],
    ) -> Result<TextureHandle> {
        let pixels = image::load_from_memory(encoded)
            .context("decoding image")?
            .into_rgba8();
        let (width, height) = pixels.dimensions();
        self.upload(device, queue, quads, pixels.as_raw(), width, height, Filtering::Smooth)
    }

    /// Upload tightly packed RGBA8 rows.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        quads: &QuadPipeline,
        rgba: &[u8],
        width: u32,
        height: u32,
        filtering: Filtering,
    ) -> Result<TextureHandle> {
        if width == 0 || height == 0 {
            bail!("texture has no pixels ({width}x{height})");
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            bail!(
                "{width}x{height} texture needs {expected} bytes of RGBA, got {}",
                rgba.len()
            );
        }

        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("quad-texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            extent,
        );

        let filter = match filtering {
            Filtering::Smooth => wgpu::FilterMode::Linear,
            Filtering::Nearest => wgpu::FilterMode::Nearest,
        };
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quad-sampler"),
            mag_filter: filter,
            min_filter: filter,
            ..Default::default()
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bindings = quads.bind_texture(device, &view, &sampler);

        let handle = TextureHandle(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            handle,
            StoredTexture {
                _texture: texture,
                bindings,
                size: (width, height),
            },
        );
        Ok(handle)
    }

    pub(crate) fn size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.entries.get(&handle).map(|entry| entry.size)
    }

    pub(crate) fn bindings(&self, handle: TextureHandle) -> Option<&wgpu::BindGroup> {
        self.entries.get(&handle).map(|entry| &entry.bindings)
    }
}
