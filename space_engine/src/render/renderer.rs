use anyhow::{anyhow, Context, Result};
use winit::{dpi::PhysicalSize, window::Window};

use crate::math::{Camera2D, Transform2D, Vec2};
use crate::render::animation::SpriteAnim;
use crate::render::gpu::Gpu;
use crate::render::quad::{QuadPipeline, QuadUniforms, QUAD_CAPACITY};
use crate::render::sprite::{TextureHandle, TextureSink};
use crate::render::text::{FontHandle, TextRenderer};
use crate::render::textures::{Filtering, TextureStore};

const FULL_TEXTURE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

/// One swapchain image being recorded.
///
/// Draw calls only queue quads; nothing reaches the GPU until
/// [`Renderer::end_frame`]. A frame dropped early still presents its image.
pub struct Frame {
    image: Option<wgpu::SurfaceTexture>,
    clear: [f32; 4],
    quads: Vec<TextureHandle>,
    dropped: usize,
}

impl Drop for Frame {
    fn drop(&mut self) {
        if let Some(image) = self.image.take() {
            image.present();
        }
    }
}

/// Draws textured quads into the window.
///
/// Sprites, solid rectangles and text all go through the same quad
/// pipeline. Rectangles sample a 1x1 white texture and text draws one quad
/// per cached glyph bitmap.
pub struct Renderer<'window> {
    gpu: Gpu<'window>,
    quads: QuadPipeline,
    textures: TextureStore,
    text: TextRenderer,
    white: Option<TextureHandle>,
}

impl<'window> Renderer<'window> {
    pub fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        let gpu = Gpu::new(window, vsync)?;
        let quads = QuadPipeline::new(&gpu.device, gpu.format());
        Ok(Self {
            gpu,
            quads,
            textures: TextureStore::new(),
            text: TextRenderer::new(),
            white: None,
        })
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size);
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.gpu.size()
    }

    pub fn begin_frame(&mut self, clear: [f32; 4]) -> Result<Frame> {
        Ok(Frame {
            image: Some(self.gpu.acquire()?),
            clear,
            quads: Vec::new(),
            dropped: 0,
        })
    }

    /// Queue `texture` (or the `uv_rect` part of it, as normalized
    /// `[x, y, w, h]`) centered on the transform's position.
    ///
    /// The quad is the texture's full pixel size times `transform.scale`,
    /// whatever the region. Callers drawing a sub-rectangle scale it down
    /// themselves.
    pub fn draw_texture_region(
        &mut self,
        frame: &mut Frame,
        texture: TextureHandle,
        uv_rect: Option<[f32; 4]>,
        transform: &Transform2D,
        tint: [f32; 4],
        camera: &Camera2D,
    ) -> Result<()> {
        let (width, height) = self
            .textures
            .size(texture)
            .ok_or_else(|| anyhow!("texture {} does not exist", texture.id()))?;

        let slot = frame.quads.len() as u64;
        if slot >= QUAD_CAPACITY {
            frame.dropped += 1;
            return Ok(());
        }

        let (surface_w, surface_h) = self.gpu.size();
        let clip_from_local = camera.view_projection(surface_w, surface_h)
            * transform.model_matrix(Vec2::new(width as f32, height as f32));
        let [u, v, du, dv] = uv_rect.unwrap_or(FULL_TEXTURE);
        let uniforms = QuadUniforms {
            clip_from_local: clip_from_local.to_cols_array_2d(),
            tint,
            uv_origin: [u, v],
            uv_extent: [du, dv],
        };
        self.quads.write_slot(&self.gpu.queue, slot, &uniforms);
        frame.quads.push(texture);
        Ok(())
    }

    /// Current frame of `anim`, `scale` times its pixel size.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_sprite_anim(
        &mut self,
        frame: &mut Frame,
        anim: &SpriteAnim,
        position: Vec2,
        scale: f32,
        rotation: f32,
        tint: [f32; 4],
        camera: &Camera2D,
    ) -> Result<()> {
        let transform = Transform2D::new(position, anim.sheet.frame_scale(scale), rotation);
        self.draw_texture_region(
            frame,
            anim.sheet.texture,
            Some(anim.uv_rect()),
            &transform,
            tint,
            camera,
        )
    }

    /// Solid axis-aligned rectangle.
    pub fn draw_rect(
        &mut self,
        frame: &mut Frame,
        center: Vec2,
        size: Vec2,
        color: [f32; 4],
        camera: &Camera2D,
    ) -> Result<()> {
        let white = match self.white {
            Some(handle) => handle,
            None => {
                let handle = self.upload(&[255; 4], 1, 1, Filtering::Nearest)?;
                *self.white.insert(handle)
            }
        };
        self.draw_texture_region(
            frame,
            white,
            None,
            &Transform2D::new(center, size, 0.0),
            color,
            camera,
        )
    }

    /// Single line of text whose top-left corner is `position`.
    ///
    /// Glyphs are rasterized and uploaded the first time they are seen at a
    /// given pixel size.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text(
        &mut self,
        frame: &mut Frame,
        text: &str,
        font: FontHandle,
        size: f32,
        position: Vec2,
        color: [f32; 4],
        camera: &Camera2D,
    ) -> Result<()> {
        for ch in self.text.missing_glyphs(font, text, size) {
            let bitmap = self.text.rasterize(font, ch, size)?;
            let texture = if bitmap.width == 0 || bitmap.height == 0 {
                None
            } else {
                Some(self.upload(&bitmap.rgba, bitmap.width, bitmap.height, Filtering::Nearest)?)
            };
            self.text.insert(font, ch, size, &bitmap, texture);
        }

        for glyph in self.text.layout(font, text, size)? {
            let transform = Transform2D::new(position + glyph.center, Vec2::ONE, 0.0);
            self.draw_texture_region(frame, glyph.texture, None, &transform, color, camera)?;
        }
        Ok(())
    }

    /// Record every queued quad in one pass over the cleared image, submit
    /// and present.
    pub fn end_frame(&mut self, mut frame: Frame) -> Result<()> {
        if frame.dropped > 0 {
            log::warn!(
                "{} draws over the {QUAD_CAPACITY} quad limit were skipped",
                frame.dropped
            );
        }
        let image = frame
            .image
            .take()
            .ok_or_else(|| anyhow!("frame was already presented"))?;
        let target = image
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });
        {
            let [r, g, b, a] = frame.clear.map(f64::from);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quads"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                multiview_mask: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.quads.bind(&mut pass);
            for (slot, texture) in frame.quads.iter().enumerate() {
                let bindings = self
                    .textures
                    .bindings(*texture)
                    .ok_or_else(|| anyhow!("texture {} vanished mid-frame", texture.id()))?;
                self.quads.draw(&mut pass, bindings, slot as u64);
            }
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        image.present();
        Ok(())
    }

    pub fn load_texture_from_file(&mut self, path: &str) -> Result<TextureHandle> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {path}"))?;
        self.load_texture_from_bytes(&bytes)
            .with_context(|| format!("loading {path}"))
    }

    pub fn load_texture_from_bytes(&mut self, bytes: &[u8]) -> Result<TextureHandle> {
        self.textures
            .decode(&self.gpu.device, &self.gpu.queue, &self.quads, bytes)
    }

    /// Upload raw RGBA8 pixels, `width * height * 4` bytes.
    pub fn load_texture_from_rgba(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle> {
        self.upload(rgba, width, height, Filtering::Smooth)
    }

    pub fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.textures.size(handle)
    }

    /// Parse a TTF or OTF font.
    pub fn load_font_from_bytes(&mut self, bytes: &[u8]) -> Result<FontHandle> {
        self.text.load_font_from_bytes(bytes)
    }

    fn upload(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        filtering: Filtering,
    ) -> Result<TextureHandle> {
        self.textures.upload(
            &self.gpu.device,
            &self.gpu.queue,
            &self.quads,
            rgba,
            width,
            height,
            filtering,
        )
    }
}

impl TextureSink for Renderer<'_> {
    fn upload_rgba(&mut self, rgba: &[u8], width: u32, height: u32) -> Result<TextureHandle> {
        self.load_texture_from_rgba(rgba, width, height)
    }
}
