//! CPU glyph rasterization with `ab_glyph`.
//!
//! Each (font, char, pixel size) is rasterized once into a white RGBA bitmap
//! whose alpha is the glyph coverage. The renderer uploads the bitmap and
//! tints it when drawing.

use std::collections::{HashMap, HashSet};

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use anyhow::{anyhow, Result};

use crate::math::Vec2;
use crate::render::TextureHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontHandle(pub(crate) u32);

/// Fractional sizes share the glyphs of their integer part.
type GlyphKey = (FontHandle, char, u32);

fn key(font: FontHandle, ch: char, size: f32) -> GlyphKey {
    (font, ch, size as u32)
}

pub(crate) struct GlyphBitmap {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Bitmap top-left relative to the pen on the baseline.
    pub bearing: Vec2,
    pub advance: f32,
}

#[derive(Clone, Copy, Debug)]
struct CachedGlyph {
    /// `None` for blank glyphs such as space.
    texture: Option<TextureHandle>,
    size: Vec2,
    bearing: Vec2,
    advance: f32,
}

/// Glyph quad relative to the top-left corner of the text.
pub(crate) struct PlacedGlyph {
    pub texture: TextureHandle,
    pub center: Vec2,
}

pub(crate) struct TextRenderer {
    fonts: Vec<FontArc>,
    glyphs: HashMap<GlyphKey, CachedGlyph>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self {
            fonts: Vec::new(),
            glyphs: HashMap::new(),
        }
    }

    pub fn load_font_from_bytes(&mut self, bytes: &[u8]) -> Result<FontHandle> {
        let font = FontArc::try_from_vec(bytes.to_vec())
            .map_err(|err| anyhow!("not a usable TTF/OTF font: {err}"))?;
        self.fonts.push(font);
        Ok(FontHandle(self.fonts.len() as u32))
    }

    fn font(&self, handle: FontHandle) -> Result<&FontArc> {
        (handle.0 as usize)
            .checked_sub(1)
            .and_then(|index| self.fonts.get(index))
            .ok_or_else(|| anyhow!("font {} is not loaded", handle.0))
    }

    /// Characters of `text` with no cached glyph at `size`, each listed once.
    pub fn missing_glyphs(&self, font: FontHandle, text: &str, size: f32) -> Vec<char> {
        let mut seen = HashSet::new();
        text.chars()
            .filter(|ch| !self.glyphs.contains_key(&key(font, *ch, size)) && seen.insert(*ch))
            .collect()
    }

    pub fn rasterize(&self, font: FontHandle, ch: char, size: f32) -> Result<GlyphBitmap> {
        let scaled = self.font(font)?.as_scaled(PxScale::from(size));
        let id = scaled.glyph_id(ch);
        let advance = scaled.h_advance(id);

        let Some(outline) = scaled.outline_glyph(id.with_scale(size)) else {
            return Ok(GlyphBitmap {
                rgba: Vec::new(),
                width: 0,
                height: 0,
                bearing: Vec2::ZERO,
                advance,
            });
        };

        let bounds = outline.px_bounds();
        let width = bounds.width().ceil() as u32;
        let height = bounds.height().ceil() as u32;
        let mut rgba = [255u8, 255, 255, 0].repeat((width * height) as usize);
        outline.draw(|x, y, coverage| {
            if x < width && y < height {
                let alpha = (y * width + x) as usize * 4 + 3;
                rgba[alpha] = (coverage.clamp(0.0, 1.0) * 255.0) as u8;
            }
        });

        Ok(GlyphBitmap {
            rgba,
            width,
            height,
            bearing: Vec2::new(bounds.min.x, bounds.min.y),
            advance,
        })
    }

    pub fn insert(
        &mut self,
        font: FontHandle,
        ch: char,
        size: f32,
        bitmap: &GlyphBitmap,
        texture: Option<TextureHandle>,
    ) {
        self.glyphs.insert(
            key(font, ch, size),
            CachedGlyph {
                texture,
                size: Vec2::new(bitmap.width as f32, bitmap.height as f32),
                bearing: bitmap.bearing,
                advance: bitmap.advance,
            },
        );
    }

    /// Walk the pen along one line. Every glyph must already be cached.
    pub fn layout(&self, font: FontHandle, text: &str, size: f32) -> Result<Vec<PlacedGlyph>> {
        let ascent = self.font(font)?.as_scaled(PxScale::from(size)).ascent();
        let mut pen = 0.0;
        let mut placed = Vec::new();

        for ch in text.chars() {
            let glyph = self
                .glyphs
                .get(&key(font, ch, size))
                .ok_or_else(|| anyhow!("glyph {ch:?} was never rasterized"))?;
            if let Some(texture) = glyph.texture {
                let top_left = Vec2::new(pen, ascent) + glyph.bearing;
                placed.push(PlacedGlyph {
                    texture,
                    center: top_left + glyph.size * 0.5,
                });
            }
            pen += glyph.advance;
        }
        Ok(placed)
    }
}
