use crate::math::{Rect, Vec2};

use super::sprite::TextureHandle;

/// A texture split into equally sized frames, indexed row by row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteSheet {
    pub texture: TextureHandle,
    pub texture_size: (u32, u32),
    pub frame_width: u32,
    pub frame_height: u32,
    pub columns: u32,
    pub rows: u32,
    pub frame_count: u32,
}

impl SpriteSheet {
    /// Single-row strip of square frames whose side is the texture height.
    pub fn auto(texture: TextureHandle, texture_size: (u32, u32)) -> Self {
        let (width, height) = texture_size;
        if width == 0 || height == 0 {
            return Self::degenerate(texture, texture_size);
        }

        let frame_height = height;
        let frame_width = frame_height;
        let columns = at_least_one(width / frame_width);
        Self {
            texture,
            texture_size,
            frame_width,
            frame_height,
            columns,
            rows: 1,
            frame_count: columns,
        }
    }

    /// Grid of `frame_width` x `frame_height` frames. A zero frame dimension
    /// falls back to the texture height.
    pub fn grid(
        texture: TextureHandle,
        texture_size: (u32, u32),
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let (width, height) = texture_size;
        if width == 0 || height == 0 {
            return Self::degenerate(texture, texture_size);
        }

        let frame_width = if frame_width > 0 { frame_width } else { height };
        let frame_height = if frame_height > 0 { frame_height } else { height };
        let columns = at_least_one(width / frame_width);
        let rows = at_least_one(height / frame_height);
        Self {
            texture,
            texture_size,
            frame_width,
            frame_height,
            columns,
            rows,
            frame_count: columns * rows,
        }
    }

    fn degenerate(texture: TextureHandle, texture_size: (u32, u32)) -> Self {
        Self {
            texture,
            texture_size,
            frame_width: 1,
            frame_height: 1,
            columns: 1,
            rows: 1,
            frame_count: 1,
        }
    }

    /// Pixel rectangle of frame `index` (wrapped to the frame count).
    pub fn frame_rect(&self, index: u32) -> Rect {
        let index = index % self.frame_count;
        let col = index % self.columns;
        let row = index / self.columns;
        Rect::new(
            (col * self.frame_width) as f32,
            (row * self.frame_height) as f32,
            self.frame_width as f32,
            self.frame_height as f32,
        )
    }

    /// Normalized `[x, y, w, h]` source region for the renderer.
    pub fn uv_rect(&self, frame: Rect) -> [f32; 4] {
        let (width, height) = self.texture_size;
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        [
            frame.x / width,
            frame.y / height,
            frame.width / width,
            frame.height / height,
        ]
    }
}

impl SpriteSheet {
    /// Transform scale that draws a single frame at `scale` times its
    /// pixel size. The renderer multiplies by the full texture size.
    pub fn frame_scale(&self, scale: f32) -> Vec2 {
        let (width, height) = self.texture_size;
        Vec2::new(
            self.frame_width as f32 * scale / width.max(1) as f32,
            self.frame_height as f32 * scale / height.max(1) as f32,
        )
    }
}

fn at_least_one(value: u32) -> u32 {
    value.max(1)
}

/// Frame cursor over a sprite sheet, advanced by elapsed time.
#[derive(Clone, Debug)]
pub struct SpriteAnim {
    pub sheet: SpriteSheet,
    pub frame_time: f32,
    timer: f32,
    index: u32,
}

impl SpriteAnim {
    pub fn new(sheet: SpriteSheet, frame_time: f32) -> Self {
        Self {
            sheet,
            frame_time,
            timer: 0.0,
            index: 0,
        }
    }

    /// Advance at most one frame per call; the leftover time is discarded.
    pub fn update(&mut self, dt: f32) {
        if self.sheet.frame_count <= 1 {
            return;
        }

        self.timer += dt;
        if self.timer >= self.frame_time {
            self.timer = 0.0;
            self.index = (self.index + 1) % self.sheet.frame_count;
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Pixel rectangle of the current frame.
    pub fn frame(&self) -> Rect {
        self.sheet.frame_rect(self.index)
    }

    /// Normalized source region of the current frame.
    pub fn uv_rect(&self) -> [f32; 4] {
        self.sheet.uv_rect(self.frame())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> TextureHandle {
        TextureHandle::from_raw(7)
    }

    #[test]
    fn auto_sheet_uses_square_frames_of_texture_height() {
        let sheet = SpriteSheet::auto(handle(), (192, 48));
        assert_eq!(sheet.frame_width, 48);
        assert_eq!(sheet.columns, 4);
        assert_eq!(sheet.rows, 1);
        assert_eq!(sheet.frame_count, 4);
    }

    #[test]
    fn narrow_texture_still_has_one_column() {
        let sheet = SpriteSheet::auto(handle(), (20, 48));
        assert_eq!(sheet.columns, 1);
        assert_eq!(sheet.frame_count, 1);
    }

    #[test]
    fn empty_texture_degenerates_to_single_pixel_frame() {
        let sheet = SpriteSheet::grid(handle(), (0, 0), 500, 500);
        assert_eq!(sheet.frame_width, 1);
        assert_eq!(sheet.frame_count, 1);
    }

    #[test]
    fn grid_frames_are_indexed_row_by_row() {
        let sheet = SpriteSheet::grid(handle(), (1500, 1000), 500, 500);
        assert_eq!(sheet.frame_count, 6);
        assert_eq!(sheet.frame_rect(4), Rect::new(500.0, 500.0, 500.0, 500.0));
        assert_eq!(sheet.uv_rect(sheet.frame_rect(2))[0], 1000.0 / 1500.0);
    }

    #[test]
    fn frame_scale_shrinks_to_one_frame() {
        let sheet = SpriteSheet::grid(handle(), (1500, 1000), 500, 500);
        let scale = sheet.frame_scale(0.6);
        approx::assert_relative_eq!(scale.x, 0.2, epsilon = 1e-6);
        approx::assert_relative_eq!(scale.y, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn anim_steps_one_frame_and_wraps() {
        let sheet = SpriteSheet::grid(handle(), (1000, 500), 500, 500);
        let mut anim = SpriteAnim::new(sheet, 0.25);

        anim.update(0.1);
        assert_eq!(anim.index(), 0);
        // A long frame still advances only once.
        anim.update(1.0);
        assert_eq!(anim.index(), 1);
        anim.update(0.25);
        assert_eq!(anim.index(), 0);
    }

    #[test]
    fn single_frame_anim_never_moves() {
        let sheet = SpriteSheet::auto(handle(), (64, 64));
        let mut anim = SpriteAnim::new(sheet, 0.01);
        anim.update(5.0);
        assert_eq!(anim.index(), 0);
        assert_eq!(anim.frame(), Rect::new(0.0, 0.0, 64.0, 64.0));
    }
}
