use std::ops::RangeInclusive;

use anyhow::Result;
use space_engine::{Camera2D, Frame, Rect, Renderer, TextureHandle, Transform2D, Vec2};

/// Sky blue at half opacity.
const BOUNDS_COLOR: [f32; 4] = [102.0 / 255.0, 191.0 / 255.0, 1.0, 0.5];
const BOUNDS_THICKNESS: f32 = 2.0;

/// Tile indices covering the world rectangle `top_left..bottom_right`, with
/// one spare tile on every side.
pub fn tile_range(
    top_left: Vec2,
    bottom_right: Vec2,
    tile_size: Vec2,
) -> (RangeInclusive<i32>, RangeInclusive<i32>) {
    let start_x = (top_left.x / tile_size.x).floor() as i32 - 1;
    let end_x = (bottom_right.x / tile_size.x).floor() as i32 + 1;
    let start_y = (top_left.y / tile_size.y).floor() as i32 - 1;
    let end_y = (bottom_right.y / tile_size.y).floor() as i32 + 1;
    (start_x..=end_x, start_y..=end_y)
}

/// Endlessly repeating backdrop texture.
pub struct Background {
    texture: TextureHandle,
    tile_size: Vec2,
}

impl Background {
    pub fn new(texture: TextureHandle, size: (u32, u32)) -> Self {
        Self {
            texture,
            tile_size: Vec2::new(size.0.max(1) as f32, size.1.max(1) as f32),
        }
    }

    /// Tile the part of the world visible through `camera` on a screen of
    /// `screen` pixels.
    pub fn draw(
        &self,
        renderer: &mut Renderer,
        frame: &mut Frame,
        camera: &Camera2D,
        screen: Vec2,
    ) -> Result<()> {
        let top_left = camera.screen_to_world(Vec2::ZERO);
        let bottom_right = camera.screen_to_world(screen);
        let (xs, ys) = tile_range(top_left, bottom_right, self.tile_size);

        for y in ys {
            for x in xs.clone() {
                let corner = Vec2::new(x as f32 * self.tile_size.x, y as f32 * self.tile_size.y);
                let transform = Transform2D::new(corner + self.tile_size * 0.5, Vec2::ONE, 0.0);
                renderer.draw_texture_region(
                    frame,
                    self.texture,
                    None,
                    &transform,
                    [1.0, 1.0, 1.0, 1.0],
                    camera,
                )?;
            }
        }
        Ok(())
    }
}

/// Center and size of the four strips outlining `map` from the inside.
pub fn boundary_strips(map: Rect, thickness: f32) -> [(Vec2, Vec2); 4] {
    let half = thickness * 0.5;
    let center = map.center();
    [
        (
            Vec2::new(center.x, map.y + half),
            Vec2::new(map.width, thickness),
        ),
        (
            Vec2::new(center.x, map.bottom() - half),
            Vec2::new(map.width, thickness),
        ),
        (
            Vec2::new(map.x + half, center.y),
            Vec2::new(thickness, map.height),
        ),
        (
            Vec2::new(map.right() - half, center.y),
            Vec2::new(thickness, map.height),
        ),
    ]
}

pub fn draw_map_bounds(
    renderer: &mut Renderer,
    frame: &mut Frame,
    camera: &Camera2D,
    map: Rect,
) -> Result<()> {
    for (center, size) in boundary_strips(map, BOUNDS_THICKNESS) {
        renderer.draw_rect(frame, center, size, BOUNDS_COLOR, camera)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_view_with_a_margin() {
        let (xs, ys) = tile_range(
            Vec2::new(1860.0, 1140.0),
            Vec2::new(3140.0, 1860.0),
            Vec2::new(512.0, 512.0),
        );
        assert_eq!(xs, 2..=7);
        assert_eq!(ys, 1..=4);
    }

    #[test]
    fn negative_coordinates_round_down() {
        let (xs, _) = tile_range(
            Vec2::new(-10.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(100.0, 100.0),
        );
        assert_eq!(xs, -2..=1);
    }

    #[test]
    fn strips_hug_the_inside_of_the_map() {
        let strips = boundary_strips(Rect::new(0.0, 0.0, 5000.0, 3000.0), 2.0);
        assert_eq!(strips[0], (Vec2::new(2500.0, 1.0), Vec2::new(5000.0, 2.0)));
        assert_eq!(strips[1].0, Vec2::new(2500.0, 2999.0));
        assert_eq!(strips[2].0, Vec2::new(1.0, 1500.0));
        assert_eq!(strips[3], (Vec2::new(4999.0, 1500.0), Vec2::new(2.0, 3000.0)));
    }
}
