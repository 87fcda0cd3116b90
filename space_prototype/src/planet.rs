use anyhow::Result;
use space_engine::{Camera2D, Frame, Renderer, SpriteAnim, SpriteSheet, Vec2};

pub const PLANET_FRAME_SIZE: u32 = 500;
const PLANET_FRAME_TIME: f32 = 0.25;
pub const PLANET_SCALE: f32 = 0.6;

/// Decorative spinning planet. Has no gameplay effect.
pub struct Planet {
    pub position: Vec2,
    pub scale: f32,
    anim: Option<SpriteAnim>,
}

impl Planet {
    /// A planet centered horizontally, 30% down the map.
    pub fn for_map(map_size: Vec2) -> Self {
        Self {
            position: Vec2::new(map_size.x * 0.5, map_size.y * 0.3),
            scale: PLANET_SCALE,
            anim: None,
        }
    }

    pub fn set_sheet(&mut self, sheet: SpriteSheet) {
        self.anim = Some(SpriteAnim::new(sheet, PLANET_FRAME_TIME));
    }

    pub fn frame_index(&self) -> Option<u32> {
        self.anim.as_ref().map(SpriteAnim::index)
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(anim) = &mut self.anim {
            anim.update(dt);
        }
    }

    pub fn draw(&self, renderer: &mut Renderer, frame: &mut Frame, camera: &Camera2D) -> Result<()> {
        match &self.anim {
            Some(anim) => renderer.draw_sprite_anim(
                frame,
                anim,
                self.position,
                self.scale,
                0.0,
                [1.0, 1.0, 1.0, 1.0],
                camera,
            ),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use space_engine::TextureHandle;

    #[test]
    fn sits_above_map_center() {
        let planet = Planet::for_map(Vec2::new(5000.0, 3000.0));
        assert_eq!(planet.position.x, 2500.0);
        approx::assert_relative_eq!(planet.position.y, 900.0, epsilon = 1e-3);
        assert_eq!(planet.frame_index(), None);
    }

    #[test]
    fn spins_through_its_sheet() {
        let mut planet = Planet::for_map(Vec2::new(5000.0, 3000.0));
        let sheet = SpriteSheet::grid(
            TextureHandle::from_raw(3),
            (PLANET_FRAME_SIZE * 4, PLANET_FRAME_SIZE),
            PLANET_FRAME_SIZE,
            PLANET_FRAME_SIZE,
        );
        planet.set_sheet(sheet);

        planet.update(0.3);
        planet.update(0.3);
        assert_eq!(planet.frame_index(), Some(2));
    }
}
