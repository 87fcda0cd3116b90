use anyhow::Result;
use space_engine::{Camera2D, FontHandle, Frame, Renderer, Transform2D, Vec2};

use super::{AsteroidSystem, POPUP_COLOR, POPUP_FONT_SIZE};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

impl AsteroidSystem {
    /// Draw every asteroid, then the damage numbers on top. Popups are
    /// skipped when no font is available.
    pub fn draw(
        &self,
        renderer: &mut Renderer,
        frame: &mut Frame,
        camera: &Camera2D,
        font: Option<FontHandle>,
    ) -> Result<()> {
        for asteroid in &self.asteroids {
            let Some(asset) = self.assets.get(asteroid.asset_index) else {
                continue;
            };
            let transform = Transform2D::new(
                asteroid.position,
                Vec2::new(asteroid.scale, asteroid.scale),
                0.0,
            );
            renderer.draw_texture_region(frame, asset.texture(), None, &transform, WHITE, camera)?;
        }

        let Some(font) = font else {
            return Ok(());
        };
        for popup in &self.popups {
            let [r, g, b] = POPUP_COLOR;
            let position = Vec2::new(popup.position.x.trunc(), popup.position.y.trunc());
            renderer.draw_text(
                frame,
                &popup.label(),
                font,
                POPUP_FONT_SIZE,
                position,
                [r, g, b, popup.alpha()],
                camera,
            )?;
        }

        Ok(())
    }
}
