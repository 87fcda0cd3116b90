//! Automatic mining beam.
//!
//! Every frame the beam locks onto the closest asteroid in range and burns
//! `damage_per_second * dt` off it. The sprite chain is laid out by
//! [`BeamLayout`] from the ship nose to just inside the target's edge.

use anyhow::Result;
use space_engine::{Camera2D, Frame, Renderer, TextureHandle, Transform2D, Vec2};

use crate::asteroids::{AsteroidInfo, AsteroidSystem, DamageOutcome};
use crate::config::BeamConfig;

/// The head stops this fraction of the target radius short of its center.
const TARGET_INSET: f32 = 0.95;
/// The head never ends closer to the ship than this.
const MIN_END_DISTANCE: f32 = 12.0;
/// Fraction of the head's half width pulled back from the end point.
const HEAD_PULLBACK: f32 = 0.9;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const BODY_GLOW: [f32; 4] = [180.0 / 255.0, 210.0 / 255.0, 1.0, 0.35];
const HEAD_GLOW: [f32; 4] = [200.0 / 255.0, 230.0 / 255.0, 1.0, 0.35];

/// Placement of every beam sprite for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamLayout {
    pub direction: Vec2,
    /// Rotation of the sprites, radians.
    pub angle: f32,
    pub body_centers: Vec<Vec2>,
    pub head_center: Vec2,
}

impl BeamLayout {
    /// Lay out the beam from `origin` towards `target`.
    ///
    /// `body_width` and `head_width` are the drawn (scaled) sprite widths.
    /// Returns `None` when the target sits on the origin.
    pub fn compute(
        origin: Vec2,
        target: AsteroidInfo,
        nose_offset: f32,
        body_width: f32,
        head_width: f32,
        config: &BeamConfig,
    ) -> Option<Self> {
        let delta = target.position - origin;
        let dist = delta.length();
        if dist <= 0.01 {
            return None;
        }
        let direction = delta / dist;

        let clamped = dist.min(config.range);
        let end_dist = (clamped - target.radius * TARGET_INSET).max(MIN_END_DISTANCE);

        let start_dist = nose_offset + body_width * 0.5;
        let head_dist = (end_dist - head_width * 0.5 * HEAD_PULLBACK).max(start_dist);
        let body_end_dist = head_dist - body_width * 0.5;
        let beam_len = (body_end_dist - start_dist).max(0.0);

        let step = body_width * config.step_scale;
        let count = if step > 0.0 {
            ((beam_len / step).ceil() as usize).max(1)
        } else {
            1
        };
        let actual_step = beam_len / count as f32;

        // Both ends get a segment, so there is one more piece than steps.
        let body_centers = (0..=count)
            .map(|i| origin + direction * (start_dist + actual_step * i as f32))
            .collect();

        Some(Self {
            direction,
            angle: direction.angle(),
            body_centers,
            head_center: origin + direction * head_dist,
        })
    }
}

/// Beam sprite textures with their pixel sizes.
#[derive(Debug, Clone, Copy)]
pub struct BeamTextures {
    pub body: TextureHandle,
    pub body_size: (u32, u32),
    pub head: TextureHandle,
    pub head_size: (u32, u32),
}

#[derive(Debug, Default)]
pub struct Beam {
    popup_timer: f32,
    target: Option<AsteroidInfo>,
}

impl Beam {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target hit this frame, if it survived.
    pub fn target(&self) -> Option<AsteroidInfo> {
        self.target
    }

    /// Damage the closest asteroid within range of `origin`.
    ///
    /// Spawns a damage popup at most once per `popup_interval`. Returns what
    /// happened to the target, or `None` when nothing was in range.
    pub fn update(
        &mut self,
        dt: f32,
        origin: Vec2,
        asteroids: &mut AsteroidSystem,
        config: &BeamConfig,
    ) -> Option<DamageOutcome> {
        self.popup_timer -= dt;
        self.target = None;

        let (index, _) = asteroids.find_closest(origin, config.range)?;
        let info = asteroids.info(index)?;
        let damage = config.damage_per_second * dt;
        let outcome = asteroids.apply_damage(index, damage);

        if self.popup_timer <= 0.0 {
            asteroids.add_popup(info.position, damage * config.popup_value_scale);
            self.popup_timer = config.popup_interval;
        }

        if outcome == DamageOutcome::Alive {
            self.target = Some(info);
        } else {
            log::debug!("beam destroyed asteroid at {:?}", info.position);
        }
        Some(outcome)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        renderer: &mut Renderer,
        frame: &mut Frame,
        camera: &Camera2D,
        textures: &BeamTextures,
        origin: Vec2,
        nose_offset: f32,
        config: &BeamConfig,
    ) -> Result<()> {
        let Some(target) = self.target else {
            return Ok(());
        };
        let body_width = textures.body_size.0 as f32 * config.body_scale;
        let head_width = textures.head_size.0 as f32 * config.head_scale;
        let Some(layout) =
            BeamLayout::compute(origin, target, nose_offset, body_width, head_width, config)
        else {
            return Ok(());
        };

        let body_scale = Vec2::new(config.body_scale, config.body_scale);
        for center in &layout.body_centers {
            let transform = Transform2D::new(*center, body_scale, layout.angle);
            renderer.draw_texture_region(frame, textures.body, None, &transform, WHITE, camera)?;
            renderer.draw_texture_region(frame, textures.body, None, &transform, BODY_GLOW, camera)?;
        }

        let head_scale = Vec2::new(config.head_scale, config.head_scale);
        let transform = Transform2D::new(layout.head_center, head_scale, layout.angle);
        renderer.draw_texture_region(frame, textures.head, None, &transform, WHITE, camera)?;
        renderer.draw_texture_region(frame, textures.head, None, &transform, HEAD_GLOW, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asteroids::{Asteroid, AsteroidAsset};
    use crate::config::AsteroidConfig;
    use approx::assert_relative_eq;

    fn target(x: f32, radius: f32) -> AsteroidInfo {
        AsteroidInfo {
            position: Vec2::new(x, 0.0),
            radius,
        }
    }

    #[test]
    fn chain_runs_from_nose_to_head() {
        let config = BeamConfig::default();
        // 32 px body and head textures at their default scales.
        let layout =
            BeamLayout::compute(Vec2::ZERO, target(150.0, 20.0), 24.0, 24.0, 20.8, &config)
                .unwrap();

        // end 150 - 19 = 131, head 131 - 10.4 * 0.9, body ends half a body short.
        assert_relative_eq!(layout.head_center.x, 121.64, epsilon = 1e-3);
        assert_eq!(layout.body_centers.len(), 7);
        assert_relative_eq!(layout.body_centers[0].x, 36.0, epsilon = 1e-4);
        assert_relative_eq!(layout.body_centers[6].x, 109.64, epsilon = 1e-3);
        assert!(layout.body_centers.iter().all(|c| c.y == 0.0));
        assert_relative_eq!(layout.angle, 0.0);
    }

    #[test]
    fn distant_targets_are_clamped_to_range() {
        let config = BeamConfig::default();
        let near = BeamLayout::compute(Vec2::ZERO, target(180.0, 0.0), 24.0, 24.0, 20.8, &config)
            .unwrap();
        let far = BeamLayout::compute(Vec2::ZERO, target(900.0, 0.0), 24.0, 24.0, 20.8, &config)
            .unwrap();
        assert_relative_eq!(near.head_center.x, far.head_center.x, epsilon = 1e-4);
    }

    #[test]
    fn huge_target_collapses_to_a_stub() {
        let config = BeamConfig::default();
        let layout =
            BeamLayout::compute(Vec2::ZERO, target(0.0, 0.0), 24.0, 24.0, 20.8, &config);
        assert!(layout.is_none());

        let layout = BeamLayout::compute(
            Vec2::new(10.0, 10.0),
            AsteroidInfo {
                position: Vec2::new(10.0, 110.0),
                radius: 400.0,
            },
            24.0,
            24.0,
            20.8,
            &config,
        )
        .unwrap();
        assert_eq!(layout.body_centers.len(), 2);
        assert_relative_eq!(layout.head_center.y, 46.0, epsilon = 1e-4);
        assert_relative_eq!(layout.angle, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
    }

    fn field_with(position: Vec2, hp: f32) -> AsteroidSystem {
        let rgba = vec![255u8; 10 * 10 * 4];
        let asset = AsteroidAsset::from_rgba(TextureHandle::from_raw(1), 10, 10, &rgba);
        let mut system = AsteroidSystem::new(
            vec![asset],
            &AsteroidConfig {
                seed: Some(1),
                ..AsteroidConfig::default()
            },
        );
        system.insert(Asteroid::new(position, 1.0, 0, hp)).unwrap();
        system
    }

    #[test]
    fn burns_target_and_rate_limits_popups() {
        let config = BeamConfig::default();
        let mut field = field_with(Vec2::new(100.0, 0.0), 100.0);
        let mut beam = Beam::new();

        assert_eq!(beam.update(0.1, Vec2::ZERO, &mut field, &config), Some(DamageOutcome::Alive));
        assert_relative_eq!(field.asteroids()[0].hp, 97.0, epsilon = 1e-4);
        assert_eq!(field.popups().len(), 1);
        assert_relative_eq!(field.popups()[0].value, 30.0, epsilon = 1e-4);
        assert_eq!(beam.target().map(|t| t.radius), Some(5.0));

        // Still inside the popup cooldown.
        beam.update(0.1, Vec2::ZERO, &mut field, &config);
        assert_eq!(field.popups().len(), 1);
        beam.update(0.1, Vec2::ZERO, &mut field, &config);
        assert_eq!(field.popups().len(), 2);
    }

    #[test]
    fn destroyed_target_turns_the_beam_off() {
        let config = BeamConfig::default();
        let mut field = field_with(Vec2::new(100.0, 0.0), 2.0);
        let mut beam = Beam::new();

        assert_eq!(
            beam.update(0.1, Vec2::ZERO, &mut field, &config),
            Some(DamageOutcome::Destroyed)
        );
        assert!(beam.target().is_none());
        assert!(field.asteroids().is_empty());
        assert_eq!(beam.update(0.1, Vec2::ZERO, &mut field, &config), None);
    }

    #[test]
    fn out_of_range_asteroids_are_ignored() {
        let config = BeamConfig::default();
        let mut field = field_with(Vec2::new(300.0, 0.0), 100.0);
        let mut beam = Beam::new();
        assert_eq!(beam.update(0.1, Vec2::ZERO, &mut field, &config), None);
        assert_eq!(field.asteroids()[0].hp, 100.0);
    }
}
