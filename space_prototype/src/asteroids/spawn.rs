use std::f32::consts::TAU;

use space_engine::Vec2;

use super::{Asteroid, AsteroidSystem, MAX_ASTEROIDS};

/// Distance beyond the edge of the view where the spawn band starts.
pub const SPAWN_MARGIN: f32 = 320.0;

/// Width of the spawn band.
pub const SPAWN_BAND: f32 = 800.0;

const SPEED_RANGE: (f32, f32) = (0.5, 1.1);
const SCALE_RANGE: (f32, f32) = (0.6, 1.1);
const HP_RANGE: (f32, f32) = (60.0, 120.0);

impl AsteroidSystem {
    /// Inner and outer spawn distance for a screen of `viewport` pixels.
    pub fn spawn_band(&self, viewport: Vec2) -> (f32, f32) {
        let view_radius = 0.5 * viewport.x.max(viewport.y);
        let min = self
            .min_spawn_distance
            .unwrap_or(view_radius + SPAWN_MARGIN);
        let max = self.max_spawn_distance.unwrap_or(min + SPAWN_BAND);
        (min, max)
    }

    /// Spawn one asteroid somewhere in the band around `player_position`,
    /// drifting in a random direction. Returns its index, or `None` when no
    /// templates are loaded or the pool is full.
    pub fn spawn(&mut self, viewport: Vec2, player_position: Vec2) -> Option<usize> {
        if self.assets.is_empty() || self.asteroids.len() >= MAX_ASTEROIDS {
            return None;
        }

        let (min_dist, max_dist) = self.spawn_band(viewport);
        let angle = self.random_range(0.0, TAU);
        let dist = self.random_range(min_dist, max_dist);
        let position = player_position + Vec2::from_angle(angle) * dist;

        let drift = Vec2::from_angle(self.random_range(0.0, TAU));
        let asset_index = self.rng.usize(..self.assets.len());
        let speed = self.random_range(
            self.base_speed * SPEED_RANGE.0,
            self.base_speed * SPEED_RANGE.1,
        );
        let scale = self.random_range(SCALE_RANGE.0, SCALE_RANGE.1);
        let hp_max = self.random_range(HP_RANGE.0, HP_RANGE.1);

        let mut asteroid = Asteroid::new(position, scale, asset_index, hp_max);
        asteroid.velocity = drift * speed;
        self.asteroids.push(asteroid);
        Some(self.asteroids.len() - 1)
    }

    fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.rng.f32()
    }
}
