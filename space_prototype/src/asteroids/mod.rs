//! Drifting asteroid field around the player.
//!
//! [`AsteroidSystem`] owns the collision templates, the live asteroid pool and
//! the floating damage numbers. Pools are unordered: removal swaps the last
//! element into the freed slot, so an index handed out by
//! [`AsteroidSystem::find_closest`] or [`AsteroidSystem::spawn`] is only good
//! until the next call that can remove an asteroid. Re-query every frame.

mod assets;
mod collision;
mod draw;
mod popups;
mod spawn;

use std::path::Path;

use space_engine::{TextureSink, Vec2};

use crate::config::AsteroidConfig;

pub use assets::{build_mask, load_dir, AsteroidAsset, MASK_ALPHA_THRESHOLD, MAX_ASSETS};
pub use collision::overlap;
pub use popups::{DamagePopup, POPUP_COLOR, POPUP_FONT_SIZE, POPUP_JITTER, POPUP_LIFETIME};
pub use spawn::{SPAWN_BAND, SPAWN_MARGIN};

/// Live asteroid and popup capacity.
pub const MAX_ASTEROIDS: usize = 128;

/// Assumed outer spawn distance when no override is configured.
pub const DEFAULT_MAX_SPAWN_DISTANCE: f32 = 1200.0;

/// Extra distance past the outer spawn distance before an asteroid is dropped.
pub const DESPAWN_MARGIN: f32 = 600.0;

/// One live asteroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Asteroid {
    pub position: Vec2,
    /// Units per second.
    pub velocity: Vec2,
    pub scale: f32,
    /// Index into [`AsteroidSystem::assets`].
    pub asset_index: usize,
    pub hp: f32,
    pub hp_max: f32,
}

impl Asteroid {
    /// Stationary asteroid at full health.
    pub fn new(position: Vec2, scale: f32, asset_index: usize, hp_max: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            scale,
            asset_index,
            hp: hp_max,
            hp_max,
        }
    }

    /// On-screen size of the asteroid drawn with `asset`.
    pub fn scaled_size(&self, asset: &AsteroidAsset) -> Vec2 {
        Vec2::new(
            asset.width() as f32 * self.scale,
            asset.height() as f32 * self.scale,
        )
    }

    /// Radius of the circle enclosing the scaled sprite.
    pub fn radius(&self, asset: &AsteroidAsset) -> f32 {
        let size = self.scaled_size(asset);
        0.5 * size.x.max(size.y)
    }
}

/// Where an asteroid is and how big it looks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsteroidInfo {
    pub position: Vec2,
    pub radius: f32,
}

/// Result of [`AsteroidSystem::apply_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Still alive; the index remains valid.
    Alive,
    /// Health reached zero and the asteroid was removed.
    Destroyed,
    /// The index did not name a live asteroid.
    Missed,
}

pub struct AsteroidSystem {
    assets: Vec<AsteroidAsset>,
    asteroids: Vec<Asteroid>,
    popups: Vec<DamagePopup>,
    spawn_timer: f32,
    spawn_interval: f32,
    min_spawn_distance: Option<f32>,
    max_spawn_distance: Option<f32>,
    base_speed: f32,
    rng: fastrand::Rng,
}

impl AsteroidSystem {
    /// Build a system around already loaded templates. Templates past
    /// [`MAX_ASSETS`] are dropped. The first spawn happens on the first update.
    pub fn new(mut assets: Vec<AsteroidAsset>, config: &AsteroidConfig) -> Self {
        if assets.len() > MAX_ASSETS {
            log::warn!(
                "{} asteroid assets given, keeping the first {MAX_ASSETS}",
                assets.len()
            );
            assets.truncate(MAX_ASSETS);
        }

        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        Self {
            assets,
            asteroids: Vec::with_capacity(MAX_ASTEROIDS),
            popups: Vec::with_capacity(MAX_ASTEROIDS),
            spawn_timer: 0.0,
            spawn_interval: config.spawn_interval,
            min_spawn_distance: config.min_spawn_distance.filter(|d| *d > 0.0),
            max_spawn_distance: config.max_spawn_distance.filter(|d| *d > 0.0),
            base_speed: config.base_speed,
            rng,
        }
    }

    /// Scan `dir` for asteroid images and build a system around them.
    pub fn load<S>(dir: impl AsRef<Path>, sink: &mut S, config: &AsteroidConfig) -> Self
    where
        S: TextureSink + ?Sized,
    {
        Self::new(load_dir(dir, sink), config)
    }

    pub fn assets(&self) -> &[AsteroidAsset] {
        &self.assets
    }

    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    pub fn popups(&self) -> &[DamagePopup] {
        &self.popups
    }

    /// Distance from the player past which asteroids are discarded.
    pub fn despawn_radius(&self) -> f32 {
        self.max_spawn_distance
            .unwrap_or(DEFAULT_MAX_SPAWN_DISTANCE)
            + DESPAWN_MARGIN
    }

    /// Place an asteroid directly. Returns its index, or `None` when the pool
    /// is full or the asteroid names an unknown asset.
    pub fn insert(&mut self, asteroid: Asteroid) -> Option<usize> {
        if self.asteroids.len() >= MAX_ASTEROIDS || asteroid.asset_index >= self.assets.len() {
            return None;
        }
        self.asteroids.push(asteroid);
        Some(self.asteroids.len() - 1)
    }

    /// Advance the field by `dt` seconds around `player_position`.
    ///
    /// `viewport` is the screen size in pixels and sizes the spawn band.
    pub fn update(&mut self, dt: f32, viewport: Vec2, player_position: Vec2) {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn(viewport, player_position);
            self.spawn_timer = self.spawn_interval;
        }

        self.integrate_and_despawn(dt, player_position);
        self.resolve_collisions();
        self.update_popups(dt);
    }

    fn integrate_and_despawn(&mut self, dt: f32, player_position: Vec2) {
        let despawn_radius = self.despawn_radius();
        let despawn_sq = despawn_radius * despawn_radius;

        let mut i = 0;
        while i < self.asteroids.len() {
            let asteroid = &mut self.asteroids[i];
            asteroid.position += asteroid.velocity * dt;

            if asteroid.position.distance_squared(player_position) > despawn_sq {
                // The swapped-in asteroid lands on `i` and is visited next.
                self.asteroids.swap_remove(i);
                continue;
            }
            i += 1;
        }
    }

    /// Index and distance of the nearest asteroid within `range` of `position`.
    /// Equal distances keep the earliest index.
    pub fn find_closest(&self, position: Vec2, range: f32) -> Option<(usize, f32)> {
        let mut best_dist_sq = range * range;
        let mut best = None;

        for (index, asteroid) in self.asteroids.iter().enumerate() {
            let dist_sq = asteroid.position.distance_squared(position);
            if dist_sq <= best_dist_sq && (best.is_none() || dist_sq < best_dist_sq) {
                best_dist_sq = dist_sq;
                best = Some(index);
            }
        }

        best.map(|index| (index, best_dist_sq.sqrt()))
    }

    /// Subtract `amount` from an asteroid's health, removing it at zero.
    /// Health never rises above its maximum.
    pub fn apply_damage(&mut self, index: usize, amount: f32) -> DamageOutcome {
        let Some(asteroid) = self.asteroids.get_mut(index) else {
            return DamageOutcome::Missed;
        };

        asteroid.hp = (asteroid.hp - amount).min(asteroid.hp_max);
        if asteroid.hp <= 0.0 {
            self.asteroids.swap_remove(index);
            DamageOutcome::Destroyed
        } else {
            DamageOutcome::Alive
        }
    }

    /// Position and enclosing radius of a live asteroid.
    pub fn info(&self, index: usize) -> Option<AsteroidInfo> {
        let asteroid = self.asteroids.get(index)?;
        let asset = self.assets.get(asteroid.asset_index)?;
        Some(AsteroidInfo {
            position: asteroid.position,
            radius: asteroid.radius(asset),
        })
    }
}
