use space_engine::Vec2;

use super::{AsteroidSystem, MAX_ASTEROIDS};

/// Seconds a popup stays on screen.
pub const POPUP_LIFETIME: f32 = 0.6;

/// Upward drift in units per second.
const POPUP_RISE_SPEED: f32 = 12.0;

/// Maximum whole-unit offset applied to each axis at creation.
pub const POPUP_JITTER: i32 = 8;

pub const POPUP_FONT_SIZE: f32 = 14.0;

/// Warm orange; alpha comes from [`DamagePopup::alpha`].
pub const POPUP_COLOR: [f32; 3] = [1.0, 210.0 / 255.0, 120.0 / 255.0];

/// Floating damage number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamagePopup {
    pub position: Vec2,
    pub value: f32,
    pub timer: f32,
    pub lifetime: f32,
}

impl DamagePopup {
    pub fn new(position: Vec2, value: f32) -> Self {
        Self {
            position,
            value,
            timer: 0.0,
            lifetime: POPUP_LIFETIME,
        }
    }

    /// Opacity fading linearly from 1 to 0 over the lifetime.
    pub fn alpha(&self) -> f32 {
        let t = if self.lifetime > 0.0 {
            self.timer / self.lifetime
        } else {
            1.0
        };
        1.0 - t.clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.timer >= self.lifetime
    }

    /// Text shown for the popup, e.g. `+12`.
    pub fn label(&self) -> String {
        format!("+{}", self.value.round() as i64)
    }
}

impl AsteroidSystem {
    /// Queue a damage number near `position`. Dropped when the popup pool is full.
    pub fn add_popup(&mut self, position: Vec2, value: f32) {
        if self.popups.len() >= MAX_ASTEROIDS {
            return;
        }

        let jitter = Vec2::new(
            self.rng.i32(-POPUP_JITTER..=POPUP_JITTER) as f32,
            self.rng.i32(-POPUP_JITTER..=POPUP_JITTER) as f32,
        );
        self.popups.push(DamagePopup::new(position + jitter, value));
    }

    pub(crate) fn update_popups(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.popups.len() {
            let popup = &mut self.popups[i];
            popup.timer += dt;
            popup.position.y -= POPUP_RISE_SPEED * dt;
            if popup.is_expired() {
                self.popups.swap_remove(i);
                continue;
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn alpha_fades_and_clamps() {
        let mut popup = DamagePopup::new(Vec2::ZERO, 3.0);
        assert_relative_eq!(popup.alpha(), 1.0);

        popup.timer = 0.3;
        assert_relative_eq!(popup.alpha(), 0.5, epsilon = 1e-6);

        popup.timer = 2.0;
        assert_eq!(popup.alpha(), 0.0);

        popup.timer = -1.0;
        assert_eq!(popup.alpha(), 1.0);
    }

    #[test]
    fn label_rounds_to_whole_numbers() {
        assert_eq!(DamagePopup::new(Vec2::ZERO, 5.4).label(), "+5");
        assert_eq!(DamagePopup::new(Vec2::ZERO, 5.5).label(), "+6");
        assert_eq!(DamagePopup::new(Vec2::ZERO, 0.0).label(), "+0");
    }

    #[test]
    fn expiry_is_inclusive() {
        let mut popup = DamagePopup::new(Vec2::ZERO, 1.0);
        popup.timer = POPUP_LIFETIME - 0.001;
        assert!(!popup.is_expired());
        popup.timer = POPUP_LIFETIME;
        assert!(popup.is_expired());
    }
}
