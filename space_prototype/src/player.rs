use std::f32::consts::FRAC_PI_2;

use anyhow::Result;
use space_engine::{
    Camera2D, Frame, InputState, KeyCode, MouseButton, Rect, Renderer, SpriteAnim, TextureHandle,
    Transform2D, Vec2,
};

use crate::config::PlayerConfig;

const IDLE_FRAME_TIME: f32 = 0.12;
const BOOST_FRAME_TIME: f32 = 0.08;

/// Flame sits this fraction of the ship height behind its center.
const ENGINE_OFFSET: f32 = 0.05;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// What the player asked for this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Raw direction from the movement keys, each axis in -1..=1.
    pub movement: Vec2,
    pub boost: bool,
    /// Mouse cursor in world space.
    pub aim: Vec2,
}

impl PlayerInput {
    /// WASD or arrow keys to move, right mouse button to boost.
    pub fn read(input: &InputState, camera: &Camera2D) -> Self {
        let mut movement = Vec2::ZERO;
        if input.any_key_down(&[KeyCode::KeyW, KeyCode::ArrowUp]) {
            movement.y -= 1.0;
        }
        if input.any_key_down(&[KeyCode::KeyS, KeyCode::ArrowDown]) {
            movement.y += 1.0;
        }
        if input.any_key_down(&[KeyCode::KeyA, KeyCode::ArrowLeft]) {
            movement.x -= 1.0;
        }
        if input.any_key_down(&[KeyCode::KeyD, KeyCode::ArrowRight]) {
            movement.x += 1.0;
        }

        Self {
            movement,
            boost: input.is_mouse_down(MouseButton::Right),
            aim: camera.screen_to_world(input.mouse_position()),
        }
    }
}

/// Ship body plus the two engine flame animations.
pub struct PlayerSprites {
    pub body: TextureHandle,
    pub body_size: (u32, u32),
    pub engine_idle: SpriteAnim,
    pub engine_boost: SpriteAnim,
}

impl PlayerSprites {
    pub fn new(
        body: TextureHandle,
        body_size: (u32, u32),
        engine_idle: space_engine::SpriteSheet,
        engine_boost: space_engine::SpriteSheet,
    ) -> Self {
        Self {
            body,
            body_size,
            engine_idle: SpriteAnim::new(engine_idle, IDLE_FRAME_TIME),
            engine_boost: SpriteAnim::new(engine_boost, BOOST_FRAME_TIME),
        }
    }
}

pub struct Player {
    pub position: Vec2,
    /// Sprite rotation in radians; zero points the nose up.
    pub angle: f32,
    /// Unit vector towards the cursor.
    pub facing: Vec2,
    /// Ship sprite size, used for map clamping and the beam origin.
    pub size: Vec2,
    pub speed: f32,
    pub boost_speed: f32,
    boosting: bool,
    sprites: Option<PlayerSprites>,
}

impl Player {
    pub fn new(position: Vec2, config: &PlayerConfig) -> Self {
        Self {
            position,
            angle: 0.0,
            facing: Vec2::new(0.0, -1.0),
            size: Vec2::ZERO,
            speed: config.speed,
            boost_speed: config.boost_speed,
            boosting: false,
            sprites: None,
        }
    }

    pub fn set_sprites(&mut self, sprites: PlayerSprites) {
        self.size = Vec2::new(sprites.body_size.0 as f32, sprites.body_size.1 as f32);
        self.sprites = Some(sprites);
    }

    pub fn is_boosting(&self) -> bool {
        self.boosting
    }

    /// Distance from the ship center to its nose.
    pub fn nose_offset(&self) -> f32 {
        self.size.y * 0.5
    }

    pub fn update(&mut self, dt: f32, input: &PlayerInput, map: Rect) {
        self.boosting = input.boost;
        let direction = input.movement.normalized();
        if direction != Vec2::ZERO {
            let speed = if self.boosting {
                self.boost_speed
            } else {
                self.speed
            };
            self.position += direction * speed * dt;
        }

        let to_aim = input.aim - self.position;
        self.angle = to_aim.angle() + FRAC_PI_2;
        let facing = to_aim.normalized();
        if facing != Vec2::ZERO {
            self.facing = facing;
        }

        let half = self.size * 0.5;
        self.position.x = self.position.x.max(map.x + half.x).min(map.right() - half.x);
        self.position.y = self.position.y.max(map.y + half.y).min(map.bottom() - half.y);

        if let Some(sprites) = &mut self.sprites {
            sprites.engine_idle.update(dt);
            sprites.engine_boost.update(dt);
        }
    }

    /// Engine flame behind the ship, then the ship itself.
    pub fn draw(&self, renderer: &mut Renderer, frame: &mut Frame, camera: &Camera2D) -> Result<()> {
        let Some(sprites) = &self.sprites else {
            return Ok(());
        };

        let engine = if self.boosting {
            &sprites.engine_boost
        } else {
            &sprites.engine_idle
        };
        let engine_position = self.position - self.facing * (self.size.y * ENGINE_OFFSET);
        renderer.draw_sprite_anim(frame, engine, engine_position, 1.0, self.angle, WHITE, camera)?;

        let transform = Transform2D::new(self.position, Vec2::ONE, self.angle);
        renderer.draw_texture_region(frame, sprites.body, None, &transform, WHITE, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn player() -> Player {
        let mut player = Player::new(Vec2::new(2500.0, 1500.0), &PlayerConfig::default());
        player.size = Vec2::new(48.0, 48.0);
        player
    }

    fn map() -> Rect {
        Rect::new(0.0, 0.0, 5000.0, 3000.0)
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut player = player();
        let input = PlayerInput {
            movement: Vec2::new(1.0, 1.0),
            boost: false,
            aim: Vec2::new(2500.0, 0.0),
        };
        player.update(1.0, &input, map());

        let moved = player.position - Vec2::new(2500.0, 1500.0);
        assert_relative_eq!(moved.length(), 200.0, epsilon = 1e-3);
        assert_relative_eq!(moved.x, moved.y, epsilon = 1e-3);
    }

    #[test]
    fn boost_uses_boost_speed() {
        let mut player = player();
        let input = PlayerInput {
            movement: Vec2::new(1.0, 0.0),
            boost: true,
            aim: Vec2::ZERO,
        };
        player.update(0.5, &input, map());
        assert_relative_eq!(player.position.x, 2710.0, epsilon = 1e-3);
        assert!(player.is_boosting());
    }

    #[test]
    fn nose_points_at_the_cursor() {
        let mut player = player();
        let input = PlayerInput {
            aim: Vec2::new(2600.0, 1500.0),
            ..PlayerInput::default()
        };
        player.update(0.016, &input, map());

        // Cursor to the right: the up-facing sprite turns a quarter clockwise.
        assert_relative_eq!(player.angle, FRAC_PI_2, epsilon = 1e-5);
        assert_relative_eq!(player.facing.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn aim_on_the_ship_keeps_the_last_facing() {
        let mut player = player();
        let input = PlayerInput {
            aim: player.position,
            ..PlayerInput::default()
        };
        player.update(0.016, &input, map());
        assert_eq!(player.facing, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn ship_stays_inside_the_map() {
        let mut player = player();
        player.position = Vec2::new(10.0, 2990.0);
        let input = PlayerInput {
            movement: Vec2::new(-1.0, 1.0),
            ..PlayerInput::default()
        };
        player.update(1.0, &input, map());
        assert_eq!(player.position, Vec2::new(24.0, 2976.0));
    }
}
