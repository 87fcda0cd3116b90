use std::collections::HashSet;

use winit::{
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::math::Vec2;

/// Trackpads report pixels; this many count as one wheel notch.
const PIXELS_PER_NOTCH: f64 = 40.0;

/// Keyboard and mouse state, fed from window events.
///
/// `held` state persists across frames. Key presses and wheel movement
/// are per frame and reset by [`InputState::begin_frame`].
#[derive(Debug, Default)]
pub struct InputState {
    held_keys: HashSet<KeyCode>,
    new_keys: HashSet<KeyCode>,
    held_buttons: HashSet<MouseButton>,
    cursor: Vec2,
    wheel: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self) {
        self.new_keys.clear();
        self.wheel = 0.0;
    }

    pub fn handle_key(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(code) = event.physical_key {
            self.set_key(code, event.state);
        }
    }

    fn set_key(&mut self, code: KeyCode, state: ElementState) {
        if state.is_pressed() {
            // OS key repeat arrives as more presses; only the first counts.
            if self.held_keys.insert(code) {
                self.new_keys.insert(code);
            }
        } else {
            self.held_keys.remove(&code);
        }
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if state.is_pressed() {
            self.held_buttons.insert(button);
        } else {
            self.held_buttons.remove(&button);
        }
    }

    pub fn handle_cursor_moved(&mut self, x: f64, y: f64) {
        self.cursor = Vec2::new(x as f32, y as f32);
    }

    pub fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        self.wheel += match delta {
            MouseScrollDelta::LineDelta(_, lines) => lines,
            MouseScrollDelta::PixelDelta(pixels) => (pixels.y / PIXELS_PER_NOTCH) as f32,
        };
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.held_keys.contains(&key)
    }

    /// Went down since the last `begin_frame`.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.new_keys.contains(&key)
    }

    pub fn any_key_down(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|key| self.held_keys.contains(key))
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.held_buttons.contains(&button)
    }

    /// Cursor in window pixels, origin top-left.
    pub fn mouse_position(&self) -> Vec2 {
        self.cursor
    }

    /// Wheel notches this frame, positive away from the user.
    pub fn wheel_delta(&self) -> f32 {
        self.wheel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn key_repeat_is_not_a_new_press() {
        let mut input = InputState::new();
        input.set_key(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.is_key_pressed(KeyCode::KeyW));
        assert!(input.is_key_down(KeyCode::KeyW));

        input.begin_frame();
        input.set_key(KeyCode::KeyW, ElementState::Pressed);
        assert!(!input.is_key_pressed(KeyCode::KeyW));
        assert!(input.any_key_down(&[KeyCode::ArrowUp, KeyCode::KeyW]));

        input.set_key(KeyCode::KeyW, ElementState::Released);
        assert!(!input.is_key_down(KeyCode::KeyW));
        assert!(!input.any_key_down(&[KeyCode::ArrowUp, KeyCode::KeyW]));
    }

    #[test]
    fn wheel_resets_each_frame() {
        let mut input = InputState::new();
        input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.handle_mouse_wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 80.0)));
        assert_eq!(input.wheel_delta(), 3.0);

        input.begin_frame();
        assert_eq!(input.wheel_delta(), 0.0);
    }

    #[test]
    fn buttons_are_held_until_released() {
        let mut input = InputState::new();
        input.handle_mouse_button(MouseButton::Right, ElementState::Pressed);
        input.begin_frame();
        assert!(input.is_mouse_down(MouseButton::Right));
        assert!(!input.is_mouse_down(MouseButton::Left));

        input.handle_mouse_button(MouseButton::Right, ElementState::Released);
        assert!(!input.is_mouse_down(MouseButton::Right));
    }

    #[test]
    fn cursor_follows_moves() {
        let mut input = InputState::new();
        input.handle_cursor_moved(12.5, 300.0);
        assert_eq!(input.mouse_position(), Vec2::new(12.5, 300.0));
    }
}
