use super::{Key, KeyState};
use std::collections::HashSet;
use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Debug, Default)]
pub struct InputState {
    pressed: HashSet<KeyCode>,
}

impl InputState {
    pub fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match state {
            ElementState::Pressed => {
                self.pressed.insert(code);
            }
            ElementState::Released => {
                self.pressed.remove(&code);
            }
        }
    }

    pub fn key_state(&self, key: Key) -> KeyState {
        let code = match key {
            Key::Escape => KeyCode::Escape,
        };
        if self.pressed.contains(&code) {
            KeyState::Pressed
        } else {
            KeyState::Released
        }
    }

    /// Forgets held keys, e.g. after focus loss when release events never arrive.
    pub fn reset(&mut self) {
        self.pressed.clear();
    }
}
