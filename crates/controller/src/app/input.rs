use std::collections::HashSet;

use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use super::layout::Vec2;
use super::simulation::PointerButton;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Lowercase ASCII letter.
    Char(char),
    Digit(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Enter,
    Space,
    F3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pos: Vec2,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerUp {
        pos: Vec2,
        button: PointerButton,
    },
    PointerMove(Vec2),
    PointerLeave,
    Wheel {
        delta: i32,
        pos: Vec2,
    },
    KeyDown(Key),
}

/// Turns raw window events into shell input. Keys are edge-triggered: holding a key
/// produces one `KeyDown` until it is released.
#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    cursor_position_px: Option<Vec2>,
    modifiers: Modifiers,
    keys_down: HashSet<Key>,
    buttons_down: HashSet<PointerButton>,
}

impl InputCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.set_modifiers(modifiers.state());
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(position.x as f32, position.y as f32))
            }
            WindowEvent::CursorLeft { .. } => Some(self.cursor_left()),
            WindowEvent::MouseInput { state, button, .. } => self.mouse_input(*button, *state),
            WindowEvent::MouseWheel { delta, .. } => self.mouse_wheel(*delta),
            WindowEvent::KeyboardInput { event, .. } => {
                let key = key_from_physical(event.physical_key)?;
                self.key_state(key, event.state)
            }
            _ => None,
        }
    }

    fn set_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = Modifiers {
            ctrl: state.control_key() || state.super_key(),
            shift: state.shift_key(),
        };
    }

    fn cursor_moved(&mut self, x: f32, y: f32) -> InputEvent {
        let pos = Vec2::new(x, y);
        self.cursor_position_px = Some(pos);
        InputEvent::PointerMove(pos)
    }

    fn cursor_left(&mut self) -> InputEvent {
        self.cursor_position_px = None;
        self.buttons_down.clear();
        InputEvent::PointerLeave
    }

    fn mouse_input(&mut self, button: MouseButton, state: ElementState) -> Option<InputEvent> {
        let button = pointer_button(button)?;
        let pos = self.cursor_position_px?;
        match state {
            ElementState::Pressed => {
                if !self.buttons_down.insert(button) {
                    return None;
                }
                Some(InputEvent::PointerDown {
                    pos,
                    button,
                    modifiers: self.modifiers,
                })
            }
            ElementState::Released => {
                if !self.buttons_down.remove(&button) {
                    return None;
                }
                Some(InputEvent::PointerUp { pos, button })
            }
        }
    }

    fn mouse_wheel(&mut self, delta: MouseScrollDelta) -> Option<InputEvent> {
        let pos = self.cursor_position_px?;
        let delta = wheel_steps(delta);
        (delta != 0).then_some(InputEvent::Wheel { delta, pos })
    }

    fn key_state(&mut self, key: Key, state: ElementState) -> Option<InputEvent> {
        match state {
            ElementState::Pressed => self.keys_down.insert(key).then_some(InputEvent::KeyDown(key)),
            ElementState::Released => {
                self.keys_down.remove(&key);
                None
            }
        }
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

fn key_from_physical(key: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let key = match code {
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Space => Key::Space,
        KeyCode::F3 => Key::F3,
        KeyCode::Digit0 | KeyCode::Numpad0 => Key::Digit(0),
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Digit(1),
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Digit(2),
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Digit(3),
        KeyCode::Digit4 | KeyCode::Numpad4 => Key::Digit(4),
        KeyCode::Digit5 | KeyCode::Numpad5 => Key::Digit(5),
        KeyCode::Digit6 | KeyCode::Numpad6 => Key::Digit(6),
        KeyCode::Digit7 | KeyCode::Numpad7 => Key::Digit(7),
        KeyCode::Digit8 | KeyCode::Numpad8 => Key::Digit(8),
        KeyCode::Digit9 | KeyCode::Numpad9 => Key::Digit(9),
        other => Key::Char(letter_for(other)?),
    };
    Some(key)
}

fn letter_for(code: KeyCode) -> Option<char> {
    const LETTERS: [(KeyCode, char); 26] = [
        (KeyCode::KeyA, 'a'),
        (KeyCode::KeyB, 'b'),
        (KeyCode::KeyC, 'c'),
        (KeyCode::KeyD, 'd'),
        (KeyCode::KeyE, 'e'),
        (KeyCode::KeyF, 'f'),
        (KeyCode::KeyG, 'g'),
        (KeyCode::KeyH, 'h'),
        (KeyCode::KeyI, 'i'),
        (KeyCode::KeyJ, 'j'),
        (KeyCode::KeyK, 'k'),
        (KeyCode::KeyL, 'l'),
        (KeyCode::KeyM, 'm'),
        (KeyCode::KeyN, 'n'),
        (KeyCode::KeyO, 'o'),
        (KeyCode::KeyP, 'p'),
        (KeyCode::KeyQ, 'q'),
        (KeyCode::KeyR, 'r'),
        (KeyCode::KeyS, 's'),
        (KeyCode::KeyT, 't'),
        (KeyCode::KeyU, 'u'),
        (KeyCode::KeyV, 'v'),
        (KeyCode::KeyW, 'w'),
        (KeyCode::KeyX, 'x'),
        (KeyCode::KeyY, 'y'),
        (KeyCode::KeyZ, 'z'),
    ];
    LETTERS
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, letter)| *letter)
}

fn wheel_steps(delta: MouseScrollDelta) -> i32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y.round() as i32,
        MouseScrollDelta::PixelDelta(position) => {
            if position.y > 0.0 {
                1
            } else if position.y < 0.0 {
                -1
            } else {
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_key_does_not_repeat_key_down() {
        let mut input = InputCollector::new();

        let first = input.key_state(Key::Char('e'), ElementState::Pressed);
        let repeat = input.key_state(Key::Char('e'), ElementState::Pressed);
        input.key_state(Key::Char('e'), ElementState::Released);
        let again = input.key_state(Key::Char('e'), ElementState::Pressed);

        assert_eq!(first, Some(InputEvent::KeyDown(Key::Char('e'))));
        assert_eq!(repeat, None);
        assert_eq!(again, Some(InputEvent::KeyDown(Key::Char('e'))));
    }

    #[test]
    fn physical_keys_map_to_shell_keys() {
        assert_eq!(
            key_from_physical(PhysicalKey::Code(KeyCode::KeyP)),
            Some(Key::Char('p'))
        );
        assert_eq!(
            key_from_physical(PhysicalKey::Code(KeyCode::Digit0)),
            Some(Key::Digit(0))
        );
        assert_eq!(
            key_from_physical(PhysicalKey::Code(KeyCode::F3)),
            Some(Key::F3)
        );
        assert_eq!(key_from_physical(PhysicalKey::Code(KeyCode::F12)), None);
    }

    #[test]
    fn mouse_buttons_need_a_cursor_position() {
        let mut input = InputCollector::new();
        assert_eq!(
            input.mouse_input(MouseButton::Left, ElementState::Pressed),
            None
        );

        input.cursor_moved(10.0, 20.0);
        let down = input.mouse_input(MouseButton::Left, ElementState::Pressed);
        assert_eq!(
            down,
            Some(InputEvent::PointerDown {
                pos: Vec2::new(10.0, 20.0),
                button: PointerButton::Primary,
                modifiers: Modifiers::default(),
            })
        );
    }

    #[test]
    fn release_without_press_is_dropped() {
        let mut input = InputCollector::new();
        input.cursor_moved(1.0, 1.0);

        assert_eq!(
            input.mouse_input(MouseButton::Left, ElementState::Released),
            None
        );
        input.mouse_input(MouseButton::Left, ElementState::Pressed);
        assert!(matches!(
            input.mouse_input(MouseButton::Left, ElementState::Released),
            Some(InputEvent::PointerUp { .. })
        ));
    }

    #[test]
    fn ctrl_modifier_rides_along_with_pointer_down() {
        let mut input = InputCollector::new();
        input.set_modifiers(ModifiersState::CONTROL);
        input.cursor_moved(5.0, 5.0);

        let Some(InputEvent::PointerDown { modifiers, .. }) =
            input.mouse_input(MouseButton::Left, ElementState::Pressed)
        else {
            panic!("expected pointer down");
        };
        assert!(modifiers.ctrl);
    }

    #[test]
    fn cursor_leave_releases_held_buttons() {
        let mut input = InputCollector::new();
        input.cursor_moved(5.0, 5.0);
        input.mouse_input(MouseButton::Left, ElementState::Pressed);

        assert_eq!(input.cursor_left(), InputEvent::PointerLeave);
        input.cursor_moved(6.0, 6.0);
        assert!(input
            .mouse_input(MouseButton::Left, ElementState::Pressed)
            .is_some());
    }

    #[test]
    fn pixel_wheel_delta_maps_to_single_step() {
        let positive = wheel_steps(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, 3.0),
        ));
        let none = wheel_steps(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, 0.0),
        ));

        assert_eq!(positive, 1);
        assert_eq!(none, 0);
    }
}
