//! Application modes and key bindings

use std::collections::HashMap;

use winit::event::ElementState;
use winit::keyboard::KeyCode;

use crate::core::camera_controller::Movement;

/// Interaction mode of the application
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AppMode {
    /// Cursor visible, GUI panel active
    #[default]
    Modify,
    /// Cursor captured, camera flies freely
    Freefly,
}

/// Key transition a binding reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Press,
    Release,
}

impl KeyAction {
    /// Map a winit element state, ignoring key repeats
    pub fn from_state(state: ElementState, repeat: bool) -> Option<Self> {
        match (state, repeat) {
            (_, true) => None,
            (ElementState::Pressed, false) => Some(Self::Press),
            (ElementState::Released, false) => Some(Self::Release),
        }
    }
}

/// Action produced by a key binding
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    EnterFreefly,
    EnterModify,
    ResetCamera,
    Move(Movement, bool),
}

/// Table of `(key, action, mode)` to command lists
#[derive(Clone, Debug)]
pub struct KeyBindings {
    bindings: HashMap<(KeyCode, KeyAction, AppMode), Vec<Command>>,
}

impl KeyBindings {
    /// Empty binding table
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Append a command to a binding
    pub fn bind(&mut self, key: KeyCode, action: KeyAction, mode: AppMode, command: Command) {
        self.bindings
            .entry((key, action, mode))
            .or_default()
            .push(command);
    }

    /// Commands bound to the key transition in `mode`, in binding order
    pub fn lookup(&self, key: KeyCode, action: KeyAction, mode: AppMode) -> &[Command] {
        self.bindings
            .get(&(key, action, mode))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self::empty();

        bindings.bind(KeyCode::Escape, KeyAction::Press, AppMode::Modify, Command::EnterFreefly);
        bindings.bind(KeyCode::Escape, KeyAction::Press, AppMode::Freefly, Command::EnterModify);
        bindings.bind(KeyCode::Escape, KeyAction::Press, AppMode::Freefly, Command::ResetCamera);

        let movement_keys = [
            (KeyCode::KeyW, Movement::Forward),
            (KeyCode::KeyS, Movement::Backward),
            (KeyCode::KeyD, Movement::Right),
            (KeyCode::KeyA, Movement::Left),
            (KeyCode::ShiftLeft, Movement::SpeedUp),
        ];
        for (key, movement) in movement_keys {
            bindings.bind(key, KeyAction::Press, AppMode::Freefly, Command::Move(movement, true));
            bindings.bind(key, KeyAction::Release, AppMode::Freefly, Command::Move(movement, false));
        }

        bindings
    }
}
