use flycube_camera::Direction;
use winit::keyboard::KeyCode;

/// Physical key assignments for camera movement and exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub up: KeyCode,
    pub down: KeyCode,
    pub exit: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            backward: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            up: KeyCode::KeyE,
            down: KeyCode::KeyQ,
            exit: KeyCode::Escape,
        }
    }
}

impl KeyBindings {
    pub fn key_for(&self, direction: Direction) -> KeyCode {
        match direction {
            Direction::Forward => self.forward,
            Direction::Backward => self.backward,
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    /// The movement direction bound to `key`, if any.
    pub fn direction_for(&self, key: KeyCode) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.key_for(*direction) == key)
    }

    pub fn is_exit(&self, key: KeyCode) -> bool {
        self.exit == key
    }
}
