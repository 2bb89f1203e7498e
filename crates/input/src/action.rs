use flycube_camera::{Direction, PerspectiveCamera};
use serde::{Deserialize, Serialize};

/// A high-level camera action produced from input.
///
/// Actions are serializable so that scripted input can be replayed without a
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Move the camera for one frame.
    Move(Direction),
    /// Rotate by a mouse delta in pixels (positive `dy` looks up).
    Look { dx: f32, dy: f32 },
    /// Zoom by a scroll delta (positive narrows the field of view).
    Zoom(f32),
    /// Leave the application.
    Exit,
}

impl Action {
    /// Apply the action to `camera` for a frame of `dt` seconds.
    ///
    /// Returns `false` for [`Action::Exit`], which the camera ignores.
    pub fn apply(&self, camera: &mut PerspectiveCamera, dt: f32) -> bool {
        match *self {
            Action::Move(direction) => camera.process_move(direction, dt),
            Action::Look { dx, dy } => camera.process_look(dx, dy),
            Action::Zoom(offset) => camera.process_zoom(offset),
            Action::Exit => return false,
        }
        true
    }
}
