use crate::action::Action;
use crate::bindings::KeyBindings;
use crate::mouse::MouseTracker;
use flycube_camera::{Direction, PerspectiveCamera};
use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Input collected between frames.
///
/// Cursor and scroll events are queued as they arrive; held movement keys are
/// sampled when the frame drains the state.
#[derive(Debug, Default)]
pub struct InputState {
    bindings: KeyBindings,
    keys_held: HashSet<KeyCode>,
    mouse: MouseTracker,
    pending: Vec<Action>,
    exit_requested: bool,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            self.keys_held.remove(&key);
            return;
        }
        self.keys_held.insert(key);
        if self.bindings.is_exit(key) {
            tracing::debug!("exit key pressed");
            self.exit_requested = true;
        }
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        if let Some((dx, dy)) = self.mouse.track(x, y) {
            if dx != 0.0 || dy != 0.0 {
                self.pending.push(Action::Look { dx, dy });
            }
        }
    }

    /// The cursor left the window; its next position is not a delta.
    pub fn cursor_left(&mut self) {
        self.mouse.reset();
    }

    /// The overlay took the cursor (e.g. while dragging a panel). Positions it
    /// saw are not look input, so the next one starts a fresh delta.
    pub fn cursor_captured(&mut self) {
        self.mouse.reset();
    }

    pub fn scroll(&mut self, offset: f32) {
        if offset != 0.0 {
            self.pending.push(Action::Zoom(offset));
        }
    }

    /// Drop held keys, e.g. when the window loses focus and releases are never seen.
    pub fn release_all(&mut self) {
        self.keys_held.clear();
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Drain this frame's actions: queued look/zoom events, then one move per held direction.
    pub fn frame_actions(&mut self) -> Vec<Action> {
        let mut actions = std::mem::take(&mut self.pending);
        actions.extend(
            Direction::ALL
                .into_iter()
                .filter(|direction| self.keys_held.contains(&self.bindings.key_for(*direction)))
                .map(Action::Move),
        );
        actions
    }

    /// Drain this frame's actions into `camera`. Returns how many were applied.
    pub fn apply_frame(&mut self, camera: &mut PerspectiveCamera, dt: f32) -> usize {
        let actions = self.frame_actions();
        for action in &actions {
            action.apply(camera, dt);
        }
        actions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_produce_moves_every_frame() {
        let mut input = InputState::default();
        input.handle_key(KeyCode::KeyW, true);
        input.handle_key(KeyCode::KeyE, true);
        let expected = vec![Action::Move(Direction::Forward), Action::Move(Direction::Up)];
        assert_eq!(input.frame_actions(), expected);
        assert_eq!(input.frame_actions(), expected);

        input.handle_key(KeyCode::KeyW, false);
        assert_eq!(input.frame_actions(), vec![Action::Move(Direction::Up)]);
    }

    #[test]
    fn cursor_and_scroll_are_queued_once() {
        let mut input = InputState::default();
        input.cursor_moved(100.0, 100.0);
        input.cursor_moved(110.0, 95.0);
        input.scroll(1.5);
        assert_eq!(
            input.frame_actions(),
            vec![Action::Look { dx: 10.0, dy: 5.0 }, Action::Zoom(1.5)]
        );
        assert!(input.frame_actions().is_empty());
    }

    #[test]
    fn cursor_leave_prevents_jump() {
        let mut input = InputState::default();
        input.cursor_moved(0.0, 0.0);
        input.cursor_left();
        input.cursor_moved(900.0, 700.0);
        assert!(input.frame_actions().is_empty());
    }

    #[test]
    fn captured_cursor_does_not_turn_into_look() {
        let mut input = InputState::default();
        input.cursor_moved(100.0, 100.0);
        // the overlay consumed a drag; the first sample after it only re-anchors
        input.cursor_captured();
        input.cursor_moved(400.0, 100.0);
        assert!(input.frame_actions().is_empty());

        input.cursor_moved(405.0, 100.0);
        assert_eq!(input.frame_actions(), vec![Action::Look { dx: 5.0, dy: 0.0 }]);
    }

    #[test]
    fn exit_key_requests_exit() {
        let mut input = InputState::default();
        assert!(!input.exit_requested());
        input.handle_key(KeyCode::Escape, true);
        assert!(input.exit_requested());
    }

    #[test]
    fn release_all_stops_movement() {
        let mut input = InputState::default();
        input.handle_key(KeyCode::KeyA, true);
        input.release_all();
        assert!(input.frame_actions().is_empty());
    }

    #[test]
    fn apply_frame_moves_camera() {
        let mut input = InputState::default();
        let mut cam = PerspectiveCamera::default();
        input.handle_key(KeyCode::KeyD, true);
        assert_eq!(input.apply_frame(&mut cam, 0.1), 1);
        assert!(cam.view_position().x > 0.0);
    }
}
