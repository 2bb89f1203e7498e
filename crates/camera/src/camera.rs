use crate::direction::Direction;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Fixed world-space up axis.
pub const WORLD_UP: Vec3 = Vec3::Y;
/// Pitch is clamped to `[-PITCH_LIMIT, PITCH_LIMIT]` degrees to avoid flipping over the poles.
pub const PITCH_LIMIT: f32 = 89.0;
pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 45.0;

/// Tuning and initial pose for a [`PerspectiveCamera`].
///
/// Angles are in degrees. Missing fields deserialize to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    /// World units per second.
    pub speed: f32,
    /// Degrees per pixel of mouse motion.
    pub sensitivity: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            yaw: -90.0,
            pitch: 0.0,
            zoom: ZOOM_MAX,
            speed: 10.0,
            sensitivity: 0.2,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Orthonormal camera basis derived from yaw and pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub front: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Basis {
    /// Build the basis for the given yaw and pitch (degrees) around `world_up`.
    pub fn from_euler(yaw: f32, pitch: f32, world_up: Vec3) -> Self {
        let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
        let front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        let right = front.cross(world_up).normalize();
        let up = right.cross(front).normalize();
        Self { front, right, up }
    }
}

/// Free-fly perspective camera driven by movement, look and zoom events.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    position: Vec3,
    world_up: Vec3,
    basis: Basis,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    speed: f32,
    sensitivity: f32,
    near: f32,
    far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(CameraSettings::default())
    }
}

impl PerspectiveCamera {
    /// Create a camera from settings. Pitch and zoom are clamped into range;
    /// non-finite angles fall back to the defaults.
    pub fn new(settings: CameraSettings) -> Self {
        let defaults = CameraSettings::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };
        let yaw = finite_or(settings.yaw, defaults.yaw);
        let pitch = finite_or(settings.pitch, defaults.pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let zoom = finite_or(settings.zoom, defaults.zoom).clamp(ZOOM_MIN, ZOOM_MAX);
        Self {
            position: settings.position,
            world_up: WORLD_UP,
            basis: Basis::from_euler(yaw, pitch, WORLD_UP),
            yaw,
            pitch,
            zoom,
            speed: settings.speed,
            sensitivity: settings.sensitivity,
            near: settings.near,
            far: settings.far,
        }
    }

    /// View transform looking from the camera position along `front`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            self.position,
            self.position + self.basis.front,
            self.basis.up,
        )
    }

    /// Perspective projection using the current zoom as vertical field of view.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, self.near, self.far)
    }

    pub fn view_position(&self) -> Vec3 {
        self.position
    }

    /// Field of view in degrees.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn basis(&self) -> Basis {
        self.basis
    }

    pub fn front(&self) -> Vec3 {
        self.basis.front
    }

    pub fn right(&self) -> Vec3 {
        self.basis.right
    }

    pub fn up(&self) -> Vec3 {
        self.basis.up
    }

    /// Translate the camera by `speed * dt` along `direction`.
    pub fn process_move(&mut self, direction: Direction, dt: f32) {
        let velocity = self.speed * dt;
        self.position += direction.displacement(&self.basis, self.world_up) * velocity;
    }

    /// Apply a mouse delta in pixels. Positive `y_offset` looks up.
    pub fn process_look(&mut self, x_offset: f32, y_offset: f32) {
        if !(x_offset.is_finite() && y_offset.is_finite()) {
            return;
        }
        self.yaw += x_offset * self.sensitivity;
        self.pitch = (self.pitch + y_offset * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.basis = Basis::from_euler(self.yaw, self.pitch, self.world_up);
    }

    /// Apply a scroll delta. Scrolling up (positive) narrows the field of view.
    pub fn process_zoom(&mut self, scroll_offset: f32) {
        if !scroll_offset.is_finite() {
            return;
        }
        self.zoom = (self.zoom - scroll_offset).clamp(ZOOM_MIN, ZOOM_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(basis: Basis) {
        let Basis { front, right, up } = basis;
        assert!((front.length() - 1.0).abs() < EPS);
        assert!((right.length() - 1.0).abs() < EPS);
        assert!((up.length() - 1.0).abs() < EPS);
        assert!(front.dot(right).abs() < EPS);
        assert!(front.dot(up).abs() < EPS);
        assert!(right.dot(up).abs() < EPS);
        // right-handed: (right, up, -front)
        assert!(right.cross(up).abs_diff_eq(-front, EPS));
    }

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.yaw(), -90.0);
        assert_eq!(cam.pitch(), 0.0);
        assert_eq!(cam.zoom(), 45.0);
        assert_eq!(cam.view_position(), Vec3::new(0.0, 0.0, 5.0));
        assert!(cam.front().abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), EPS));
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn basis_stays_orthonormal_while_looking_around() {
        let mut cam = PerspectiveCamera::default();
        assert_orthonormal(cam.basis());
        for step in 0..400 {
            let dx = ((step * 37) % 101) as f32 - 50.0;
            let dy = ((step * 53) % 67) as f32 - 33.0;
            cam.process_look(dx * 3.0, dy * 3.0);
            assert_orthonormal(cam.basis());
        }
    }

    #[test]
    fn basis_orthonormal_at_pitch_limits() {
        for yaw in [-720.0, -90.0, 0.0, 45.0, 180.0, 1234.5] {
            for pitch in [-PITCH_LIMIT, -45.0, 0.0, 60.0, PITCH_LIMIT] {
                assert_orthonormal(Basis::from_euler(yaw, pitch, WORLD_UP));
            }
        }
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = PerspectiveCamera::default();
        cam.process_look(0.0, 1.0e6);
        assert_eq!(cam.pitch(), PITCH_LIMIT);
        cam.process_look(0.0, -1.0e7);
        assert_eq!(cam.pitch(), -PITCH_LIMIT);
        for _ in 0..100 {
            cam.process_look(0.0, 5_000.0);
            assert!(cam.pitch() <= PITCH_LIMIT);
        }
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut cam = PerspectiveCamera::default();
        cam.process_look(10_000.0, 0.0);
        assert!(cam.yaw() > 360.0);
        assert_orthonormal(cam.basis());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = PerspectiveCamera::default();
        cam.process_zoom(-1.0e6);
        assert_eq!(cam.zoom(), ZOOM_MAX);
        cam.process_zoom(1.0e6);
        assert_eq!(cam.zoom(), ZOOM_MIN);
        cam.process_zoom(-4.0);
        assert_eq!(cam.zoom(), 5.0);
    }

    #[test]
    fn settings_are_clamped_on_construction() {
        let cam = PerspectiveCamera::new(CameraSettings {
            pitch: 120.0,
            zoom: 90.0,
            ..CameraSettings::default()
        });
        assert_eq!(cam.pitch(), PITCH_LIMIT);
        assert_eq!(cam.zoom(), ZOOM_MAX);
    }

    #[test]
    fn non_finite_settings_fall_back_to_defaults() {
        let mut cam = PerspectiveCamera::new(CameraSettings {
            yaw: f32::INFINITY,
            pitch: f32::NAN,
            zoom: f32::NAN,
            ..CameraSettings::default()
        });
        assert_eq!(cam.yaw(), -90.0);
        assert_eq!(cam.pitch(), 0.0);
        assert_eq!(cam.zoom(), ZOOM_MAX);
        assert_orthonormal(cam.basis());

        cam.process_zoom(-100.0);
        assert_eq!(cam.zoom(), ZOOM_MAX);
        assert!(cam.projection_matrix(1.0).is_finite());
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut cam = PerspectiveCamera::default();
        cam.process_look(f32::NAN, 1.0);
        cam.process_look(0.0, f32::INFINITY);
        cam.process_zoom(f32::NAN);
        assert_eq!(cam.yaw(), -90.0);
        assert_eq!(cam.pitch(), 0.0);
        assert_eq!(cam.zoom(), ZOOM_MAX);
        assert_orthonormal(cam.basis());
    }

    #[test]
    fn opposite_moves_cancel() {
        let mut cam = PerspectiveCamera::default();
        cam.process_look(123.0, -47.0);
        let start = cam.view_position();
        for direction in Direction::ALL {
            cam.process_move(direction, 0.016);
            cam.process_move(direction.opposite(), 0.016);
            assert!(cam.view_position().abs_diff_eq(start, 1e-4));
        }
    }

    #[test]
    fn move_forward_follows_front() {
        let mut cam = PerspectiveCamera::default();
        cam.process_move(Direction::Forward, 0.5);
        // speed 10 * 0.5s along -Z
        assert!(cam.view_position().abs_diff_eq(Vec3::ZERO, EPS));
    }

    #[test]
    fn vertical_moves_ignore_pitch() {
        let mut cam = PerspectiveCamera::default();
        cam.process_look(0.0, 200.0);
        cam.process_move(Direction::Up, 1.0);
        assert!(cam.view_position().abs_diff_eq(Vec3::new(0.0, 10.0, 5.0), EPS));
        cam.process_move(Direction::Down, 2.0);
        assert!(cam.view_position().abs_diff_eq(Vec3::new(0.0, -10.0, 5.0), EPS));
    }

    #[test]
    fn view_matrix_places_camera() {
        let mut cam = PerspectiveCamera::default();
        cam.process_look(80.0, 40.0);
        cam.process_move(Direction::Forward, 0.3);
        cam.process_move(Direction::Right, 0.2);

        let camera_to_world = cam.view_matrix().inverse();
        let eye = camera_to_world.transform_point3(Vec3::ZERO);
        let look = camera_to_world.transform_vector3(Vec3::NEG_Z);
        assert!(eye.abs_diff_eq(cam.view_position(), 1e-4));
        assert!(look.abs_diff_eq(cam.front(), 1e-4));
    }

    #[test]
    fn projection_uses_zoom() {
        let mut cam = PerspectiveCamera::default();
        let wide = cam.projection_matrix(16.0 / 9.0);
        cam.process_zoom(30.0);
        let narrow = cam.projection_matrix(16.0 / 9.0);
        // y scale is cot(fov / 2): a narrower fov scales more
        assert!(narrow.y_axis.y > wide.y_axis.y);
        assert!(!wide.col(0).x.is_nan());
    }
}
