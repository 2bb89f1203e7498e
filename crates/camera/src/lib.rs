//! Free-fly perspective camera.
//!
//! The camera owns a world-space position and a yaw/pitch orientation from
//! which an orthonormal `{front, right, up}` basis is derived. Input is fed in
//! as discrete movement, look and zoom events; the camera produces the view and
//! projection matrices the renderer consumes.
//!
//! # Invariants
//! - `{front, right, up}` is a right-handed orthonormal basis after every update.
//! - Pitch stays within `[-89°, 89°]`, zoom within `[1°, 45°]`.
//! - World-up never changes for the lifetime of a camera.

mod camera;
mod direction;

pub use camera::{
    Basis, CameraSettings, PerspectiveCamera, PITCH_LIMIT, WORLD_UP, ZOOM_MAX, ZOOM_MIN,
};
pub use direction::Direction;
