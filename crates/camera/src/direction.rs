use crate::camera::Basis;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Discrete camera movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Signed unit displacement for this direction.
    ///
    /// Horizontal directions follow the camera basis; vertical directions
    /// follow `world_up` so that ascending never depends on pitch.
    pub fn displacement(self, basis: &Basis, world_up: Vec3) -> Vec3 {
        match self {
            Direction::Forward => basis.front,
            Direction::Backward => -basis.front,
            Direction::Left => -basis.right,
            Direction::Right => basis.right,
            Direction::Up => world_up,
            Direction::Down => -world_up,
        }
    }
}
