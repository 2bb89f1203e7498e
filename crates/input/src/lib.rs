//! Input mapping: raw window events in, camera actions out.
//!
//! The camera consumes [`Action`]s, never raw input events. Key state, cursor
//! tracking and scroll input are collected into an [`InputState`] owned by the
//! application and drained once per frame.
//!
//! # Invariants
//! - The first cursor sample after (re)entering the window never produces a look delta.
//! - Held movement keys produce one move action per frame, in `Direction::ALL` order.

pub mod action;
pub mod bindings;
pub mod mouse;
pub mod state;

pub use action::Action;
pub use bindings::KeyBindings;
pub use mouse::MouseTracker;
pub use state::InputState;
