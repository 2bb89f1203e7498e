//! wgpu render backend for the cube demo.
//!
//! A [`ShaderProgram`] links a vertex and a fragment WGSL source into one
//! pipeline and exposes its uniform buffer by field name. [`CubeMesh`] owns
//! the static cube geometry; [`CubeRenderer`] sequences a frame.
//!
//! # Invariants
//! - Shader read, compile and link failures surface as [`ProgramError`];
//!   a program is never built from an empty or invalid source.
//! - Writes to unknown uniform names are ignored.
//! - The renderer never mutates camera state.

mod gpu;
mod mesh;
mod program;
mod uniforms;

pub use gpu::{CubeRenderer, DEPTH_FORMAT};
pub use mesh::{cube_geometry, CubeMesh, Vertex};
pub use program::{ProgramError, ProgramTarget, ShaderProgram, ShaderSource, ShaderStage};
pub use uniforms::{UniformBlock, UniformBlockBuilder, UniformField, UniformKind, UniformWriter};
