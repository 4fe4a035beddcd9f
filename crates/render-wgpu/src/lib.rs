//! wgpu render backend for the cube wall.
//!
//! Draws every cell with one instanced draw call. Displacement and shading
//! run in the vertex shader; the glow comes from a bloom chain (bright pass,
//! separable blur, composite with ACES tone mapping).
//!
//! # Invariants
//! - Instance data (origin, seed) is uploaded once; per frame only the scene
//!   uniforms change.
//! - If the bloom chain cannot be built the renderer draws straight to the
//!   surface instead.
//! - Depth and offscreen targets are always the size of the surface.

mod bloom;
mod context;
mod error;
mod gpu;
mod scene;
mod shaders;

pub use context::GpuContext;
pub use error::RenderError;
pub use gpu::{FrameTarget, WgpuRenderer};
