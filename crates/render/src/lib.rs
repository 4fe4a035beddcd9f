//! Rendering adapter: renderer-agnostic interface and the wall lifecycle.
//!
//! # Invariants
//! - Renderers read the field; they never mutate it.
//! - Camera aspect and renderer resolution change together, before the next
//!   frame is drawn.
//! - Every resource a renderer acquires is released exactly once.
//!
//! [`CpuRenderer`] evaluates the displacement and shading per cell on the
//! host. It backs headless runs and tests; the GPU backend lives in
//! `cubewall-render-wgpu` behind the same [`Renderer`] trait.

mod renderer;
mod timer;
mod wall;

pub use renderer::{CpuFrame, CpuRenderer, Renderer};
pub use timer::FrameTimer;
pub use wall::{CubeWall, FrameOutcome, WallState, WallStatus};

pub fn crate_info() -> &'static str {
    concat!("cubewall-render v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
