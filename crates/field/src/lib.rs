//! Field: the CPU-side scene model of the cube wall.
//!
//! Owns the cell lattice, the smoothed pointer, the interaction radius, the
//! parallax camera rig and the idle sway. Produces one [`FieldFrame`] per
//! display refresh; renderers turn that into pixels.
//!
//! # Invariants
//! - Cell count and origins are fixed once the [`Grid`] is built.
//! - Per-cell displacement is a pure function of origin, seed, smoothed
//!   pointer, radius and elapsed time. Cells carry no state between frames.
//! - Smoothed values approach their target without overshoot.

pub mod camera;
pub mod displace;
pub mod field;
pub mod grid;
pub mod pointer;
pub mod smooth;

pub use camera::PerspectiveCamera;
pub use displace::{CellSample, LIGHT_DIR};
pub use field::{Field, FieldFrame, idle_rotation};
pub use grid::{Bounds, Cell, Grid, cell_seed};
pub use pointer::{InteractionRadius, Pointer, pick_local, screen_to_ndc};
pub use smooth::{Approach, Smoothed};
