//! Shared value types and the configuration surface of the cube wall.
//!
//! # Invariants
//! - A validated [`WallConfig`] never produces an empty grid or a
//!   non-positive interaction radius.
//! - Colours are stored as sRGB and converted to linear only at the GPU edge.

mod config;
mod types;

pub use config::{ConfigError, MAX_GRID_SIZE, WallConfig};
pub use types::{ParseColorError, Rgb, SurfaceSize};
