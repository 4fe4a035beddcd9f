//! Per-cell displacement and shading.
//!
//! This is the CPU twin of the WGSL cube shader in `cubewall-render-wgpu`.
//! Both must agree term for term; the constants below are shared by name.

use crate::grid::Cell;
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Directional light used for the lambert term (unnormalised).
pub const LIGHT_DIR: Vec3 = Vec3::new(-0.4, 0.7, 0.8);

/// Peak in-plane push at the pointer.
pub const BUMP_FORCE: f32 = 0.8;
/// Fraction of the push removed at full influence.
pub const BUMP_DAMPING: f32 = 0.3;
/// Out-of-plane lift at full influence.
pub const BULGE: f32 = 0.3;

/// Hermite step between `edge0` and `edge1`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Pointer influence at `distance`: 1 at the pointer, easing to exactly 0 at
/// `radius` and beyond.
pub fn influence(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    1.0 - smoothstep(0.0, radius, distance)
}

/// Offset from a cell's origin at time `t`.
pub fn displacement(cell: &Cell, pointer: Vec2, radius: f32, depth: f32, t: f32) -> Vec3 {
    let away = cell.origin.truncate() - pointer;
    let inf = influence(away.length(), radius);
    let dir = away.normalize_or_zero();

    let wobble = (t * 0.9 + cell.seed * TAU).sin() * 0.25;
    let rest_z = (cell.seed - 0.5) * depth;
    let push = inf * BUMP_FORCE * (1.0 - inf * BUMP_DAMPING);
    // keeps cells from ever settling completely
    let jitter = (t * 3.0 + cell.seed * 10.0).sin() * 0.1;

    Vec3::new(
        dir.x * push + jitter,
        dir.y * push + jitter * 0.5,
        rest_z + wobble + inf * BULGE,
    )
}

/// Lambert term remapped so unlit faces keep some colour.
pub fn shade(normal: Vec3) -> f32 {
    let lambert = normal.normalize_or_zero().dot(LIGHT_DIR.normalize()).max(0.0);
    lambert * 0.85 + 0.15
}

/// Flicker multiplier in `[0.55, 1.0]`.
pub fn sparkle(seed: f32, t: f32) -> f32 {
    0.55 + 0.45 * (t * 1.7 + seed * 12.37).sin().abs()
}

/// Linear colour of a face with `normal`.
pub fn face_color(normal: Vec3, seed: f32, t: f32, color_a: Vec3, color_b: Vec3) -> Vec3 {
    color_a.lerp(color_b, shade(normal)) * sparkle(seed, t)
}

/// Everything a renderer needs for one cell in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    /// Displaced centre in grid-local space.
    pub position: Vec3,
    pub influence: f32,
    /// Colour of the camera-facing face.
    pub color: Vec3,
}

impl CellSample {
    pub fn compute(
        cell: &Cell,
        pointer: Vec2,
        radius: f32,
        depth: f32,
        t: f32,
        colors: (Vec3, Vec3),
    ) -> Self {
        let distance = cell.origin.truncate().distance(pointer);
        Self {
            position: cell.origin + displacement(cell, pointer, radius, depth, t),
            influence: influence(distance, radius),
            color: face_color(Vec3::Z, cell.seed, t, colors.0, colors.1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_at(x: f32, y: f32, seed: f32) -> Cell {
        Cell {
            origin: Vec3::new(x, y, 0.0),
            seed,
        }
    }

    #[test]
    fn influence_is_one_at_pointer() {
        assert_eq!(influence(0.0, 3.0), 1.0);
    }

    #[test]
    fn influence_is_zero_at_and_beyond_radius() {
        assert_eq!(influence(3.0, 3.0), 0.0);
        assert_eq!(influence(3.0001, 3.0), 0.0);
        assert_eq!(influence(500.0, 3.0), 0.0);
    }

    #[test]
    fn influence_falls_off_monotonically() {
        let radius = 3.0;
        let mut prev = influence(0.0, radius);
        for i in 1..=300 {
            let d = i as f32 * 0.01;
            let v = influence(d, radius);
            assert!(v <= prev, "influence rose at d={d}");
            assert!((0.0..=1.0).contains(&v));
            prev = v;
        }
        assert_eq!(prev, 0.0);
    }

    #[test]
    fn falloff_is_smooth_at_both_edges() {
        let r = 2.0;
        // zero slope near the pointer and near the rim
        assert!(1.0 - influence(0.01, r) < 1e-3);
        assert!(influence(r - 0.01, r) < 1e-3);
    }

    #[test]
    fn far_cells_only_idle() {
        let cell = cell_at(4.0, 0.0, 0.25);
        let t = 1.3;
        let d = displacement(&cell, Vec2::new(1000.0, 1000.0), 3.0, 1.8, t);
        let jitter = (t * 3.0 + 2.5).sin() * 0.1;
        assert!((d.x - jitter).abs() < 1e-6);
        assert!((d.y - jitter * 0.5).abs() < 1e-6);
        let wobble = (t * 0.9 + 0.25 * TAU).sin() * 0.25;
        assert!((d.z - ((0.25 - 0.5) * 1.8 + wobble)).abs() < 1e-5);
    }

    #[test]
    fn near_cells_are_pushed_away_and_toward_viewer() {
        let pointer = Vec2::ZERO;
        let t = 0.0;
        let seed = 0.0;
        let near = cell_at(0.5, 0.0, seed);
        let far = cell_at(10.0, 0.0, seed);
        let dn = displacement(&near, pointer, 3.0, 1.8, t);
        let df = displacement(&far, pointer, 3.0, 1.8, t);
        assert!(dn.x > df.x, "near cell should be pushed outward");
        assert!(dn.z > df.z, "near cell should bulge toward the viewer");
    }

    #[test]
    fn cell_under_pointer_has_no_direction() {
        let cell = cell_at(1.0, 1.0, 0.5);
        let d = displacement(&cell, Vec2::new(1.0, 1.0), 3.0, 0.0, 0.0);
        assert!(d.is_finite());
        assert!((d.z - (0.5 * TAU).sin() * 0.25 - BULGE).abs() < 1e-5);
    }

    #[test]
    fn displacement_is_pure() {
        let cell = cell_at(0.7, -0.2, 0.61);
        let a = displacement(&cell, Vec2::new(0.1, 0.4), 3.0, 1.8, 2.5);
        let b = displacement(&cell, Vec2::new(0.1, 0.4), 3.0, 1.8, 2.5);
        assert_eq!(a, b);
    }

    #[test]
    fn shading_bounds() {
        assert!((shade(-LIGHT_DIR) - 0.15).abs() < 1e-6);
        assert!((shade(LIGHT_DIR) - 1.0).abs() < 1e-5);
        for seed in [0.0, 0.3, 0.9] {
            for t in [0.0, 1.0, 7.7] {
                let s = sparkle(seed, t);
                assert!((0.55..=1.0).contains(&s));
            }
        }
    }

    #[test]
    fn face_colour_blends_between_endpoints() {
        let a = Vec3::new(0.5, 0.55, 0.7);
        let b = Vec3::ONE;
        let c = face_color(Vec3::Z, 0.0, 0.0, a, b);
        let spark = sparkle(0.0, 0.0);
        for i in 0..3 {
            assert!(c[i] >= a[i] * spark - 1e-6 && c[i] <= b[i] * spark + 1e-6);
        }
    }
}
