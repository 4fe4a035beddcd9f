use glam::{Vec2, Vec3};

/// One cube of the wall. Immutable after the grid is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Resting position in grid-local space.
    pub origin: Vec3,
    /// Per-cell phase offset in `[0, 1)`.
    pub seed: f32,
}

/// Axis-aligned box in grid-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Clamp a local xy point to the box grown by `margin` on every side.
    pub fn clamp_xy(&self, p: Vec2, margin: f32) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min.x - margin, self.max.x + margin),
            p.y.clamp(self.min.y - margin, self.max.y + margin),
        )
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Deterministic seed for the cell at `index`.
///
/// Reproducible across runs and platforms; stays strictly below 1.
pub fn cell_seed(index: usize) -> f32 {
    let s = ((index as f64 * 177.7).sin() + 1.0) * 0.5;
    (s as f32).clamp(0.0, 1.0 - f32::EPSILON)
}

/// Fixed N×N lattice of cells, row-major, centred on the local origin.
#[derive(Debug, Clone)]
pub struct Grid {
    size: u32,
    spacing: f32,
    cells: Vec<Cell>,
    bounds: Bounds,
}

impl Grid {
    /// Build a `size`×`size` lattice spanning `width` world units, with
    /// resting depths spread over `depth`.
    pub fn new(size: u32, width: f32, depth: f32) -> Self {
        assert!(size > 0, "grid size must be at least 1");
        let n = size as usize;
        let spacing = width / size as f32;
        let half = (size as f32 - 1.0) * 0.5 * spacing;

        let mut cells = Vec::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                let index = y * n + x;
                cells.push(Cell {
                    origin: Vec3::new(x as f32 * spacing - half, y as f32 * spacing - half, 0.0),
                    seed: cell_seed(index),
                });
            }
        }

        let bounds = Bounds {
            min: Vec3::new(-half, -half, -depth * 0.5),
            max: Vec3::new(half, half, depth * 0.5),
        };
        tracing::debug!(cells = cells.len(), spacing, "built cube grid");

        Self {
            size,
            spacing,
            cells,
            bounds,
        }
    }

    /// Cells per side.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at column `x`, row `y`.
    pub fn cell(&self, x: u32, y: u32) -> Option<&Cell> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.cells.get((y * self.size + x) as usize)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_count_is_square_of_size() {
        for n in [1u32, 2, 3, 7, 40] {
            let grid = Grid::new(n, 11.0, 1.8);
            assert_eq!(grid.len(), (n * n) as usize);
        }
    }

    #[test]
    fn lattice_is_centred() {
        let grid = Grid::new(40, 11.0, 1.8);
        let sum: Vec3 = grid.cells().iter().map(|c| c.origin).sum();
        let mean = sum / grid.len() as f32;
        assert!(mean.length() < 1e-4);
        assert!((grid.bounds().min.x + grid.bounds().max.x).abs() < 1e-5);
    }

    #[test]
    fn single_cell_sits_at_origin() {
        let grid = Grid::new(1, 11.0, 1.8);
        assert_eq!(grid.cells()[0].origin, Vec3::ZERO);
    }

    #[test]
    fn layout_is_row_major() {
        let grid = Grid::new(4, 4.0, 0.0);
        let a = grid.cell(1, 0).unwrap();
        let b = grid.cell(0, 1).unwrap();
        assert_eq!(grid.cells()[1], *a);
        assert_eq!(grid.cells()[4], *b);
        assert!((a.origin.x - grid.cells()[0].origin.x - grid.spacing()).abs() < 1e-6);
        assert!((b.origin.y - grid.cells()[0].origin.y - grid.spacing()).abs() < 1e-6);
        assert!(grid.cell(4, 0).is_none());
    }

    #[test]
    fn seeds_are_deterministic_and_in_range() {
        let a = Grid::new(20, 11.0, 1.8);
        let b = Grid::new(20, 11.0, 1.8);
        for (i, (ca, cb)) in a.cells().iter().zip(b.cells()).enumerate() {
            assert_eq!(ca.seed, cb.seed);
            assert_eq!(ca.seed, cell_seed(i));
            assert!((0.0..1.0).contains(&ca.seed));
        }
    }

    #[test]
    fn seed_depends_only_on_index() {
        // same index in differently sized grids
        let small = Grid::new(3, 1.0, 0.0);
        let large = Grid::new(9, 30.0, 5.0);
        assert_eq!(small.cells()[5].seed, large.cells()[5].seed);
    }

    #[test]
    fn bounds_span_outer_cell_origins() {
        let grid = Grid::new(10, 10.0, 1.0);
        let extent = grid.bounds().size();
        assert!((extent.x - 9.0).abs() < 1e-5);
        assert!((extent.y - 9.0).abs() < 1e-5);
        assert_eq!(extent.z, 1.0);
    }

    #[test]
    fn clamp_respects_margin() {
        let grid = Grid::new(10, 10.0, 1.0);
        let b = grid.bounds();
        let p = b.clamp_xy(Vec2::new(1000.0, -1000.0), 2.0);
        assert_eq!(p, Vec2::new(b.max.x + 2.0, b.min.y - 2.0));
        let inside = Vec2::new(0.5, -0.25);
        assert_eq!(b.clamp_xy(inside, 2.0), inside);
    }
}
