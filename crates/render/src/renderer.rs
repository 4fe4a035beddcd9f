use cubewall_common::{Rgb, SurfaceSize, WallConfig};
use cubewall_field::{CellSample, Field, FieldFrame};
use glam::Vec3;
use std::convert::Infallible;
use std::fmt::Write as _;

/// Renderer-agnostic interface. All cube wall backends implement this trait.
///
/// The renderer reads the field and one frame's inputs, then produces
/// output. It never mutates the field.
pub trait Renderer {
    /// Per-frame failure. Construction failures are reported by whatever
    /// builds the renderer.
    type Error: std::fmt::Display;

    /// Match the output resolution to the surface. Only called with a
    /// non-empty size.
    fn resize(&mut self, size: SurfaceSize);

    /// Draw one frame.
    fn render(&mut self, field: &Field, frame: &FieldFrame) -> Result<(), Self::Error>;

    /// Whether frames go through the bloom chain.
    fn bloom_enabled(&self) -> bool;

    /// Free every resource acquired at construction. Called once.
    fn release(&mut self);
}

/// Result of a [`CpuRenderer`] frame.
#[derive(Debug, Clone, Default)]
pub struct CpuFrame {
    pub time: f32,
    pub size: SurfaceSize,
    pub samples: Vec<CellSample>,
}

impl CpuFrame {
    /// Cells with non-zero pointer influence.
    pub fn influenced(&self) -> usize {
        self.samples.iter().filter(|s| s.influence > 0.0).count()
    }

    /// Largest influence in the frame.
    pub fn peak_influence(&self) -> f32 {
        self.samples
            .iter()
            .map(|s| s.influence)
            .fold(0.0, f32::max)
    }
}

/// Host-side renderer: evaluates displacement and shading per cell.
///
/// Used when no GPU is wanted (headless simulation, tests). Keeps the last
/// frame for inspection.
#[derive(Debug)]
pub struct CpuRenderer {
    colors: (Vec3, Vec3),
    size: SurfaceSize,
    last: CpuFrame,
    released: bool,
}

impl CpuRenderer {
    pub fn new(config: &WallConfig, size: SurfaceSize) -> Self {
        Self {
            colors: (linear(config.color_a), linear(config.color_b)),
            size,
            last: CpuFrame::default(),
            released: false,
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn last_frame(&self) -> &CpuFrame {
        &self.last
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Human-readable dump of the last frame.
    pub fn describe(&self, max_cells: usize) -> String {
        let f = &self.last;
        let mut out = String::new();
        let _ = writeln!(out, "=== Cube wall t={:.3}s ===", f.time);
        let _ = writeln!(
            out,
            "Surface: {}x{}  Cells: {}  Influenced: {}  Peak: {:.3}",
            f.size.width,
            f.size.height,
            f.samples.len(),
            f.influenced(),
            f.peak_influence()
        );
        for (i, s) in f.samples.iter().take(max_cells).enumerate() {
            let _ = writeln!(
                out,
                "  [{i:>5}] pos=({:.3}, {:.3}, {:.3}) influence={:.3} rgb=({:.2}, {:.2}, {:.2})",
                s.position.x,
                s.position.y,
                s.position.z,
                s.influence,
                s.color.x,
                s.color.y,
                s.color.z
            );
        }
        out
    }
}

fn linear(c: Rgb) -> Vec3 {
    Vec3::from_array(c.to_linear())
}

impl Renderer for CpuRenderer {
    type Error = Infallible;

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn render(&mut self, field: &Field, frame: &FieldFrame) -> Result<(), Infallible> {
        self.last.time = frame.time;
        self.last.size = self.size;
        self.last.samples.clear();
        self.last.samples.extend(field.sample(frame, self.colors));
        Ok(())
    }

    fn bloom_enabled(&self) -> bool {
        false
    }

    fn release(&mut self) {
        self.last = CpuFrame::default();
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn setup() -> (Field, CpuRenderer) {
        let config = WallConfig {
            grid_size: 10,
            ..WallConfig::default()
        };
        let size = SurfaceSize::new(800, 600);
        (Field::new(&config, size), CpuRenderer::new(&config, size))
    }

    #[test]
    fn cpu_renderer_samples_every_cell() {
        let (mut field, mut renderer) = setup();
        let frame = field.step(0.016);
        renderer.render(&field, &frame).unwrap();
        assert_eq!(renderer.last_frame().samples.len(), 100);
        assert_eq!(renderer.last_frame().size, SurfaceSize::new(800, 600));
    }

    #[test]
    fn idle_wall_has_no_influence() {
        let (mut field, mut renderer) = setup();
        let frame = field.step(0.016);
        renderer.render(&field, &frame).unwrap();
        assert_eq!(renderer.last_frame().influenced(), 0);
    }

    #[test]
    fn pointer_over_wall_influences_cells() {
        let (mut field, mut renderer) = setup();
        field.pointer_moved(Vec2::new(400.0, 300.0));
        let mut frame = field.step(0.016);
        for _ in 0..300 {
            frame = field.step(0.016);
        }
        renderer.render(&field, &frame).unwrap();
        assert!(renderer.last_frame().influenced() > 0);
        assert!(renderer.last_frame().peak_influence() > 0.5);
    }

    #[test]
    fn describe_reports_frame() {
        let (mut field, mut renderer) = setup();
        let frame = field.step(0.25);
        renderer.render(&field, &frame).unwrap();
        let text = renderer.describe(3);
        assert!(text.contains("t=0.250"));
        assert!(text.contains("Cells: 100"));
        assert_eq!(text.matches("pos=").count(), 3);
    }

    #[test]
    fn release_drops_last_frame() {
        let (mut field, mut renderer) = setup();
        let frame = field.step(0.016);
        renderer.render(&field, &frame).unwrap();
        renderer.release();
        assert!(renderer.is_released());
        assert!(renderer.last_frame().samples.is_empty());
        assert!(!renderer.bloom_enabled());
    }
}
