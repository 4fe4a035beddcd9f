use crate::camera::PerspectiveCamera;
use crate::displace::CellSample;
use crate::grid::Grid;
use crate::pointer::{InteractionRadius, Pointer, pick_local, screen_to_ndc};
use crate::smooth::Smoothed;
use cubewall_common::{SurfaceSize, WallConfig};
use glam::{Mat4, Quat, Vec2, Vec3};

/// Slow decorative sway of the grid root at elapsed time `t`.
///
/// `frequency` and `amplitude` are given as (x axis, y axis). Rotation is
/// applied x first, then y.
pub fn idle_rotation(t: f32, frequency: [f32; 2], amplitude: [f32; 2]) -> Quat {
    let rot_x = (t * frequency[0]).cos() * amplitude[0];
    let rot_y = (t * frequency[1]).sin() * amplitude[1];
    Quat::from_rotation_x(rot_x) * Quat::from_rotation_y(rot_y)
}

/// Inputs for drawing one frame. Everything per-cell is derived from these
/// plus the immutable grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldFrame {
    /// Seconds since the field was created.
    pub time: f32,
    /// Smoothed pointer in grid-local xy.
    pub pointer: Vec2,
    pub radius: f32,
    /// Grid root transform (idle sway).
    pub model: Mat4,
    pub view_proj: Mat4,
    pub camera_position: Vec3,
}

/// The cube wall's scene state, owned by one component instance.
///
/// Input handlers write targets (`pointer_moved`, `pointer_pressed`, ...);
/// [`Field::step`] reads them once per frame.
#[derive(Debug, Clone)]
pub struct Field {
    grid: Grid,
    pointer: Pointer,
    radius: InteractionRadius,
    camera: PerspectiveCamera,
    camera_pos: Smoothed<Vec3>,
    rotation: Quat,
    elapsed: f64,
    surface: SurfaceSize,
    pointer_smoothing: f32,
    camera_smoothing: f32,
    parallax: [f32; 2],
    idle_frequency: [f32; 2],
    idle_amplitude: [f32; 2],
    pointer_margin: f32,
    wall_depth: f32,
}

impl Field {
    pub fn new(config: &WallConfig, surface: SurfaceSize) -> Self {
        let mut camera = PerspectiveCamera::new(config.camera_fov_deg, config.camera_distance);
        if let Some(aspect) = surface.aspect() {
            camera.aspect = aspect;
        }
        Self {
            grid: Grid::new(config.grid_size, config.wall_width, config.wall_depth),
            pointer: Pointer::new(),
            radius: InteractionRadius::new(config.radius_base, config.press_radius_factor),
            camera_pos: Smoothed::new(camera.position),
            camera,
            rotation: idle_rotation(0.0, config.idle_frequency, config.idle_amplitude),
            elapsed: 0.0,
            surface,
            pointer_smoothing: config.pointer_smoothing,
            camera_smoothing: config.camera_smoothing,
            parallax: config.parallax,
            idle_frequency: config.idle_frequency,
            idle_amplitude: config.idle_amplitude,
            pointer_margin: config.pointer_margin,
            wall_depth: config.wall_depth,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn radius(&self) -> &InteractionRadius {
        &self.radius
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    /// Camera position the parallax rig is easing toward.
    pub fn camera_target(&self) -> Vec3 {
        self.camera_pos.target()
    }

    /// Grid root transform as of the last frame.
    pub fn model(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }

    /// Track a new surface size. The camera aspect follows immediately;
    /// an empty surface leaves the previous aspect in place.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.surface = size;
        if let Some(aspect) = size.aspect() {
            self.camera.aspect = aspect;
        }
    }

    /// Pointer moved to pixel `px` (origin top-left of the surface).
    pub fn pointer_moved(&mut self, px: Vec2) {
        self.retarget_pointer(px);
        if self.surface.is_empty() {
            return;
        }
        let nx = px.x / self.surface.width as f32 - 0.5;
        let ny = px.y / self.surface.height as f32 - 0.5;
        self.camera_pos.set_target(Vec3::new(
            nx * self.parallax[0],
            -ny * self.parallax[1],
            self.camera.position.z,
        ));
    }

    pub fn pointer_pressed(&mut self, px: Vec2) {
        self.radius.press();
        self.retarget_pointer(px);
    }

    pub fn pointer_released(&mut self, px: Vec2) {
        self.radius.release();
        self.retarget_pointer(px);
    }

    fn retarget_pointer(&mut self, px: Vec2) {
        let Some(ndc) = screen_to_ndc(px, self.surface) else {
            return;
        };
        let Some(hit) = pick_local(&self.camera, ndc, self.model()) else {
            tracing::trace!(?px, "pointer ray missed the grid plane");
            return;
        };
        let local = self.grid.bounds().clamp_xy(hit, self.pointer_margin);
        self.pointer.set_target(local);
    }

    /// Advance one frame by `dt` seconds.
    pub fn step(&mut self, dt: f32) -> FieldFrame {
        self.elapsed += dt.max(0.0) as f64;
        let t = self.elapsed as f32;

        let pointer = self.pointer.step(self.pointer_smoothing);
        self.camera.position = self.camera_pos.step(self.camera_smoothing);
        self.rotation = idle_rotation(t, self.idle_frequency, self.idle_amplitude);

        FieldFrame {
            time: t,
            pointer,
            radius: self.radius.value(),
            model: self.model(),
            view_proj: self.camera.view_projection(),
            camera_position: self.camera.position,
        }
    }

    /// Per-cell samples for `frame`, in grid order.
    pub fn sample<'a>(
        &'a self,
        frame: &'a FieldFrame,
        colors: (Vec3, Vec3),
    ) -> impl Iterator<Item = CellSample> + 'a {
        self.grid.cells().iter().map(move |cell| {
            CellSample::compute(
                cell,
                frame.pointer,
                frame.radius,
                self.wall_depth,
                frame.time,
                colors,
            )
        })
    }
}
