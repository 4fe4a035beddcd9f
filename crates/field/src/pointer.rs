use crate::camera::PerspectiveCamera;
use crate::smooth::Smoothed;
use cubewall_common::SurfaceSize;
use glam::{Mat4, Vec2, Vec3};

/// Pointer position in grid-local xy, smoothed per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pos: Smoothed<Vec2>,
}

impl Pointer {
    /// Far enough off-grid that no cell feels it.
    pub const OFFSCREEN: Vec2 = Vec2::new(1000.0, 1000.0);

    pub fn new() -> Self {
        Self {
            pos: Smoothed::new(Self::OFFSCREEN),
        }
    }

    pub fn current(&self) -> Vec2 {
        self.pos.current()
    }

    pub fn target(&self) -> Vec2 {
        self.pos.target()
    }

    pub fn set_target(&mut self, local: Vec2) {
        self.pos.set_target(local);
    }

    pub fn step(&mut self, factor: f32) -> Vec2 {
        self.pos.step(factor)
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::new()
    }
}

/// Influence radius with a "press to focus" state.
///
/// Press and release assign the radius outright, so any sequence of
/// cycles ends back at exactly `base`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRadius {
    base: f32,
    press_factor: f32,
    pressed: bool,
}

impl InteractionRadius {
    pub fn new(base: f32, press_factor: f32) -> Self {
        Self {
            base,
            press_factor,
            pressed: false,
        }
    }

    pub fn press(&mut self) {
        self.pressed = true;
    }

    pub fn release(&mut self) {
        self.pressed = false;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    pub fn value(&self) -> f32 {
        if self.pressed {
            self.base * self.press_factor
        } else {
            self.base
        }
    }
}

/// Pixel position (origin top-left) to normalised device coordinates.
/// `None` for an empty surface.
pub fn screen_to_ndc(px: Vec2, size: SurfaceSize) -> Option<Vec2> {
    if size.is_empty() {
        return None;
    }
    Some(Vec2::new(
        px.x / size.width as f32 * 2.0 - 1.0,
        -(px.y / size.height as f32 * 2.0 - 1.0),
    ))
}

/// Cast a ray from the camera through `ndc` and intersect it with the local
/// z = 0 plane of the object placed by `group`. Returns the hit in the
/// group's local xy, or `None` when the ray misses the plane.
pub fn pick_local(camera: &PerspectiveCamera, ndc: Vec2, group: Mat4) -> Option<Vec2> {
    let far = camera.unproject(ndc.extend(1.0));
    let dir = (far - camera.position).try_normalize()?;

    let plane_point = group.transform_point3(Vec3::ZERO);
    let normal = group.transform_vector3(Vec3::Z).try_normalize()?;

    let denom = normal.dot(dir);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = normal.dot(plane_point - camera.position) / denom;
    if t < 0.0 {
        return None;
    }
    let hit = camera.position + dir * t;
    Some(group.inverse().transform_point3(hit).truncate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn pointer_starts_offscreen() {
        let p = Pointer::new();
        assert_eq!(p.current(), Pointer::OFFSCREEN);
        assert_eq!(p.target(), Pointer::OFFSCREEN);
    }

    #[test]
    fn press_release_cycles_restore_base() {
        let mut r = InteractionRadius::new(3.0, 0.65);
        for _ in 0..100 {
            r.press();
            assert!(r.is_pressed());
            assert!((r.value() - 1.95).abs() < 1e-6);
            // a second press while held does not shrink further
            r.press();
            assert!((r.value() - 1.95).abs() < 1e-6);
            r.release();
            assert!(!r.is_pressed());
            assert_eq!(r.value(), 3.0);
        }
        r.release();
        assert_eq!(r.value(), r.base());
    }

    #[test]
    fn ndc_corners() {
        let size = SurfaceSize::new(800, 600);
        assert_eq!(screen_to_ndc(Vec2::ZERO, size), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(
            screen_to_ndc(Vec2::new(800.0, 600.0), size),
            Some(Vec2::new(1.0, -1.0))
        );
        assert_eq!(
            screen_to_ndc(Vec2::new(400.0, 300.0), size),
            Some(Vec2::ZERO)
        );
        assert_eq!(screen_to_ndc(Vec2::ZERO, SurfaceSize::new(0, 600)), None);
    }

    #[test]
    fn centre_ray_hits_local_origin() {
        let cam = PerspectiveCamera::default();
        let hit = pick_local(&cam, Vec2::ZERO, Mat4::IDENTITY).unwrap();
        assert!(hit.length() < 1e-4);
    }

    #[test]
    fn pick_accounts_for_group_rotation() {
        let cam = PerspectiveCamera {
            aspect: 1.6,
            ..PerspectiveCamera::default()
        };
        let group = Mat4::from_quat(Quat::from_rotation_x(0.02) * Quat::from_rotation_y(0.03));
        let local = Vec3::new(2.5, -1.25, 0.0);
        let ndc = cam.project(group.transform_point3(local));
        let back = pick_local(&cam, ndc.truncate(), group).unwrap();
        assert!((back - local.truncate()).length() < 1e-3, "{back:?}");
    }

    #[test]
    fn ray_parallel_to_plane_misses() {
        let cam = PerspectiveCamera::default();
        // plane turned edge-on to the camera
        let group = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(pick_local(&cam, Vec2::ZERO, group).is_none());
    }
}
