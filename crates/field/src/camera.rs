use glam::{Mat4, Vec3};

/// Perspective camera that always looks at a fixed point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 9.0),
            look_at: Vec3::ZERO,
            fov: 50.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, distance: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            fov: fov_degrees.to_radians(),
            ..Self::default()
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a point in normalised device coordinates back to world space.
    /// `ndc.z` is 0 on the near plane and 1 on the far plane.
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.view_projection().inverse().project_point3(ndc)
    }

    /// World-space point to normalised device coordinates.
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.view_projection().project_point3(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.position.z, 9.0);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn look_at_target_projects_to_centre() {
        let cam = PerspectiveCamera {
            position: Vec3::new(0.3, -0.2, 9.0),
            aspect: 16.0 / 9.0,
            ..PerspectiveCamera::default()
        };
        let ndc = cam.project(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
    }

    #[test]
    fn unproject_inverts_project() {
        let cam = PerspectiveCamera {
            aspect: 1.5,
            ..PerspectiveCamera::default()
        };
        let p = Vec3::new(1.0, -2.0, 0.5);
        let back = cam.unproject(cam.project(p));
        assert!((back - p).length() < 1e-3);
    }
}
