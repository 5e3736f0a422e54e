use deskscene_common::ProjectionMode;
use glam::Mat4;

/// Clip planes and orthographic box size shared by both projection modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub near: f32,
    pub far: f32,
    pub ortho_half_height: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 100.0,
            ortho_half_height: 1.2,
        }
    }
}

impl Projection {
    /// Right-handed projection matrix with a [0, 1] depth range.
    ///
    /// `fov_degrees` only applies in perspective mode; the orthographic box
    /// is `ortho_half_height` tall in each direction and widened by `aspect`.
    pub fn matrix(&self, mode: ProjectionMode, fov_degrees: f32, aspect: f32) -> Mat4 {
        match mode {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh(fov_degrees.to_radians(), aspect, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_height = self.ortho_half_height;
                let half_width = half_height * aspect;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn orthographic_box_scales_with_aspect() {
        let projection = Projection::default();
        let m = projection.matrix(ProjectionMode::Orthographic, 45.0, 1.25);
        let corner = m.project_point3(Vec3::new(1.5, 1.2, -1.0));
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn orthographic_ignores_fov() {
        let projection = Projection::default();
        assert_eq!(
            projection.matrix(ProjectionMode::Orthographic, 10.0, 1.25),
            projection.matrix(ProjectionMode::Orthographic, 45.0, 1.25)
        );
    }

    #[test]
    fn perspective_maps_near_and_far_to_depth_range() {
        let projection = Projection::default();
        let m = projection.matrix(ProjectionMode::Perspective, 45.0, 1.25);
        let near = m.project_point3(Vec3::new(0.0, 0.0, -0.1));
        let far = m.project_point3(Vec3::new(0.0, 0.0, -100.0));
        assert!(near.z.abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn perspective_fov_sets_vertical_extent() {
        let projection = Projection::default();
        let m = projection.matrix(ProjectionMode::Perspective, 90.0, 1.0);
        // At distance 1 a 90 degree FOV spans y in [-1, 1].
        let edge = m.project_point3(Vec3::new(0.0, 1.0, -1.0));
        assert!((edge.y - 1.0).abs() < 1e-4);
    }
}
