use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Scale, per-axis rotation (degrees) and translation of one primitive.
///
/// The model matrix is `T * Rx * Ry * Rz * S`: each rotation is about its own
/// fixed world axis, applied X first, then Y, then Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub scale: Vec3,
    pub rotation_degrees: Vec3,
    pub translation: Vec3,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation_degrees: Vec3::ZERO,
            translation: Vec3::ZERO,
        }
    }
}

impl Placement {
    pub fn new(scale: Vec3, rotation_degrees: Vec3, translation: Vec3) -> Self {
        Self {
            scale,
            rotation_degrees,
            translation,
        }
    }

    /// Unrotated placement.
    pub fn at(scale: Vec3, translation: Vec3) -> Self {
        Self::new(scale, Vec3::ZERO, translation)
    }

    pub fn model_matrix(&self) -> Mat4 {
        let r = self.rotation_degrees;
        Mat4::from_translation(self.translation)
            * Mat4::from_rotation_x(r.x.to_radians())
            * Mat4::from_rotation_y(r.y.to_radians())
            * Mat4::from_rotation_z(r.z.to_radians())
            * Mat4::from_scale(self.scale)
    }
}

/// Primitive shapes the mesh provider knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeshKind {
    Plane,
    Box,
    Cylinder,
    Sphere,
}

impl MeshKind {
    pub const ALL: [MeshKind; 4] = [
        MeshKind::Plane,
        MeshKind::Box,
        MeshKind::Cylinder,
        MeshKind::Sphere,
    ];
}

/// Camera-relative movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

/// Per-frame camera matrices and eye position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub view: Mat4,
    pub projection: Mat4,
    pub eye: Vec3,
}

impl Default for FrameView {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            eye: Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn identity_placement_is_identity_matrix() {
        let m = Placement::default().model_matrix();
        assert!(m.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn translation_lands_in_last_column() {
        let m = Placement::at(Vec3::ONE, Vec3::new(1.0, 2.0, 3.0)).model_matrix();
        assert_eq!(m.w_axis, Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert!(
            Mat4::from_cols(m.x_axis, m.y_axis, m.z_axis, Vec4::W).abs_diff_eq(Mat4::IDENTITY, 1e-6)
        );
    }

    #[test]
    fn scale_applies_before_rotation() {
        // Scaling X then rotating 90 degrees about Z stretches along world Y.
        let p = Placement::new(
            Vec3::new(2.0, 1.0, 1.0),
            Vec3::new(0.0, 0.0, 90.0),
            Vec3::ZERO,
        );
        let v = p.model_matrix().transform_point3(Vec3::X);
        assert!(v.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn rotations_compose_x_then_y_then_z() {
        let p = Placement::new(Vec3::ONE, Vec3::new(90.0, 90.0, 0.0), Vec3::ZERO);
        let expected = Mat4::from_rotation_x(90f32.to_radians())
            * Mat4::from_rotation_y(90f32.to_radians());
        assert!(p.model_matrix().abs_diff_eq(expected, 1e-6));
        // Different order gives a different matrix.
        let swapped = Mat4::from_rotation_y(90f32.to_radians())
            * Mat4::from_rotation_x(90f32.to_radians());
        assert!(!p.model_matrix().abs_diff_eq(swapped, 1e-3));
    }

    #[test]
    fn projection_defaults_to_perspective() {
        assert_eq!(ProjectionMode::default(), ProjectionMode::Perspective);
    }
}
