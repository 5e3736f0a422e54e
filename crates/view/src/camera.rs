use deskscene_common::Direction;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 45.0;
const PITCH_LIMIT: f32 = 89.0;

/// Camera placement and orientation. `front` and `up` are unit vectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
}

impl Pose {
    pub fn new(position: Vec3, front: Vec3, up: Vec3) -> Self {
        Self {
            position,
            front: front.normalize_or_zero(),
            up: up.normalize_or_zero(),
        }
    }

    /// Copy with unit `front` and `up`, or `None` when either has no usable length.
    pub fn normalized(self) -> Option<Self> {
        let front = self.front.try_normalize()?;
        let up = self.up.try_normalize()?;
        self.position.is_finite().then_some(Self {
            position: self.position,
            front,
            up,
        })
    }

    /// Startup pose: slightly above the desk, tilted down toward it.
    pub fn navigation() -> Self {
        Self::new(Vec3::new(0.0, 0.5, 2.0), Vec3::new(0.0, -0.15, -1.0), Vec3::Y)
    }

    /// Fixed pose used whenever orthographic mode is entered.
    pub fn inspection() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z, Vec3::Y)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::navigation()
    }
}

/// Free-fly camera: yaw/pitch orientation in degrees, zoom as vertical FOV.
#[derive(Debug, Clone)]
pub struct Camera {
    pose: Pose,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    speed: f32,
    min_speed: f32,
    max_speed: f32,
    sensitivity: f32,
}

impl Camera {
    pub fn new(pose: Pose) -> Self {
        let mut camera = Self {
            pose: Pose::navigation(),
            yaw: -90.0,
            pitch: 0.0,
            zoom: MAX_ZOOM,
            speed: 2.5,
            min_speed: 0.5,
            max_speed: 15.0,
            sensitivity: 0.1,
        };
        camera.set_pose(pose);
        camera
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Speed bounds for [`Camera::set_speed`]. Re-clamps the current speed.
    pub fn with_speed_range(mut self, min: f32, max: f32) -> Self {
        self.min_speed = min.min(max);
        self.max_speed = max.max(min);
        self.speed = self.speed.clamp(self.min_speed, self.max_speed);
        self
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Replace the pose and re-derive yaw and pitch from its front vector,
    /// so later look deltas continue from the new orientation.
    ///
    /// A pose with a zero-length `front` or `up` is ignored.
    pub fn set_pose(&mut self, pose: Pose) {
        let Some(pose) = pose.normalized() else {
            tracing::warn!("ignoring degenerate camera pose {pose:?}");
            return;
        };
        self.pose = pose;
        let front = pose.front;
        self.pitch = front
            .y
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = front.z.atan2(front.x).to_degrees();
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn front(&self) -> Vec3 {
        self.pose.front
    }

    pub fn up(&self) -> Vec3 {
        self.pose.up
    }

    pub fn right(&self) -> Vec3 {
        self.pose.front.cross(Vec3::Y).normalize_or_zero()
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn speed_range(&self) -> (f32, f32) {
        (self.min_speed, self.max_speed)
    }

    /// Translate along the camera basis: front, right (front x world up) or up.
    pub fn move_relative(&mut self, direction: Direction, distance: f32) {
        let axis = match direction {
            Direction::Forward => self.pose.front,
            Direction::Backward => -self.pose.front,
            Direction::Left => -self.right(),
            Direction::Right => self.right(),
            Direction::Up => self.pose.up,
            Direction::Down => -self.pose.up,
        };
        self.pose.position += axis * distance;
    }

    /// Apply a cursor offset in pixels. Positive `dy` looks up.
    pub fn look_delta(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_basis();
    }

    pub fn set_zoom(&mut self, degrees: f32) {
        self.zoom = degrees.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.clamp(self.min_speed, self.max_speed);
    }

    pub fn view_matrix(&self) -> Mat4 {
        let Pose {
            position,
            front,
            up,
        } = self.pose;
        Mat4::look_at_rh(position, position + front, up)
    }

    fn update_basis(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        let right = front.cross(Vec3::Y).normalize();
        self.pose.front = front;
        self.pose.up = right.cross(front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Pose::navigation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn default_camera_is_at_navigation_pose() {
        let cam = Camera::default();
        assert_eq!(cam.position(), Vec3::new(0.0, 0.5, 2.0));
        assert!((cam.front().length() - 1.0).abs() < EPS);
        assert!(cam.front().y < 0.0);
        assert_eq!(cam.zoom(), 45.0);
        assert_eq!(cam.speed(), 2.5);
    }

    #[test]
    fn forward_then_backward_returns_to_start() {
        let mut cam = Camera::default();
        cam.look_delta(137.0, -42.0);
        let start = cam.position();
        cam.move_relative(Direction::Forward, 3.7);
        assert!(!cam.position().abs_diff_eq(start, EPS));
        cam.move_relative(Direction::Backward, 3.7);
        assert!(cam.position().abs_diff_eq(start, EPS));
    }

    #[test]
    fn strafe_follows_right_vector() {
        let mut cam = Camera::new(Pose::inspection());
        cam.move_relative(Direction::Right, 1.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(1.0, 0.0, 3.0), EPS));
        cam.move_relative(Direction::Left, 2.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(-1.0, 0.0, 3.0), EPS));
    }

    #[test]
    fn vertical_moves_follow_up_vector() {
        let mut cam = Camera::new(Pose::inspection());
        cam.move_relative(Direction::Up, 0.5);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.5, 3.0), EPS));
        cam.move_relative(Direction::Down, 1.5);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, -1.0, 3.0), EPS));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.look_delta(0.0, 10_000.0);
        assert_eq!(cam.pitch(), 89.0);
        assert!(cam.front().y < 1.0);
        cam.look_delta(0.0, -100_000.0);
        assert_eq!(cam.pitch(), -89.0);
    }

    #[test]
    fn look_delta_scales_by_sensitivity() {
        let mut cam = Camera::new(Pose::inspection()).with_sensitivity(0.5);
        cam.look_delta(20.0, 4.0);
        assert!((cam.yaw() - (-80.0)).abs() < 1e-3);
        assert!((cam.pitch() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn zoom_and_speed_are_clamped() {
        let mut cam = Camera::default();
        cam.set_zoom(0.2);
        assert_eq!(cam.zoom(), MIN_ZOOM);
        cam.set_zoom(90.0);
        assert_eq!(cam.zoom(), MAX_ZOOM);
        cam.set_speed(100.0);
        assert_eq!(cam.speed(), 15.0);
        cam.set_speed(-1.0);
        assert_eq!(cam.speed(), 0.5);
    }

    #[test]
    fn set_pose_rederives_orientation() {
        let mut cam = Camera::default();
        cam.set_pose(Pose::inspection());
        assert!((cam.yaw() - (-90.0)).abs() < 1e-3);
        assert!(cam.pitch().abs() < 1e-3);
        cam.look_delta(0.0, 0.0);
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn set_pose_normalizes_direction_vectors() {
        let mut cam = Camera::default();
        cam.set_pose(Pose {
            position: Vec3::ZERO,
            front: Vec3::new(0.0, 0.0, -4.0),
            up: Vec3::new(0.0, 3.0, 0.0),
        });
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
        cam.move_relative(Direction::Forward, 2.5);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, -2.5), EPS));
    }

    #[test]
    fn degenerate_pose_is_ignored() {
        let mut cam = Camera::default();
        let before = cam.pose();
        cam.set_pose(Pose {
            position: Vec3::ONE,
            front: Vec3::ZERO,
            up: Vec3::Y,
        });
        assert_eq!(cam.pose(), before);
        assert!(cam.view_matrix().is_finite());
    }

    #[test]
    fn normalized_rejects_zero_up() {
        let pose = Pose {
            position: Vec3::ZERO,
            front: Vec3::NEG_Z,
            up: Vec3::ZERO,
        };
        assert!(pose.normalized().is_none());
        assert!(Pose::inspection().normalized().is_some());
    }

    #[test]
    fn view_matrix_puts_eye_at_origin() {
        let cam = Camera::default();
        let view = cam.view_matrix();
        assert!(view.transform_point3(cam.position()).abs_diff_eq(Vec3::ZERO, EPS));
        let ahead = view.transform_point3(cam.position() + cam.front());
        assert!(ahead.z < 0.0);
    }
}
