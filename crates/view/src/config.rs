use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Pose};
use crate::projection::Projection;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid view settings: {0}")]
    Invalid(String),
}

/// Window, camera and projection settings. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub navigation_pose: Pose,
    pub inspection_pose: Pose,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub ortho_half_height: f32,
    pub base_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Speed change per unit of scroll.
    pub scroll_step: f32,
    /// Degrees of yaw/pitch per pixel of cursor motion.
    pub mouse_sensitivity: f32,
    /// Upper bound on the frame time used for movement, in seconds.
    pub max_frame_delta: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            window_width: 1000,
            window_height: 800,
            navigation_pose: Pose::navigation(),
            inspection_pose: Pose::inspection(),
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            ortho_half_height: 1.2,
            base_speed: 2.5,
            min_speed: 0.5,
            max_speed: 15.0,
            scroll_step: 0.5,
            mouse_sensitivity: 0.1,
            max_frame_delta: 0.1,
        }
    }
}

impl ViewConfig {
    pub fn aspect(&self) -> f32 {
        self.window_width.max(1) as f32 / self.window_height.max(1) as f32
    }

    /// Camera at the navigation pose with this config's speed, zoom and sensitivity.
    pub fn camera(&self) -> Camera {
        let mut camera = Camera::new(self.navigation_pose)
            .with_sensitivity(self.mouse_sensitivity)
            .with_speed_range(self.min_speed, self.max_speed);
        camera.set_speed(self.base_speed);
        camera.set_zoom(self.fov_degrees);
        camera
    }

    /// Reject values the frame loop cannot run with and normalize pose vectors.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(invalid(format!(
                "window size {}x{} must be non-zero",
                self.window_width, self.window_height
            )));
        }
        positive("near", self.near)?;
        positive("far", self.far)?;
        if self.far <= self.near {
            return Err(invalid(format!(
                "clip planes need 0 < near < far (near {}, far {})",
                self.near, self.far
            )));
        }
        positive("max_frame_delta", self.max_frame_delta)?;
        positive("fov_degrees", self.fov_degrees)?;
        positive("ortho_half_height", self.ortho_half_height)?;
        positive("min_speed", self.min_speed)?;
        positive("max_speed", self.max_speed)?;
        if self.max_speed < self.min_speed {
            return Err(invalid(format!(
                "max_speed {} is below min_speed {}",
                self.max_speed, self.min_speed
            )));
        }
        if !(self.base_speed.is_finite()
            && self.scroll_step.is_finite()
            && self.mouse_sensitivity.is_finite())
        {
            return Err(invalid("speed and sensitivity values must be finite".into()));
        }
        self.navigation_pose = checked_pose("navigation_pose", self.navigation_pose)?;
        self.inspection_pose = checked_pose("inspection_pose", self.inspection_pose)?;
        Ok(self)
    }

    pub fn projection(&self) -> Projection {
        Projection {
            near: self.near,
            far: self.far,
            ortho_half_height: self.ortho_half_height,
        }
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive, got {value}")))
    }
}

fn checked_pose(name: &str, pose: Pose) -> Result<Pose, ConfigError> {
    pose.normalized()
        .ok_or_else(|| invalid(format!("{name} needs non-zero front and up vectors")))
}

/// Read a YAML settings file. An empty file yields `T::default()`.
pub fn load_yaml<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    let value = serde_yaml::from_str(&text)?;
    tracing::debug!("loaded settings from {}", path.display());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::io::Write;

    #[test]
    fn defaults_match_desk_viewer() {
        let config = ViewConfig::default();
        assert_eq!((config.window_width, config.window_height), (1000, 800));
        assert_eq!(config.aspect(), 1.25);
        let camera = config.camera();
        assert_eq!(camera.speed(), 2.5);
        assert_eq!(camera.zoom(), 45.0);
        assert_eq!(camera.speed_range(), (0.5, 15.0));
        assert_eq!(config.projection(), Projection::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_speed: 4.0\nwindow_width: 1600").unwrap();
        let config: ViewConfig = load_yaml(file.path()).unwrap();
        assert_eq!(config.base_speed, 4.0);
        assert_eq!(config.window_width, 1600);
        assert_eq!(config.window_height, 800);
        assert_eq!(config.inspection_pose, Pose::inspection());
    }

    #[test]
    fn yaml_pose_round_trips_vectors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let yaml = pose_yaml("inspection_pose", [0.0, 1.0, 4.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]);
        writeln!(file, "{yaml}").unwrap();
        let config: ViewConfig = load_yaml(file.path()).unwrap();
        assert_eq!(config.inspection_pose.position, Vec3::new(0.0, 1.0, 4.0));
    }

    #[test]
    fn empty_file_is_default() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config: ViewConfig = load_yaml(file.path()).unwrap();
        assert_eq!(config, ViewConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_yaml::<ViewConfig>(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    fn pose_yaml(name: &str, position: [f32; 3], front: [f32; 3], up: [f32; 3]) -> String {
        format!("{name}:\n  position: {position:?}\n  front: {front:?}\n  up: {up:?}")
    }

    fn load_str(yaml: &str) -> Result<ViewConfig, ConfigError> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{yaml}").unwrap();
        load_yaml::<ViewConfig>(file.path())?.validated()
    }

    fn assert_invalid(yaml: &str) {
        match load_str(yaml) {
            Err(ConfigError::Invalid(_)) => {}
            other => panic!("expected invalid settings for {yaml:?}, got {other:?}"),
        }
    }

    #[test]
    fn defaults_pass_validation() {
        let defaults = ViewConfig::default();
        let config = defaults.clone().validated().unwrap();
        assert_eq!(config.max_frame_delta, defaults.max_frame_delta);
        assert!(config
            .navigation_pose
            .front
            .abs_diff_eq(defaults.navigation_pose.front, 1e-6));
    }

    #[test]
    fn negative_frame_cap_is_rejected() {
        assert_invalid("max_frame_delta: -0.1");
        assert_invalid("max_frame_delta: 0.0");
    }

    #[test]
    fn bad_clip_planes_are_rejected() {
        assert_invalid("near: 0.0");
        assert_invalid("near: -1.0");
        assert_invalid("far: -5.0");
        assert_invalid("near: 10.0\nfar: 5.0");
    }

    #[test]
    fn zero_window_is_rejected() {
        assert_invalid("window_width: 0");
        assert_invalid("window_height: 0");
    }

    #[test]
    fn inverted_speed_range_is_rejected() {
        assert_invalid("min_speed: 5.0\nmax_speed: 1.0");
        assert_invalid("min_speed: 0.0");
    }

    #[test]
    fn zero_length_pose_vectors_are_rejected() {
        let zero = [0.0; 3];
        assert_invalid(&pose_yaml("navigation_pose", zero, zero, [0.0, 1.0, 0.0]));
        assert_invalid(&pose_yaml("inspection_pose", zero, [0.0, 0.0, -1.0], zero));
    }

    #[test]
    fn pose_vectors_are_normalized_on_load() {
        let yaml = pose_yaml("navigation_pose", [0.0; 3], [0.0, 0.0, -4.0], [0.0, 2.0, 0.0]);
        let config = load_str(&yaml).unwrap();
        assert_eq!(config.navigation_pose.front, Vec3::NEG_Z);
        assert_eq!(config.navigation_pose.up, Vec3::Y);
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_speed: [not, a, number").unwrap();
        let err = load_yaml::<ViewConfig>(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
