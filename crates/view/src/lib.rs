//! View: fly camera, projection mode switching and per-frame matrices.
//!
//! # Invariants
//! - A saved navigation pose exists only while orthographic mode was entered
//!   from perspective mode.
//! - Holding a projection key never re-snapshots the pose.
//! - Movement distance is frame time multiplied by the current speed.

pub mod camera;
pub mod config;
pub mod controller;
pub mod projection;

pub use camera::{Camera, Pose};
pub use config::{ConfigError, ViewConfig, load_yaml};
pub use controller::ViewController;
pub use projection::Projection;

pub fn crate_info() -> &'static str {
    "deskscene-view v0.1.0"
}
