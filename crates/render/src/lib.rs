//! Rendering adapter: named-uniform bridge and the desk scene composer.
//!
//! The rendering backend is reached only through [`UniformSink`],
//! [`MeshProvider`] and [`DrawTarget`]. Every call is immediate; nothing is
//! batched or validated on this side.
//!
//! # Invariants
//! - The scene keeps no per-object state between frames.
//! - Texture state set for one draw never leaks UV scaling into the next.

mod bridge;
mod renderer;
pub mod scene;

pub use bridge::ShaderBridge;
pub use renderer::{
    DrawRecord, DrawTarget, MeshProvider, RecordingTarget, UniformSink, UniformValue, uniforms,
};
pub use scene::{DeskLayout, DeskScene};

pub fn crate_info() -> &'static str {
    "deskscene-render v0.1.0"
}
