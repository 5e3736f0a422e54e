//! wgpu render backend for the desk scene.
//!
//! Implements the scene's draw target and texture backend on top of wgpu.
//! Named uniform writes are captured per draw and replayed when the frame ends.
//!
//! # Invariants
//! - Draws are submitted in the order they were issued.
//! - Each draw sees exactly the uniform state current when it was issued.
//! - Released textures are destroyed once and unbound from every unit.

mod gpu;
mod meshes;
mod shaders;

pub use gpu::{GpuTextureId, WgpuBackend};
