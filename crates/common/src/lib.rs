//! Shared value types used across the desk scene crates.
//!
//! Nothing here owns GPU or window state; every type is plain data.

mod types;

pub use types::{Direction, FrameView, MeshKind, Placement, ProjectionMode};
