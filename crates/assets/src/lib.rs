//! Scene assets: decoded images, the texture registry, material presets.
//!
//! Textures are registered under string tags. Registration order is the
//! texture-unit order; lookups are linear scans over that list.
//!
//! # Invariants
//! - A failed load never changes the registry.
//! - Slot `i` is always bound to texture unit `i`.
//! - Lookups are first-match: duplicate tags resolve to the earliest slot.

mod decode;
mod locate;
mod materials;
mod textures;

use std::path::PathBuf;

pub use decode::{DecodedImage, decode_rgba};
pub use locate::{AssetConfig, SENTINEL_ASSET, locate_base, resolve_base};
pub use materials::{Material, MaterialRegistry};
pub use textures::{CpuTextureBackend, TextureBackend, TextureRegistry, TextureSlot};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("could not decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture '{tag}' rejected by backend: {reason}")]
    Upload { tag: String, reason: String },
}

pub fn crate_info() -> &'static str {
    "deskscene-assets v0.1.0"
}
