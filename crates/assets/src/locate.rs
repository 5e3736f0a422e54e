use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File whose presence marks a directory as the texture base.
pub const SENTINEL_ASSET: &str = "wood_oak.jpg";

/// Where to look for scene textures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Candidate base directories, tried in order.
    pub candidates: Vec<PathBuf>,
    pub sentinel: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            candidates: [
                "../Utilities/textures/",
                "../../Utilities/textures/",
                "./Utilities/textures/",
                "./textures/",
                "../textures/",
                "../../../Utilities/textures/",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            sentinel: SENTINEL_ASSET.into(),
        }
    }
}

/// First candidate directory that contains `sentinel`.
pub fn locate_base<P: AsRef<Path>>(candidates: &[P], sentinel: &str) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|candidate| candidate.as_ref())
        .find(|base| base.join(sentinel).is_file())
        .map(Path::to_path_buf)
}

/// Resolve the texture base, falling back to the empty path.
///
/// With the empty base every later load fails on its own and is logged there.
pub fn resolve_base(config: &AssetConfig) -> PathBuf {
    if let Ok(cwd) = std::env::current_dir() {
        tracing::debug!("resolving texture base from {}", cwd.display());
    }
    match locate_base(&config.candidates, &config.sentinel) {
        Some(base) => {
            tracing::info!("texture base: {}", base.display());
            base
        }
        None => {
            tracing::warn!(
                "could not locate a texture directory containing {}",
                config.sentinel
            );
            PathBuf::new()
        }
    }
}
