use std::path::Path;

use anyhow::Context;
use deskscene_assets::AssetConfig;
use deskscene_view::{ViewConfig, load_yaml};
use serde::{Deserialize, Serialize};

/// Desktop settings file. Every section is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window_title: String,
    pub view: ViewConfig,
    pub assets: AssetConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_title: "Desk Scene".into(),
            view: ViewConfig::default(),
            assets: AssetConfig::default(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let mut settings: Self = load_yaml(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        settings.view = settings
            .view
            .validated()
            .with_context(|| format!("checking view settings in {}", path.display()))?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn no_file_means_defaults() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }

    #[test]
    fn nested_sections_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "window_title: Study\nview:\n  fov_degrees: 30.0\nassets:\n  candidates: [./art]"
        )
        .unwrap();
        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.window_title, "Study");
        assert_eq!(settings.view.fov_degrees, 30.0);
        assert_eq!(settings.view.window_width, 1000);
        assert_eq!(settings.assets.candidates, vec![std::path::PathBuf::from("./art")]);
        assert_eq!(settings.assets.sentinel, "wood_oak.jpg");
    }

    #[test]
    fn invalid_view_section_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "view:\n  max_frame_delta: -0.1").unwrap();
        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("max_frame_delta"));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("missing.yaml"));
    }
}
