use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Lighting response of a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub tag: String,
    pub ambient_color: Vec3,
    pub ambient_strength: f32,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,
}

impl Material {
    pub fn new(
        tag: impl Into<String>,
        ambient_color: Vec3,
        ambient_strength: f32,
        diffuse_color: Vec3,
        specular_color: Vec3,
        shininess: f32,
    ) -> Self {
        Self {
            tag: tag.into(),
            ambient_color,
            ambient_strength,
            diffuse_color,
            specular_color,
            shininess,
        }
    }
}

/// Ordered list of material presets, looked up by tag.
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    materials: Vec<Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materials used by the desk scene.
    pub fn desk_presets() -> Self {
        let mut registry = Self::new();
        let presets = [
            ("wood", 0.3, Vec3::new(0.6, 0.45, 0.3), Vec3::splat(0.2), 12.0),
            ("plastic", 0.25, Vec3::splat(0.5), Vec3::splat(0.5), 32.0),
            ("fabric", 0.35, Vec3::splat(0.6), Vec3::splat(0.05), 2.0),
            ("wall", 0.4, Vec3::splat(0.7), Vec3::splat(0.05), 4.0),
            ("carpet", 0.35, Vec3::splat(0.6), Vec3::ZERO, 1.0),
            ("screen", 0.6, Vec3::splat(0.4), Vec3::splat(0.3), 64.0),
            ("glass", 0.5, Vec3::splat(0.2), Vec3::splat(0.9), 96.0),
        ];
        for (tag, ambient, diffuse, specular, shininess) in presets {
            registry.define(Material::new(
                tag,
                Vec3::ONE,
                ambient,
                diffuse,
                specular,
                shininess,
            ));
        }
        registry
    }

    /// Append a material. Tags are not deduplicated.
    pub fn define(&mut self, material: Material) {
        tracing::debug!("defined material '{}'", material.tag);
        self.materials.push(material);
    }

    /// First material tagged `tag`.
    pub fn find(&self, tag: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
