use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use deskscene_common::MeshKind;
use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::Serialize;

/// Uniform names understood by the scene shader.
pub mod uniforms {
    pub const MODEL: &str = "model";
    pub const VIEW: &str = "view";
    pub const PROJECTION: &str = "projection";
    pub const VIEW_POSITION: &str = "viewPosition";
    pub const OBJECT_COLOR: &str = "objectColor";
    pub const OBJECT_TEXTURE: &str = "objectTexture";
    pub const USE_TEXTURE: &str = "bUseTexture";
    pub const USE_LIGHTING: &str = "bUseLighting";
    pub const UV_SCALE: &str = "UVscale";
    pub const AMBIENT_COLOR: &str = "material.ambientColor";
    pub const AMBIENT_STRENGTH: &str = "material.ambientStrength";
    pub const DIFFUSE_COLOR: &str = "material.diffuseColor";
    pub const SPECULAR_COLOR: &str = "material.specularColor";
    pub const SHININESS: &str = "material.shininess";
}

/// Accepts shader values by name. Every call takes effect immediately.
pub trait UniformSink {
    fn set_int(&mut self, name: &str, value: i32);
    fn set_scalar(&mut self, name: &str, value: f32);
    fn set_vec2(&mut self, name: &str, value: Vec2);
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_vec4(&mut self, name: &str, value: Vec4);
    fn set_mat4(&mut self, name: &str, value: Mat4);
    /// Point a sampler at a texture unit.
    fn set_sampler(&mut self, name: &str, unit: u32);
}

/// Source of drawable primitives. `load` must precede the first `draw`.
pub trait MeshProvider {
    fn load(&mut self, kind: MeshKind);
    fn draw(&mut self, kind: MeshKind);
}

/// Everything the scene composer needs from a backend.
pub trait DrawTarget: UniformSink + MeshProvider {
    /// Enable or disable depth-buffer writes for subsequent draws.
    fn set_depth_write(&mut self, enabled: bool);
}

/// A value last pushed to a named uniform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum UniformValue {
    Int(i32),
    Scalar(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Sampler(u32),
}

/// One captured draw call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawRecord {
    pub kind: MeshKind,
    pub model: Mat4,
    pub color: Vec4,
    /// Texture unit sampled by this draw, `None` when drawn with a flat color.
    pub texture_unit: Option<u32>,
    pub uv_scale: Vec2,
    pub depth_write: bool,
}

impl DrawRecord {
    /// World-space position of the primitive's origin.
    pub fn position(&self) -> Vec3 {
        self.model.w_axis.truncate()
    }
}

/// Headless draw target that remembers uniform state and logs draws.
///
/// Useful for CLI output, logging, and testing the composer.
#[derive(Debug)]
pub struct RecordingTarget {
    uniforms: BTreeMap<String, UniformValue>,
    loaded: BTreeSet<MeshKind>,
    depth_write: bool,
    records: Vec<DrawRecord>,
    skipped: usize,
}

impl Default for RecordingTarget {
    fn default() -> Self {
        Self {
            uniforms: BTreeMap::new(),
            loaded: BTreeSet::new(),
            depth_write: true,
            records: Vec::new(),
            skipped: 0,
        }
    }
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    /// Draws dropped because their mesh kind was never loaded.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Human-readable listing of the recorded draws.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Draw list ({} draws) ===", self.records.len());
        for (i, r) in self.records.iter().enumerate() {
            let p = r.position();
            let source = match r.texture_unit {
                Some(unit) => format!("unit {unit}"),
                None => format!(
                    "rgba({:.2}, {:.2}, {:.2}, {:.2})",
                    r.color.x, r.color.y, r.color.z, r.color.w
                ),
            };
            let _ = writeln!(
                out,
                "  [{i:02}] {:?} pos=({:.3}, {:.3}, {:.3}) {source}{}",
                r.kind,
                p.x,
                p.y,
                p.z,
                if r.depth_write { "" } else { " no-depth-write" }
            );
        }
        out
    }

    fn set(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_string(), value);
    }
}

impl UniformSink for RecordingTarget {
    fn set_int(&mut self, name: &str, value: i32) {
        self.set(name, UniformValue::Int(value));
    }

    fn set_scalar(&mut self, name: &str, value: f32) {
        self.set(name, UniformValue::Scalar(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.set(name, UniformValue::Vec2(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set(name, UniformValue::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set(name, UniformValue::Vec4(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set(name, UniformValue::Mat4(value));
    }

    fn set_sampler(&mut self, name: &str, unit: u32) {
        self.set(name, UniformValue::Sampler(unit));
    }
}

impl MeshProvider for RecordingTarget {
    fn load(&mut self, kind: MeshKind) {
        self.loaded.insert(kind);
    }

    fn draw(&mut self, kind: MeshKind) {
        if !self.loaded.contains(&kind) {
            tracing::warn!("draw of {kind:?} before its mesh was loaded; skipped");
            self.skipped += 1;
            return;
        }

        let model = match self.uniform(uniforms::MODEL) {
            Some(UniformValue::Mat4(m)) => m,
            _ => Mat4::IDENTITY,
        };
        let color = match self.uniform(uniforms::OBJECT_COLOR) {
            Some(UniformValue::Vec4(c)) => c,
            _ => Vec4::ONE,
        };
        let textured = matches!(self.uniform(uniforms::USE_TEXTURE), Some(UniformValue::Int(1)));
        let texture_unit = match self.uniform(uniforms::OBJECT_TEXTURE) {
            Some(UniformValue::Sampler(unit)) if textured => Some(unit),
            _ => None,
        };
        let uv_scale = match self.uniform(uniforms::UV_SCALE) {
            Some(UniformValue::Vec2(uv)) => uv,
            _ => Vec2::ONE,
        };

        self.records.push(DrawRecord {
            kind,
            model,
            color,
            texture_unit,
            uv_scale,
            depth_write: self.depth_write,
        });
    }
}

impl DrawTarget for RecordingTarget {
    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }
}
