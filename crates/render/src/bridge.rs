use std::fmt::Debug;

use deskscene_assets::{MaterialRegistry, TextureRegistry};
use deskscene_common::{FrameView, MeshKind, Placement};
use glam::{Vec2, Vec4};

use crate::renderer::{DrawTarget, uniforms};

/// Pushes transforms, colors, textures and materials to a [`DrawTarget`],
/// resolving tags through the scene registries.
pub struct ShaderBridge<'a, T: DrawTarget + ?Sized, H> {
    target: &'a mut T,
    textures: &'a TextureRegistry<H>,
    materials: &'a MaterialRegistry,
}

impl<'a, T: DrawTarget + ?Sized, H: Clone + Debug> ShaderBridge<'a, T, H> {
    pub fn new(
        target: &'a mut T,
        textures: &'a TextureRegistry<H>,
        materials: &'a MaterialRegistry,
    ) -> Self {
        Self {
            target,
            textures,
            materials,
        }
    }

    /// Push the per-frame camera matrices and eye position.
    pub fn apply_view(&mut self, frame: &FrameView) {
        self.target.set_mat4(uniforms::VIEW, frame.view);
        self.target.set_mat4(uniforms::PROJECTION, frame.projection);
        self.target.set_vec3(uniforms::VIEW_POSITION, frame.eye);
    }

    pub fn set_transform(&mut self, placement: &Placement) {
        let model = placement.model_matrix();
        self.target.set_mat4(uniforms::MODEL, model);
    }

    /// Flat color for the next draw; disables texture sampling.
    pub fn set_color(&mut self, rgba: Vec4) {
        self.target.set_int(uniforms::USE_TEXTURE, 0);
        self.target.set_vec4(uniforms::OBJECT_COLOR, rgba);
    }

    /// Sample the texture tagged `tag` in the next draw.
    ///
    /// Returns `false` when no such texture is registered; texturing is then
    /// left as it was.
    pub fn set_texture(&mut self, tag: &str) -> bool {
        let Some(slot) = self.textures.find_slot(tag) else {
            tracing::trace!("texture '{tag}' not registered");
            return false;
        };
        let target = &mut *self.target;
        target.set_int(uniforms::USE_TEXTURE, 1);
        target.set_sampler(uniforms::OBJECT_TEXTURE, slot as u32);
        true
    }

    /// Scale applied to texture coordinates. Callers reset it to (1, 1).
    pub fn set_uv_scale(&mut self, uv: Vec2) {
        self.target.set_vec2(uniforms::UV_SCALE, uv);
    }

    /// Push the material tagged `tag`.
    ///
    /// An unknown tag leaves the previous material uniforms in place.
    pub fn set_material(&mut self, tag: &str) -> bool {
        let Some(material) = self.materials.find(tag) else {
            tracing::trace!("material '{tag}' not defined; keeping previous material");
            return false;
        };
        let target = &mut *self.target;
        target.set_vec3(uniforms::AMBIENT_COLOR, material.ambient_color);
        target.set_scalar(uniforms::AMBIENT_STRENGTH, material.ambient_strength);
        target.set_vec3(uniforms::DIFFUSE_COLOR, material.diffuse_color);
        target.set_vec3(uniforms::SPECULAR_COLOR, material.specular_color);
        target.set_scalar(uniforms::SHININESS, material.shininess);
        true
    }

    pub fn set_lighting(&mut self, enabled: bool) {
        let flag = i32::from(enabled);
        self.target.set_int(uniforms::USE_LIGHTING, flag);
    }

    pub fn set_depth_write(&mut self, enabled: bool) {
        self.target.set_depth_write(enabled);
    }

    pub fn draw(&mut self, kind: MeshKind) {
        self.target.draw(kind);
    }
}
