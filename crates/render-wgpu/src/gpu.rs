use std::borrow::Cow;
use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use deskscene_assets::{AssetError, DecodedImage, TextureBackend};
use deskscene_common::MeshKind;
use deskscene_render::{DrawTarget, MeshProvider, UniformSink, uniforms};
use glam::{Mat4, Vec2, Vec3, Vec4};
use image::imageops::FilterType;
use wgpu::util::DeviceExt;

use crate::meshes::{self, Vertex};
use crate::shaders;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const MAX_TEXTURE_UNITS: usize = 16;
const INITIAL_DRAW_CAPACITY: u64 = 64;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.08,
    g: 0.08,
    b: 0.1,
    a: 1.0,
};

/// Shader-side state captured at every draw call.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DrawUniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    object_color: [f32; 4],
    view_position: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    uv_scale: [f32; 2],
    use_texture: u32,
    use_lighting: u32,
}

impl Default for DrawUniforms {
    fn default() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            model: identity,
            view: identity,
            projection: identity,
            object_color: [1.0; 4],
            view_position: [0.0; 4],
            ambient: [1.0, 1.0, 1.0, 0.1],
            diffuse: [1.0, 1.0, 1.0, 32.0],
            specular: [0.5, 0.5, 0.5, 0.0],
            uv_scale: [1.0, 1.0],
            use_texture: 0,
            use_lighting: 0,
        }
    }
}

/// Texture handle issued by [`WgpuBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GpuTextureId(u32);

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

#[derive(Debug, Clone, Copy)]
struct DrawCall {
    mesh: MeshKind,
    uniform_index: u32,
    texture: Option<GpuTextureId>,
    depth_write: bool,
}

/// wgpu draw target for the desk scene.
///
/// Uniform setters update a CPU copy of the shader state. Each `draw`
/// snapshots that state into a dynamic-offset uniform buffer and queues the
/// call; [`WgpuBackend::end_frame`] encodes and submits the queued calls in
/// order.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    depth_write_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
    uniform_capacity: u64,
    sampler: wgpu::Sampler,
    fallback: GpuTexture,
    textures: BTreeMap<GpuTextureId, GpuTexture>,
    next_texture: u32,
    units: [Option<GpuTextureId>; MAX_TEXTURE_UNITS],
    meshes: BTreeMap<MeshKind, GpuMesh>,
    current: DrawUniforms,
    sampler_unit: u32,
    depth_write: bool,
    staging: Vec<u8>,
    draws: Vec<DrawCall>,
    depth_view: wgpu::TextureView,
}

impl WgpuBackend {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_size = std::mem::size_of::<DrawUniforms>() as u64;
        let uniform_stride = wgpu::util::align_to(
            uniform_size,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(uniform_size),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let depth_write_pipeline =
            create_scene_pipeline(&device, &pipeline_layout, &shader, surface_format, true);
        let overlay_pipeline =
            create_scene_pipeline(&device, &pipeline_layout, &shader, surface_format, false);

        let (uniform_buffer, uniform_bind_group) = create_uniform_buffer(
            &device,
            &uniform_layout,
            INITIAL_DRAW_CAPACITY * uniform_stride,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("scene_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let fallback_texture = device.create_texture_with_data(
            &queue,
            &texture_descriptor("fallback_white", 1, 1, 1),
            wgpu::util::TextureDataOrder::LayerMajor,
            &[255, 255, 255, 255],
        );
        let fallback = GpuTexture {
            bind_group: create_texture_bind_group(
                &device,
                &texture_layout,
                &fallback_texture,
                &sampler,
            ),
            texture: fallback_texture,
        };

        let depth_view = create_depth_texture(&device, width, height);

        Self {
            device,
            queue,
            depth_write_pipeline,
            overlay_pipeline,
            uniform_layout,
            texture_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            uniform_capacity: INITIAL_DRAW_CAPACITY,
            sampler,
            fallback,
            textures: BTreeMap::new(),
            next_texture: 0,
            units: [None; MAX_TEXTURE_UNITS],
            meshes: BTreeMap::new(),
            current: DrawUniforms::default(),
            sampler_unit: 0,
            depth_write: true,
            staging: Vec::new(),
            draws: Vec::new(),
            depth_view,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth_view = create_depth_texture(&self.device, width, height);
    }

    /// Encode and submit every queued draw into `target`, clearing color and
    /// depth first. Returns the number of draws submitted.
    pub fn end_frame(&mut self, target: &wgpu::TextureView) -> usize {
        let count = self.draws.len();
        self.ensure_uniform_capacity(count as u64);
        if !self.staging.is_empty() {
            let staging = self.staging.as_slice();
            self.queue.write_buffer(&self.uniform_buffer, 0, staging);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for call in &self.draws {
                let Some(mesh) = self.meshes.get(&call.mesh) else {
                    continue;
                };
                let pipeline = if call.depth_write {
                    &self.depth_write_pipeline
                } else {
                    &self.overlay_pipeline
                };
                let texture = call
                    .texture
                    .and_then(|id| self.textures.get(&id))
                    .unwrap_or(&self.fallback);
                let offset = (call.uniform_index as u64 * self.uniform_stride) as u32;

                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                pass.set_bind_group(1, &texture.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.draws.clear();
        self.staging.clear();
        count
    }

    fn ensure_uniform_capacity(&mut self, draws: u64) {
        if draws <= self.uniform_capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        tracing::debug!("growing draw uniform buffer to {capacity} draws");
        let (buffer, bind_group) = create_uniform_buffer(
            &self.device,
            &self.uniform_layout,
            capacity * self.uniform_stride,
        );
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = capacity;
    }

    fn unknown_uniform(&self, name: &str) {
        tracing::trace!("ignoring unknown uniform '{name}'");
    }
}

impl UniformSink for WgpuBackend {
    fn set_int(&mut self, name: &str, value: i32) {
        let flag = u32::from(value != 0);
        match name {
            uniforms::USE_TEXTURE => self.current.use_texture = flag,
            uniforms::USE_LIGHTING => self.current.use_lighting = flag,
            _ => self.unknown_uniform(name),
        }
    }

    fn set_scalar(&mut self, name: &str, value: f32) {
        match name {
            uniforms::AMBIENT_STRENGTH => self.current.ambient[3] = value,
            uniforms::SHININESS => self.current.diffuse[3] = value,
            _ => self.unknown_uniform(name),
        }
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        match name {
            uniforms::UV_SCALE => self.current.uv_scale = value.to_array(),
            _ => self.unknown_uniform(name),
        }
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        let [x, y, z] = value.to_array();
        let target = match name {
            uniforms::VIEW_POSITION => &mut self.current.view_position,
            uniforms::AMBIENT_COLOR => &mut self.current.ambient,
            uniforms::DIFFUSE_COLOR => &mut self.current.diffuse,
            uniforms::SPECULAR_COLOR => &mut self.current.specular,
            _ => return self.unknown_uniform(name),
        };
        target[..3].copy_from_slice(&[x, y, z]);
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        match name {
            uniforms::OBJECT_COLOR => self.current.object_color = value.to_array(),
            _ => self.unknown_uniform(name),
        }
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        let cols = value.to_cols_array_2d();
        match name {
            uniforms::MODEL => self.current.model = cols,
            uniforms::VIEW => self.current.view = cols,
            uniforms::PROJECTION => self.current.projection = cols,
            _ => self.unknown_uniform(name),
        }
    }

    fn set_sampler(&mut self, name: &str, unit: u32) {
        match name {
            uniforms::OBJECT_TEXTURE => self.sampler_unit = unit,
            _ => self.unknown_uniform(name),
        }
    }
}

impl MeshProvider for WgpuBackend {
    fn load(&mut self, kind: MeshKind) {
        if self.meshes.contains_key(&kind) {
            return;
        }
        let data = meshes::mesh_for(kind);
        let label = format!("{kind:?}");
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&label),
                contents: bytemuck::cast_slice::<Vertex, u8>(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&label),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        tracing::debug!(
            "loaded {kind:?} mesh: {} vertices, {} indices",
            data.vertices.len(),
            data.indices.len()
        );
        self.meshes.insert(
            kind,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: data.indices.len() as u32,
            },
        );
    }

    fn draw(&mut self, kind: MeshKind) {
        if !self.meshes.contains_key(&kind) {
            tracing::warn!("draw of {kind:?} before its mesh was loaded; skipped");
            return;
        }

        let uniform_index = self.draws.len() as u32;
        let start = self.staging.len();
        let end = start + self.uniform_stride as usize;
        self.staging.resize(end, 0);
        let size = std::mem::size_of::<DrawUniforms>();
        self.staging[start..start + size].copy_from_slice(bytemuck::bytes_of(&self.current));

        let texture = if self.current.use_texture != 0 {
            self.units
                .get(self.sampler_unit as usize)
                .copied()
                .flatten()
        } else {
            None
        };

        self.draws.push(DrawCall {
            mesh: kind,
            uniform_index,
            texture,
            depth_write: self.depth_write,
        });
    }
}

impl DrawTarget for WgpuBackend {
    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }
}

impl TextureBackend for WgpuBackend {
    type Handle = GpuTextureId;

    fn upload(&mut self, tag: &str, image: &DecodedImage) -> Result<GpuTextureId, AssetError> {
        let reject = |reason: String| AssetError::Upload {
            tag: tag.to_string(),
            reason,
        };

        let max = self.device.limits().max_texture_dimension_2d;
        if image.width == 0 || image.height == 0 {
            return Err(reject("zero-sized image".into()));
        }
        if image.width > max || image.height > max {
            return Err(reject(format!(
                "{}x{} exceeds the {max} pixel limit",
                image.width, image.height
            )));
        }
        let base = image::RgbaImage::from_raw(image.width, image.height, image.pixels.clone())
            .ok_or_else(|| reject("pixel buffer does not match dimensions".into()))?;

        let mip_levels = image.mip_level_count();
        let texture = self.device.create_texture(&texture_descriptor(
            tag,
            image.width,
            image.height,
            mip_levels,
        ));

        for level in 0..mip_levels {
            let width = (image.width >> level).max(1);
            let height = (image.height >> level).max(1);
            let pixels: Cow<'_, [u8]> = if level == 0 {
                Cow::Borrowed(base.as_raw())
            } else {
                Cow::Owned(
                    image::imageops::resize(&base, width, height, FilterType::Triangle)
                        .into_raw(),
                )
            };
            self.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let bind_group =
            create_texture_bind_group(&self.device, &self.texture_layout, &texture, &self.sampler);
        let id = GpuTextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                bind_group,
            },
        );
        tracing::debug!(
            "uploaded texture '{tag}' ({}x{}, {mip_levels} mip levels)",
            image.width,
            image.height
        );
        Ok(id)
    }

    fn bind(&mut self, unit: u32, handle: &GpuTextureId) {
        match self.units.get_mut(unit as usize) {
            Some(slot) => *slot = Some(*handle),
            None => tracing::warn!("texture unit {unit} out of range"),
        }
    }

    fn release(&mut self, handle: GpuTextureId) {
        if let Some(gpu) = self.textures.remove(&handle) {
            gpu.texture.destroy();
        }
        for unit in self.units.iter_mut() {
            if *unit == Some(handle) {
                *unit = None;
            }
        }
    }

    fn max_units(&self) -> u32 {
        MAX_TEXTURE_UNITS as u32
    }
}

fn texture_descriptor(
    label: &str,
    width: u32,
    height: u32,
    mip_level_count: u32,
) -> wgpu::TextureDescriptor<'_> {
    wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEXTURE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    }
}

fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &wgpu::Texture,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("texture_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_uniform_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    size: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("draw_uniforms"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("draw_uniform_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_scene_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(if depth_write {
            "scene_pipeline"
        } else {
            "scene_overlay_pipeline"
        }),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                    2 => Float32x2,
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_uniforms_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 288);
        assert_eq!(std::mem::size_of::<DrawUniforms>() % 16, 0);
    }

    #[test]
    fn default_uniforms_are_identity_and_untextured() {
        let uniforms = DrawUniforms::default();
        assert_eq!(uniforms.model, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(uniforms.uv_scale, [1.0, 1.0]);
        assert_eq!(uniforms.use_texture, 0);
    }
}
