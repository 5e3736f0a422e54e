/// WGSL shader for scene primitives: per-draw uniforms, optional texture,
/// Phong lighting from a fixed key light and fill light.
pub const SCENE_SHADER: &str = r#"
struct DrawUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    object_color: vec4<f32>,
    view_position: vec4<f32>,
    // rgb = color, w = ambient strength
    ambient: vec4<f32>,
    // rgb = color, w = shininess
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    uv_scale: vec2<f32>,
    use_texture: u32,
    use_lighting: u32,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniforms;

@group(1) @binding(0)
var object_texture: texture_2d<f32>;
@group(1) @binding(1)
var object_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world = draw.model * vec4<f32>(vertex.position, 1.0);
    // No inverse-transpose: normals skew slightly under non-uniform scale.
    let normal = (draw.model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = draw.projection * draw.view * world;
    out.world_position = world.xyz;
    out.world_normal = normalize(normal);
    out.uv = vertex.uv * draw.uv_scale;
    return out;
}

fn phong(
    light_dir: vec3<f32>,
    light_color: vec3<f32>,
    normal: vec3<f32>,
    view_dir: vec3<f32>,
) -> vec3<f32> {
    let diffuse = max(dot(normal, light_dir), 0.0) * draw.diffuse.rgb;
    let reflected = reflect(-light_dir, normal);
    let highlight = pow(max(dot(view_dir, reflected), 0.0), max(draw.diffuse.w, 1.0));
    return light_color * (diffuse + highlight * draw.specular.rgb);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var base = draw.object_color;
    if (draw.use_texture != 0u) {
        base = textureSample(object_texture, object_sampler, in.uv) * draw.object_color;
    }
    if (draw.use_lighting == 0u) {
        return base;
    }

    let normal = normalize(in.world_normal);
    let view_dir = normalize(draw.view_position.xyz - in.world_position);

    let key_dir = normalize(vec3<f32>(-2.0, 6.0, 4.0) - in.world_position);
    let fill_dir = normalize(vec3<f32>(0.4, 0.8, 0.6));

    var light = draw.ambient.rgb * draw.ambient.w;
    light += phong(key_dir, vec3<f32>(0.9, 0.88, 0.82), normal, view_dir);
    light += phong(fill_dir, vec3<f32>(0.25, 0.27, 0.32), normal, view_dir);

    return vec4<f32>(base.rgb * light, base.a);
}
"#;
