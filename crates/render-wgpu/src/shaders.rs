/// WGSL shader for Blinn-Phong planes with an optional texture map.
///
/// Group 0 holds per-frame data (camera and lights), group 1 per-draw mesh
/// data, group 2 the texture and sampler.
pub const PHONG_SHADER: &str = r#"
struct Light {
    direction: vec4<f32>,
    color: vec4<f32>,
};

struct FrameUniforms {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    lights: array<Light, 4>,
    light_count: vec4<u32>,
};

struct MeshUniforms {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
    // rgb = diffuse color, a = opacity
    color: vec4<f32>,
    // rgb = specular color, a = shininess
    specular: vec4<f32>,
    // xy = offset, zw = repeat
    uv_transform: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

@group(1) @binding(0)
var<uniform> mesh: MeshUniforms;

@group(2) @binding(0)
var map_texture: texture_2d<f32>;
@group(2) @binding(1)
var map_sampler: sampler;

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
    let world_pos = mesh.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = (mesh.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv * mesh.uv_transform.zw + mesh.uv_transform.xy;
    return out;
}

fn fresnel_schlick(specular: vec3<f32>, dot_lh: f32) -> vec3<f32> {
    let fresnel = exp2((-5.55473 * dot_lh - 6.98316) * dot_lh);
    return (1.0 - specular) * fresnel + specular;
}

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front_facing: bool) -> @location(0) vec4<f32> {
    // Rows are uploaded top first while v grows upwards.
    let texel = textureSample(map_texture, map_sampler, vec2<f32>(in.uv.x, 1.0 - in.uv.y));
    let diffuse = mesh.color.rgb * texel.rgb;
    let alpha = mesh.color.a * texel.a;

    var normal = normalize(in.world_normal);
    if (!front_facing) {
        normal = -normal;
    }
    let view_dir = normalize(frame.camera_position.xyz - in.world_position);
    let shininess = mesh.specular.a;

    var outgoing = vec3<f32>(0.0);
    for (var i = 0u; i < frame.light_count.x; i = i + 1u) {
        let light = frame.lights[i];
        let light_dir = light.direction.xyz;
        let irradiance = max(dot(normal, light_dir), 0.0) * light.color.rgb;

        let half_dir = normalize(light_dir + view_dir);
        let dot_nh = max(dot(normal, half_dir), 0.0);
        let dot_lh = max(dot(light_dir, half_dir), 0.0);
        let blinn = 0.25 * (shininess * 0.5 + 1.0) * pow(dot_nh, shininess);

        outgoing += irradiance * diffuse;
        outgoing += irradiance * fresnel_schlick(mesh.specular.rgb, dot_lh) * blinn;
    }

    return vec4<f32>(outgoing, alpha);
}
"#;
