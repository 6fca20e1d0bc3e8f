//! CPU-side packing of scene data into the layouts the shader expects.

use bytemuck::{Pod, Zeroable};
use crossplanes_scene::{DirectionalLight, Mesh, PerspectiveCamera, PlaneGeometry};
use glam::Mat4;

pub const MAX_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl GpuVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub fn plane_vertices(geometry: &PlaneGeometry) -> [GpuVertex; 4] {
    geometry.vertices().map(|v| GpuVertex {
        position: v.position,
        normal: v.normal,
        uv: v.uv,
    })
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct LightUniform {
    /// Unit vector towards the light.
    pub direction: [f32; 4],
    /// Color times intensity.
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
    pub light_count: [u32; 4],
}

impl FrameUniforms {
    /// Lights beyond [`MAX_LIGHTS`] are dropped with a warning.
    pub fn new(camera: &PerspectiveCamera, lights: &[DirectionalLight]) -> Self {
        if lights.len() > MAX_LIGHTS {
            tracing::warn!(
                lights = lights.len(),
                max = MAX_LIGHTS,
                "too many directional lights, extra lights ignored"
            );
        }

        let mut packed = [LightUniform::default(); MAX_LIGHTS];
        for (slot, light) in packed.iter_mut().zip(lights) {
            slot.direction = light.direction_to_light().extend(0.0).to_array();
            let [r, g, b] = light.radiance().to_array();
            slot.color = [r, g, b, 1.0];
        }

        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            lights: packed,
            light_count: [lights.len().min(MAX_LIGHTS) as u32, 0, 0, 0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub specular: [f32; 4],
    pub uv_transform: [f32; 4],
}

impl MeshUniforms {
    pub fn new(world: Mat4, mesh: &Mesh) -> Self {
        let material = &mesh.material;
        let [r, g, b] = material.color.to_array();
        let [sr, sg, sb] = material.specular.to_array();
        let uv_transform = match material.map {
            Some(map) => [map.offset.x, map.offset.y, map.repeat.x, map.repeat.y],
            None => [0.0, 0.0, 1.0, 1.0],
        };

        Self {
            model: world.to_cols_array_2d(),
            normal_matrix: world.inverse().transpose().to_cols_array_2d(),
            color: [r, g, b, material.effective_opacity()],
            specular: [sr, sg, sb, material.shininess],
            uv_transform,
        }
    }
}
