use crate::error::GpuError;
use crate::mesh::{FrameUniforms, GpuVertex, MeshUniforms, plane_vertices};
use crate::shaders;
use crossplanes_assets::TextureImage;
use crossplanes_common::{Color, SurfaceSize, TextureId};
use crossplanes_render::{DrawingSurface, Renderer, draw_order};
use crossplanes_scene::{PerspectiveCamera, PlaneGeometry, Scene, Side};
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU resources for one draw position in the sorted draw list.
///
/// Slots are reused frame to frame; vertices and uniforms are rewritten for
/// whichever mesh lands in the slot.
struct DrawSlot {
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// A texture with its group-2 bind group.
struct TextureSlot {
    size: SurfaceSize,
    bind_group: wgpu::BindGroup,
}

/// wgpu-based scene renderer that owns its window surface.
pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    layout: SurfaceSize,
    backing: SurfaceSize,
    depth_texture: wgpu::TextureView,

    /// Indexed by [`pipeline_index`].
    pipelines: Vec<wgpu::RenderPipeline>,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    mesh_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    index_buffer: wgpu::Buffer,
    index_count: u32,

    slots: Vec<DrawSlot>,
    placeholder: TextureSlot,
    textures: BTreeMap<TextureId, TextureSlot>,
}

fn pipeline_index(side: Side, transparent: bool) -> usize {
    let side = match side {
        Side::Front => 0,
        Side::Back => 1,
        Side::Double => 2,
    };
    side * 2 + transparent as usize
}

fn cull_mode(side: Side) -> Option<wgpu::Face> {
    match side {
        Side::Front => Some(wgpu::Face::Back),
        Side::Back => Some(wgpu::Face::Front),
        Side::Double => None,
    }
}

fn clear_color(color: Color) -> wgpu::Color {
    let [r, g, b] = color.to_array();
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

impl WgpuRenderer {
    /// Create a surface for `target` (usually an `Arc<winit::window::Window>`),
    /// bring up an adapter and device for it and configure it at `size`.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: SurfaceSize,
    ) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(target)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("crossplanes_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        // Colors are written as-is, without sRGB encoding on output.
        let format = caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            adapter = %adapter.get_info().name,
            ?format,
            "GPU initialized"
        );

        Ok(Self::with_device(surface, device, queue, config, size))
    }

    fn with_device(
        surface: wgpu::Surface<'static>,
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: wgpu::SurfaceConfiguration,
        size: SurfaceSize,
    ) -> Self {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let mesh_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
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

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniform_buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("phong_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &mesh_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("phong_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PHONG_SHADER.into()),
        });

        let mut pipelines = Vec::with_capacity(6);
        for side in [Side::Front, Side::Back, Side::Double] {
            for transparent in [false, true] {
                debug_assert_eq!(pipelines.len(), pipeline_index(side, transparent));
                pipelines.push(create_pipeline(
                    &device,
                    &pipeline_layout,
                    &shader,
                    config.format,
                    side,
                    transparent,
                ));
            }
        }

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("map_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let indices = PlaneGeometry::new(1.0, 1.0).indices();
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("plane_index_buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let placeholder = upload_texture(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            &TextureImage::placeholder(),
            "placeholder_texture",
        );

        let depth_texture = create_depth_texture(&device, config.width, config.height);

        Self {
            surface,
            device,
            queue,
            // Unsized until the first frame, so that frame runs the resize
            // path and fixes up the camera aspect.
            backing: SurfaceSize::default(),
            config,
            layout: size,
            depth_texture,
            pipelines,
            frame_buffer,
            frame_bind_group,
            mesh_layout,
            texture_layout,
            sampler,
            index_buffer,
            index_count: indices.len() as u32,
            slots: Vec::new(),
            placeholder,
            textures: BTreeMap::new(),
        }
    }

    /// Record the window's current inner size. The backing buffer follows on
    /// the next frame.
    pub fn set_layout_size(&mut self, size: SurfaceSize) {
        self.layout = size;
    }

    /// Reconfigure the surface after it was lost or became outdated.
    pub fn reconfigure(&mut self) {
        if !self.backing.is_empty() {
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn ensure_slots(&mut self, count: usize) {
        while self.slots.len() < count {
            let index = self.slots.len();
            let vertex_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(format!("draw_slot_{index}_vertices").as_str()),
                size: std::mem::size_of::<[GpuVertex; 4]>() as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(format!("draw_slot_{index}_uniforms").as_str()),
                size: std::mem::size_of::<MeshUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(format!("draw_slot_{index}_bind_group").as_str()),
                layout: &self.mesh_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
            self.slots.push(DrawSlot {
                vertex_buffer,
                uniform_buffer,
                bind_group,
            });
        }
    }
}

impl DrawingSurface for WgpuRenderer {
    fn layout_size(&self) -> SurfaceSize {
        self.layout
    }

    fn backing_size(&self) -> SurfaceSize {
        self.backing
    }

    fn resize_backing(&mut self, size: SurfaceSize) {
        self.backing = size;
        if size.is_empty() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = create_depth_texture(&self.device, size.width, size.height);
    }
}

impl Renderer for WgpuRenderer {
    type Output = Result<(), wgpu::SurfaceError>;

    /// Render one frame. Surface errors are returned so the host can
    /// reconfigure and ask for another frame.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output {
        if self.backing.is_empty() {
            return Ok(());
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(camera, scene.lights())),
        );

        let items = draw_order(scene, camera);
        self.ensure_slots(items.len());
        for (slot, item) in self.slots.iter().zip(&items) {
            self.queue.write_buffer(
                &slot.vertex_buffer,
                0,
                bytemuck::cast_slice(&plane_vertices(&item.mesh.geometry)),
            );
            self.queue.write_buffer(
                &slot.uniform_buffer,
                0,
                bytemuck::bytes_of(&MeshUniforms::new(item.world, item.mesh)),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene.background)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

            for (slot, item) in self.slots.iter().zip(&items) {
                let material = &item.mesh.material;
                let texture = material
                    .map
                    .and_then(|map| self.textures.get(&map.texture))
                    .unwrap_or(&self.placeholder);

                pass.set_pipeline(&self.pipelines[pipeline_index(material.side, material.transparent)]);
                pass.set_bind_group(1, &slot.bind_group, &[]);
                pass.set_bind_group(2, &texture.bind_group, &[]);
                pass.set_vertex_buffer(0, slot.vertex_buffer.slice(..));
                pass.draw_indexed(0..self.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        tracing::trace!(meshes = items.len(), "frame submitted");
        Ok(())
    }

    fn set_texture(&mut self, id: TextureId, image: &TextureImage) {
        let max = self.device.limits().max_texture_dimension_2d;
        if !texture_fits(image, max) {
            tracing::warn!(
                texture = id.0,
                width = image.width,
                height = image.height,
                max,
                "texture too large for the device, keeping placeholder"
            );
            return;
        }
        let slot = upload_texture(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            image,
            &format!("texture_{}", id.0),
        );
        tracing::debug!(
            texture = id.0,
            width = slot.size.width,
            height = slot.size.height,
            "texture uploaded"
        );
        self.textures.insert(id, slot);
    }
}

/// Whether `image` can be uploaded to a device whose 2D textures are at most
/// `max_dimension` texels on a side.
fn texture_fits(image: &TextureImage, max_dimension: u32) -> bool {
    (1..=max_dimension).contains(&image.width)
        && (1..=max_dimension).contains(&image.height)
        && image.stride().is_some()
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    side: Side,
    transparent: bool,
) -> wgpu::RenderPipeline {
    let blend = if transparent {
        wgpu::BlendState::ALPHA_BLENDING
    } else {
        wgpu::BlendState::REPLACE
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(format!("phong_pipeline_{side:?}_{transparent}").as_str()),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[GpuVertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: cull_mode(side),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    image: &TextureImage,
    label: &str,
) -> TextureSlot {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: image.stride(),
            rows_per_image: Some(image.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
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
    });

    TextureSlot {
        size: SurfaceSize::new(image.width, image.height),
        bind_group,
    }
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
    fn pipeline_indices_are_dense() {
        let mut seen = Vec::new();
        for side in [Side::Front, Side::Back, Side::Double] {
            for transparent in [false, true] {
                seen.push(pipeline_index(side, transparent));
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn double_sided_disables_culling() {
        assert_eq!(cull_mode(Side::Double), None);
        assert_eq!(cull_mode(Side::Front), Some(wgpu::Face::Back));
        assert_eq!(cull_mode(Side::Back), Some(wgpu::Face::Front));
    }

    #[test]
    fn background_clears_opaque() {
        let color = clear_color(Color::WHITE);
        assert_eq!((color.r, color.g, color.b, color.a), (1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn textures_beyond_device_limits_are_refused() {
        let image = |width, height| TextureImage {
            width,
            height,
            pixels: Vec::new(),
        };
        assert!(texture_fits(&TextureImage::placeholder(), 8192));
        assert!(texture_fits(&image(8192, 8192), 8192));
        assert!(!texture_fits(&image(8193, 16), 8192));
        assert!(!texture_fits(&image(0, 16), 8192));
        assert!(!texture_fits(&image(u32::MAX, 1), u32::MAX));
    }
}
