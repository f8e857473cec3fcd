use wgpu::util::DeviceExt;

use crate::scene::{self, InstanceBatch, InstanceData, Mesh, MeshKind, OceanVertex, SolidVertex};
use storm_core::{
    FrameUniforms, OceanUniforms, ShaderAsset, SimulationContext, OCEAN_SHADER, RAIN_SHADER,
    SCENE_SHADER,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct GpuMesh {
    kind: MeshKind,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, kind: MeshKind, mesh: &Mesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vb"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_ib"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            kind,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

pub struct GpuState<'w> {
    pub window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    frame_buffer: wgpu::Buffer,
    ocean_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    ocean_pipeline: wgpu::RenderPipeline,
    scene_pipeline: wgpu::RenderPipeline,
    rain_pipeline: wgpu::RenderPipeline,
    ocean_vb: wgpu::Buffer,
    ocean_ib: wgpu::Buffer,
    ocean_index_count: u32,
    ocean_scratch: Vec<OceanVertex>,
    rain_vb: wgpu::Buffer,
    rain_count: u32,
    rain_scratch: Vec<[f32; 3]>,
    instance_vb: wgpu::Buffer,
    instances: InstanceBatch,
    meshes: Vec<GpuMesh>,
    host_waves: bool,
}

impl<'w> GpuState<'w> {
    pub async fn new(
        window: &'w winit::window::Window,
        ctx: &SimulationContext,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, config.width, config.height);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let ocean_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ocean_uniforms"),
            size: std::mem::size_of::<OceanUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniforms_bgl"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniforms_bg"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ocean_buffer.as_entire_binding(),
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let host_waves = ctx.host_waves();
        let ocean_attrs = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
        let ocean_pipeline = build_pipeline(
            &device,
            &pipeline_layout,
            format,
            &OCEAN_SHADER,
            if host_waves { "vs_host" } else { "vs_displaced" },
            "fs_ocean",
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<OceanVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &ocean_attrs,
            }],
            wgpu::PrimitiveTopology::TriangleList,
            true,
        );

        let solid_attrs = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
        let instance_attrs = wgpu::vertex_attr_array![
            2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4, 6 => Float32x4
        ];
        let scene_pipeline = build_pipeline(
            &device,
            &pipeline_layout,
            format,
            &SCENE_SHADER,
            "vs_main",
            "fs_main",
            &[
                // slot 0: mesh vertices
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SolidVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &solid_attrs,
                },
                // slot 1: instance data
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &instance_attrs,
                },
            ],
            wgpu::PrimitiveTopology::TriangleList,
            true,
        );

        let rain_attrs = wgpu::vertex_attr_array![0 => Float32x3];
        let rain_pipeline = build_pipeline(
            &device,
            &pipeline_layout,
            format,
            &RAIN_SHADER,
            "vs_rain",
            "fs_rain",
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &rain_attrs,
            }],
            wgpu::PrimitiveTopology::PointList,
            false,
        );

        let mut ocean_scratch = Vec::with_capacity(ctx.ocean().len());
        scene::ocean_vertices(ctx, &mut ocean_scratch);
        let ocean_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ocean_vb"),
            contents: bytemuck::cast_slice(&ocean_scratch),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let ocean_indices = ctx.ocean().indices();
        let ocean_ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ocean_ib"),
            contents: bytemuck::cast_slice(&ocean_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut rain_scratch = Vec::with_capacity(ctx.rain().len());
        ctx.rain().write_positions(&mut rain_scratch);
        let rain_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rain_vb"),
            contents: bytemuck::cast_slice(&rain_scratch),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let instance_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_vb"),
            size: (std::mem::size_of::<InstanceData>() * scene::instance_capacity(ctx)) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let meshes = scene::static_meshes()
            .iter()
            .map(|(kind, mesh)| GpuMesh::upload(&device, *kind, mesh))
            .collect();

        log::info!(
            "[gpu] {}x{} {:?}, ocean via {}",
            config.width,
            config.height,
            format,
            if host_waves { "host" } else { "vertex program" }
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            depth_view,
            frame_buffer,
            ocean_buffer,
            bind_group,
            ocean_pipeline,
            scene_pipeline,
            rain_pipeline,
            ocean_vb,
            ocean_ib,
            ocean_index_count: ocean_indices.len() as u32,
            ocean_scratch,
            rain_vb,
            rain_count: rain_scratch.len() as u32,
            rain_scratch,
            instance_vb,
            instances: InstanceBatch::default(),
            meshes,
            host_waves,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, new_size.width, new_size.height);
    }

    /// Upload the boat once its model has been loaded.
    fn sync_boat(&mut self, ctx: &SimulationContext) {
        if self.meshes.iter().any(|m| m.kind == MeshKind::Boat) {
            return;
        }
        if let Some(model) = ctx.boat().get() {
            let mesh = Mesh::from_model(model);
            self.meshes
                .push(GpuMesh::upload(&self.device, MeshKind::Boat, &mesh));
            log::info!("[gpu] boat mesh uploaded ({} triangles)", model.triangle_count());
        }
    }

    pub fn render(&mut self, ctx: &SimulationContext) -> Result<(), wgpu::SurfaceError> {
        self.sync_boat(ctx);

        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&ctx.frame_uniforms()));
        self.queue
            .write_buffer(&self.ocean_buffer, 0, bytemuck::bytes_of(ctx.ocean_uniforms()));
        if self.host_waves {
            scene::ocean_vertices(ctx, &mut self.ocean_scratch);
            self.queue
                .write_buffer(&self.ocean_vb, 0, bytemuck::cast_slice(&self.ocean_scratch));
        }
        ctx.rain().write_positions(&mut self.rain_scratch);
        self.queue
            .write_buffer(&self.rain_vb, 0, bytemuck::cast_slice(&self.rain_scratch));
        self.instances.rebuild(ctx);
        self.queue.write_buffer(
            &self.instance_vb,
            0,
            bytemuck::cast_slice(&self.instances.data),
        );

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let sky = ctx.config().sky_color;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: sky.x as f64,
                            g: sky.y as f64,
                            b: sky.z as f64,
                            a: 1.0,
                        }),
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
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.bind_group, &[]);

            // Opaque solids first, then the translucent sea, then rain on top.
            rpass.set_pipeline(&self.scene_pipeline);
            rpass.set_vertex_buffer(1, self.instance_vb.slice(..));
            for (kind, range) in &self.instances.ranges {
                let Some(mesh) = self.meshes.iter().find(|m| m.kind == *kind) else {
                    continue;
                };
                rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, range.clone());
            }

            rpass.set_pipeline(&self.ocean_pipeline);
            rpass.set_vertex_buffer(0, self.ocean_vb.slice(..));
            rpass.set_index_buffer(self.ocean_ib.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..self.ocean_index_count, 0, 0..1);

            rpass.set_pipeline(&self.rain_pipeline);
            rpass.set_vertex_buffer(0, self.rain_vb.slice(..));
            rpass.draw(0..self.rain_count, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[allow(clippy::too_many_arguments)]
fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    shader: &ShaderAsset,
    vs_entry: &str,
    fs_entry: &str,
    buffers: &[wgpu::VertexBufferLayout],
    topology: wgpu::PrimitiveTopology,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    let label = shader.label();
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(shader.source.into()),
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some(vs_entry),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}
