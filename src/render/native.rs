use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::bytes_of;
use log::info;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use super::common::{FrameUniforms, RenderOptions};
use super::shared::{uniform_entry, vertex_layout, MATRIX_BYTES, SHADER};
use crate::Mesh;

/// wgpu renderer that draws a single mesh with model/view/projection uniforms.
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth: Option<DepthBuffer>,
    pipeline: wgpu::RenderPipeline,
    matrices: MatrixBuffers,
    mvp_bind_group: wgpu::BindGroup,
    time_buffer: wgpu::Buffer,
    time_bind_group: wgpu::BindGroup,
    mesh: MeshBuffers,
    clear_color: wgpu::Color,
}

impl Renderer {
    /// Initializes the device and surface for `window` and uploads `mesh`.
    pub async fn new(window: Arc<Window>, mesh: &Mesh, options: RenderOptions) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(Arc::clone(&window))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;
        let adapter_info = adapter.get_info();
        info!(
            "using adapter {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("viewer-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
        };
        let (device, queue) = adapter
            .request_device(&device_descriptor)
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = options
            .depth_buffer
            .then(|| DepthBuffer::create(&device, config.width, config.height));

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("viewer-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let mvp_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mvp-bind-layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX, MATRIX_BYTES),
                uniform_entry(1, wgpu::ShaderStages::VERTEX, MATRIX_BYTES),
                uniform_entry(2, wgpu::ShaderStages::VERTEX, MATRIX_BYTES),
            ],
        });
        let time_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("time-bind-layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                std::mem::size_of::<f32>() as u64,
            )],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("viewer-pipeline-layout"),
            bind_group_layouts: &[&mvp_layout, &time_layout],
            push_constant_ranges: &[],
        });

        let matrices = MatrixBuffers::create(&device);
        let mvp_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mvp-bind-group"),
            layout: &mvp_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: matrices.model.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: matrices.view.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: matrices.projection.as_entire_binding(),
                },
            ],
        });

        let time_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("time-uniform"),
            size: std::mem::size_of::<super::TimeUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let time_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("time-bind-group"),
            layout: &time_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: time_buffer.as_entire_binding(),
            }],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("viewer-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                ..Default::default()
            },
            depth_stencil: depth.as_ref().map(|_| wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        let mesh = MeshBuffers::from_mesh(&device, mesh, "viewer-mesh");
        let [r, g, b, a] = options.clear_color;

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth,
            pipeline,
            matrices,
            mvp_bind_group,
            time_buffer,
            time_bind_group,
            mesh,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Width over height of the current surface.
    pub fn aspect_ratio(&self) -> f32 {
        if self.size.height == 0 {
            1.0
        } else {
            self.size.width as f32 / self.size.height as f32
        }
    }

    /// Reconfigures the surface (and depth buffer) for a new window size.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        if self.depth.is_some() {
            self.depth = Some(DepthBuffer::create(
                &self.device,
                new_size.width,
                new_size.height,
            ));
        }
    }

    /// Queues the frame's matrices and elapsed time ahead of the draw.
    pub fn write_uniforms(&self, uniforms: &FrameUniforms) {
        self.queue
            .write_buffer(&self.matrices.model, 0, uniforms.model.as_bytes());
        self.queue
            .write_buffer(&self.matrices.view, 0, uniforms.view.as_bytes());
        self.queue
            .write_buffer(&self.matrices.projection, 0, uniforms.projection.as_bytes());
        self.queue
            .write_buffer(&self.time_buffer, 0, bytes_of(&uniforms.time()));
    }

    /// Clears the surface and draws the mesh once.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("viewer-encoder"),
            });

        let depth_stencil_attachment =
            self.depth
                .as_ref()
                .map(|depth| wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("main-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.mvp_bind_group, &[]);
        pass.set_bind_group(1, &self.time_bind_group, &[]);
        // empty buffers cannot be sliced; a face-less mesh just clears
        if self.mesh.index_count > 0 {
            pass.set_vertex_buffer(0, self.mesh.vertex.slice(..));
            pass.set_index_buffer(self.mesh.index.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
        }

        drop(pass);
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

struct MatrixBuffers {
    model: wgpu::Buffer,
    view: wgpu::Buffer,
    projection: wgpu::Buffer,
}

impl MatrixBuffers {
    fn create(device: &wgpu::Device) -> Self {
        let uniform = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: MATRIX_BYTES,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        Self {
            model: uniform("model-uniform"),
            view: uniform("view-uniform"),
            projection: uniform("projection-uniform"),
        }
    }
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn from_mesh(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.index_count() as u32,
        }
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}
