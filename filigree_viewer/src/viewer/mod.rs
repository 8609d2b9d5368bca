//! wgpu bring-up and the per-frame draw path. The viewer owns no simulation
//! state; it uploads whatever geometry the scene's tick returned and issues
//! one render pass over it.

use std::{borrow::Cow, sync::Arc};

use anyhow::{Context, Result};
use bytemuck::cast_slice;
use wgpu::util::DeviceExt;
use wgpu::{self, SurfaceError};
use winit::{dpi::PhysicalSize, window::Window};

use filigree_scene::SceneFrame;

mod frame_data;
mod shaders;

use frame_data::{GlobeUniforms, LineVertex, SpriteInstanceRaw, build_frame_buffers};
use shaders::{LINE_SHADER_SOURCE, SPRITE_QUAD_VERTICES, SPRITE_SHADER_SOURCE, SpriteQuadVertex};

/// Particles add into the framebuffer so overlapping motes bloom instead of
/// darkening each other; markers use ordinary alpha compositing.
const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub struct ViewerState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    line_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    marker_pipeline: wgpu::RenderPipeline,
    globe_uniform_buffer: wgpu::Buffer,
    globe_bind_group: wgpu::BindGroup,
    line_vertex_buffer: wgpu::Buffer,
    line_vertex_capacity: usize,
    sprite_quad_buffer: wgpu::Buffer,
    sprite_instance_buffer: wgpu::Buffer,
    sprite_instance_capacity: usize,
}

impl ViewerState {
    /// Bring up the GPU stack for `window`. Returns `Ok(None)` when no
    /// compatible adapter exists for the surface - the caller skips the
    /// window and exits cleanly rather than treating it as a failure.
    pub async fn new(window: Arc<Window>) -> Result<Option<Self>> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("creating wgpu surface")?;

        let Some(adapter) = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
        else {
            return Ok(None);
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("filigree-viewer-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("requesting wgpu device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Mailbox)
            .unwrap_or(wgpu::PresentMode::Fifo);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Opaque);

        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line-shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(LINE_SHADER_SOURCE)),
        });
        let sprite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sprite-shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(SPRITE_SHADER_SOURCE)),
        });

        let globe_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globe-uniform-buffer"),
            size: std::mem::size_of::<GlobeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globe_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("globe-bind-group-layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let globe_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globe-bind-group"),
            layout: &globe_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globe_uniform_buffer.as_entire_binding(),
            }],
        });

        let line_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4],
        };

        let line_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line-pipeline-layout"),
            bind_group_layouts: &[&globe_bind_group_layout],
            push_constant_ranges: &[],
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line-pipeline"),
            layout: Some(&line_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: "vs_main",
                buffers: &[line_vertex_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let sprite_quad_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteQuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x2],
        };

        let sprite_instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstanceRaw>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![
                1 => Float32x2,
                2 => Float32x2,
                3 => Float32x3,
                4 => Float32,
            ],
        };

        let sprite_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("sprite-pipeline-layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

        let build_sprite_pipeline = |label: &str, blend: wgpu::BlendState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&sprite_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &sprite_shader,
                    entry_point: "vs_main",
                    buffers: &[sprite_quad_layout.clone(), sprite_instance_layout.clone()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &sprite_shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        };

        let particle_pipeline = build_sprite_pipeline("particle-pipeline", ADDITIVE_BLENDING);
        let marker_pipeline =
            build_sprite_pipeline("marker-pipeline", wgpu::BlendState::ALPHA_BLENDING);

        let sprite_quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite-quad-buffer"),
            contents: cast_slice(&SPRITE_QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let initial_line_capacity = 1024usize;
        let line_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("line-vertex-buffer"),
            size: (initial_line_capacity * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let initial_sprite_capacity = 256usize;
        let sprite_instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite-instance-buffer"),
            size: (initial_sprite_capacity * std::mem::size_of::<SpriteInstanceRaw>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let state = Self {
            window,
            surface,
            device,
            queue,
            config: wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format: surface_format,
                width: size.width.max(1),
                height: size.height.max(1),
                present_mode,
                alpha_mode,
                view_formats: vec![],
                desired_maximum_frame_latency: 1,
            },
            size,
            line_pipeline,
            particle_pipeline,
            marker_pipeline,
            globe_uniform_buffer,
            globe_bind_group,
            line_vertex_buffer,
            line_vertex_capacity: initial_line_capacity,
            sprite_quad_buffer,
            sprite_instance_buffer,
            sprite_instance_capacity: initial_sprite_capacity,
        };

        state.surface.configure(&state.device, &state.config);
        Ok(Some(state))
    }

    pub fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Reconfigure the surface for a new viewport. The camera aspect is
    /// updated by the caller on the scene side before the next frame.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn ensure_line_capacity(&mut self, required: usize) {
        if required <= self.line_vertex_capacity {
            return;
        }
        let new_capacity = required.next_power_of_two().max(1024);
        self.line_vertex_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("line-vertex-buffer"),
            size: (new_capacity * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.line_vertex_capacity = new_capacity;
    }

    fn ensure_sprite_capacity(&mut self, required: usize) {
        if required <= self.sprite_instance_capacity {
            return;
        }
        let new_capacity = required.next_power_of_two().max(256);
        self.sprite_instance_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite-instance-buffer"),
            size: (new_capacity * std::mem::size_of::<SpriteInstanceRaw>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.sprite_instance_capacity = new_capacity;
    }

    /// Upload the frame's geometry and draw it: glow strings, main strings,
    /// particles, then glow markers, all into one pass over a black clear.
    pub fn render(&mut self, frame: &SceneFrame) -> Result<(), SurfaceError> {
        let buffers = build_frame_buffers(frame);

        self.queue.write_buffer(
            &self.globe_uniform_buffer,
            0,
            bytemuck::bytes_of(&buffers.uniforms),
        );
        self.ensure_line_capacity(buffers.line_vertices.len());
        if !buffers.line_vertices.is_empty() {
            self.queue
                .write_buffer(&self.line_vertex_buffer, 0, cast_slice(&buffers.line_vertices));
        }
        self.ensure_sprite_capacity(buffers.sprite_instances.len());
        if !buffers.sprite_instances.is_empty() {
            self.queue.write_buffer(
                &self.sprite_instance_buffer,
                0,
                cast_slice(&buffers.sprite_instances),
            );
        }

        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("filigree-encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("filigree-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if !buffers.line_vertices.is_empty() {
                rpass.set_pipeline(&self.line_pipeline);
                rpass.set_bind_group(0, &self.globe_bind_group, &[]);
                rpass.set_vertex_buffer(0, self.line_vertex_buffer.slice(..));
                rpass.draw(buffers.glow_range.clone(), 0..1);
                rpass.draw(buffers.main_range.clone(), 0..1);
            }

            if !buffers.sprite_instances.is_empty() {
                if !buffers.particle_range.is_empty() {
                    rpass.set_pipeline(&self.particle_pipeline);
                    rpass.set_vertex_buffer(0, self.sprite_quad_buffer.slice(..));
                    rpass.set_vertex_buffer(1, self.sprite_instance_buffer.slice(..));
                    rpass.draw(
                        0..SPRITE_QUAD_VERTICES.len() as u32,
                        buffers.particle_range.clone(),
                    );
                }
                if !buffers.marker_range.is_empty() {
                    rpass.set_pipeline(&self.marker_pipeline);
                    rpass.set_vertex_buffer(0, self.sprite_quad_buffer.slice(..));
                    rpass.set_vertex_buffer(1, self.sprite_instance_buffer.slice(..));
                    rpass.draw(
                        0..SPRITE_QUAD_VERTICES.len() as u32,
                        buffers.marker_range.clone(),
                    );
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}
