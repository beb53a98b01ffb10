//! Text render pipeline — draws built text runs from their packed atlas.
//!
//! Each [`quill_text::TextRun`] becomes one [`GpuTextRun`] holding its
//! own R8 atlas texture, vertex buffer, and index buffer (atlases are
//! write-once per run, never shared or evicted). The pipeline itself is
//! shared: shader, camera uniform, bind group layouts, sampler.
//!
//! Lifecycle: [`TextPipeline::upload`] → any number of
//! [`TextPipeline::draw`] calls → [`GpuTextRun::destroy`]. `destroy`
//! consumes the run, so drawing after destruction is a compile error
//! rather than a runtime fault.

use wgpu::{
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry,
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry,
    BindingResource, BindingType, BlendState, Buffer, BufferAddress,
    BufferBindingType, BufferDescriptor, BufferUsages, ColorTargetState,
    ColorWrites, Device, Extent3d, FilterMode, FragmentState, FrontFace,
    IndexFormat, MultisampleState, PipelineCompilationOptions,
    PipelineLayoutDescriptor, PolygonMode, PrimitiveState,
    PrimitiveTopology, Queue, RenderPass, RenderPipeline,
    RenderPipelineDescriptor, Sampler, SamplerBindingType,
    SamplerDescriptor, ShaderModuleDescriptor, ShaderStages, Texture,
    TextureDescriptor, TextureDimension, TextureFormat, TextureSampleType,
    TextureUsages, TextureViewDimension, VertexAttribute,
    VertexBufferLayout, VertexFormat, VertexState, VertexStepMode,
};

use quill_text::{TextRun, Vertex};

use crate::context::GpuContext;
use crate::vertex::CameraUniform;

/// Vertex buffer layout for [`quill_text::Vertex`] (position + uv).
fn vertex_layout() -> VertexBufferLayout<'static> {
    static ATTRS: &[VertexAttribute] = &[
        // location(0) = position
        VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: VertexFormat::Float32x2,
        },
        // location(1) = uv
        VertexAttribute {
            offset: 8,
            shader_location: 1,
            format: VertexFormat::Float32x2,
        },
    ];
    VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
        step_mode: VertexStepMode::Vertex,
        attributes: ATTRS,
    }
}

/// GPU resources for one uploaded text run.
///
/// Owns the atlas texture and both geometry buffers; released together
/// by [`GpuTextRun::destroy`].
pub struct GpuTextRun {
    atlas_texture: Texture,
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    color_buffer: Buffer,
    bind_group: BindGroup,
    index_count: u32,
    glyph_count: u32,
}

impl GpuTextRun {
    /// Number of indices drawn for this run (zero for an empty run).
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn glyph_count(&self) -> u32 {
        self.glyph_count
    }

    /// Update the run's draw color without re-uploading geometry.
    pub fn set_color(&self, queue: &Queue, color: [f32; 4]) {
        queue.write_buffer(&self.color_buffer, 0, bytemuck::bytes_of(&color));
    }

    /// Release the atlas texture and both geometry buffers.
    ///
    /// Consumes the run: a destroyed run can no longer be drawn.
    pub fn destroy(self) {
        self.atlas_texture.destroy();
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.color_buffer.destroy();
    }
}

/// Shared pipeline state for drawing text runs.
pub struct TextPipeline {
    pipeline: RenderPipeline,
    camera_buffer: Buffer,
    camera_bind_group: BindGroup,
    run_bgl: BindGroupLayout,
    atlas_sampler: Sampler,
}

impl TextPipeline {
    pub fn new(device: &Device, target_format: TextureFormat) -> Self {
        // ── Shader ──────────────────────────────────────────────
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("text_shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../shaders/text.wgsl").into(),
            ),
        });

        // ── Camera bind group layout (group 0) ──────────────────
        let camera_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("text_camera_bgl"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        // ── Per-run bind group layout (group 1) ─────────────────
        let run_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("text_run_bgl"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 2,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        // ── Pipeline ────────────────────────────────────────────
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("text_pipeline_layout"),
            bind_group_layouts: &[&camera_bgl, &run_bgl],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("text_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &[vertex_layout()],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format: target_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // ── Camera uniform ──────────────────────────────────────
        let camera_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("text_camera_ub"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("text_camera_bg"),
            layout: &camera_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // Clamping to edges and bilinear filtering keep glyph edges
        // clean at non-integer scales.
        let atlas_sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("glyph_atlas_sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            ..Default::default()
        });

        Self {
            pipeline,
            camera_buffer,
            camera_bind_group,
            run_bgl,
            atlas_sampler,
        }
    }

    /// Upload the camera uniform for this frame.
    pub fn upload_camera(&self, queue: &Queue, camera: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
    }

    /// Upload a built run: atlas pixels into an R8 texture, geometry
    /// into vertex/index buffers.
    ///
    /// An empty run uploads a 1×1 placeholder texture and records a zero
    /// index count — drawable, drawing nothing.
    pub fn upload(&self, gpu: &GpuContext, run: &TextRun, color: [f32; 4]) -> GpuTextRun {
        let atlas_w = run.atlas.width.max(1);
        let atlas_h = run.atlas.height.max(1);

        let atlas_texture = gpu.device.create_texture(&TextureDescriptor {
            label: Some("glyph_atlas"),
            size: Extent3d {
                width: atlas_w,
                height: atlas_h,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::R8Unorm,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        if !run.atlas.is_empty() {
            gpu.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &atlas_texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &run.atlas.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(run.atlas.width), // R8 = 1 byte per pixel
                    rows_per_image: Some(run.atlas.height),
                },
                Extent3d {
                    width: run.atlas.width,
                    height: run.atlas.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&run.vertices);
        let vertex_buffer = gpu.device.create_buffer(&BufferDescriptor {
            label: Some("text_run_vb"),
            size: (vertex_bytes.len() as u64).max(std::mem::size_of::<Vertex>() as u64),
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        if !vertex_bytes.is_empty() {
            gpu.queue.write_buffer(&vertex_buffer, 0, vertex_bytes);
        }

        let index_bytes: &[u8] = bytemuck::cast_slice(&run.indices);
        let index_buffer = gpu.device.create_buffer(&BufferDescriptor {
            label: Some("text_run_ib"),
            size: (index_bytes.len() as u64).max(std::mem::size_of::<u32>() as u64),
            usage: BufferUsages::INDEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        if !index_bytes.is_empty() {
            gpu.queue.write_buffer(&index_buffer, 0, index_bytes);
        }

        let color_buffer = gpu.device.create_buffer(&BufferDescriptor {
            label: Some("text_run_color_ub"),
            size: std::mem::size_of::<[f32; 4]>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        gpu.queue.write_buffer(&color_buffer, 0, bytemuck::bytes_of(&color));

        let atlas_view = atlas_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = gpu.device.create_bind_group(&BindGroupDescriptor {
            label: Some("text_run_bg"),
            layout: &self.run_bgl,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&atlas_view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&self.atlas_sampler),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: color_buffer.as_entire_binding(),
                },
            ],
        });

        log::debug!(
            "uploaded text run: {} glyphs, atlas {}x{}",
            run.glyph_count,
            run.atlas.width,
            run.atlas.height
        );

        GpuTextRun {
            atlas_texture,
            vertex_buffer,
            index_buffer,
            color_buffer,
            bind_group,
            index_count: run.index_count(),
            glyph_count: run.glyph_count,
        }
    }

    /// Record an indexed draw of one run. No-op for empty runs.
    pub fn draw<'a>(&'a self, pass: &mut RenderPass<'a>, run: &'a GpuTextRun) {
        if run.index_count == 0 {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        pass.set_bind_group(1, &run.bind_group, &[]);
        pass.set_vertex_buffer(0, run.vertex_buffer.slice(..));
        pass.set_index_buffer(run.index_buffer.slice(..), IndexFormat::Uint32);
        pass.draw_indexed(0..run.index_count, 0, 0..1);
    }
}

// ===================================================================
// Tests
// ===================================================================
