//! wgpu implementation of the text renderer contract.
//!
//! Textures and buffers live in id-keyed tables behind a mutex. Draws are
//! recorded by [`RenderContext::draw_indexed`] and replayed into a render
//! pass by [`WgpuRenderContext::render`].

use crate::context::GraphicsContext;
use crate::vertex::Vertex2D;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use notepad_core::alloc::HashMap;
use notepad_core::profiling::profile_function;
use notepad_test_utils::{
    BufferDescriptor, BufferHandle, BufferKind, DrawParams, RenderContext, RenderError,
    RenderResult, TextureDescriptor, TextureHandle,
};
use parking_lot::Mutex;
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Smallest allocation made for a vertex or index buffer.
const MIN_BUFFER_SIZE: u64 = 256;

/// Orthographic projection mapping pixel coordinates (origin top-left,
/// y down) onto clip space.
pub fn screen_projection(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0)
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct TransformUniform {
    mvp: [[f32; 4]; 4],
}

struct TextureEntry {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
    channels: u32,
}

struct BufferEntry {
    label: Option<String>,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
    element_size: u32,
    element_count: u32,
    kind: BufferKind,
}

impl BufferEntry {
    fn usage(&self) -> wgpu::BufferUsages {
        let kind = match self.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };
        kind | wgpu::BufferUsages::COPY_DST
    }

    fn byte_len(&self) -> u64 {
        self.element_count as u64 * self.element_size as u64
    }
}

struct QueuedDraw {
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    texture: TextureHandle,
    index_count: u32,
    transform_bind_group: wgpu::BindGroup,
}

#[derive(Default)]
struct Resources {
    next_id: u64,
    textures: HashMap<u64, TextureEntry>,
    buffers: HashMap<u64, BufferEntry>,
    bound_vertex: Option<BufferHandle>,
    bound_index: Option<BufferHandle>,
    draws: Vec<QueuedDraw>,
}

impl Resources {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// GPU-backed [`RenderContext`] drawing textured `Vertex2D` triangle lists.
pub struct WgpuRenderContext {
    context: Arc<GraphicsContext>,
    pipeline: wgpu::RenderPipeline,
    transform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    resources: Mutex<Resources>,
}

impl WgpuRenderContext {
    /// Create the text pipeline for render targets of `target_format`.
    pub fn new(context: Arc<GraphicsContext>, target_format: wgpu::TextureFormat) -> Self {
        let device = context.device();

        let transform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Text Transform Bind Group Layout"),
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

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Text Atlas Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
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

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Text Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Text Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/text.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Text Pipeline Layout"),
            bind_group_layouts: &[&transform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Text Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex2D::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            context,
            pipeline,
            transform_layout,
            texture_layout,
            sampler,
            resources: Mutex::new(Resources::default()),
        }
    }

    pub fn graphics_context(&self) -> &Arc<GraphicsContext> {
        &self.context
    }

    /// Number of draws recorded since the last [`render`](Self::render).
    pub fn pending_draw_count(&self) -> usize {
        self.resources.lock().draws.len()
    }

    /// Replay and clear every recorded draw.
    ///
    /// Draws whose resources were destroyed after recording are skipped.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        profile_function!();

        let mut resources = self.resources.lock();
        let draws = std::mem::take(&mut resources.draws);
        if draws.is_empty() {
            return;
        }

        pass.push_debug_group("WgpuRenderContext::render");
        pass.set_pipeline(&self.pipeline);

        for draw in &draws {
            if draw.index_count == 0 {
                continue;
            }
            let (Some(vertices), Some(indices), Some(texture)) = (
                resources.buffers.get(&draw.vertex_buffer.id()),
                resources.buffers.get(&draw.index_buffer.id()),
                resources.textures.get(&draw.texture.id()),
            ) else {
                tracing::warn!("Skipping draw that references destroyed resources");
                continue;
            };
            let (Some(vertex_buffer), Some(index_buffer)) = (&vertices.buffer, &indices.buffer)
            else {
                continue;
            };

            let index_format = if indices.element_size == 2 {
                wgpu::IndexFormat::Uint16
            } else {
                wgpu::IndexFormat::Uint32
            };

            pass.set_bind_group(0, &draw.transform_bind_group, &[]);
            pass.set_bind_group(1, &texture.bind_group, &[]);
            pass.set_vertex_buffer(0, vertex_buffer.slice(..vertices.byte_len()));
            pass.set_index_buffer(index_buffer.slice(..indices.byte_len()), index_format);
            pass.draw_indexed(0..draw.index_count, 0, 0..1);
        }

        pass.pop_debug_group();
    }

    fn texture_format(channels: u32) -> RenderResult<wgpu::TextureFormat> {
        match channels {
            1 => Ok(wgpu::TextureFormat::R8Unorm),
            4 => Ok(wgpu::TextureFormat::Rgba8Unorm),
            other => Err(RenderError::UnsupportedChannels(other)),
        }
    }
}

impl RenderContext for WgpuRenderContext {
    fn create_texture(&self, desc: &TextureDescriptor) -> RenderResult<TextureHandle> {
        let format = Self::texture_format(desc.channels)?;
        let max = self.context.max_texture_dimension_2d();
        if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
            return Err(RenderError::TextureCreation(format!(
                "{}x{} is outside the supported range 1..={}",
                desc.width, desc.height, max
            )));
        }

        let device = self.context.device();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: desc.label,
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: desc.label,
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut resources = self.resources.lock();
        let id = resources.allocate_id();
        resources.textures.insert(
            id,
            TextureEntry {
                texture,
                bind_group,
                width: desc.width,
                height: desc.height,
                channels: desc.channels,
            },
        );

        tracing::trace!(
            "Created {}x{} texture {} ({} channels)",
            desc.width,
            desc.height,
            id,
            desc.channels
        );
        Ok(TextureHandle::from_raw(id))
    }

    fn upload_texture_pixels(&self, texture: TextureHandle, pixels: &[u8]) -> RenderResult<()> {
        profile_function!();

        let resources = self.resources.lock();
        let entry = resources
            .textures
            .get(&texture.id())
            .ok_or(RenderError::InvalidTexture(texture))?;

        let expected = entry.width as usize * entry.height as usize * entry.channels as usize;
        if pixels.len() != expected {
            return Err(RenderError::UploadSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        self.context.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &entry.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(entry.width * entry.channels),
                rows_per_image: Some(entry.height),
            },
            wgpu::Extent3d {
                width: entry.width,
                height: entry.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn destroy_texture(&self, texture: TextureHandle) {
        if let Some(entry) = self.resources.lock().textures.remove(&texture.id()) {
            entry.texture.destroy();
        }
    }

    fn create_buffer(&self, desc: &BufferDescriptor) -> RenderResult<BufferHandle> {
        if desc.element_size == 0 {
            return Err(RenderError::BufferCreation(
                "element size must be non-zero".to_string(),
            ));
        }

        let mut resources = self.resources.lock();
        let id = resources.allocate_id();
        resources.buffers.insert(
            id,
            BufferEntry {
                label: desc.label.map(str::to_string),
                buffer: None,
                capacity: 0,
                element_size: desc.element_size,
                element_count: 0,
                kind: desc.kind,
            },
        );
        Ok(BufferHandle::from_raw(id))
    }

    fn upload_buffer(
        &self,
        buffer: BufferHandle,
        element_count: u32,
        data: &[u8],
    ) -> RenderResult<()> {
        let mut resources = self.resources.lock();
        let entry = resources
            .buffers
            .get_mut(&buffer.id())
            .ok_or(RenderError::InvalidBuffer(buffer))?;

        let expected = element_count as usize * entry.element_size as usize;
        if data.len() != expected {
            return Err(RenderError::UploadSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        entry.element_count = element_count;
        if data.is_empty() {
            return Ok(());
        }

        // Buffer writes must be a multiple of COPY_BUFFER_ALIGNMENT.
        let aligned = (data.len() as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        if entry.buffer.is_none() || entry.capacity < aligned {
            let capacity = aligned.next_power_of_two().max(MIN_BUFFER_SIZE);
            tracing::trace!(
                "Growing buffer {} from {} to {} bytes",
                buffer.id(),
                entry.capacity,
                capacity
            );
            if let Some(old) = entry.buffer.take() {
                old.destroy();
            }
            entry.buffer = Some(self.context.device().create_buffer(&wgpu::BufferDescriptor {
                label: entry.label.as_deref(),
                size: capacity,
                usage: entry.usage(),
                mapped_at_creation: false,
            }));
            entry.capacity = capacity;
        }

        if let Some(gpu_buffer) = &entry.buffer {
            if aligned == data.len() as u64 {
                self.context.queue().write_buffer(gpu_buffer, 0, data);
            } else {
                let mut padded = data.to_vec();
                padded.resize(aligned as usize, 0);
                self.context.queue().write_buffer(gpu_buffer, 0, &padded);
            }
        }
        Ok(())
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        let mut resources = self.resources.lock();
        if let Some(entry) = resources.buffers.remove(&buffer.id()) {
            if let Some(gpu_buffer) = entry.buffer {
                gpu_buffer.destroy();
            }
        }
        if resources.bound_vertex == Some(buffer) {
            resources.bound_vertex = None;
        }
        if resources.bound_index == Some(buffer) {
            resources.bound_index = None;
        }
    }

    fn bind_buffer(&self, buffer: BufferHandle) -> RenderResult<()> {
        let mut resources = self.resources.lock();
        let kind = resources
            .buffers
            .get(&buffer.id())
            .map(|entry| entry.kind)
            .ok_or(RenderError::InvalidBuffer(buffer))?;

        match kind {
            BufferKind::Vertex => resources.bound_vertex = Some(buffer),
            BufferKind::Index => resources.bound_index = Some(buffer),
        }
        Ok(())
    }

    fn draw_indexed(&self, index_buffer: BufferHandle, params: &DrawParams) -> RenderResult<()> {
        let mut resources = self.resources.lock();
        let vertex_buffer = resources
            .bound_vertex
            .ok_or(RenderError::NoVertexBufferBound)?;
        if !resources.textures.contains_key(&params.texture.id()) {
            return Err(RenderError::InvalidTexture(params.texture));
        }
        let index_count = resources
            .buffers
            .get(&index_buffer.id())
            .filter(|entry| entry.kind == BufferKind::Index)
            .map(|entry| entry.element_count)
            .ok_or(RenderError::InvalidBuffer(index_buffer))?;

        let device = self.context.device();
        let uniform = TransformUniform {
            mvp: params.transform,
        };
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Text Transform Buffer"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Text Transform Bind Group"),
            layout: &self.transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        resources.draws.push(QueuedDraw {
            vertex_buffer,
            index_buffer,
            texture: params.texture,
            index_count,
            transform_bind_group,
        });
        Ok(())
    }
}
