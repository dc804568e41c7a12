use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// Flat opaque white, the only tint text currently uses.
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Textured 2D vertex consumed by the text pipeline.
///
/// Field order and packing are part of the GPU contract: position, texture
/// coordinate, then RGBA color, tightly packed as 8 `f32`s.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex2D {
    pub position: [f32; 2],
    pub texcoord: [f32; 2],
    pub color: [f32; 4],
}

const_assert_eq!(std::mem::size_of::<Vertex2D>(), 32);

impl Vertex2D {
    /// Byte stride of one vertex.
    pub const STRIDE: u32 = std::mem::size_of::<Vertex2D>() as u32;

    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32x4,
    ];

    pub const fn new(position: [f32; 2], texcoord: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            texcoord,
            color,
        }
    }

    /// Vertex buffer layout for pipelines drawing `Vertex2D`.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
