//! Resource handles and descriptors shared by every render context.

/// Opaque id of a texture owned by a render context.
///
/// Handles are cheap to copy. They do not keep the texture alive; the owner
/// destroys it explicitly with
/// [`RenderContext::destroy_texture`](crate::RenderContext::destroy_texture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    /// Wrap a backend id.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the backend id.
    pub const fn id(&self) -> u64 {
        self.0
    }
}

/// Opaque id of a vertex or index buffer owned by a render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(u64);

impl BufferHandle {
    /// Wrap a backend id.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the backend id.
    pub const fn id(&self) -> u64 {
        self.0
    }
}

/// What a buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Parameters for creating a 2D texture.
#[derive(Debug, Clone, Copy)]
pub struct TextureDescriptor<'a> {
    pub label: Option<&'a str>,
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel, one byte per channel.
    pub channels: u32,
}

impl TextureDescriptor<'_> {
    /// Number of bytes a full upload must contain.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }
}

/// Parameters for creating a growable element buffer.
///
/// Buffers start empty; their storage is sized by the first upload.
#[derive(Debug, Clone, Copy)]
pub struct BufferDescriptor<'a> {
    pub label: Option<&'a str>,
    /// Size of one element in bytes (a vertex record or one index).
    pub element_size: u32,
    pub kind: BufferKind,
}

/// Per-draw state that is not carried by the buffers themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    /// Texture sampled by the fragment stage.
    pub texture: TextureHandle,
    /// Column-major model-view-projection matrix.
    pub transform: [[f32; 4]; 4],
}

impl DrawParams {
    pub const IDENTITY: [[f32; 4]; 4] = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];

    /// Draw with the identity transform.
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            transform: Self::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: [[f32; 4]; 4]) -> Self {
        self.transform = transform;
        self
    }
}
