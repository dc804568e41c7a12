//! Mock implementation of RenderContext for testing.
//!
//! Records every operation and keeps the uploaded bytes so tests can
//! inspect atlas pixels and label geometry without a GPU.

use crate::error::{RenderError, RenderResult};
use crate::gpu_types::*;
use crate::render_context::RenderContext;
use parking_lot::Mutex;

/// Records a render operation for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    CreateTexture {
        texture: TextureHandle,
        width: u32,
        height: u32,
        channels: u32,
    },
    UploadTexture {
        texture: TextureHandle,
        size: usize,
    },
    DestroyTexture {
        texture: TextureHandle,
    },
    CreateBuffer {
        buffer: BufferHandle,
        element_size: u32,
        kind: BufferKind,
    },
    UploadBuffer {
        buffer: BufferHandle,
        element_count: u32,
        size: usize,
    },
    DestroyBuffer {
        buffer: BufferHandle,
    },
    BindBuffer {
        buffer: BufferHandle,
    },
    DrawIndexed {
        index_buffer: BufferHandle,
        index_count: u32,
        texture: TextureHandle,
    },
}

#[derive(Debug, Clone)]
struct MockTexture {
    width: u32,
    height: u32,
    channels: u32,
    pixels: Option<Vec<u8>>,
    alive: bool,
}

#[derive(Debug, Clone)]
struct MockBuffer {
    element_size: u32,
    kind: BufferKind,
    element_count: u32,
    data: Vec<u8>,
    alive: bool,
}

/// Operations the mock should refuse, for exercising error paths.
#[derive(Debug, Clone, Copy, Default)]
struct FailureFlags {
    texture_creation: bool,
    texture_upload: bool,
    buffer_creation: bool,
}

#[derive(Debug, Default)]
struct Bindings {
    vertex: Option<BufferHandle>,
    index: Option<BufferHandle>,
}

/// Mock implementation of RenderContext for testing.
///
/// # Borrow Checking Pattern: Interior Mutability
///
/// Trait methods take `&self` but must record calls and store resources,
/// so all state lives behind `parking_lot::Mutex`. `Mutex` keeps the type
/// `Send + Sync`, which the trait requires.
///
/// Handle ids index into the resource tables and are never reused, so a
/// destroyed handle stays invalid for the lifetime of the mock.
///
/// # Example
///
/// ```rust
/// use notepad_test_utils::{MockRenderContext, RenderContext, TextureDescriptor};
///
/// let mock = MockRenderContext::new();
/// let texture = mock
///     .create_texture(&TextureDescriptor {
///         label: Some("atlas"),
///         width: 2,
///         height: 2,
///         channels: 1,
///     })
///     .unwrap();
/// mock.upload_texture_pixels(texture, &[0, 64, 128, 255]).unwrap();
///
/// assert_eq!(mock.texture_pixels(texture), Some(vec![0, 64, 128, 255]));
/// ```
pub struct MockRenderContext {
    /// Recorded calls for verification
    calls: Mutex<Vec<RenderCall>>,

    textures: Mutex<Vec<MockTexture>>,
    buffers: Mutex<Vec<MockBuffer>>,
    bindings: Mutex<Bindings>,
    failures: Mutex<FailureFlags>,
}

impl MockRenderContext {
    /// Create a new mock render context.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            textures: Mutex::new(Vec::new()),
            buffers: Mutex::new(Vec::new()),
            bindings: Mutex::new(Bindings::default()),
            failures: Mutex::new(FailureFlags::default()),
        }
    }

    /// Make subsequent `create_texture` calls fail.
    pub fn set_fail_texture_creation(&self, fail: bool) {
        self.failures.lock().texture_creation = fail;
    }

    /// Make subsequent `upload_texture_pixels` calls fail.
    pub fn set_fail_texture_upload(&self, fail: bool) {
        self.failures.lock().texture_upload = fail;
    }

    /// Make subsequent `create_buffer` calls fail.
    pub fn set_fail_buffer_creation(&self, fail: bool) {
        self.failures.lock().buffer_creation = fail;
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    fn count_calls(&self, pred: impl Fn(&RenderCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| pred(call)).count()
    }

    pub fn count_texture_creates(&self) -> usize {
        self.count_calls(|call| matches!(call, RenderCall::CreateTexture { .. }))
    }

    pub fn count_texture_uploads(&self) -> usize {
        self.count_calls(|call| matches!(call, RenderCall::UploadTexture { .. }))
    }

    pub fn count_texture_destroys(&self) -> usize {
        self.count_calls(|call| matches!(call, RenderCall::DestroyTexture { .. }))
    }

    pub fn count_buffer_creates(&self) -> usize {
        self.count_calls(|call| matches!(call, RenderCall::CreateBuffer { .. }))
    }

    pub fn count_buffer_uploads(&self) -> usize {
        self.count_calls(|call| matches!(call, RenderCall::UploadBuffer { .. }))
    }

    pub fn count_buffer_destroys(&self) -> usize {
        self.count_calls(|call| matches!(call, RenderCall::DestroyBuffer { .. }))
    }

    pub fn count_draws(&self) -> usize {
        self.count_calls(|call| matches!(call, RenderCall::DrawIndexed { .. }))
    }

    /// Number of textures created and not yet destroyed.
    pub fn live_texture_count(&self) -> usize {
        self.textures.lock().iter().filter(|t| t.alive).count()
    }

    /// Number of buffers created and not yet destroyed.
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.lock().iter().filter(|b| b.alive).count()
    }

    /// Whether `texture` exists and has not been destroyed.
    pub fn is_texture_alive(&self, texture: TextureHandle) -> bool {
        self.textures
            .lock()
            .get(texture.id() as usize)
            .is_some_and(|t| t.alive)
    }

    /// Whether `buffer` exists and has not been destroyed.
    pub fn is_buffer_alive(&self, buffer: BufferHandle) -> bool {
        self.buffers
            .lock()
            .get(buffer.id() as usize)
            .is_some_and(|b| b.alive)
    }

    /// Last bytes uploaded to a live texture.
    pub fn texture_pixels(&self, texture: TextureHandle) -> Option<Vec<u8>> {
        self.textures
            .lock()
            .get(texture.id() as usize)
            .filter(|t| t.alive)
            .and_then(|t| t.pixels.clone())
    }

    /// `(width, height, channels)` of a live texture.
    pub fn texture_dimensions(&self, texture: TextureHandle) -> Option<(u32, u32, u32)> {
        self.textures
            .lock()
            .get(texture.id() as usize)
            .filter(|t| t.alive)
            .map(|t| (t.width, t.height, t.channels))
    }

    /// Last bytes uploaded to a live buffer.
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<Vec<u8>> {
        self.buffers
            .lock()
            .get(buffer.id() as usize)
            .filter(|b| b.alive)
            .map(|b| b.data.clone())
    }

    /// Element count of the last upload to a live buffer.
    pub fn buffer_element_count(&self, buffer: BufferHandle) -> Option<u32> {
        self.buffers
            .lock()
            .get(buffer.id() as usize)
            .filter(|b| b.alive)
            .map(|b| b.element_count)
    }

    /// Currently bound vertex buffer.
    pub fn bound_vertex_buffer(&self) -> Option<BufferHandle> {
        self.bindings.lock().vertex
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Get total number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for MockRenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext for MockRenderContext {
    fn create_texture(&self, desc: &TextureDescriptor) -> RenderResult<TextureHandle> {
        if self.failures.lock().texture_creation {
            return Err(RenderError::TextureCreation(
                "mock configured to fail texture creation".to_string(),
            ));
        }
        if desc.channels != 1 && desc.channels != 4 {
            return Err(RenderError::UnsupportedChannels(desc.channels));
        }

        let mut textures = self.textures.lock();
        let texture = TextureHandle::from_raw(textures.len() as u64);
        textures.push(MockTexture {
            width: desc.width,
            height: desc.height,
            channels: desc.channels,
            pixels: None,
            alive: true,
        });

        self.calls.lock().push(RenderCall::CreateTexture {
            texture,
            width: desc.width,
            height: desc.height,
            channels: desc.channels,
        });

        Ok(texture)
    }

    fn upload_texture_pixels(&self, texture: TextureHandle, pixels: &[u8]) -> RenderResult<()> {
        if self.failures.lock().texture_upload {
            return Err(RenderError::TextureCreation(
                "mock configured to fail texture upload".to_string(),
            ));
        }

        let mut textures = self.textures.lock();
        let entry = textures
            .get_mut(texture.id() as usize)
            .filter(|t| t.alive)
            .ok_or(RenderError::InvalidTexture(texture))?;

        let expected = entry.width as usize * entry.height as usize * entry.channels as usize;
        if pixels.len() != expected {
            return Err(RenderError::UploadSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        entry.pixels = Some(pixels.to_vec());

        self.calls.lock().push(RenderCall::UploadTexture {
            texture,
            size: pixels.len(),
        });
        Ok(())
    }

    fn destroy_texture(&self, texture: TextureHandle) {
        let mut textures = self.textures.lock();
        if let Some(entry) = textures.get_mut(texture.id() as usize).filter(|t| t.alive) {
            entry.alive = false;
            entry.pixels = None;
            self.calls.lock().push(RenderCall::DestroyTexture { texture });
        }
    }

    fn create_buffer(&self, desc: &BufferDescriptor) -> RenderResult<BufferHandle> {
        if self.failures.lock().buffer_creation {
            return Err(RenderError::BufferCreation(
                "mock configured to fail buffer creation".to_string(),
            ));
        }

        let mut buffers = self.buffers.lock();
        let buffer = BufferHandle::from_raw(buffers.len() as u64);
        buffers.push(MockBuffer {
            element_size: desc.element_size,
            kind: desc.kind,
            element_count: 0,
            data: Vec::new(),
            alive: true,
        });

        self.calls.lock().push(RenderCall::CreateBuffer {
            buffer,
            element_size: desc.element_size,
            kind: desc.kind,
        });

        Ok(buffer)
    }

    fn upload_buffer(
        &self,
        buffer: BufferHandle,
        element_count: u32,
        data: &[u8],
    ) -> RenderResult<()> {
        let mut buffers = self.buffers.lock();
        let entry = buffers
            .get_mut(buffer.id() as usize)
            .filter(|b| b.alive)
            .ok_or(RenderError::InvalidBuffer(buffer))?;

        let expected = element_count as usize * entry.element_size as usize;
        if data.len() != expected {
            return Err(RenderError::UploadSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        entry.element_count = element_count;
        entry.data = data.to_vec();

        self.calls.lock().push(RenderCall::UploadBuffer {
            buffer,
            element_count,
            size: data.len(),
        });
        Ok(())
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        let mut buffers = self.buffers.lock();
        if let Some(entry) = buffers.get_mut(buffer.id() as usize).filter(|b| b.alive) {
            entry.alive = false;
            entry.data = Vec::new();

            let mut bindings = self.bindings.lock();
            if bindings.vertex == Some(buffer) {
                bindings.vertex = None;
            }
            if bindings.index == Some(buffer) {
                bindings.index = None;
            }

            self.calls.lock().push(RenderCall::DestroyBuffer { buffer });
        }
    }

    fn bind_buffer(&self, buffer: BufferHandle) -> RenderResult<()> {
        let kind = self
            .buffers
            .lock()
            .get(buffer.id() as usize)
            .filter(|b| b.alive)
            .map(|b| b.kind)
            .ok_or(RenderError::InvalidBuffer(buffer))?;

        let mut bindings = self.bindings.lock();
        match kind {
            BufferKind::Vertex => bindings.vertex = Some(buffer),
            BufferKind::Index => bindings.index = Some(buffer),
        }

        self.calls.lock().push(RenderCall::BindBuffer { buffer });
        Ok(())
    }

    fn draw_indexed(&self, index_buffer: BufferHandle, params: &DrawParams) -> RenderResult<()> {
        if self.bindings.lock().vertex.is_none() {
            return Err(RenderError::NoVertexBufferBound);
        }
        if !self.is_texture_alive(params.texture) {
            return Err(RenderError::InvalidTexture(params.texture));
        }

        let index_count = self
            .buffers
            .lock()
            .get(index_buffer.id() as usize)
            .filter(|b| b.alive && b.kind == BufferKind::Index)
            .map(|b| b.element_count)
            .ok_or(RenderError::InvalidBuffer(index_buffer))?;

        self.calls.lock().push(RenderCall::DrawIndexed {
            index_buffer,
            index_count,
            texture: params.texture,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atlas_desc(channels: u32) -> TextureDescriptor<'static> {
        TextureDescriptor {
            label: Some("test_texture"),
            width: 4,
            height: 4,
            channels,
        }
    }

    fn vertex_desc() -> BufferDescriptor<'static> {
        BufferDescriptor {
            label: Some("test_vertices"),
            element_size: 32,
            kind: BufferKind::Vertex,
        }
    }

    fn index_desc() -> BufferDescriptor<'static> {
        BufferDescriptor {
            label: Some("test_indices"),
            element_size: 4,
            kind: BufferKind::Index,
        }
    }

    #[test]
    fn test_mock_texture_creation() {
        let mock = MockRenderContext::new();
        let texture = mock.create_texture(&atlas_desc(4)).unwrap();

        assert_eq!(mock.count_texture_creates(), 1);
        assert_eq!(mock.texture_dimensions(texture), Some((4, 4, 4)));
        assert_eq!(mock.texture_pixels(texture), None);
    }

    #[test]
    fn test_unsupported_channels() {
        let mock = MockRenderContext::new();
        assert_eq!(
            mock.create_texture(&atlas_desc(3)),
            Err(RenderError::UnsupportedChannels(3))
        );
        assert_eq!(mock.count_texture_creates(), 0);
    }

    #[test]
    fn test_texture_upload_size_checked() {
        let mock = MockRenderContext::new();
        let texture = mock.create_texture(&atlas_desc(1)).unwrap();

        let err = mock.upload_texture_pixels(texture, &[0u8; 15]).unwrap_err();
        assert_eq!(
            err,
            RenderError::UploadSizeMismatch {
                expected: 16,
                actual: 15
            }
        );

        mock.upload_texture_pixels(texture, &[7u8; 16]).unwrap();
        assert_eq!(mock.texture_pixels(texture), Some(vec![7u8; 16]));
        assert_eq!(mock.count_texture_uploads(), 1);
    }

    #[test]
    fn test_destroyed_texture_is_invalid() {
        let mock = MockRenderContext::new();
        let texture = mock.create_texture(&atlas_desc(4)).unwrap();
        mock.destroy_texture(texture);
        // Second destroy is a no-op
        mock.destroy_texture(texture);

        assert_eq!(mock.count_texture_destroys(), 1);
        assert_eq!(mock.live_texture_count(), 0);
        assert_eq!(
            mock.upload_texture_pixels(texture, &[0u8; 64]),
            Err(RenderError::InvalidTexture(texture))
        );
    }

    #[test]
    fn test_buffer_upload_and_draw() {
        let mock = MockRenderContext::new();
        let texture = mock.create_texture(&atlas_desc(4)).unwrap();
        let vertices = mock.create_buffer(&vertex_desc()).unwrap();
        let indices = mock.create_buffer(&index_desc()).unwrap();

        mock.upload_buffer(vertices, 4, &[0u8; 128]).unwrap();
        mock.upload_buffer(indices, 6, &[0u8; 24]).unwrap();
        mock.bind_buffer(vertices).unwrap();
        mock.bind_buffer(indices).unwrap();
        mock.draw_indexed(indices, &DrawParams::new(texture)).unwrap();

        assert_eq!(mock.bound_vertex_buffer(), Some(vertices));
        assert_eq!(
            mock.calls().last(),
            Some(&RenderCall::DrawIndexed {
                index_buffer: indices,
                index_count: 6,
                texture,
            })
        );
    }

    #[test]
    fn test_draw_requires_vertex_binding() {
        let mock = MockRenderContext::new();
        let texture = mock.create_texture(&atlas_desc(4)).unwrap();
        let indices = mock.create_buffer(&index_desc()).unwrap();

        assert_eq!(
            mock.draw_indexed(indices, &DrawParams::new(texture)),
            Err(RenderError::NoVertexBufferBound)
        );
    }

    #[test]
    fn test_failure_injection() {
        let mock = MockRenderContext::new();
        mock.set_fail_texture_creation(true);
        mock.set_fail_buffer_creation(true);

        assert!(matches!(
            mock.create_texture(&atlas_desc(4)),
            Err(RenderError::TextureCreation(_))
        ));
        assert!(matches!(
            mock.create_buffer(&vertex_desc()),
            Err(RenderError::BufferCreation(_))
        ));

        mock.set_fail_texture_creation(false);
        assert!(mock.create_texture(&atlas_desc(4)).is_ok());
    }

    #[test]
    fn test_clear_calls() {
        let mock = MockRenderContext::new();
        mock.create_buffer(&vertex_desc()).unwrap();
        assert_eq!(mock.call_count(), 1);

        mock.clear_calls();
        assert_eq!(mock.call_count(), 0);
        assert_eq!(mock.live_buffer_count(), 1);
    }
}
