//! Trait abstracting the GPU operations used by the text pipeline.

use crate::error::RenderResult;
use crate::gpu_types::{BufferDescriptor, BufferHandle, DrawParams, TextureDescriptor, TextureHandle};

/// Texture and buffer operations consumed by the font system and labels.
///
/// # Borrow Checking Pattern
///
/// Methods take `&self` and return `Copy` handles. This allows:
/// - Several owners (font system, every label) to share one context via `Arc`
/// - Implementations to keep their resource tables behind a `Mutex`
/// - `dyn RenderContext` to be used without lifetime parameters
///
/// # Example
///
/// ```rust,no_run
/// use notepad_test_utils::{RenderContext, RenderResult, TextureDescriptor};
///
/// fn upload_atlas(ctx: &dyn RenderContext, pixels: &[u8]) -> RenderResult<()> {
///     let texture = ctx.create_texture(&TextureDescriptor {
///         label: Some("atlas"),
///         width: 1024,
///         height: 1024,
///         channels: 4,
///     })?;
///     ctx.upload_texture_pixels(texture, pixels)
/// }
/// ```
pub trait RenderContext: Send + Sync {
    // Texture operations

    /// Create a 2D texture. Contents are undefined until the first upload.
    fn create_texture(&self, desc: &TextureDescriptor) -> RenderResult<TextureHandle>;

    /// Replace the full contents of a texture.
    ///
    /// `pixels` must hold exactly `width * height * channels` bytes.
    fn upload_texture_pixels(&self, texture: TextureHandle, pixels: &[u8]) -> RenderResult<()>;

    /// Release a texture. Destroying an unknown handle is a no-op.
    fn destroy_texture(&self, texture: TextureHandle);

    // Buffer operations

    /// Create an empty vertex or index buffer.
    fn create_buffer(&self, desc: &BufferDescriptor) -> RenderResult<BufferHandle>;

    /// Replace the contents of a buffer with `element_count` elements.
    ///
    /// `data` must hold exactly `element_count * element_size` bytes.
    fn upload_buffer(&self, buffer: BufferHandle, element_count: u32, data: &[u8])
    -> RenderResult<()>;

    /// Release a buffer. Destroying an unknown handle is a no-op.
    fn destroy_buffer(&self, buffer: BufferHandle);

    /// Make `buffer` the current binding for its kind.
    fn bind_buffer(&self, buffer: BufferHandle) -> RenderResult<()>;

    // Draw operations

    /// Draw every index in `index_buffer` as a triangle list, reading
    /// vertices from the currently bound vertex buffer.
    fn draw_indexed(&self, index_buffer: BufferHandle, params: &DrawParams) -> RenderResult<()>;
}
