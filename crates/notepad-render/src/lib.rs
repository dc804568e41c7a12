//! GPU backend for the notepad-- text renderer.
//!
//! - [`GraphicsContext`] owns the wgpu instance, adapter, device and queue.
//! - [`WgpuRenderContext`] implements [`RenderContext`] on top of it.
//! - [`Vertex2D`] is the vertex record produced by text layout.
//! - [`AtlasPacker`] places glyph bitmaps inside an atlas.

pub mod atlas;
mod context;
mod renderer;
mod vertex;

pub use atlas::{AtlasPacker, DEFAULT_PADDING};
pub use context::{GraphicsContext, GraphicsContextDescriptor, GraphicsError};
pub use renderer::{WgpuRenderContext, screen_projection};
pub use vertex::{Vertex2D, WHITE};

// Renderer contract, re-exported so downstream crates need one import path.
pub use notepad_test_utils::{
    BufferDescriptor, BufferHandle, BufferKind, DrawParams, RenderContext, RenderError,
    RenderResult, TextureDescriptor, TextureHandle,
};
