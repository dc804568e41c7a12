//! Renderer contract and test utilities for notepad--.
//!
//! The font and text crates never talk to a GPU API directly. They go
//! through the [`RenderContext`] trait, which exposes the handful of
//! texture and buffer operations the text pipeline needs.
//!
//! # Overview
//!
//! - [`RenderContext`] - Trait abstracting texture/buffer creation, upload and drawing
//! - `MockRenderContext` - Recording implementation for tests (requires `mock` feature)
//! - [`TextureHandle`], [`BufferHandle`] - Opaque resource ids handed out by a context
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use notepad_test_utils::{BufferDescriptor, BufferKind, MockRenderContext, RenderContext};
//!
//! let mock = MockRenderContext::new();
//!
//! let buffer = mock
//!     .create_buffer(&BufferDescriptor {
//!         label: Some("label_vertices"),
//!         element_size: 32,
//!         kind: BufferKind::Vertex,
//!     })
//!     .unwrap();
//! mock.upload_buffer(buffer, 4, &[0u8; 128]).unwrap();
//!
//! assert_eq!(mock.count_buffer_creates(), 1);
//! assert_eq!(mock.count_buffer_uploads(), 1);
//! # }
//! ```
//!
//! # Design
//!
//! Handles are plain `Copy` ids rather than wrapped API objects, so callers
//! own no lifetimes and a context can be shared as `Arc<dyn RenderContext>`.
//! Implementations use interior mutability; every method takes `&self`.

pub mod error;
pub mod gpu_types;
#[cfg(feature = "mock")]
pub mod mock_render;
pub mod render_context;

// Re-export main types at crate root
pub use error::{RenderError, RenderResult};
pub use gpu_types::*;
#[cfg(feature = "mock")]
pub use mock_render::*;
pub use render_context::*;
