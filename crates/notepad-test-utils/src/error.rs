use crate::gpu_types::{BufferHandle, TextureHandle};

/// Errors reported by a [`RenderContext`](crate::RenderContext) implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The backend refused to create a texture.
    TextureCreation(String),

    /// The backend refused to create a buffer.
    BufferCreation(String),

    /// Only 1- and 4-channel textures are supported.
    UnsupportedChannels(u32),

    /// The texture was never created or has been destroyed.
    InvalidTexture(TextureHandle),

    /// The buffer was never created or has been destroyed.
    InvalidBuffer(BufferHandle),

    /// Uploaded byte count does not match what the resource expects.
    UploadSizeMismatch { expected: usize, actual: usize },

    /// A draw was requested without a bound vertex buffer.
    NoVertexBufferBound,
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::TextureCreation(msg) => write!(f, "Texture creation failed: {}", msg),
            RenderError::BufferCreation(msg) => write!(f, "Buffer creation failed: {}", msg),
            RenderError::UnsupportedChannels(channels) => {
                write!(f, "Unsupported texture channel count: {}", channels)
            }
            RenderError::InvalidTexture(handle) => {
                write!(f, "Invalid texture handle: {}", handle.id())
            }
            RenderError::InvalidBuffer(handle) => write!(f, "Invalid buffer handle: {}", handle.id()),
            RenderError::UploadSizeMismatch { expected, actual } => write!(
                f,
                "Upload size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
            RenderError::NoVertexBufferBound => write!(f, "No vertex buffer bound for draw"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
