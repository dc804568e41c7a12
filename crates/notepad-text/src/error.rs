use crate::system::FontHandle;
use notepad_test_utils::RenderError;
use std::path::PathBuf;

/// Errors that can occur in the font and text system.
#[derive(Debug, Clone, PartialEq)]
pub enum FontError {
    /// The font file could not be opened, sized or read.
    Io { path: PathBuf, message: String },

    /// The font binary is malformed or the face index does not exist.
    Parse(String),

    /// A glyph did not fit into the atlas.
    Pack {
        codepoint: i32,
        atlas_width: u32,
        atlas_height: u32,
    },

    /// Texture or buffer creation/upload failed.
    RenderResource(RenderError),

    /// Neither the codepoint nor its fallback has a glyph.
    Lookup { codepoint: i32, fallback: i32 },

    /// No face is registered under this name.
    FontNotFound(String),

    /// The face table already holds `max` faces.
    CapacityExceeded { max: u16 },

    /// Rejected configuration value.
    InvalidConfig(String),

    /// The handle does not refer to a live variant.
    InvalidHandle(FontHandle),
}

impl std::fmt::Display for FontError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontError::Io { path, message } => {
                write!(f, "Failed to read font file {}: {}", path.display(), message)
            }
            FontError::Parse(msg) => write!(f, "Failed to parse font: {}", msg),
            FontError::Pack {
                codepoint,
                atlas_width,
                atlas_height,
            } => write!(
                f,
                "Glyph for codepoint {} does not fit in the {}x{} atlas",
                codepoint, atlas_width, atlas_height
            ),
            FontError::RenderResource(err) => write!(f, "Render resource error: {}", err),
            FontError::Lookup {
                codepoint,
                fallback,
            } => write!(
                f,
                "No glyph for codepoint {} or fallback {}",
                codepoint, fallback
            ),
            FontError::FontNotFound(name) => write!(f, "Font not found: {}", name),
            FontError::CapacityExceeded { max } => {
                write!(f, "Font table is full ({} faces)", max)
            }
            FontError::InvalidConfig(msg) => write!(f, "Invalid font system config: {}", msg),
            FontError::InvalidHandle(handle) => write!(f, "Invalid font handle: {:?}", handle),
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FontError::RenderResource(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FontError {
    fn from(err: std::io::Error) -> Self {
        FontError::Io {
            path: PathBuf::new(),
            message: err.to_string(),
        }
    }
}

impl From<RenderError> for FontError {
    fn from(err: RenderError) -> Self {
        FontError::RenderResource(err)
    }
}

/// Result type for font and text operations.
pub type FontResult<T> = Result<T, FontError>;
