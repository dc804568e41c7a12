//! notepad-- text: font atlases and text layout.
//!
//! This crate turns UTF-8 strings into textured quads:
//! - [`FontSystem`] loads TrueType faces and owns one atlas per face and
//!   pixel size ([`FontSizeVariant`]), growing it as new codepoints show up
//! - [`layout()`] and [`measure`] walk a string against a variant's glyph
//!   and kerning tables
//! - [`Label`] keeps a string's geometry in GPU buffers and redraws it
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notepad_text::{FontSystem, FontSystemConfig, Label, SystemFontConfig};
//! use notepad_render::{GraphicsContext, WgpuRenderContext, screen_projection};
//! use std::sync::Arc;
//!
//! let graphics = GraphicsContext::new_owned_sync().unwrap();
//! let renderer = Arc::new(WgpuRenderContext::new(
//!     graphics,
//!     wgpu::TextureFormat::Bgra8UnormSrgb,
//! ));
//!
//! let config = FontSystemConfig::default()
//!     .with_default_font(SystemFontConfig::new("mono", "assets/mono.ttf", 20));
//! let mut fonts = FontSystem::new(config, renderer.clone()).unwrap();
//!
//! let font = fonts.acquire("mono", 20).unwrap();
//! let mut label = Label::new(&mut fonts, font, "Hello, notepad--").unwrap();
//!
//! // Once per frame
//! label.prepare_frame(&fonts);
//! label.render(&fonts, screen_projection(800.0, 600.0)).unwrap();
//! // renderer.render(&mut render_pass);
//! ```

pub mod config;
pub mod error;
pub mod font;
pub mod label;
pub mod layout;
pub mod packer;
pub mod system;
pub mod variant;

#[cfg(test)]
#[path = "../tests/common/fake_font.rs"]
mod fake_font;

pub use config::{FontSystemConfig, SystemFontConfig};
pub use error::{FontError, FontResult};
pub use font::{
    FontSource, KerningEntry, RasterizedGlyph, TrueTypeFont, VerticalMetrics, read_font_file,
};
pub use label::Label;
pub use layout::{
    LAYOUT_FALLBACK_CODEPOINT, MEASURE_FALLBACK_CODEPOINT, TextMesh, is_whitespace, layout,
    measure,
};
pub use system::{FontFace, FontHandle, FontId, FontSystem};
pub use variant::{DEFAULT_VOCABULARY, FontSizeVariant, Glyph, KerningPair};

// Re-export math types from notepad-core
pub use notepad_core::math::{Mat4, Vec2};
