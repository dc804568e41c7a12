#![allow(dead_code)]

pub use notepad_text::{FontSource, KerningEntry, RasterizedGlyph, VerticalMetrics};

mod fake_font;

pub use fake_font::FakeFont;

use notepad_test_utils::MockRenderContext;
use notepad_text::{FontHandle, FontSystem, FontSystemConfig};
use std::sync::Arc;

pub const FONT_NAME: &str = "fake";
pub const DEJAVU_SANS: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

/// A font system over a mock renderer with one fake face registered.
pub fn fake_system(font: FakeFont) -> (Arc<MockRenderContext>, FontSystem) {
    let mock = Arc::new(MockRenderContext::new());
    let config = FontSystemConfig::default().with_atlas_size(512, 512);
    let mut fonts = FontSystem::new(config, mock.clone()).unwrap();
    fonts.register_face(FONT_NAME, Box::new(font), 20).unwrap();
    (mock, fonts)
}

pub fn acquire(fonts: &mut FontSystem, size: u16) -> FontHandle {
    fonts.acquire(FONT_NAME, size).unwrap()
}
