//! Tests against a real TrueType file.
//!
//! They use the DejaVu Sans font shipped by most Linux distributions and
//! return early when it is not installed.

mod common;

use common::DEJAVU_SANS;
use notepad_test_utils::MockRenderContext;
use notepad_text::{FontSource, FontSystem, FontSystemConfig, SystemFontConfig, TrueTypeFont};
use std::path::Path;
use std::sync::Arc;

fn dejavu_available() -> bool {
    Path::new(DEJAVU_SANS).exists()
}

#[test]
fn test_load_by_file_stem() {
    if !dejavu_available() {
        return;
    }
    let mock = Arc::new(MockRenderContext::new());
    let mut fonts = FontSystem::new(FontSystemConfig::default(), mock.clone()).unwrap();

    fonts.load(DEJAVU_SANS, 18).unwrap();
    let face = fonts.face("DejaVuSans").unwrap();
    assert_eq!(face.family_name(), Some("DejaVu Sans"));
    assert_eq!(face.default_size(), 18);
    assert_eq!(mock.texture_dimensions(face.variants()[0].atlas()), Some((1024, 1024, 4)));
}

#[test]
fn test_default_font_from_config() {
    if !dejavu_available() {
        return;
    }
    let mock = Arc::new(MockRenderContext::new());
    let config = FontSystemConfig::default()
        .with_default_font(SystemFontConfig::new("sans", DEJAVU_SANS, 20));
    let mut fonts = FontSystem::new(config, mock).unwrap();

    let font = fonts.acquire("sans", 20).unwrap();
    let variant = fonts.variant(font).unwrap();
    let metrics = fonts.face("sans").unwrap().metrics();
    let expected = (metrics.ascent - metrics.descent + metrics.line_gap) * variant.scale();
    assert!((variant.line_height() - expected).abs() < 1e-4);
    assert!(variant.tab_x_advance() > 0.0);

    let mesh = fonts.layout(font, "Hello, world").unwrap();
    assert_eq!(mesh.quad_count, 11);
}

#[test]
fn test_real_glyphs_after_verify() {
    if !dejavu_available() {
        return;
    }
    let mock = Arc::new(MockRenderContext::new());
    let mut fonts = FontSystem::new(FontSystemConfig::default(), mock).unwrap();
    fonts.load(DEJAVU_SANS, 24).unwrap();
    let font = fonts.acquire_default(24).unwrap();

    assert_eq!(fonts.verify_atlas(font, "\u{e9}\u{3a9}").unwrap(), 2);
    let variant = fonts.variant(font).unwrap();
    let omega = variant.glyph(0x3a9).unwrap();
    assert!(omega.width > 0 && omega.height > 0);
    assert!(omega.y_offset < 0.0);
}

#[test]
fn test_kerning_pairs_are_codepoints() {
    let Ok(font) = TrueTypeFont::from_file(DEJAVU_SANS, 0) else {
        return;
    };
    for pair in font.kerning_table() {
        assert!(pair.codepoint_0 >= 0);
        assert!(pair.codepoint_1 >= 0);
    }
}
