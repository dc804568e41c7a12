//! Text measurement and quad-mesh layout.
//!
//! The pen starts at `(0, 0)` on the first baseline and moves down by the
//! variant's line height on every `'\n'`. Each visible glyph becomes one
//! quad of four [`Vertex2D`]s and six `u32` indices.

use crate::error::{FontError, FontResult};
use crate::variant::{FontSizeVariant, Glyph};
use notepad_core::math::Vec2;
use notepad_core::profiling::profile_function;
use notepad_render::{Vertex2D, WHITE};

/// Stand-in glyph used by [`measure`] for codepoints missing from the atlas.
pub const MEASURE_FALLBACK_CODEPOINT: i32 = -1;

/// Stand-in glyph used by [`layout`] for codepoints missing from the atlas.
pub const LAYOUT_FALLBACK_CODEPOINT: i32 = '?' as i32;

pub const VERTICES_PER_QUAD: usize = 4;
pub const INDICES_PER_QUAD: usize = 6;

const NEWLINE: i32 = '\n' as i32;
const TAB: i32 = '\t' as i32;

/// ASCII whitespace: no quad is emitted for these.
pub fn is_whitespace(codepoint: i32) -> bool {
    matches!(codepoint, 0x20 | 0x09 | 0x0a | 0x0b | 0x0c | 0x0d)
}

/// Geometry for one string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMesh {
    pub vertices: Vec<Vertex2D>,
    pub indices: Vec<u32>,
    pub quad_count: u32,
    /// Same extent [`measure`] reports for the string.
    pub extent: Vec2,
}

impl TextMesh {
    pub fn is_empty(&self) -> bool {
        self.quad_count == 0
    }
}

/// Width and height of `text` without building geometry.
///
/// The height is always at least one line.
pub fn measure(variant: &FontSizeVariant, text: &str) -> Vec2 {
    profile_function!();

    let line_height = variant.line_height();
    let mut x = 0.0f32;
    let mut y = 0.0f32;
    let mut max_width = 0.0f32;

    let mut codepoints = text.chars().map(|ch| ch as i32).peekable();
    while let Some(codepoint) = codepoints.next() {
        match codepoint {
            NEWLINE => {
                max_width = max_width.max(x);
                x = 0.0;
                y += line_height;
            }
            TAB => x += variant.tab_x_advance(),
            _ => {
                let glyph = variant.glyph(codepoint).or_else(|| {
                    tracing::trace!(
                        "No glyph for codepoint {} while measuring, using {}",
                        codepoint,
                        MEASURE_FALLBACK_CODEPOINT
                    );
                    variant.glyph(MEASURE_FALLBACK_CODEPOINT)
                });
                let Some(glyph) = glyph else {
                    continue;
                };
                let kerning = codepoints
                    .peek()
                    .map_or(0.0, |&next| variant.kerning(codepoint, next));
                x += glyph.x_advance + kerning;
            }
        }
    }

    Vec2::new(max_width.max(x), y + line_height)
}

/// Build the quad mesh for `text`.
///
/// Codepoints missing from the atlas are drawn with the `'?'` glyph; call
/// [`FontSystem::verify_atlas`](crate::FontSystem::verify_atlas) first to
/// get the real glyphs. Fails with [`FontError::Lookup`] when `'?'` is
/// missing as well.
pub fn layout(variant: &FontSizeVariant, text: &str) -> FontResult<TextMesh> {
    profile_function!();

    let codepoints: Vec<i32> = text.chars().map(|ch| ch as i32).collect();
    let quad_count = codepoints.iter().filter(|&&cp| !is_whitespace(cp)).count();

    let mut vertices = Vec::with_capacity(quad_count * VERTICES_PER_QUAD);
    let mut indices = Vec::with_capacity(quad_count * INDICES_PER_QUAD);

    let atlas_size = variant.atlas_size();
    let atlas_width = atlas_size.width as f32;
    let atlas_height = atlas_size.height as f32;
    let line_height = variant.line_height();

    let mut x = 0.0f32;
    let mut y = 0.0f32;
    let mut max_width = 0.0f32;

    for (i, &codepoint) in codepoints.iter().enumerate() {
        match codepoint {
            NEWLINE => {
                max_width = max_width.max(x);
                x = 0.0;
                y += line_height;
                continue;
            }
            TAB => {
                x += variant.tab_x_advance();
                continue;
            }
            _ => {}
        }

        let glyph = match variant.glyph(codepoint) {
            Some(glyph) => glyph,
            None => {
                tracing::warn!(
                    "No glyph for codepoint {}, using '?' instead",
                    codepoint
                );
                variant
                    .glyph(LAYOUT_FALLBACK_CODEPOINT)
                    .ok_or(FontError::Lookup {
                        codepoint,
                        fallback: LAYOUT_FALLBACK_CODEPOINT,
                    })?
            }
        };

        if !is_whitespace(codepoint) {
            let base = vertices.len() as u32;
            vertices.extend(quad_vertices(glyph, x, y, atlas_width, atlas_height));
            indices.extend([2, 1, 0, 3, 0, 1].map(|offset| base + offset));
        }

        let kerning = codepoints
            .get(i + 1)
            .map_or(0.0, |&next| variant.kerning(codepoint, next));
        x += glyph.x_advance + kerning;
    }

    Ok(TextMesh {
        vertices,
        indices,
        quad_count: quad_count as u32,
        extent: Vec2::new(max_width.max(x), y + line_height),
    })
}

/// Vertices in emission order top-left, bottom-right, bottom-left,
/// top-right.
fn quad_vertices(
    glyph: &Glyph,
    x: f32,
    y: f32,
    atlas_width: f32,
    atlas_height: f32,
) -> [Vertex2D; 4] {
    let min_x = x + glyph.x_offset;
    let min_y = y + glyph.y_offset;
    let max_x = min_x + glyph.width as f32;
    let max_y = min_y + glyph.height as f32;

    let u0 = glyph.x as f32 / atlas_width;
    let u1 = (glyph.x + glyph.width) as f32 / atlas_width;
    let v0 = glyph.y as f32 / atlas_height;
    let v1 = (glyph.y + glyph.height) as f32 / atlas_height;

    let top_left = Vertex2D::new([min_x, min_y], [u0, v0], WHITE);
    let top_right = Vertex2D::new([max_x, min_y], [u1, v0], WHITE);
    let bottom_right = Vertex2D::new([max_x, max_y], [u1, v1], WHITE);
    let bottom_left = Vertex2D::new([min_x, max_y], [u0, v1], WHITE);

    [top_left, bottom_right, bottom_left, top_right]
}
