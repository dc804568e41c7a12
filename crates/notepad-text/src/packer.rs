//! Glyph rasterization and atlas packing.

use crate::error::{FontError, FontResult};
use crate::font::{FontSource, RasterizedGlyph};
use notepad_core::geometry::Rect;
use notepad_core::profiling::profile_function;
use notepad_render::AtlasPacker;

/// Where a glyph landed in the atlas and how to place it on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedGlyph {
    pub codepoint: i32,
    pub rect: Rect<u32>,
    pub x_offset: f32,
    pub y_offset: f32,
    pub advance: f32,
}

/// A single-channel atlas image and its glyph placements.
#[derive(Debug, Clone)]
pub struct PackedAtlas {
    pub width: u32,
    pub height: u32,
    /// `width * height` coverage bytes.
    pub pixels: Vec<u8>,
    /// One entry per requested codepoint, in request order.
    pub glyphs: Vec<PackedGlyph>,
}

/// Rasterize every codepoint at `scale` and pack the bitmaps into a
/// `width x height` coverage image.
///
/// Bitmaps are placed tallest first, ties broken by request order, so the
/// result only depends on the inputs.
pub fn pack(
    source: &dyn FontSource,
    codepoints: &[i32],
    scale: f32,
    width: u32,
    height: u32,
) -> FontResult<PackedAtlas> {
    profile_function!();

    let rasterized: Vec<RasterizedGlyph> = codepoints
        .iter()
        .map(|&codepoint| source.rasterize(codepoint, scale))
        .collect();

    let mut order: Vec<usize> = (0..rasterized.len()).collect();
    // sort_by_key is stable
    order.sort_by_key(|&i| std::cmp::Reverse(rasterized[i].height));

    let mut packer = AtlasPacker::new(width, height);
    let mut rects = vec![Rect::default(); rasterized.len()];
    for i in order {
        let glyph = &rasterized[i];
        rects[i] = packer
            .insert(glyph.width, glyph.height)
            .ok_or(FontError::Pack {
                codepoint: codepoints[i],
                atlas_width: width,
                atlas_height: height,
            })?;
    }

    let mut pixels = vec![0u8; width as usize * height as usize];
    for (glyph, rect) in rasterized.iter().zip(&rects) {
        blit(&mut pixels, width as usize, glyph, rect);
    }

    let glyphs = codepoints
        .iter()
        .zip(rasterized)
        .zip(rects)
        .map(|((&codepoint, glyph), rect)| PackedGlyph {
            codepoint,
            rect,
            x_offset: glyph.x_offset,
            y_offset: glyph.y_offset,
            advance: glyph.advance,
        })
        .collect();

    Ok(PackedAtlas {
        width,
        height,
        pixels,
        glyphs,
    })
}

fn blit(pixels: &mut [u8], stride: usize, glyph: &RasterizedGlyph, rect: &Rect<u32>) {
    let row_len = glyph.width as usize;
    if row_len == 0 {
        return;
    }
    for (row, src) in glyph.coverage.chunks_exact(row_len).enumerate() {
        let start = (rect.y as usize + row) * stride + rect.x as usize;
        pixels[start..start + row_len].copy_from_slice(src);
    }
}

/// Replicate each coverage byte into all four RGBA channels.
pub fn expand_to_rgba(coverage: &[u8]) -> Vec<u8> {
    coverage.iter().flat_map(|&c| [c, c, c, c]).collect()
}
