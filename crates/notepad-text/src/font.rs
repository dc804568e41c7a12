//! Font binaries: reading, parsing and glyph rasterization.
//!
//! [`FontSource`] is everything the variant manager needs from a parsed
//! font. [`TrueTypeFont`] implements it with `ttf-parser` for the tables
//! and `fontdue` for coverage bitmaps.

use crate::error::{FontError, FontResult};
use notepad_core::alloc::HashMap;
use std::io::Read;
use std::path::Path;

/// Vertical metrics in font units (descent is negative).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

/// A rasterized glyph bitmap plus placement data, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizedGlyph {
    pub width: u32,
    pub height: u32,
    /// Offset from the pen position to the bitmap's left edge.
    pub x_offset: f32,
    /// Offset from the baseline to the bitmap's top edge (y down).
    pub y_offset: f32,
    /// Horizontal pen advance.
    pub advance: f32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

/// One kerning pair in codepoint space, amount in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KerningEntry {
    pub codepoint_0: i32,
    pub codepoint_1: i32,
    pub amount: i32,
}

/// A parsed font face.
pub trait FontSource: Send + Sync {
    /// Family name from the naming table, if present.
    fn family_name(&self) -> Option<&str> {
        None
    }

    fn vertical_metrics(&self) -> VerticalMetrics;

    /// Scale mapping font units to pixels so that `ascent - descent`
    /// spans `pixel_height` pixels.
    fn scale_for_pixel_height(&self, pixel_height: f32) -> f32 {
        let metrics = self.vertical_metrics();
        pixel_height / (metrics.ascent - metrics.descent)
    }

    /// Rasterize `codepoint` at `scale`.
    ///
    /// Codepoint `-1`, and any codepoint the font does not map, produce the
    /// font's `.notdef` glyph.
    fn rasterize(&self, codepoint: i32, scale: f32) -> RasterizedGlyph;

    /// Legacy kerning pairs of the face.
    fn kerning_table(&self) -> &[KerningEntry];
}

/// Read a font file fully into memory.
///
/// The size is queried first so the buffer is allocated once.
pub fn read_font_file(path: impl AsRef<Path>) -> FontResult<Vec<u8>> {
    let path = path.as_ref();
    let io_error = |err: std::io::Error| FontError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let mut file = std::fs::File::open(path).map_err(io_error)?;
    let reported = file.metadata().map_err(io_error)?.len();

    let mut bytes = Vec::with_capacity(reported as usize);
    file.read_to_end(&mut bytes).map_err(io_error)?;
    if bytes.len() as u64 != reported {
        tracing::warn!(
            "Font file {} reported {} bytes but {} were read",
            path.display(),
            reported,
            bytes.len()
        );
    }

    tracing::debug!("Read font file {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

/// A TrueType/OpenType face parsed from an owned byte buffer.
pub struct TrueTypeFont {
    data: Vec<u8>,
    face_index: u32,
    family_name: Option<String>,
    metrics: VerticalMetrics,
    units_per_em: f32,
    kerning: Vec<KerningEntry>,
    raster: fontdue::Font,
}

impl TrueTypeFont {
    /// Parse face `face_index` out of `data`.
    pub fn parse(data: Vec<u8>, face_index: u32) -> FontResult<Self> {
        let face_count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
        if face_count == 0 {
            return Err(FontError::Parse("font collection holds no faces".to_string()));
        }
        if face_index >= face_count {
            return Err(FontError::Parse(format!(
                "face index {} out of range ({} faces)",
                face_index, face_count
            )));
        }

        let face = ttf_parser::Face::parse(&data, face_index)
            .map_err(|e| FontError::Parse(e.to_string()))?;

        let metrics = VerticalMetrics {
            ascent: face.ascender() as f32,
            descent: face.descender() as f32,
            line_gap: face.line_gap() as f32,
        };
        if metrics.ascent - metrics.descent <= 0.0 {
            return Err(FontError::Parse(format!(
                "degenerate vertical metrics (ascent {}, descent {})",
                metrics.ascent, metrics.descent
            )));
        }

        let family_name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == ttf_parser::name_id::FAMILY)
            .find_map(|name| name.to_string());
        let units_per_em = face.units_per_em() as f32;
        let kerning = read_kerning_pairs(&face);

        let raster = fontdue::Font::from_bytes(
            data.as_slice(),
            fontdue::FontSettings {
                collection_index: face_index,
                ..fontdue::FontSettings::default()
            },
        )
        .map_err(|e| FontError::Parse(e.to_string()))?;

        tracing::trace!(
            "Parsed face {} ({:?}): {} kerning pairs",
            face_index,
            family_name,
            kerning.len()
        );

        Ok(Self {
            data,
            face_index,
            family_name,
            metrics,
            units_per_em,
            kerning,
            raster,
        })
    }

    /// Read and parse a font file.
    pub fn from_file(path: impl AsRef<Path>, face_index: u32) -> FontResult<Self> {
        Self::parse(read_font_file(path)?, face_index)
    }

    /// The raw font binary.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    pub fn units_per_em(&self) -> f32 {
        self.units_per_em
    }

    fn glyph_index(&self, codepoint: i32) -> u16 {
        u32::try_from(codepoint)
            .ok()
            .and_then(char::from_u32)
            .map_or(0, |ch| self.raster.lookup_glyph_index(ch))
    }
}

impl FontSource for TrueTypeFont {
    fn family_name(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    fn vertical_metrics(&self) -> VerticalMetrics {
        self.metrics
    }

    fn rasterize(&self, codepoint: i32, scale: f32) -> RasterizedGlyph {
        // fontdue sizes are pixels per em
        let px = scale * self.units_per_em;
        let (metrics, coverage) = self.raster.rasterize_indexed(self.glyph_index(codepoint), px);

        RasterizedGlyph {
            width: metrics.width as u32,
            height: metrics.height as u32,
            x_offset: metrics.xmin as f32,
            y_offset: -(metrics.ymin as f32 + metrics.height as f32),
            advance: metrics.advance_width,
            coverage,
        }
    }

    fn kerning_table(&self) -> &[KerningEntry] {
        &self.kerning
    }
}

/// Collect horizontal format 0 `kern` pairs, translated from glyph ids to
/// codepoints through the Unicode cmap subtables.
fn read_kerning_pairs(face: &ttf_parser::Face<'_>) -> Vec<KerningEntry> {
    let Some(kern) = face.tables().kern else {
        return Vec::new();
    };

    // Several codepoints may share a glyph; keep the lowest.
    let mut glyph_codepoints: HashMap<u16, i32> = HashMap::default();
    if let Some(cmap) = face.tables().cmap {
        for subtable in cmap.subtables {
            if !subtable.is_unicode() {
                continue;
            }
            subtable.codepoints(|codepoint| {
                if let Some(glyph) = subtable.glyph_index(codepoint) {
                    let codepoint = codepoint as i32;
                    glyph_codepoints
                        .entry(glyph.0)
                        .and_modify(|existing| *existing = (*existing).min(codepoint))
                        .or_insert(codepoint);
                }
            });
        }
    }

    let mut pairs = Vec::new();
    for subtable in kern.subtables {
        if !subtable.horizontal || subtable.variable {
            continue;
        }
        let ttf_parser::kern::Format::Format0(format0) = subtable.format else {
            continue;
        };
        for pair in format0.pairs {
            let left = glyph_codepoints.get(&pair.left().0);
            let right = glyph_codepoints.get(&pair.right().0);
            if let (Some(&codepoint_0), Some(&codepoint_1)) = (left, right) {
                pairs.push(KerningEntry {
                    codepoint_0,
                    codepoint_1,
                    amount: pair.value as i32,
                });
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DEJAVU: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

    #[test]
    fn test_read_missing_file_is_io_error() {
        let err = read_font_file("/definitely/not/a/font.ttf").unwrap_err();
        assert!(matches!(err, FontError::Io { .. }));
    }

    #[test]
    fn test_read_font_file_returns_all_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(read_font_file(file.path()).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let result = TrueTypeFont::parse(b"definitely not a font".to_vec(), 0);
        assert!(matches!(result, Err(FontError::Parse(_))));
    }

    #[test]
    fn test_empty_buffer_is_parse_error() {
        assert!(matches!(
            TrueTypeFont::parse(Vec::new(), 0),
            Err(FontError::Parse(_))
        ));
    }

    #[test]
    fn test_dejavu_metrics_and_raster() {
        let Ok(font) = TrueTypeFont::from_file(DEJAVU, 0) else {
            return;
        };

        let metrics = font.vertical_metrics();
        assert!(metrics.ascent > 0.0);
        assert!(metrics.descent < 0.0);
        assert_eq!(font.family_name(), Some("DejaVu Sans"));

        let scale = font.scale_for_pixel_height(20.0);
        assert!((scale * (metrics.ascent - metrics.descent) - 20.0).abs() < 1e-3);

        let glyph = font.rasterize('A' as i32, scale);
        assert!(glyph.width > 0 && glyph.height > 0);
        assert_eq!(glyph.coverage.len(), (glyph.width * glyph.height) as usize);
        // Cap height sits above the baseline
        assert!(glyph.y_offset < 0.0);
        assert!(glyph.advance > 0.0);

        let space = font.rasterize(' ' as i32, scale);
        assert_eq!(space.coverage.len(), (space.width * space.height) as usize);
        assert!(space.advance > 0.0);
    }

    #[test]
    fn test_dejavu_face_index_out_of_range() {
        let Ok(bytes) = read_font_file(DEJAVU) else {
            return;
        };
        assert!(matches!(
            TrueTypeFont::parse(bytes, 3),
            Err(FontError::Parse(_))
        ));
    }
}
