//! Deterministic in-memory font used by unit tests, integration tests and
//! benches.
//!
//! Glyphs are solid boxes. Metrics are in a 1000 unit em with ascent 800,
//! descent -200 and line gap 100, so `scale_for_pixel_height(h)` is
//! `h / 1000`.

#![allow(dead_code)]

use super::{FontSource, KerningEntry, RasterizedGlyph, VerticalMetrics};

pub const UNITS_PER_EM: f32 = 1000.0;
pub const SPACE_ADVANCE: f32 = 250.0;
pub const NOTDEF_ADVANCE: f32 = 500.0;
pub const GLYPH_HEIGHT: f32 = 700.0;

pub struct FakeFont {
    space_advance: f32,
    extra_codepoints: Vec<i32>,
    kerning: Vec<KerningEntry>,
}

impl Default for FakeFont {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeFont {
    pub fn new() -> Self {
        Self {
            space_advance: SPACE_ADVANCE,
            extra_codepoints: Vec::new(),
            kerning: vec![
                KerningEntry {
                    codepoint_0: 'A' as i32,
                    codepoint_1: 'V' as i32,
                    amount: -80,
                },
                KerningEntry {
                    codepoint_0: 'T' as i32,
                    codepoint_1: 'o' as i32,
                    amount: -60,
                },
            ],
        }
    }

    /// A font whose space glyph has no advance.
    pub fn without_space(mut self) -> Self {
        self.space_advance = 0.0;
        self
    }

    /// Map an additional codepoint outside printable ASCII.
    pub fn with_codepoint(mut self, codepoint: i32) -> Self {
        self.extra_codepoints.push(codepoint);
        self
    }

    pub fn with_kerning(mut self, codepoint_0: i32, codepoint_1: i32, amount: i32) -> Self {
        self.kerning.push(KerningEntry {
            codepoint_0,
            codepoint_1,
            amount,
        });
        self
    }

    pub fn supports(&self, codepoint: i32) -> bool {
        (32..=126).contains(&codepoint) || self.extra_codepoints.contains(&codepoint)
    }

    /// Advance in font units; unmapped codepoints get the notdef advance.
    pub fn advance_units(&self, codepoint: i32) -> f32 {
        if !self.supports(codepoint) {
            NOTDEF_ADVANCE
        } else if codepoint == ' ' as i32 {
            self.space_advance
        } else {
            500.0 + (codepoint % 7) as f32 * 50.0
        }
    }
}

impl FontSource for FakeFont {
    fn family_name(&self) -> Option<&str> {
        Some("Fake Sans")
    }

    fn vertical_metrics(&self) -> VerticalMetrics {
        VerticalMetrics {
            ascent: 800.0,
            descent: -200.0,
            line_gap: 100.0,
        }
    }

    fn rasterize(&self, codepoint: i32, scale: f32) -> RasterizedGlyph {
        let advance = self.advance_units(codepoint) * scale;
        if codepoint == ' ' as i32 {
            return RasterizedGlyph {
                width: 0,
                height: 0,
                x_offset: 0.0,
                y_offset: 0.0,
                advance,
                coverage: Vec::new(),
            };
        }

        let width = (advance * 0.8).ceil() as u32;
        let height = (GLYPH_HEIGHT * scale).ceil() as u32;
        RasterizedGlyph {
            width,
            height,
            x_offset: (advance * 0.1).floor(),
            y_offset: -(height as f32),
            advance,
            coverage: vec![255; (width * height) as usize],
        }
    }

    fn kerning_table(&self) -> &[KerningEntry] {
        &self.kerning
    }
}
