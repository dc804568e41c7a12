//! Per-size font variants and their glyph atlas.
//!
//! A [`FontSizeVariant`] is one face rendered at one pixel size. It owns an
//! RGBA atlas texture and the glyph and kerning tables derived from it. The
//! tracked vocabulary only ever grows; every growth repacks the full atlas.

use crate::error::FontResult;
use crate::font::FontSource;
use crate::packer::{self, PackedGlyph};
use notepad_core::alloc::HashMap;
use notepad_core::geometry::Size;
use notepad_core::profiling::{profile_function, profile_scope};
use notepad_test_utils::{RenderContext, TextureDescriptor, TextureHandle};

/// Codepoints packed into every new variant: the `-1` "not found"
/// placeholder followed by printable ASCII (32 through 126).
pub const DEFAULT_VOCABULARY: [i32; 96] = {
    let mut vocabulary = [0i32; 96];
    vocabulary[0] = -1;
    let mut i = 1;
    while i < vocabulary.len() {
        vocabulary[i] = 31 + i as i32;
        i += 1;
    }
    vocabulary
};

/// Codepoints below this are assumed to be covered by the default vocabulary.
const VERIFY_THRESHOLD: i32 = 128;

/// Spaces per tab when the tab width comes from the space glyph.
const TAB_WIDTH_IN_SPACES: f32 = 4.0;

/// One packed character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub codepoint: i32,
    /// Always 0: a variant has a single atlas page.
    pub page_id: u8,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub x_advance: f32,
}

impl From<PackedGlyph> for Glyph {
    fn from(packed: PackedGlyph) -> Self {
        Self {
            codepoint: packed.codepoint,
            page_id: 0,
            x: packed.rect.x,
            y: packed.rect.y,
            width: packed.rect.width,
            height: packed.rect.height,
            x_offset: packed.x_offset,
            y_offset: packed.y_offset,
            x_advance: packed.advance,
        }
    }
}

/// Horizontal adjustment applied when `codepoint_1` follows `codepoint_0`,
/// in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KerningPair {
    pub codepoint_0: i32,
    pub codepoint_1: i32,
    pub amount: f32,
}

/// A font face rendered at one pixel size.
#[derive(Debug)]
pub struct FontSizeVariant {
    size: u16,
    scale: f32,
    line_height: f32,
    tab_x_advance: f32,
    atlas_size: Size<u32>,
    atlas: TextureHandle,
    codepoints: Vec<i32>,
    glyphs: Vec<Glyph>,
    kernings: Vec<KerningPair>,
    glyph_lookup: HashMap<i32, usize>,
    kerning_lookup: HashMap<(i32, i32), f32>,
    reference_count: u32,
    generation: u64,
}

impl FontSizeVariant {
    /// Create a variant seeded with [`DEFAULT_VOCABULARY`] and build its
    /// atlas.
    ///
    /// The atlas texture is destroyed again if the first rebuild fails.
    pub fn create(
        context: &dyn RenderContext,
        source: &dyn FontSource,
        size: u16,
        atlas_size: Size<u32>,
    ) -> FontResult<Self> {
        profile_function!();

        let metrics = source.vertical_metrics();
        let scale = source.scale_for_pixel_height(size as f32);
        let line_height = (metrics.ascent - metrics.descent + metrics.line_gap) * scale;

        let label = format!("font_atlas_{}px", size);
        let atlas = context.create_texture(&TextureDescriptor {
            label: Some(&label),
            width: atlas_size.width,
            height: atlas_size.height,
            channels: 4,
        })?;

        let mut variant = Self {
            size,
            scale,
            line_height,
            tab_x_advance: 0.0,
            atlas_size,
            atlas,
            codepoints: DEFAULT_VOCABULARY.to_vec(),
            glyphs: Vec::new(),
            kernings: Vec::new(),
            glyph_lookup: HashMap::default(),
            kerning_lookup: HashMap::default(),
            reference_count: 0,
            generation: 0,
        };

        if let Err(err) = variant.rebuild_atlas(context, source) {
            context.destroy_texture(atlas);
            return Err(err);
        }
        variant.tab_x_advance = variant.compute_tab_advance();

        tracing::debug!(
            "Created {}px variant: scale {:.5}, line height {:.2}, tab {:.2}",
            size,
            scale,
            line_height,
            variant.tab_x_advance
        );

        Ok(variant)
    }

    /// Repack every tracked codepoint and replace the atlas contents.
    ///
    /// Glyph and kerning tables are only swapped in after the upload
    /// succeeds, so a failed rebuild leaves the previous generation usable.
    pub fn rebuild_atlas(
        &mut self,
        context: &dyn RenderContext,
        source: &dyn FontSource,
    ) -> FontResult<()> {
        profile_function!();

        let packed = packer::pack(
            source,
            &self.codepoints,
            self.scale,
            self.atlas_size.width,
            self.atlas_size.height,
        )?;

        {
            profile_scope!("upload_atlas");
            let rgba = packer::expand_to_rgba(&packed.pixels);
            context.upload_texture_pixels(self.atlas, &rgba)?;
        }

        self.glyphs = packed.glyphs.into_iter().map(Glyph::from).collect();
        self.glyph_lookup = self
            .glyphs
            .iter()
            .enumerate()
            .map(|(i, glyph)| (glyph.codepoint, i))
            .collect();

        let scale = self.scale;
        self.kernings = source
            .kerning_table()
            .iter()
            .map(|entry| KerningPair {
                codepoint_0: entry.codepoint_0,
                codepoint_1: entry.codepoint_1,
                amount: entry.amount as f32 * scale,
            })
            .collect();
        self.kerning_lookup = self
            .kernings
            .iter()
            .map(|pair| ((pair.codepoint_0, pair.codepoint_1), pair.amount))
            .collect();

        self.generation += 1;
        tracing::debug!(
            "Rebuilt {}px atlas (generation {}): {} glyphs, {} kerning pairs",
            self.size,
            self.generation,
            self.glyphs.len(),
            self.kernings.len()
        );

        Ok(())
    }

    /// Make sure every codepoint of `text` is in the atlas.
    ///
    /// Returns how many codepoints were added. Codepoints below 128 are
    /// skipped. The atlas is rebuilt only when something was added; added
    /// codepoints stay tracked even if that rebuild fails.
    pub fn verify(
        &mut self,
        context: &dyn RenderContext,
        source: &dyn FontSource,
        text: &str,
    ) -> FontResult<usize> {
        profile_function!();

        let mut added = 0;
        for ch in text.chars() {
            let codepoint = ch as i32;
            if codepoint < VERIFY_THRESHOLD {
                continue;
            }
            if self.codepoints[DEFAULT_VOCABULARY.len()..].contains(&codepoint) {
                continue;
            }
            self.codepoints.push(codepoint);
            added += 1;
        }

        if added > 0 {
            tracing::debug!("Adding {} codepoints to the {}px atlas", added, self.size);
            self.rebuild_atlas(context, source)?;
        }

        Ok(added)
    }

    fn compute_tab_advance(&self) -> f32 {
        if let Some(tab) = self.glyph('\t' as i32).filter(|g| g.x_advance != 0.0) {
            return tab.x_advance;
        }
        if let Some(space) = self.glyph(' ' as i32).filter(|g| g.x_advance != 0.0) {
            return space.x_advance * TAB_WIDTH_IN_SPACES;
        }
        self.size as f32 * TAB_WIDTH_IN_SPACES
    }

    pub fn glyph(&self, codepoint: i32) -> Option<&Glyph> {
        self.glyph_lookup
            .get(&codepoint)
            .and_then(|&i| self.glyphs.get(i))
    }

    /// Kerning between two codepoints in pixels, 0 when the pair is absent.
    pub fn kerning(&self, codepoint_0: i32, codepoint_1: i32) -> f32 {
        self.kerning_lookup
            .get(&(codepoint_0, codepoint_1))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn tab_x_advance(&self) -> f32 {
        self.tab_x_advance
    }

    pub fn atlas_size(&self) -> Size<u32> {
        self.atlas_size
    }

    /// The RGBA atlas texture.
    pub fn atlas(&self) -> TextureHandle {
        self.atlas
    }

    /// Tracked codepoints in insertion order.
    pub fn codepoints(&self) -> &[i32] {
        &self.codepoints
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn kernings(&self) -> &[KerningPair] {
        &self.kernings
    }

    pub fn reference_count(&self) -> u32 {
        self.reference_count
    }

    /// Number of successful atlas rebuilds.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn add_reference(&mut self) {
        self.reference_count += 1;
    }

    /// Returns false when the count was already zero.
    pub(crate) fn remove_reference(&mut self) -> bool {
        match self.reference_count.checked_sub(1) {
            Some(count) => {
                self.reference_count = count;
                true
            }
            None => false,
        }
    }

    /// Release the atlas texture.
    pub(crate) fn destroy(self, context: &dyn RenderContext) {
        context.destroy_texture(self.atlas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FontError;
    use crate::fake_font::FakeFont;
    use notepad_test_utils::{MockRenderContext, RenderError};

    const ATLAS: Size<u32> = Size::new(256, 256);

    #[test]
    fn test_default_vocabulary() {
        assert_eq!(DEFAULT_VOCABULARY.len(), 96);
        assert_eq!(DEFAULT_VOCABULARY[0], -1);
        assert_eq!(DEFAULT_VOCABULARY[1], 32);
        assert_eq!(DEFAULT_VOCABULARY[95], 126);
    }

    #[test]
    fn test_create_uploads_rgba_atlas() {
        let context = MockRenderContext::new();
        let font = FakeFont::new();
        let variant = FontSizeVariant::create(&context, &font, 20, ATLAS).unwrap();

        assert_eq!(context.count_texture_creates(), 1);
        assert_eq!(context.count_texture_uploads(), 1);
        assert_eq!(context.texture_dimensions(variant.atlas()), Some((256, 256, 4)));
        let pixels = context.texture_pixels(variant.atlas()).unwrap();
        assert_eq!(pixels.len(), 256 * 256 * 4);

        assert_eq!(variant.glyphs().len(), 96);
        assert_eq!(variant.generation(), 1);
        assert_eq!(variant.reference_count(), 0);
        assert!(variant.glyphs().iter().all(|g| g.page_id == 0));
    }

    #[test]
    fn test_line_height_from_metrics() {
        let context = MockRenderContext::new();
        let variant = FontSizeVariant::create(&context, &FakeFont::new(), 20, ATLAS).unwrap();

        // (800 + 200 + 100) * (20 / 1000)
        assert!((variant.scale() - 0.02).abs() < 1e-6);
        assert!((variant.line_height() - 22.0).abs() < 1e-4);
    }

    #[test]
    fn test_tab_advance_from_space() {
        let context = MockRenderContext::new();
        let variant = FontSizeVariant::create(&context, &FakeFont::new(), 20, ATLAS).unwrap();
        // space advance 250 units * 0.02 * 4
        assert!((variant.tab_x_advance() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_tab_advance_falls_back_to_size() {
        let context = MockRenderContext::new();
        let font = FakeFont::new().without_space();
        let variant = FontSizeVariant::create(&context, &font, 18, ATLAS).unwrap();
        assert_eq!(variant.tab_x_advance(), 72.0);
    }

    #[test]
    fn test_kerning_is_scaled_to_pixels() {
        let context = MockRenderContext::new();
        let variant = FontSizeVariant::create(&context, &FakeFont::new(), 20, ATLAS).unwrap();

        assert!((variant.kerning('A' as i32, 'V' as i32) + 1.6).abs() < 1e-5);
        assert_eq!(variant.kerning('V' as i32, 'A' as i32), 0.0);
        assert_eq!(variant.kernings().len(), 2);
    }

    #[test]
    fn test_verify_is_idempotent() {
        let context = MockRenderContext::new();
        let font = FakeFont::new().with_codepoint(233);
        let mut variant = FontSizeVariant::create(&context, &font, 20, ATLAS).unwrap();

        assert_eq!(variant.verify(&context, &font, "caf\u{e9}").unwrap(), 1);
        assert_eq!(variant.generation(), 2);
        assert_eq!(variant.verify(&context, &font, "caf\u{e9}").unwrap(), 0);
        assert_eq!(variant.generation(), 2);
        assert_eq!(context.count_texture_uploads(), 2);
        assert_eq!(variant.codepoints().len(), 97);
    }

    #[test]
    fn test_verify_skips_ascii() {
        let context = MockRenderContext::new();
        let font = FakeFont::new();
        let mut variant = FontSizeVariant::create(&context, &font, 20, ATLAS).unwrap();

        assert_eq!(variant.verify(&context, &font, "plain ascii\t\n\u{7f}").unwrap(), 0);
        assert_eq!(variant.generation(), 1);
    }

    #[test]
    fn test_verify_counts_repeated_codepoint_once() {
        let context = MockRenderContext::new();
        let font = FakeFont::new();
        let mut variant = FontSizeVariant::create(&context, &font, 20, ATLAS).unwrap();

        assert_eq!(variant.verify(&context, &font, "\u{e9}\u{e9}\u{e8}").unwrap(), 2);
        assert_eq!(&variant.codepoints()[96..], &[0xe9, 0xe8]);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let context = MockRenderContext::new();
        let font = FakeFont::new();
        let mut variant = FontSizeVariant::create(&context, &font, 24, ATLAS).unwrap();

        let before = variant.glyphs().to_vec();
        let pixels_before = context.texture_pixels(variant.atlas());
        variant.rebuild_atlas(&context, &font).unwrap();

        assert_eq!(variant.glyphs(), before.as_slice());
        assert_eq!(context.texture_pixels(variant.atlas()), pixels_before);
        assert_eq!(variant.generation(), 2);
    }

    #[test]
    fn test_texture_creation_failure() {
        let context = MockRenderContext::new();
        context.set_fail_texture_creation(true);

        let result = FontSizeVariant::create(&context, &FakeFont::new(), 20, ATLAS);
        assert!(matches!(
            result,
            Err(FontError::RenderResource(RenderError::TextureCreation(_)))
        ));
        assert_eq!(context.live_texture_count(), 0);
    }

    #[test]
    fn test_upload_failure_destroys_texture() {
        let context = MockRenderContext::new();
        context.set_fail_texture_upload(true);

        let result = FontSizeVariant::create(&context, &FakeFont::new(), 20, ATLAS);
        assert!(matches!(result, Err(FontError::RenderResource(_))));
        assert_eq!(context.count_texture_creates(), 1);
        assert_eq!(context.live_texture_count(), 0);
    }

    #[test]
    fn test_pack_failure_destroys_texture() {
        let context = MockRenderContext::new();
        let result = FontSizeVariant::create(&context, &FakeFont::new(), 20, Size::new(16, 16));
        assert!(matches!(result, Err(FontError::Pack { .. })));
        assert_eq!(context.live_texture_count(), 0);
    }

    #[test]
    fn test_failed_growth_keeps_previous_tables() {
        let context = MockRenderContext::new();
        let font = FakeFont::new();
        let mut variant = FontSizeVariant::create(&context, &font, 20, ATLAS).unwrap();

        context.set_fail_texture_upload(true);
        assert!(variant.verify(&context, &font, "\u{e9}").is_err());
        assert_eq!(variant.generation(), 1);
        assert!(variant.glyph(0xe9).is_none());
        assert!(variant.glyph('A' as i32).is_some());
        // Growth is not rolled back
        assert_eq!(variant.codepoints().len(), 97);

        context.set_fail_texture_upload(false);
        assert_eq!(variant.verify(&context, &font, "\u{e9}").unwrap(), 0);
        variant.rebuild_atlas(&context, &font).unwrap();
        assert!(variant.glyph(0xe9).is_some());
    }

    #[test]
    fn test_reference_counting_saturates() {
        let context = MockRenderContext::new();
        let mut variant = FontSizeVariant::create(&context, &FakeFont::new(), 20, ATLAS).unwrap();

        variant.add_reference();
        assert!(variant.remove_reference());
        assert!(!variant.remove_reference());
        assert_eq!(variant.reference_count(), 0);
    }

    #[test]
    fn test_destroy_releases_texture() {
        let context = MockRenderContext::new();
        let variant = FontSizeVariant::create(&context, &FakeFont::new(), 20, ATLAS).unwrap();
        let atlas = variant.atlas();

        variant.destroy(&context);
        assert!(!context.is_texture_alive(atlas));
        assert_eq!(context.count_texture_destroys(), 1);
    }
}
