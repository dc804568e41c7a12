//! Font system: loaded faces, their size variants and atlas growth.

use crate::config::{FontSystemConfig, SystemFontConfig};
use crate::error::{FontError, FontResult};
use crate::font::{FontSource, TrueTypeFont, VerticalMetrics};
use crate::layout::{self, TextMesh};
use crate::variant::FontSizeVariant;
use notepad_core::alloc::HashMap;
use notepad_core::geometry::Size;
use notepad_core::math::Vec2;
use notepad_core::profiling::profile_function;
use notepad_test_utils::RenderContext;
use std::path::Path;
use std::sync::Arc;

/// Slot of a face in the font system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(u16);

impl FontId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A face rendered at one size, as returned by [`FontSystem::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle {
    face: FontId,
    variant: u16,
}

impl FontHandle {
    pub fn face(&self) -> FontId {
        self.face
    }

    pub fn variant_index(&self) -> usize {
        self.variant as usize
    }
}

/// One loaded font binary and every size variant created from it.
pub struct FontFace {
    name: String,
    face_index: u32,
    source: Box<dyn FontSource>,
    default_size: u16,
    variants: Vec<FontSizeVariant>,
}

impl FontFace {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family_name(&self) -> Option<&str> {
        self.source.family_name()
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    pub fn metrics(&self) -> VerticalMetrics {
        self.source.vertical_metrics()
    }

    pub fn default_size(&self) -> u16 {
        self.default_size
    }

    pub fn source(&self) -> &dyn FontSource {
        self.source.as_ref()
    }

    pub fn variants(&self) -> &[FontSizeVariant] {
        &self.variants
    }

    fn find_variant(&self, size: u16) -> Option<usize> {
        self.variants.iter().position(|v| v.size() == size)
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("name", &self.name)
            .field("face_index", &self.face_index)
            .field("default_size", &self.default_size)
            .field("variants", &self.variants.len())
            .finish()
    }
}

/// Owns every loaded face and hands out size variants.
///
/// The system is an explicit context object: create it at startup with
/// the renderer it should allocate atlases on, and pass it to whatever
/// lays out or draws text. Dropping it destroys every atlas texture.
///
/// # Example
///
/// ```no_run
/// use notepad_text::{FontSystem, FontSystemConfig, SystemFontConfig};
/// # fn renderer() -> std::sync::Arc<dyn notepad_render::RenderContext> { unimplemented!() }
///
/// let config = FontSystemConfig::default()
///     .with_default_font(SystemFontConfig::new("mono", "fonts/mono.ttf", 20));
/// let mut fonts = FontSystem::new(config, renderer()).unwrap();
///
/// let font = fonts.acquire("mono", 20).unwrap();
/// fonts.verify_atlas(font, "h\u{e9}llo").unwrap();
/// let mesh = fonts.layout(font, "h\u{e9}llo").unwrap();
/// assert_eq!(mesh.quad_count, 5);
/// ```
pub struct FontSystem {
    config: FontSystemConfig,
    context: Arc<dyn RenderContext>,
    faces: Vec<FontFace>,
    lookup: HashMap<String, FontId>,
}

impl FontSystem {
    /// Create the system and load the configured default fonts.
    ///
    /// A default font that fails to load is logged and skipped.
    pub fn new(config: FontSystemConfig, context: Arc<dyn RenderContext>) -> FontResult<Self> {
        config.validate()?;

        let default_fonts = config.default_fonts.clone();
        let mut system = Self {
            config,
            context,
            faces: Vec::new(),
            lookup: HashMap::default(),
        };

        for font in &default_fonts {
            if let Err(err) = system.load_system_font(font) {
                tracing::error!("Failed to load system font '{}': {}", font.name, err);
            }
        }

        tracing::info!(
            "Font system initialized with {}/{} faces",
            system.faces.len(),
            system.config.max_system_font_count
        );
        Ok(system)
    }

    /// Load a font file and register it under `font.name`.
    ///
    /// A name that is already loaded returns the existing id.
    pub fn load_system_font(&mut self, font: &SystemFontConfig) -> FontResult<FontId> {
        profile_function!();

        if let Some(id) = self.existing(&font.name) {
            return Ok(id);
        }
        self.check_capacity()?;

        let source = TrueTypeFont::from_file(&font.path, font.face_index)?;
        self.insert_face(
            font.name.clone(),
            Box::new(source),
            font.face_index,
            font.default_size,
        )
    }

    /// Load a font file named after its file stem.
    pub fn load(&mut self, path: impl AsRef<Path>, default_size: u16) -> FontResult<FontId> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        self.load_system_font(&SystemFontConfig::new(name, path, default_size))
    }

    /// Register an already parsed face.
    pub fn register_face(
        &mut self,
        name: impl Into<String>,
        source: Box<dyn FontSource>,
        default_size: u16,
    ) -> FontResult<FontId> {
        let name = name.into();
        if let Some(id) = self.existing(&name) {
            return Ok(id);
        }
        self.check_capacity()?;
        self.insert_face(name, source, 0, default_size)
    }

    fn existing(&self, name: &str) -> Option<FontId> {
        let id = self.lookup.get(name).copied()?;
        tracing::warn!("Font '{}' is already loaded", name);
        Some(id)
    }

    fn check_capacity(&self) -> FontResult<()> {
        let max = self.config.max_system_font_count;
        if self.faces.len() >= max as usize {
            tracing::error!("Cannot load more fonts, the limit is {}", max);
            return Err(FontError::CapacityExceeded { max });
        }
        Ok(())
    }

    fn insert_face(
        &mut self,
        name: String,
        source: Box<dyn FontSource>,
        face_index: u32,
        default_size: u16,
    ) -> FontResult<FontId> {
        let variant = FontSizeVariant::create(
            self.context.as_ref(),
            source.as_ref(),
            default_size,
            self.atlas_size(),
        )?;

        let id = FontId(self.faces.len() as u16);
        tracing::info!(
            "Loaded font '{}' ({}) at {}px",
            name,
            source.family_name().unwrap_or("unnamed family"),
            default_size
        );

        self.lookup.insert(name.clone(), id);
        self.faces.push(FontFace {
            name,
            face_index,
            source,
            default_size,
            variants: vec![variant],
        });
        Ok(id)
    }

    fn atlas_size(&self) -> Size<u32> {
        Size::new(self.config.atlas_width, self.config.atlas_height)
    }

    /// Get the variant of face `name` at `size`, creating it on first use.
    ///
    /// Every successful call adds one reference to the variant.
    pub fn acquire(&mut self, name: &str, size: u16) -> FontResult<FontHandle> {
        let id = self
            .lookup
            .get(name)
            .copied()
            .ok_or_else(|| FontError::FontNotFound(name.to_string()))?;
        self.acquire_face(id, size)
    }

    /// [`acquire`](Self::acquire) on the first loaded face.
    pub fn acquire_default(&mut self, size: u16) -> FontResult<FontHandle> {
        if self.faces.is_empty() {
            return Err(FontError::FontNotFound("default".to_string()));
        }
        self.acquire_face(FontId(0), size)
    }

    fn acquire_face(&mut self, id: FontId, size: u16) -> FontResult<FontHandle> {
        profile_function!();

        let atlas_size = self.atlas_size();
        let context = self.context.as_ref();
        let face = &mut self.faces[id.index()];

        let index = match face.find_variant(size) {
            Some(index) => index,
            None => {
                tracing::debug!("Creating {}px variant of '{}'", size, face.name);
                let variant =
                    FontSizeVariant::create(context, face.source.as_ref(), size, atlas_size)?;
                face.variants.push(variant);
                face.variants.len() - 1
            }
        };

        face.variants[index].add_reference();
        Ok(FontHandle {
            face: id,
            variant: index as u16,
        })
    }

    /// Drop one reference taken by [`acquire`](Self::acquire).
    ///
    /// Counts never go below zero and variants are kept alive until
    /// shutdown.
    pub fn release(&mut self, handle: FontHandle) -> FontResult<()> {
        let variant = self
            .faces
            .get_mut(handle.face.index())
            .and_then(|face| face.variants.get_mut(handle.variant_index()))
            .ok_or(FontError::InvalidHandle(handle))?;

        if !variant.remove_reference() {
            tracing::warn!(
                "Released {}px font variant with no outstanding references",
                variant.size()
            );
        }
        Ok(())
    }

    /// Add any codepoints of `text` missing from the atlas, rebuilding it
    /// when needed. Returns how many codepoints were added.
    pub fn verify_atlas(&mut self, handle: FontHandle, text: &str) -> FontResult<usize> {
        let context = self.context.as_ref();
        let face = self
            .faces
            .get_mut(handle.face.index())
            .ok_or(FontError::InvalidHandle(handle))?;
        let variant = face
            .variants
            .get_mut(handle.variant_index())
            .ok_or(FontError::InvalidHandle(handle))?;
        variant.verify(context, face.source.as_ref(), text)
    }

    /// Repack the atlas without changing the vocabulary.
    pub fn rebuild_atlas(&mut self, handle: FontHandle) -> FontResult<()> {
        let context = self.context.as_ref();
        let face = self
            .faces
            .get_mut(handle.face.index())
            .ok_or(FontError::InvalidHandle(handle))?;
        let variant = face
            .variants
            .get_mut(handle.variant_index())
            .ok_or(FontError::InvalidHandle(handle))?;
        variant.rebuild_atlas(context, face.source.as_ref())
    }

    pub fn measure_string(&self, handle: FontHandle, text: &str) -> FontResult<Vec2> {
        let variant = self.variant(handle).ok_or(FontError::InvalidHandle(handle))?;
        Ok(layout::measure(variant, text))
    }

    pub fn layout(&self, handle: FontHandle, text: &str) -> FontResult<TextMesh> {
        let variant = self.variant(handle).ok_or(FontError::InvalidHandle(handle))?;
        layout::layout(variant, text)
    }

    pub fn variant(&self, handle: FontHandle) -> Option<&FontSizeVariant> {
        self.faces
            .get(handle.face.index())
            .and_then(|face| face.variants.get(handle.variant_index()))
    }

    pub fn face(&self, name: &str) -> Option<&FontFace> {
        self.lookup
            .get(name)
            .and_then(|id| self.faces.get(id.index()))
    }

    pub fn face_id(&self, name: &str) -> Option<FontId> {
        self.lookup.get(name).copied()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn config(&self) -> &FontSystemConfig {
        &self.config
    }

    /// Renderer that owns the atlas textures.
    pub fn render_context(&self) -> &Arc<dyn RenderContext> {
        &self.context
    }

    /// Destroy every atlas texture and forget all faces.
    ///
    /// Handles handed out before shutdown become invalid.
    pub fn shutdown(&mut self) {
        if self.faces.is_empty() {
            return;
        }

        let context = self.context.as_ref();
        let mut destroyed = 0;
        for face in self.faces.drain(..) {
            for variant in face.variants {
                variant.destroy(context);
                destroyed += 1;
            }
        }
        self.lookup.clear();

        tracing::info!("Font system shut down, destroyed {} atlases", destroyed);
    }
}

impl Drop for FontSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for FontSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSystem")
            .field("config", &self.config)
            .field("faces", &self.faces)
            .finish()
    }
}
