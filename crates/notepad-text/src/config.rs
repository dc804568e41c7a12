//! Font system configuration.

use crate::error::{FontError, FontResult};
use std::path::PathBuf;

/// A face to load when the font system starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemFontConfig {
    /// Lookup name used by [`FontSystem::acquire`](crate::FontSystem::acquire).
    pub name: String,
    pub path: PathBuf,
    /// Size of the variant created together with the face.
    pub default_size: u16,
    /// Face index inside a font collection, 0 for plain font files.
    pub face_index: u32,
}

impl SystemFontConfig {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, default_size: u16) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            default_size,
            face_index: 0,
        }
    }

    pub fn with_face_index(mut self, face_index: u32) -> Self {
        self.face_index = face_index;
        self
    }
}

/// Configuration for [`FontSystem`](crate::FontSystem).
///
/// ```
/// use notepad_text::{FontSystemConfig, SystemFontConfig};
///
/// let config = FontSystemConfig::default()
///     .with_max_system_font_count(2)
///     .with_default_font(SystemFontConfig::new("mono", "fonts/mono.ttf", 20));
/// assert_eq!(config.atlas_width, 1024);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FontSystemConfig {
    /// Maximum number of faces the system will hold.
    pub max_system_font_count: u16,
    pub atlas_width: u32,
    pub atlas_height: u32,
    pub default_fonts: Vec<SystemFontConfig>,
}

impl Default for FontSystemConfig {
    fn default() -> Self {
        Self {
            max_system_font_count: 8,
            atlas_width: 1024,
            atlas_height: 1024,
            default_fonts: Vec::new(),
        }
    }
}

impl FontSystemConfig {
    pub fn with_max_system_font_count(mut self, count: u16) -> Self {
        self.max_system_font_count = count;
        self
    }

    pub fn with_atlas_size(mut self, width: u32, height: u32) -> Self {
        self.atlas_width = width;
        self.atlas_height = height;
        self
    }

    pub fn with_default_font(mut self, font: SystemFontConfig) -> Self {
        self.default_fonts.push(font);
        self
    }

    pub(crate) fn validate(&self) -> FontResult<()> {
        if self.max_system_font_count == 0 {
            return Err(FontError::InvalidConfig(
                "max_system_font_count must be greater than 0".to_string(),
            ));
        }
        if self.atlas_width == 0 || self.atlas_height == 0 {
            return Err(FontError::InvalidConfig(format!(
                "atlas size {}x{} must be non-zero",
                self.atlas_width, self.atlas_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FontSystemConfig::default();
        assert_eq!(config.max_system_font_count, 8);
        assert_eq!((config.atlas_width, config.atlas_height), (1024, 1024));
        assert!(config.default_fonts.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = FontSystemConfig::default().with_max_system_font_count(0);
        assert!(matches!(config.validate(), Err(FontError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_atlas_rejected() {
        let config = FontSystemConfig::default().with_atlas_size(0, 512);
        assert!(matches!(config.validate(), Err(FontError::InvalidConfig(_))));
    }
}
