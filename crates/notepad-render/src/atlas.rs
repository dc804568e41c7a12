//! Binary-tree rectangle packing for glyph atlases.
//!
//! The packer only hands out positions; callers own the pixel data and
//! upload it themselves. Packing is fully deterministic: the same sequence
//! of insertions into the same area always yields the same rectangles.
//!
//! # Example
//!
//! ```
//! use notepad_render::AtlasPacker;
//!
//! let mut packer = AtlasPacker::new(256, 256);
//! let a = packer.insert(16, 20).unwrap();
//! let b = packer.insert(16, 20).unwrap();
//! assert_ne!((a.x, a.y), (b.x, b.y));
//! ```

use notepad_core::geometry::Rect;

/// Padding used between packed rectangles unless overridden.
pub const DEFAULT_PADDING: u32 = 1;

#[derive(Debug, Clone)]
enum PackerNode {
    Empty {
        rect: Rect<u32>,
    },
    Filled,
    Split {
        left: Box<PackerNode>,
        right: Box<PackerNode>,
    },
}

impl PackerNode {
    fn new(rect: Rect<u32>) -> Self {
        Self::Empty { rect }
    }

    /// Place a `width x height` slot, returning its top-left corner.
    fn insert(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        match self {
            PackerNode::Empty { rect } => {
                if width > rect.width || height > rect.height {
                    return None;
                }

                let rect = *rect;
                if width == rect.width && height == rect.height {
                    *self = PackerNode::Filled;
                    return Some((rect.x, rect.y));
                }

                // Cut along the axis with more leftover space so the remaining
                // free node is as large as possible.
                let (left_rect, right_rect) = if rect.width - width > rect.height - height {
                    (
                        Rect::new(rect.x, rect.y, width, rect.height),
                        Rect::new(rect.x + width, rect.y, rect.width - width, rect.height),
                    )
                } else {
                    (
                        Rect::new(rect.x, rect.y, rect.width, height),
                        Rect::new(rect.x, rect.y + height, rect.width, rect.height - height),
                    )
                };

                let mut left = Box::new(PackerNode::new(left_rect));
                let right = Box::new(PackerNode::new(right_rect));
                let placed = left.insert(width, height);
                *self = PackerNode::Split { left, right };
                placed
            }
            PackerNode::Filled => None,
            PackerNode::Split { left, right } => left
                .insert(width, height)
                .or_else(|| right.insert(width, height)),
        }
    }
}

/// Guillotine packer over a fixed `width x height` area.
///
/// Every slot is grown by `padding` pixels on its right and bottom edges so
/// that linear sampling never bleeds a neighbour into a glyph.
#[derive(Debug, Clone)]
pub struct AtlasPacker {
    width: u32,
    height: u32,
    padding: u32,
    root: PackerNode,
    len: usize,
}

impl AtlasPacker {
    /// Create a packer with [`DEFAULT_PADDING`].
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_padding(width, height, DEFAULT_PADDING)
    }

    pub fn with_padding(width: u32, height: u32, padding: u32) -> Self {
        Self {
            width,
            height,
            padding,
            root: PackerNode::new(Rect::new(0, 0, width, height)),
            len: 0,
        }
    }

    /// Reserve space for a `width x height` bitmap.
    ///
    /// Returns the bitmap's rectangle (without padding), or `None` when the
    /// remaining area cannot hold it. Zero-sized bitmaps still consume a
    /// padding-sized slot so every caller gets a distinct position.
    pub fn insert(&mut self, width: u32, height: u32) -> Option<Rect<u32>> {
        let (x, y) = self
            .root
            .insert(width + self.padding, height + self.padding)?;
        self.len += 1;
        Some(Rect::new(x, y, width, height))
    }

    /// Forget every placement.
    pub fn reset(&mut self) {
        self.root = PackerNode::new(Rect::new(0, 0, self.width, self.height));
        self.len = 0;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Number of rectangles placed since creation or the last reset.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
