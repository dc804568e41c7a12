//! Math types re-exported from [`glam`].
//!
//! Layout extents and pen positions use [`Vec2`]; label transforms use
//! [`Mat4`]. GPU-facing records keep plain `[f32; N]` arrays instead so their
//! memory layout is fixed.
//!
//! ```
//! use notepad_core::math::{Mat4, Vec2};
//!
//! let extent = Vec2::new(120.0, 24.0);
//! let projection = Mat4::orthographic_rh(0.0, 1280.0, 720.0, 0.0, -1.0, 1.0);
//! assert_eq!(extent.x, 120.0);
//! assert_ne!(projection, Mat4::IDENTITY);
//! ```
//!
//! [`glam`]: https://docs.rs/glam

pub use glam::*;
