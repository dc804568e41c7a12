//! Collection types used across the workspace.
//!
//! Re-exports the AHash-backed hash collections so lookup tables (face name
//! to font id, GPU resource ids to resources) share one hasher.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
