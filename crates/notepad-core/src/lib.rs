//! notepad-- core
//!
//! Shared plumbing for the text renderer crates: logging bootstrap,
//! profiling hooks, geometry primitives and collection aliases.

pub mod alloc;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;
