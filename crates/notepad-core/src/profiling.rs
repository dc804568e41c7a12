//! Profiling utilities based on the `puffin` crate.
//!
//! Scopes are always compiled in but stay inert until
//! `puffin::set_scopes_on(true)` is called, which [`init_profiling`] does.

#[cfg(feature = "profiling")]
use std::sync::OnceLock;

pub use puffin::{profile_function, profile_scope};

/// Profiling backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingBackend {
    /// Scopes are recorded in-process only (no viewer attached).
    InProcess,
    /// Send profiling data to puffin_viewer via HTTP.
    #[cfg(feature = "profiling")]
    PuffinHttp,
}

#[cfg(feature = "profiling")]
static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

/// Enable profiling scopes with the given backend.
///
/// # Example
/// ```no_run
/// use notepad_core::profiling::{init_profiling, ProfilingBackend};
///
/// init_profiling(ProfilingBackend::InProcess);
/// ```
pub fn init_profiling(backend: ProfilingBackend) {
    puffin::set_scopes_on(true);

    match backend {
        ProfilingBackend::InProcess => {
            tracing::debug!("Puffin scopes enabled without a viewer");
        }
        #[cfg(feature = "profiling")]
        ProfilingBackend::PuffinHttp => {
            // Default puffin port.
            match puffin_http::Server::new("0.0.0.0:8585") {
                Ok(server) => {
                    tracing::info!("Puffin profiler server started on http://0.0.0.0:8585");
                    let _ = PROFILING_SERVER.set(server);
                }
                Err(e) => {
                    tracing::error!("Failed to start puffin server: {}", e);
                }
            }
        }
    }
}

/// Mark the start of a new frame for profiling.
///
/// Call once per iteration of the render loop.
#[inline]
pub fn new_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

/// Whether profiling scopes are currently being recorded.
pub fn is_enabled() -> bool {
    puffin::are_scopes_on()
}
