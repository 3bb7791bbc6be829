//! Utility functions for the document analysis pipeline.

pub mod visualization;

pub use visualization::{load_font, Annotator};

use tracing_subscriber::EnvFilter;

/// Initializes tracing with an env-filter subscriber.
///
/// Respects `RUST_LOG` and defaults to `info`. Call once at process
/// start; subsequent calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
