//! Error handling for the document analysis pipeline.

mod types;

pub use types::DocLensError;
