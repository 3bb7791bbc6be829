//! Result-normalization processors.
//!
//! These are the pure pieces of the pipeline: geometry extraction, field
//! flattening, and summary formatting. None of them touch the network or
//! a display surface.

pub mod flatten;
pub mod geometry;
pub mod summary;

pub use flatten::{flatten_document, AnnotationRecord};
pub use geometry::{extract_points, Point, MIN_POLYGON_COORDS};
pub use summary::format_summary;
