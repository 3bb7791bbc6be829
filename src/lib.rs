//! # doc-lens
//!
//! A viewer pipeline for remote document analysis: submit a document image
//! or PDF to a document-intelligence service, then render the extracted
//! fields as polygon annotations over the page images and as a structured
//! text summary.
//!
//! The crate does not perform OCR or layout analysis itself. It consumes
//! the analysis service's result and normalizes it for presentation:
//!
//! - [`processors::extract_points`] validates and pairs flat polygon
//!   coordinates into 2-D points.
//! - [`processors::flatten_document`] walks the nested field tree of an
//!   analyzed document and produces flat, renderable annotation records.
//! - [`utils::Annotator`] draws the records onto a copy of a page image.
//! - [`processors::format_summary`] produces an ordered, human-readable
//!   report of the well-known receipt fields.
//!
//! The high-level entry point is [`doclens::DocLens`], which ties the
//! service client and the render pass together:
//!
//! ```no_run
//! use doc_lens::client::ModelKind;
//! use doc_lens::core::AnalysisConfig;
//! use doc_lens::doclens::DocLens;
//!
//! # async fn run() -> Result<(), doc_lens::core::DocLensError> {
//! let config = AnalysisConfig::new("https://example.cognitiveservices.azure.com", "api-key");
//! let doclens = DocLens::new(config)?;
//!
//! let bytes = std::fs::read("receipt.png").unwrap();
//! let page = image::load_from_memory(&bytes).unwrap().to_rgb8();
//!
//! let result = doclens.analyze(&bytes, &[page], ModelKind::Receipt).await?;
//! for line in &result.summary {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod core;
pub mod doclens;
pub mod domain;
pub mod processors;
pub mod utils;

pub use client::{DocumentAnalysisClient, ModelKind};
pub use crate::core::config::AnalysisConfig;
pub use crate::core::errors::DocLensError;
pub use doclens::{DocLens, DocLensResult};
pub use domain::{AnalysisResult, AnalyzedDocument, BoundingRegion, Field, FieldValue};
pub use processors::{extract_points, flatten_document, format_summary, AnnotationRecord, Point};
pub use utils::Annotator;
