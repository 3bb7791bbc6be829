//! Domain-level structures for the document analysis pipeline.
//!
//! This module groups the types that mirror the analysis service's result
//! shape: the root result, its documents, and the nested field tree.

pub mod result;

pub use result::{
    AnalysisResult, AnalyzedDocument, BoundingRegion, CurrencyValue, Field, FieldValue,
};
