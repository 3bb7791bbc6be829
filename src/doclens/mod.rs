//! The document analysis pipeline.
//!
//! [`DocLens`] ties the service client and the render pass together: one
//! upload triggers one analysis call, then a synchronous flatten →
//! annotate → format pass. Pipeline runs share no mutable state; the
//! result of each run is discarded once presented.

use image::RgbImage;
use tracing::info;

use crate::client::{DocumentAnalysisClient, ModelKind};
use crate::core::config::AnalysisConfig;
use crate::core::errors::DocLensError;
use crate::domain::AnalysisResult;
use crate::processors::{flatten_document, format_summary, AnnotationRecord};
use crate::utils::Annotator;

/// Everything one pipeline run produces for presentation.
pub struct DocLensResult {
    /// The raw analysis result, for structured/debug display.
    pub analysis: AnalysisResult,
    /// One annotated copy per input page image, in page order.
    pub annotated_pages: Vec<RgbImage>,
    /// Ordered report lines from the summary formatter.
    pub summary: Vec<String>,
}

/// High-level pipeline: analysis client plus annotation style.
///
/// Construct once at process start and reuse for every upload.
pub struct DocLens {
    client: DocumentAnalysisClient,
    annotator: Annotator,
}

impl DocLens {
    /// Creates a pipeline with the default annotator.
    pub fn new(config: AnalysisConfig) -> Result<Self, DocLensError> {
        Self::with_annotator(config, Annotator::new())
    }

    /// Creates a pipeline with an explicit annotator.
    pub fn with_annotator(
        config: AnalysisConfig,
        annotator: Annotator,
    ) -> Result<Self, DocLensError> {
        Ok(Self {
            client: DocumentAnalysisClient::new(config)?,
            annotator,
        })
    }

    /// Analyzes a document and renders its presentation outputs.
    ///
    /// `bytes` are the full original upload (sent to the service as-is);
    /// `pages` are the rasterized page images the annotations are drawn
    /// onto, in page order. The remote call is the only suspension
    /// point; everything after it is synchronous.
    pub async fn analyze(
        &self,
        bytes: &[u8],
        pages: &[RgbImage],
        model: ModelKind,
    ) -> Result<DocLensResult, DocLensError> {
        let analysis = self.client.analyze(bytes, model).await?;
        Ok(self.render(analysis, pages))
    }

    /// Runs the render pass over an already-received analysis result.
    ///
    /// Flattens every document's field tree, routes each record to the
    /// page its region names (page `n` annotates `pages[n - 1]`), and
    /// formats the summary. Pure apart from logging: inputs are not
    /// mutated and no state survives the call.
    pub fn render(&self, analysis: AnalysisResult, pages: &[RgbImage]) -> DocLensResult {
        let records: Vec<AnnotationRecord> = analysis
            .documents
            .iter()
            .flat_map(flatten_document)
            .collect();
        info!(
            documents = analysis.documents.len(),
            records = records.len(),
            pages = pages.len(),
            "rendering analysis result"
        );

        let annotated_pages = pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                let page_number = (index + 1) as u32;
                let page_records: Vec<AnnotationRecord> = records
                    .iter()
                    .filter(|record| record.page_number == page_number)
                    .cloned()
                    .collect();
                self.annotator.annotate(page, &page_records)
            })
            .collect();

        let summary = format_summary(&analysis.documents);

        DocLensResult {
            analysis,
            annotated_pages,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalyzedDocument, BoundingRegion, Field};
    use crate::utils::Annotator;
    use image::Rgb;
    use std::collections::BTreeMap;

    fn pipeline() -> DocLens {
        DocLens::with_annotator(
            AnalysisConfig::new("https://example.com", "key"),
            Annotator::with_font(None),
        )
        .unwrap()
    }

    fn receipt_result() -> AnalysisResult {
        let fields = BTreeMap::from([
            (
                "MerchantName".to_string(),
                Field::string("Coffee Shop")
                    .with_confidence(0.98)
                    .with_region(BoundingRegion::new(
                        1,
                        vec![8.0, 8.0, 56.0, 8.0, 56.0, 20.0, 8.0, 20.0],
                    )),
            ),
            (
                "Total".to_string(),
                Field::number(42.5).with_confidence(0.93).with_region(
                    BoundingRegion::new(1, vec![8.0, 30.0, 56.0, 30.0, 56.0, 44.0, 8.0, 44.0]),
                ),
            ),
        ]);
        AnalysisResult {
            api_version: None,
            model_id: Some("prebuilt-receipt".to_string()),
            content: None,
            documents: vec![AnalyzedDocument {
                doc_type: Some("receipt.retailMeal".to_string()),
                fields,
                confidence: Some(0.97),
            }],
        }
    }

    #[test]
    fn render_pass_produces_summary_and_annotated_page() {
        let base = RgbImage::from_pixel(64, 64, Rgb([255u8, 255u8, 255u8]));
        let result = pipeline().render(receipt_result(), std::slice::from_ref(&base));

        // Header plus the two present fields.
        assert_eq!(result.summary.len(), 3);
        assert_eq!(result.summary[0], "Document #1 (type: receipt.retailMeal)");
        assert_eq!(
            result.summary[1],
            "Merchant Name: Coffee Shop has confidence: 0.98"
        );
        assert_eq!(result.summary[2], "Total: 42.5 has confidence: 0.93");

        // Both field polygons landed on the page.
        assert_eq!(result.annotated_pages.len(), 1);
        let annotated = &result.annotated_pages[0];
        assert_ne!(annotated.as_raw(), base.as_raw());
        assert_eq!(annotated.get_pixel(8, 8), &Rgb([255u8, 0u8, 0u8]));
        assert_eq!(annotated.get_pixel(8, 30), &Rgb([255u8, 0u8, 0u8]));

        // The raw result is passed through untouched.
        assert_eq!(
            result.analysis.model_id.as_deref(),
            Some("prebuilt-receipt")
        );
    }

    #[test]
    fn records_are_routed_to_their_page() {
        let mut analysis = receipt_result();
        analysis.documents[0]
            .fields
            .insert(
                "Subtotal".to_string(),
                Field::number(40.0).with_region(BoundingRegion::new(
                    2,
                    vec![4.0, 4.0, 20.0, 4.0, 20.0, 12.0, 4.0, 12.0],
                )),
            );

        let blank = RgbImage::from_pixel(32, 32, Rgb([255u8, 255u8, 255u8]));
        let pages = vec![blank.clone(), blank.clone()];
        let result = pipeline().render(analysis, &pages);

        assert_eq!(result.annotated_pages.len(), 2);
        // Page 2 only carries the Subtotal polygon.
        assert_eq!(
            result.annotated_pages[1].get_pixel(4, 4),
            &Rgb([255u8, 0u8, 0u8])
        );
        assert_eq!(
            result.annotated_pages[1].get_pixel(30, 30),
            &Rgb([255u8, 255u8, 255u8])
        );
    }

    #[test]
    fn render_with_no_pages_still_summarizes() {
        let result = pipeline().render(receipt_result(), &[]);
        assert!(result.annotated_pages.is_empty());
        assert_eq!(result.summary.len(), 3);
    }
}
