//! PDF rasterization for previews and annotation targets.
//!
//! The analysis service receives the original PDF bytes; rasterization
//! exists only to give the annotator and the user raster pages to look
//! at, one image per page.

use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to initialize PDFium: {0}")]
    Init(String),

    #[error("failed to open PDF: {0}")]
    Open(String),

    #[error("failed to rasterize page {page}: {message}")]
    Rasterize { page: usize, message: String },

    #[error("PDF has no pages")]
    Empty,
}

/// Rasterization settings.
#[derive(Clone)]
pub struct RasterSettings {
    /// Rendering resolution (default: 150 DPI).
    pub dpi: f32,
    /// Cap on the longer edge of a rendered page (default: 4000 px).
    pub max_dimension: u32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            dpi: 150.0,
            max_dimension: 4000,
        }
    }
}

/// Converts PDF pages into RGB images via PDFium.
pub struct PdfRasterizer {
    pdfium: Pdfium,
    settings: RasterSettings,
}

impl PdfRasterizer {
    /// Binds to a PDFium library and prepares a rasterizer.
    ///
    /// Looks for PDFium next to the executable and in the usual system
    /// locations before falling back to the system loader.
    pub fn new(settings: RasterSettings) -> Result<Self, PdfError> {
        let pdfium = Pdfium::new(
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| {
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                        "/usr/lib",
                    ))
                })
                .or_else(|_| {
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                        "/usr/local/lib",
                    ))
                })
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| PdfError::Init(format!("could not find PDFium library: {e}")))?,
        );

        Ok(Self { pdfium, settings })
    }

    /// Prepares a rasterizer with default settings.
    pub fn with_defaults() -> Result<Self, PdfError> {
        Self::new(RasterSettings::default())
    }

    /// Opens a PDF from bytes and rasterizes every page, in order.
    pub fn rasterize_bytes(&self, bytes: &[u8]) -> Result<Vec<RgbImage>, PdfError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| PdfError::Open(e.to_string()))?;

        let page_count = document.pages().len();
        if page_count == 0 {
            return Err(PdfError::Empty);
        }

        let mut pages = Vec::with_capacity(page_count as usize);
        for (index, page) in document.pages().iter().enumerate() {
            let image = self
                .rasterize_page(&page)
                .map_err(|message| PdfError::Rasterize {
                    page: index + 1,
                    message,
                })?;
            pages.push(image);
        }

        Ok(pages)
    }

    /// Rasterizes a single page at the configured DPI, capped to the
    /// maximum dimension.
    fn rasterize_page(&self, page: &PdfPage) -> Result<RgbImage, String> {
        // PDF points are 1/72 inch.
        let scale = self.settings.dpi / 72.0;
        let mut width_px = (page.width().value * scale) as u32;
        let mut height_px = (page.height().value * scale) as u32;

        let longest = width_px.max(height_px);
        if longest > self.settings.max_dimension {
            let ratio = self.settings.max_dimension as f32 / longest as f32;
            width_px = (width_px as f32 * ratio) as u32;
            height_px = (height_px as f32 * ratio) as u32;
        }

        let render_config = PdfRenderConfig::new()
            .set_target_width(width_px as i32)
            .set_target_height(height_px as i32)
            .render_form_data(true)
            .render_annotations(true);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| e.to_string())?;

        Ok(bitmap.as_image().to_rgb8())
    }
}

/// Check if bytes represent a PDF file (magic bytes: %PDF)
pub fn is_pdf_bytes(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && &bytes[0..4] == b"%PDF"
}

/// Check if a file path has a PDF extension
#[allow(dead_code)]
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_ascii_lowercase() == "pdf")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_magic_bytes_are_detected() {
        assert!(is_pdf_bytes(b"%PDF-1.7 rest of file"));
        assert!(!is_pdf_bytes(b"\x89PNG\r\n"));
        assert!(!is_pdf_bytes(b"%PD"));
    }

    #[test]
    fn pdf_paths_are_detected_case_insensitively() {
        assert!(is_pdf_path(Path::new("scan.pdf")));
        assert!(is_pdf_path(Path::new("SCAN.PDF")));
        assert!(!is_pdf_path(Path::new("scan.png")));
        assert!(!is_pdf_path(Path::new("scan")));
    }
}
