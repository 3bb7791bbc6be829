//! Analysis glue shared between CLI and server modes.

use crate::pdf::{is_pdf_bytes, PdfError, PdfRasterizer};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use doc_lens::core::DocLensError;
use doc_lens::doclens::DocLensResult;
use doc_lens::domain::AnalysisResult;
use image::RgbImage;
use serde::Serialize;
use std::io::Cursor;
use std::path::Path;

/// Upload extensions accepted for analysis.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "pdf"];

/// Rejects files whose extension is not a supported upload type.
pub fn validate_extension(path: &Path) -> Result<(), DocLensError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(DocLensError::UnsupportedInput { extension })
    }
}

/// Turns an upload into raster pages: one per PDF page, or a single page
/// for a plain image.
pub fn load_pages(bytes: &[u8]) -> Result<Vec<RgbImage>, DocLensError> {
    if bytes.is_empty() {
        return Err(DocLensError::EmptyInput);
    }

    if is_pdf_bytes(bytes) {
        let rasterizer = PdfRasterizer::with_defaults().map_err(|e| match e {
            PdfError::Init(_) => DocLensError::service("PDF rasterizer unavailable", e),
            other => DocLensError::CorruptInput {
                context: other.to_string(),
            },
        })?;
        rasterizer
            .rasterize_bytes(bytes)
            .map_err(|e| DocLensError::CorruptInput {
                context: e.to_string(),
            })
    } else {
        let image = image::load_from_memory(bytes).map_err(DocLensError::ImageDecode)?;
        Ok(vec![image.to_rgb8()])
    }
}

/// One annotated page in an analysis response.
#[derive(Debug, Serialize)]
pub struct PageImage {
    /// 1-indexed page number.
    pub page: usize,
    pub width: u32,
    pub height: u32,
    /// The annotated page as a base64-encoded PNG.
    pub image_png_base64: String,
}

/// Response envelope for an analysis request.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub page_count: usize,
    pub pages: Vec<PageImage>,
    pub summary: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<f64>,
}

impl AnalyzeResponse {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            page_count: 0,
            pages: Vec::new(),
            summary: Vec::new(),
            analysis: None,
            error: Some(message),
            processing_time_ms: None,
        }
    }

    /// Builds a success response from a finished pipeline run.
    pub fn from_result(
        result: DocLensResult,
        processing_time_ms: f64,
    ) -> Result<Self, DocLensError> {
        let pages = result
            .annotated_pages
            .iter()
            .enumerate()
            .map(|(index, image)| {
                Ok(PageImage {
                    page: index + 1,
                    width: image.width(),
                    height: image.height(),
                    image_png_base64: encode_png_base64(image)?,
                })
            })
            .collect::<Result<Vec<_>, DocLensError>>()?;

        Ok(Self {
            success: true,
            page_count: pages.len(),
            pages,
            summary: result.summary,
            analysis: Some(result.analysis),
            error: None,
            processing_time_ms: Some(processing_time_ms),
        })
    }
}

/// Encodes an image as a base64 PNG for embedding in JSON.
pub fn encode_png_base64(image: &RgbImage) -> Result<String, DocLensError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(DocLensError::ImageEncode)?;
    Ok(BASE64.encode(buffer.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn supported_extensions_pass_validation() {
        for name in ["scan.png", "scan.jpg", "photo.JPEG", "doc.pdf", "DOC.PDF"] {
            assert!(validate_extension(Path::new(name)).is_ok(), "{name}");
        }
    }

    #[test]
    fn unsupported_extensions_are_rejected() {
        for name in ["notes.txt", "archive.zip", "image.webp", "noextension"] {
            let err = validate_extension(Path::new(name)).unwrap_err();
            assert!(matches!(err, DocLensError::UnsupportedInput { .. }), "{name}");
        }
    }

    #[test]
    fn empty_uploads_are_rejected() {
        assert!(matches!(
            load_pages(&[]).unwrap_err(),
            DocLensError::EmptyInput
        ));
    }

    #[test]
    fn garbage_image_bytes_are_an_input_error() {
        let err = load_pages(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DocLensError::ImageDecode(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn single_image_upload_becomes_one_page() {
        let image = RgbImage::from_pixel(8, 8, Rgb([0u8, 0u8, 0u8]));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

        let pages = load_pages(&bytes.into_inner()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].dimensions(), (8, 8));
    }

    #[test]
    fn png_encoding_round_trips() {
        let image = RgbImage::from_pixel(4, 4, Rgb([10u8, 20u8, 30u8]));
        let encoded = encode_png_base64(&image).unwrap();

        let bytes = BASE64.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.as_raw(), image.as_raw());
    }
}
