//! Drawing of annotation records onto page images.
//!
//! The annotator operates on a copy of the base image so callers can
//! re-render the un-annotated view at any time. Output is deterministic:
//! the same base image and record sequence produce pixel-identical
//! results.

use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};

use crate::processors::{AnnotationRecord, Point};

/// Outline color for field polygons.
const OUTLINE_COLOR: Rgb<u8> = Rgb([255u8, 0u8, 0u8]);
/// Color for field labels.
const LABEL_COLOR: Rgb<u8> = Rgb([255u8, 0u8, 0u8]);
/// Pixel scale for label text.
const LABEL_SCALE: f32 = 16.0;
/// Pixel offsets that widen the one-pixel line into a visible stroke.
const STROKE_OFFSETS: [(f32, f32); 3] = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];

/// Attempts to load a label font from well-known system locations.
///
/// Returns `None` when no font is found; polygon outlines are still
/// drawn in that case, only labels are skipped.
pub fn load_font() -> Option<FontVec> {
    let font_paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    for path in &font_paths {
        if let Ok(font_data) = std::fs::read(path) {
            if let Ok(font) = FontVec::try_from_vec(font_data) {
                return Some(font);
            }
        }
    }

    None
}

/// Draws annotation records onto copies of page images.
///
/// Holds the fixed drawing style and the label font for the lifetime of
/// the process; construct once and reuse across uploads.
pub struct Annotator {
    font: Option<FontVec>,
}

impl Annotator {
    /// Creates an annotator, loading a label font from the system when
    /// one is available.
    pub fn new() -> Self {
        Self::with_font(load_font())
    }

    /// Creates an annotator with an explicit (or absent) label font.
    pub fn with_font(font: Option<FontVec>) -> Self {
        Self { font }
    }

    /// Draws each record onto a copy of the base image.
    ///
    /// Records with a non-empty point sequence get a closed polygon
    /// outline and, when a font is loaded, their label anchored at the
    /// first point. Records with no points are skipped. The base image
    /// is never mutated.
    pub fn annotate(&self, base: &RgbImage, records: &[AnnotationRecord]) -> RgbImage {
        let mut output = base.clone();

        for record in records {
            if record.points.is_empty() {
                continue;
            }
            draw_outline(&mut output, &record.points);
            self.draw_label(&mut output, record);
        }

        output
    }

    fn draw_label(&self, canvas: &mut RgbImage, record: &AnnotationRecord) {
        let Some(font) = &self.font else {
            return;
        };
        if canvas.width() == 0 || canvas.height() == 0 {
            return;
        }

        // Anchor at the first vertex, nudged into the image when the
        // polygon starts outside of it.
        let anchor = record.points[0];
        let x = (anchor.x as i32).clamp(0, canvas.width() as i32 - 1);
        let y = (anchor.y as i32).clamp(0, canvas.height() as i32 - 1);

        draw_text_mut(canvas, LABEL_COLOR, x, y, LABEL_SCALE, font, &record.label);
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

/// Draws a closed polygon outline connecting the points in order.
fn draw_outline(canvas: &mut RgbImage, points: &[Point]) {
    for i in 0..points.len() {
        let start = points[i];
        let end = points[(i + 1) % points.len()];
        for (dx, dy) in STROKE_OFFSETS {
            draw_line_segment_mut(
                canvas,
                (start.x + dx, start.y + dy),
                (end.x + dx, end.y + dy),
                OUTLINE_COLOR,
            );
        }
    }
}
