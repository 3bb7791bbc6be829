//! Flattening of the nested field tree into renderable records.
//!
//! An analyzed document is a tree: scalar fields, composites of named
//! sub-fields, and ordered collections. Rendering wants a flat list. The
//! flattener walks the tree and emits one [`AnnotationRecord`] per valid
//! bounding region of each scalar field, labeling records with their
//! provenance path (`Items[0].Description`).

use tracing::warn;

use crate::domain::{AnalyzedDocument, Field, FieldValue};
use crate::processors::geometry::{extract_points, Point};

/// One renderable annotation, derived from a scalar field's bounding
/// region. Lives only for the duration of a render pass.
#[derive(Debug, Clone)]
pub struct AnnotationRecord {
    /// Provenance path of the field, e.g. `Items[0].Description`.
    pub label: String,
    /// Polygon vertices in page pixel space. May be empty, in which case
    /// the annotator skips the record.
    pub points: Vec<Point>,
    /// The field's confidence, when the service reported one.
    pub confidence: Option<f64>,
    /// 1-indexed page the polygon belongs to.
    pub page_number: u32,
}

/// Flattens a document's field tree into annotation records.
///
/// Scalar fields emit one record per bounding region; composites recurse
/// with a `.`-joined label; collections recurse with a 0-based index.
/// Fields without regions contribute nothing. Malformed regions are
/// dropped with one warning per offending field; the walk never fails.
pub fn flatten_document(document: &AnalyzedDocument) -> Vec<AnnotationRecord> {
    let mut records = Vec::new();
    for (name, field) in &document.fields {
        flatten_field(name, field, &mut records);
    }
    records
}

fn flatten_field(label: &str, field: &Field, records: &mut Vec<AnnotationRecord>) {
    match &field.value {
        FieldValue::Object { fields } => {
            for (name, sub_field) in fields {
                flatten_field(&format!("{label}.{name}"), sub_field, records);
            }
        }
        FieldValue::Array { items } => {
            for (index, item) in items.iter().enumerate() {
                flatten_field(&format!("{label}[{index}]"), item, records);
            }
        }
        _ => {
            let mut warned = false;
            for region in &field.bounding_regions {
                match extract_points(&region.polygon) {
                    Ok(points) => records.push(AnnotationRecord {
                        label: label.to_string(),
                        points,
                        confidence: field.confidence,
                        page_number: region.page_number,
                    }),
                    Err(err) => {
                        if !warned {
                            warn!(field = label, page = region.page_number, error = %err,
                                "dropping malformed bounding region");
                            warned = true;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoundingRegion;
    use std::collections::BTreeMap;

    fn document_with(fields: Vec<(&str, Field)>) -> AnalyzedDocument {
        AnalyzedDocument {
            doc_type: None,
            fields: fields
                .into_iter()
                .map(|(name, field)| (name.to_string(), field))
                .collect(),
            confidence: None,
        }
    }

    #[test]
    fn empty_document_flattens_to_nothing() {
        let document = AnalyzedDocument::default();
        assert!(flatten_document(&document).is_empty());
    }

    #[test]
    fn scalar_field_emits_one_record_per_region() {
        let field = Field::string("Coffee Shop")
            .with_confidence(0.98)
            .with_region(BoundingRegion::new(
                1,
                vec![0.0, 0.0, 10.0, 0.0, 10.0, 5.0, 0.0, 5.0],
            ))
            .with_region(BoundingRegion::new(2, vec![1.0, 1.0, 2.0, 1.0, 2.0, 2.0]));

        let records = flatten_document(&document_with(vec![("MerchantName", field)]));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "MerchantName");
        assert_eq!(records[0].points.len(), 4);
        assert_eq!(records[0].confidence, Some(0.98));
        assert_eq!(records[0].page_number, 1);
        assert_eq!(records[1].points.len(), 3);
        assert_eq!(records[1].page_number, 2);
    }

    #[test]
    fn composite_field_prefixes_labels_with_parent_name() {
        let description = Field::string("Latte").with_region(BoundingRegion::new(
            1,
            vec![0.0, 0.0, 8.0, 0.0, 8.0, 4.0, 0.0, 4.0],
        ));
        let composite = Field::object(BTreeMap::from([(
            "Description".to_string(),
            description,
        )]));

        let records = flatten_document(&document_with(vec![("Items", composite)]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label, "Items.Description");
        assert_eq!(records[0].points.len(), 4);
    }

    #[test]
    fn collection_elements_are_indexed_by_position() {
        let item = |text: &str| {
            Field::object(BTreeMap::from([(
                "Description".to_string(),
                Field::string(text).with_region(BoundingRegion::new(
                    1,
                    vec![0.0, 0.0, 4.0, 0.0, 4.0, 2.0],
                )),
            )]))
        };
        let collection = Field::array(vec![item("Latte"), item("Muffin"), item("Water")]);

        let records = flatten_document(&document_with(vec![("Items", collection)]));
        let labels: Vec<&str> = records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "Items[0].Description",
                "Items[1].Description",
                "Items[2].Description"
            ]
        );
    }

    #[test]
    fn field_without_regions_contributes_nothing() {
        let field = Field::number(42.5).with_confidence(0.93);
        let records = flatten_document(&document_with(vec![("Total", field)]));
        assert!(records.is_empty());
    }

    #[test]
    fn malformed_region_is_dropped_while_siblings_survive() {
        let field = Field::string("Total")
            .with_region(BoundingRegion::new(1, vec![0.0, 0.0, 1.0, 0.0, 1.0])) // odd
            .with_region(BoundingRegion::new(1, vec![0.0, 0.0])) // too short
            .with_region(BoundingRegion::new(1, vec![0.0, 0.0, 6.0, 0.0, 6.0, 6.0]));

        let records = flatten_document(&document_with(vec![("Total", field)]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].points.len(), 3);
    }

    #[test]
    fn absent_confidence_is_not_an_error() {
        let field = Field::string("no confidence").with_region(BoundingRegion::new(
            1,
            vec![0.0, 0.0, 2.0, 0.0, 2.0, 2.0],
        ));
        let records = flatten_document(&document_with(vec![("Note", field)]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].confidence, None);
    }
}
