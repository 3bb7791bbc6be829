//! Human-readable summary of the well-known receipt fields.
//!
//! The formatter emits plain text lines; the presentation layer decides
//! how to render them. Output follows a fixed field order regardless of
//! how the service ordered the result. Absent fields are skipped
//! silently, absent confidences render as `N/A`.

use crate::domain::{AnalyzedDocument, Field};

/// Scalar receipt fields reported before the item list, in output order.
const LEADING_FIELDS: &[(&str, &str)] = &[
    ("MerchantName", "Merchant Name"),
    ("TransactionDate", "Transaction Date"),
];

/// Scalar receipt fields reported after the item list, in output order.
const TRAILING_FIELDS: &[(&str, &str)] = &[
    ("Subtotal", "Subtotal"),
    ("TotalTax", "Total tax"),
    ("Tip", "Tip"),
    ("Total", "Total"),
];

/// Sub-fields reported for each receipt item, in output order.
const ITEM_FIELDS: &[(&str, &str)] = &[
    ("Description", "Item Description"),
    ("Quantity", "Item Quantity"),
    ("TotalPrice", "Total Item Price"),
];

/// Formats an ordered, human-readable report for the analyzed documents.
///
/// Each document contributes a single header line with its 1-based index
/// and type (`N/A` when absent), followed by one line per present
/// well-known field. The `Items` collection contributes a sub-block per
/// element, indexed independently of the document index.
pub fn format_summary(documents: &[AnalyzedDocument]) -> Vec<String> {
    let mut lines = Vec::new();

    for (index, document) in documents.iter().enumerate() {
        lines.push(format!(
            "Document #{} (type: {})",
            index + 1,
            document.doc_type.as_deref().unwrap_or("N/A")
        ));

        for (name, label) in LEADING_FIELDS {
            if let Some(field) = document.fields.get(*name) {
                lines.push(scalar_line(label, field, ""));
            }
        }

        if let Some(items) = document.fields.get("Items") {
            format_items(items, &mut lines);
        }

        for (name, label) in TRAILING_FIELDS {
            if let Some(field) = document.fields.get(*name) {
                lines.push(scalar_line(label, field, ""));
            }
        }
    }

    lines
}

fn format_items(items: &Field, lines: &mut Vec<String>) {
    let Some(elements) = items.as_array() else {
        return;
    };

    lines.push("Document items:".to_string());
    for (item_index, item) in elements.iter().enumerate() {
        lines.push(format!("...Item #{}", item_index + 1));
        let Some(fields) = item.as_object() else {
            continue;
        };
        for (name, label) in ITEM_FIELDS {
            if let Some(field) = fields.get(*name) {
                lines.push(scalar_line(label, field, "......"));
            }
        }
    }
}

fn scalar_line(label: &str, field: &Field, indent: &str) -> String {
    let value = field
        .display_value()
        .unwrap_or_else(|| "N/A".to_string());
    let confidence = field
        .confidence
        .map(|c| c.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!("{indent}{label}: {value} has confidence: {confidence}")
}
