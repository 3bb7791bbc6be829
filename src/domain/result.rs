//! Result types returned by the document analysis service.
//!
//! These types mirror the service's camelCase wire format. The result is
//! immutable once received: it is deserialized from one analysis call,
//! consumed by one render pass (flatten, annotate, summarize), and then
//! discarded. Nothing here is cached across uploads.
//!
//! Fields form a tree: a field is either a typed scalar, an object of
//! named sub-fields, or an ordered array of sub-fields. Every field may
//! carry bounding regions locating its value on a page. Unrecognized
//! field types deserialize to [`FieldValue::Unknown`] so that new service
//! types never abort a render pass.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The root structure returned by the analysis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Service API version that produced this result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// The model that analyzed the document, e.g. `prebuilt-receipt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Full recognized text content, when the service provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// The analyzed documents, in service order.
    #[serde(default)]
    pub documents: Vec<AnalyzedDocument>,
}

/// One analyzed document instance within a result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedDocument {
    /// The document type label, e.g. `receipt.retailMeal`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    /// Extracted fields, keyed by field name.
    ///
    /// A `BTreeMap` keeps iteration deterministic within a run; the
    /// service does not assign meaning to field order.
    #[serde(default)]
    pub fields: BTreeMap<String, Field>,
    /// Overall confidence for the document classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A polygon on a specific page marking where a value was found.
///
/// The polygon is a flat list of alternating x/y coordinates. A valid
/// polygon has an even count of at least six numbers; validation happens
/// in [`extract_points`](crate::processors::extract_points), not here,
/// so that a malformed region can be dropped without failing
/// deserialization of the whole result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingRegion {
    /// 1-indexed page the polygon refers to.
    pub page_number: u32,
    /// Alternating x/y coordinates in page pixel space.
    #[serde(default)]
    pub polygon: Vec<f32>,
}

impl BoundingRegion {
    /// Creates a bounding region on the given page.
    pub fn new(page_number: u32, polygon: Vec<f32>) -> Self {
        Self {
            page_number,
            polygon,
        }
    }
}

/// One extracted field, possibly nested or repeated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// The typed value of the field.
    #[serde(flatten)]
    pub value: FieldValue,
    /// Raw text content the value was read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Service-reported certainty in `[0.0, 1.0]`, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Where on the document the value was found. Empty when the service
    /// reports no location.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounding_regions: Vec<BoundingRegion>,
}

/// The typed value carried by a [`Field`].
///
/// Scalar variants carry the service's semantic value; `Object` and
/// `Array` nest further fields. Matching is exhaustive on purpose: adding
/// a variant forces every consumer to decide how to handle it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldValue {
    /// A plain string value.
    String {
        /// The parsed string, when the service could produce one.
        #[serde(
            rename = "valueString",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<String>,
    },
    /// A numeric value.
    Number {
        /// The parsed number, when the service could produce one.
        #[serde(
            rename = "valueNumber",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<f64>,
    },
    /// An ISO-8601 date value.
    Date {
        /// The parsed date, when the service could produce one.
        #[serde(rename = "valueDate", default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    /// A monetary amount with optional currency information.
    Currency {
        /// The parsed amount, when the service could produce one.
        #[serde(
            rename = "valueCurrency",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<CurrencyValue>,
    },
    /// A composite of named sub-fields.
    Object {
        /// Sub-fields keyed by name.
        #[serde(rename = "valueObject", default)]
        fields: BTreeMap<String, Field>,
    },
    /// An ordered collection of sub-fields.
    Array {
        /// The collection elements, in service order.
        #[serde(rename = "valueArray", default)]
        items: Vec<Field>,
    },
    /// A field type this crate does not model. The raw `content` on the
    /// surrounding [`Field`] is still available for display.
    #[serde(other)]
    Unknown,
}

/// A monetary amount as reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyValue {
    /// The numeric amount.
    pub amount: f64,
    /// ISO currency code, e.g. `USD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    /// Currency symbol as printed on the document, e.g. `$`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_symbol: Option<String>,
}

impl CurrencyValue {
    /// Renders the amount with its symbol or code when available.
    pub fn display(&self) -> String {
        if let Some(symbol) = &self.currency_symbol {
            format!("{}{}", symbol, self.amount)
        } else if let Some(code) = &self.currency_code {
            format!("{} {}", self.amount, code)
        } else {
            self.amount.to_string()
        }
    }
}

impl Field {
    /// Creates a string field without confidence or regions.
    pub fn string(value: impl Into<String>) -> Self {
        Self::from_value(FieldValue::String {
            value: Some(value.into()),
        })
    }

    /// Creates a number field without confidence or regions.
    pub fn number(value: f64) -> Self {
        Self::from_value(FieldValue::Number { value: Some(value) })
    }

    /// Creates a composite field from named sub-fields.
    pub fn object(fields: BTreeMap<String, Field>) -> Self {
        Self::from_value(FieldValue::Object { fields })
    }

    /// Creates a collection field from ordered elements.
    pub fn array(items: Vec<Field>) -> Self {
        Self::from_value(FieldValue::Array { items })
    }

    fn from_value(value: FieldValue) -> Self {
        Self {
            value,
            content: None,
            confidence: None,
            bounding_regions: Vec::new(),
        }
    }

    /// Attaches a confidence score.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Attaches a bounding region.
    pub fn with_region(mut self, region: BoundingRegion) -> Self {
        self.bounding_regions.push(region);
        self
    }

    /// The sub-field map of a composite field, if this is one.
    pub fn as_object(&self) -> Option<&BTreeMap<String, Field>> {
        match &self.value {
            FieldValue::Object { fields } => Some(fields),
            _ => None,
        }
    }

    /// The elements of a collection field, if this is one.
    pub fn as_array(&self) -> Option<&[Field]> {
        match &self.value {
            FieldValue::Array { items } => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Whether this field carries a single value rather than nesting.
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self.value,
            FieldValue::Object { .. } | FieldValue::Array { .. }
        )
    }

    /// A human-readable rendering of the field's value.
    ///
    /// Prefers the typed semantic value and falls back to the raw
    /// `content` the value was read from. Composite and collection
    /// fields have no scalar rendering of their own.
    pub fn display_value(&self) -> Option<String> {
        let semantic = match &self.value {
            FieldValue::String { value } => value.clone(),
            FieldValue::Number { value } => value.map(|v| v.to_string()),
            FieldValue::Date { value } => value.clone(),
            FieldValue::Currency { value } => value.as_ref().map(CurrencyValue::display),
            FieldValue::Object { .. } | FieldValue::Array { .. } => return None,
            FieldValue::Unknown => None,
        };
        semantic.or_else(|| self.content.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_service_shaped_document() {
        let raw = json!({
            "apiVersion": "2024-11-30",
            "modelId": "prebuilt-receipt",
            "documents": [{
                "docType": "receipt.retailMeal",
                "confidence": 0.97,
                "fields": {
                    "MerchantName": {
                        "type": "string",
                        "valueString": "Coffee Shop",
                        "content": "Coffee Shop",
                        "confidence": 0.98,
                        "boundingRegions": [
                            { "pageNumber": 1, "polygon": [10.0, 10.0, 90.0, 10.0, 90.0, 30.0, 10.0, 30.0] }
                        ]
                    },
                    "Total": {
                        "type": "currency",
                        "valueCurrency": { "amount": 42.5, "currencyCode": "USD" },
                        "confidence": 0.93
                    },
                    "Items": {
                        "type": "array",
                        "valueArray": [{
                            "type": "object",
                            "valueObject": {
                                "Description": { "type": "string", "valueString": "Latte" },
                                "Quantity": { "type": "number", "valueNumber": 2.0 }
                            }
                        }]
                    }
                }
            }]
        });

        let result: AnalysisResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.model_id.as_deref(), Some("prebuilt-receipt"));
        assert_eq!(result.documents.len(), 1);

        let document = &result.documents[0];
        assert_eq!(document.doc_type.as_deref(), Some("receipt.retailMeal"));

        let merchant = &document.fields["MerchantName"];
        assert_eq!(merchant.display_value().as_deref(), Some("Coffee Shop"));
        assert_eq!(merchant.confidence, Some(0.98));
        assert_eq!(merchant.bounding_regions.len(), 1);
        assert_eq!(merchant.bounding_regions[0].page_number, 1);

        let items = document.fields["Items"].as_array().unwrap();
        let first = items[0].as_object().unwrap();
        assert_eq!(first["Description"].display_value().as_deref(), Some("Latte"));
        assert_eq!(first["Quantity"].display_value().as_deref(), Some("2"));
    }

    #[test]
    fn unknown_field_types_fall_back_to_content() {
        let raw = json!({
            "type": "phoneNumber",
            "content": "+1 555 0100",
            "confidence": 0.8
        });

        let field: Field = serde_json::from_value(raw).unwrap();
        assert!(matches!(field.value, FieldValue::Unknown));
        assert!(field.is_scalar());
        assert_eq!(field.display_value().as_deref(), Some("+1 555 0100"));
    }

    #[test]
    fn missing_semantic_value_falls_back_to_content() {
        let raw = json!({
            "type": "string",
            "content": "smudged text"
        });

        let field: Field = serde_json::from_value(raw).unwrap();
        assert_eq!(field.display_value().as_deref(), Some("smudged text"));
        assert_eq!(field.confidence, None);
    }

    #[test]
    fn currency_rendering_prefers_symbol() {
        let with_symbol = CurrencyValue {
            amount: 42.5,
            currency_code: Some("USD".to_string()),
            currency_symbol: Some("$".to_string()),
        };
        assert_eq!(with_symbol.display(), "$42.5");

        let with_code = CurrencyValue {
            amount: 42.5,
            currency_code: Some("USD".to_string()),
            currency_symbol: None,
        };
        assert_eq!(with_code.display(), "42.5 USD");
    }

    #[test]
    fn result_round_trips_through_serde() {
        let document = AnalyzedDocument {
            doc_type: Some("receipt".to_string()),
            fields: BTreeMap::from([(
                "Total".to_string(),
                Field::number(12.0).with_confidence(0.9).with_region(
                    BoundingRegion::new(1, vec![0.0, 0.0, 5.0, 0.0, 5.0, 5.0]),
                ),
            )]),
            confidence: None,
        };
        let result = AnalysisResult {
            api_version: None,
            model_id: Some("prebuilt-receipt".to_string()),
            content: None,
            documents: vec![document],
        };

        let encoded = serde_json::to_value(&result).unwrap();
        assert_eq!(encoded["documents"][0]["fields"]["Total"]["type"], "number");

        let decoded: AnalysisResult = serde_json::from_value(encoded).unwrap();
        assert_eq!(
            decoded.documents[0].fields["Total"].display_value().as_deref(),
            Some("12")
        );
    }
}
