//! Lot-information extraction from the first certificate page.
//!
//! Works on the page's plain text, one labelled field per line:
//!
//! ```text
//! Purchase Order / date: 123456 / 31.01.2023
//! Delivery / date: 87654321 / 000010 / 31.05.2023
//! Customer number: 4821
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{FieldNormalization, LotFieldSpec, NOT_PARSED};

/// Keys produced by the default lot field configuration.
pub mod keys {
    /// Purchase order number
    pub const PO_NUMBER: &str = "po_number";
    /// Purchase order date
    pub const PO_DATE: &str = "po_date";
    /// Vendor order number
    pub const ORDER_NUMBER: &str = "order_number";
    /// Vendor order date
    pub const ORDER_DATE: &str = "order_date";
    /// Vendor material number
    pub const PRODUCT_NUMBER: &str = "product_number";
    /// Customer material reference
    pub const TABCODE: &str = "tabcode";
    /// Commercial product name
    pub const PRODUCT_NAME: &str = "product_name";
    /// Customer number at the vendor
    pub const CUSTOMER_NUMBER: &str = "customer_number";
    /// Delivery number, zero-padded to 16 characters
    pub const DELIVERY_NUMBER: &str = "delivery_number";
    /// Delivery date
    pub const DELIVERY_DATE: &str = "delivery_date";
    /// Overall lot judgement
    pub const JUDGEMENT: &str = "judgement";
}

/// Header-level certificate metadata, in configuration key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotInfo {
    fields: IndexMap<String, String>,
}

impl LotInfo {
    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// True when `key` holds the "not parsed" sentinel.
    pub fn is_unparsed(&self, key: &str) -> bool {
        self.get(key) == Some(NOT_PARSED)
    }

    /// Store a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Iterate `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when nothing was stored.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Purchase order number.
    pub fn po_number(&self) -> Option<&str> {
        self.get(keys::PO_NUMBER)
    }

    /// Vendor order number.
    pub fn order_number(&self) -> Option<&str> {
        self.get(keys::ORDER_NUMBER)
    }

    /// Vendor order date.
    pub fn order_date(&self) -> Option<&str> {
        self.get(keys::ORDER_DATE)
    }

    /// Customer number.
    pub fn customer_number(&self) -> Option<&str> {
        self.get(keys::CUSTOMER_NUMBER)
    }

    /// Normalized delivery number.
    pub fn delivery_number(&self) -> Option<&str> {
        self.get(keys::DELIVERY_NUMBER)
    }

    /// Commercial product name.
    pub fn product_name(&self) -> Option<&str> {
        self.get(keys::PRODUCT_NAME)
    }

    /// Lot judgement.
    pub fn judgement(&self) -> Option<&str> {
        self.get(keys::JUDGEMENT)
    }
}

/// Result of one lot-info pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LotInfoExtraction {
    /// Extracted fields
    pub lot_info: LotInfo,
    /// Labels that were not found on the page, in configuration order
    pub unparsed_labels: Vec<String>,
}

impl LotInfoExtraction {
    /// Number of labels that were not found.
    pub fn unparsed_count(&self) -> usize {
        self.unparsed_labels.len()
    }
}

/// Remove `" / "` separators and left-pad with zeros.
///
/// # Examples
///
/// ```
/// use cert_oxide::lot_info::zero_padded;
///
/// assert_eq!(zero_padded("87654321 / 000010", 16), "0087654321000010");
/// ```
pub fn zero_padded(value: &str, width: usize) -> String {
    let compact = value.replace(" / ", "");
    format!("{:0>width$}", compact, width = width)
}

fn normalize(value: &str, normalization: FieldNormalization) -> String {
    match normalization {
        FieldNormalization::ZeroPadded { width } => zero_padded(value, width),
    }
}

/// Find the raw value of every field, scanning lines from the bottom up.
///
/// Each line is attributed to the first field (in configuration order) whose
/// label it contains. The first attribution per field wins.
fn labelled_values(text: &str, fields: &[LotFieldSpec]) -> Vec<Option<String>> {
    let mut values: Vec<Option<String>> = vec![None; fields.len()];
    for line in text.split('\n').rev() {
        let Some(index) = fields.iter().position(|f| line.contains(f.label.as_str())) else {
            continue;
        };
        if values[index].is_some() {
            continue;
        }
        let value = line
            .replace(fields[index].label.as_str(), "")
            .replace(['\n', '\r'], "")
            .trim()
            .to_string();
        values[index] = Some(value);
    }
    values
}

/// Extract lot information from the plain text of the first page.
pub fn extract_lot_info(text: &str, fields: &[LotFieldSpec]) -> LotInfoExtraction {
    let mut extraction = LotInfoExtraction::default();

    for (spec, value) in fields.iter().zip(labelled_values(text, fields)) {
        let Some(value) = value else {
            log::warn!("Lot field '{}' not found on first page", spec.label.trim());
            for key in &spec.keys {
                extraction.lot_info.insert(key.as_str(), NOT_PARSED);
            }
            extraction.unparsed_labels.push(spec.label.clone());
            continue;
        };

        // split on the last separator(s)
        let mut parts: Vec<&str> = value.rsplitn(spec.keys.len().max(1), '/').collect();
        parts.reverse();
        if parts.len() < spec.keys.len() {
            log::debug!(
                "Lot field '{}' has {} of {} parts: '{}'",
                spec.label.trim(),
                parts.len(),
                spec.keys.len(),
                value
            );
        }
        for (position, (key, part)) in spec.keys.iter().zip(parts).enumerate() {
            let part = part.trim();
            let stored = match spec.normalize {
                Some(normalization) if position == 0 => normalize(part, normalization),
                _ => part.to_string(),
            };
            extraction.lot_info.insert(key.as_str(), stored);
        }
    }

    log::debug!(
        "Lot info: {} keys, {} labels not parsed",
        extraction.lot_info.len(),
        extraction.unparsed_count()
    );
    extraction
}
