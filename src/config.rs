//! Configuration for certificate parsing.
//!
//! Every value has a default tuned for the vendor test-report template.
//! Tolerances are in PDF user-space units. A JSON file may override any
//! subset of fields:
//!
//! ```json
//! { "y_tolerance": 1.5, "columns": { "upper_limit": "Max" } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::Column;
use crate::lot_info::keys;

/// Default alignment tolerance for both axes.
pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// Label that opens a lot block on result pages.
pub const DEFAULT_DOM_LABEL: &str = "Date of Manufacturing (DOM):";

/// Value stored for lot fields whose label was not found.
pub const NOT_PARSED: &str = "not parsed";

/// Header labels of the five result columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLabels {
    /// Test name column; also the anchor that opens a test group
    pub characteristic: String,
    /// Unit column
    pub unit: String,
    /// Measured value column
    pub value: String,
    /// Lower limit column
    pub lower_limit: String,
    /// Upper limit column
    pub upper_limit: String,
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            characteristic: "Characteristic".to_string(),
            unit: "Unit".to_string(),
            value: "Value".to_string(),
            lower_limit: "Lower Limit".to_string(),
            upper_limit: "Upper Limit".to_string(),
        }
    }
}

impl ColumnLabels {
    /// Header label for a column.
    pub fn label(&self, column: Column) -> &str {
        match column {
            Column::Characteristic => &self.characteristic,
            Column::Unit => &self.unit,
            Column::Value => &self.value,
            Column::LowerLimit => &self.lower_limit,
            Column::UpperLimit => &self.upper_limit,
        }
    }

    fn label_mut(&mut self, column: Column) -> &mut String {
        match column {
            Column::Characteristic => &mut self.characteristic,
            Column::Unit => &mut self.unit,
            Column::Value => &mut self.value,
            Column::LowerLimit => &mut self.lower_limit,
            Column::UpperLimit => &mut self.upper_limit,
        }
    }
}

/// Post-processing applied to the first key of a lot field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldNormalization {
    /// Remove `" / "` separators, then left-pad with zeros to `width` characters
    ZeroPadded {
        /// Target width
        width: usize,
    },
}

/// One labelled line on the lot-information page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotFieldSpec {
    /// Label text searched for in each line
    pub label: String,
    /// Output keys. Two keys split the value on its last `/`.
    pub keys: Vec<String>,
    /// Optional normalization of the first key's value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize: Option<FieldNormalization>,
}

impl LotFieldSpec {
    /// A field stored whole under one key.
    pub fn single(label: &str, key: &str) -> Self {
        Self {
            label: label.to_string(),
            keys: vec![key.to_string()],
            normalize: None,
        }
    }

    /// A combined field split on its last `/` into two keys.
    pub fn split(label: &str, first: &str, second: &str) -> Self {
        Self {
            label: label.to_string(),
            keys: vec![first.to_string(), second.to_string()],
            normalize: None,
        }
    }

    /// Attach a normalization.
    pub fn normalized(mut self, normalization: FieldNormalization) -> Self {
        self.normalize = Some(normalization);
        self
    }
}

/// Lot-information fields of the vendor template, in matching priority.
///
/// "Purchase Order / date:" must precede "Order / date: " because every
/// purchase-order line also contains the shorter label.
pub fn default_lot_fields() -> Vec<LotFieldSpec> {
    vec![
        LotFieldSpec::split("Purchase Order / date:", keys::PO_NUMBER, keys::PO_DATE),
        LotFieldSpec::split("Delivery / date:", keys::DELIVERY_NUMBER, keys::DELIVERY_DATE)
            .normalized(FieldNormalization::ZeroPadded { width: 16 }),
        LotFieldSpec::split("Order / date: ", keys::ORDER_NUMBER, keys::ORDER_DATE),
        LotFieldSpec::single("Customer number:", keys::CUSTOMER_NUMBER),
        LotFieldSpec::split(
            "Material our / your reference:",
            keys::PRODUCT_NUMBER,
            keys::TABCODE,
        ),
        LotFieldSpec::single("Commercial Name:", keys::PRODUCT_NAME),
        LotFieldSpec::single("Judgement :", keys::JUDGEMENT),
    ]
}

/// Certificate parsing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum horizontal distance between a run and its column header
    pub x_tolerance: f64,

    /// Maximum vertical distance between runs printed on the same line
    pub y_tolerance: f64,

    /// Label of the date-of-manufacture anchor that opens a lot block
    pub dom_label: String,

    /// Result column header labels
    pub columns: ColumnLabels,

    /// Lot-information fields read from the first page
    pub lot_fields: Vec<LotFieldSpec>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            x_tolerance: DEFAULT_TOLERANCE,
            y_tolerance: DEFAULT_TOLERANCE,
            dom_label: DEFAULT_DOM_LABEL.to_string(),
            columns: ColumnLabels::default(),
            lot_fields: default_lot_fields(),
        }
    }

    /// Load configuration from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Set the horizontal tolerance.
    pub fn with_x_tolerance(mut self, tolerance: f64) -> Self {
        self.x_tolerance = tolerance;
        self
    }

    /// Set the vertical tolerance.
    pub fn with_y_tolerance(mut self, tolerance: f64) -> Self {
        self.y_tolerance = tolerance;
        self
    }

    /// Set both tolerances.
    pub fn with_tolerance(self, tolerance: f64) -> Self {
        self.with_x_tolerance(tolerance).with_y_tolerance(tolerance)
    }

    /// Set the date-of-manufacture anchor label.
    pub fn with_dom_label(mut self, label: impl Into<String>) -> Self {
        self.dom_label = label.into();
        self
    }

    /// Override one column header label.
    pub fn with_column_label(mut self, column: Column, label: impl Into<String>) -> Self {
        *self.columns.label_mut(column) = label.into();
        self
    }

    /// Replace the lot-information field list.
    pub fn with_lot_fields(mut self, fields: Vec<LotFieldSpec>) -> Self {
        self.lot_fields = fields;
        self
    }
}
