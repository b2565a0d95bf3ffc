//! Column resolution by horizontal alignment.
//!
//! Each result column is identified by its header run. Every run whose x lies
//! within the tolerance of a header's x is flagged for that column. A run can
//! end up flagged for more than one column when headers sit close together;
//! that ambiguity is left to the record assembler.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::segmentation::SegmentedPage;
use crate::config::ColumnLabels;
use crate::error::{Error, Result};
use crate::geometry::within_tolerance;

/// The five result columns of a certificate test table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    /// Test name
    Characteristic,
    /// Unit of measure
    Unit,
    /// Measured value
    Value,
    /// Lower specification limit
    LowerLimit,
    /// Upper specification limit
    UpperLimit,
}

impl Column {
    /// All columns in printed order.
    pub const ALL: [Column; 5] = [
        Column::Characteristic,
        Column::Unit,
        Column::Value,
        Column::LowerLimit,
        Column::UpperLimit,
    ];

    /// The flag bit for this column.
    pub fn flag(self) -> ColumnFlags {
        match self {
            Column::Characteristic => ColumnFlags::CHARACTERISTIC,
            Column::Unit => ColumnFlags::UNIT,
            Column::Value => ColumnFlags::VALUE,
            Column::LowerLimit => ColumnFlags::LOWER_LIMIT,
            Column::UpperLimit => ColumnFlags::UPPER_LIMIT,
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Column::Characteristic => "characteristic",
            Column::Unit => "unit",
            Column::Value => "value",
            Column::LowerLimit => "lower_limit",
            Column::UpperLimit => "upper_limit",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Columns a run is horizontally aligned with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ColumnFlags: u8 {
        /// Aligned with the Characteristic header
        const CHARACTERISTIC = 0b0000_0001;
        /// Aligned with the Unit header
        const UNIT = 0b0000_0010;
        /// Aligned with the Value header
        const VALUE = 0b0000_0100;
        /// Aligned with the Lower Limit header
        const LOWER_LIMIT = 0b0000_1000;
        /// Aligned with the Upper Limit header
        const UPPER_LIMIT = 0b0001_0000;
    }
}

/// Resolved header position of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnHeader {
    /// The column
    pub column: Column,
    /// x-coordinate of the topmost header run
    pub x: f64,
}

/// Find the x-coordinate of a column header on a segmented page.
///
/// Prefers the topmost run whose text is exactly the label, then the topmost
/// run containing it.
fn locate_header(page: &SegmentedPage<'_>, label: &str) -> Option<f64> {
    let rows = page.rows();
    rows.iter()
        .find(|row| row.run.is_label(label))
        .or_else(|| rows.iter().find(|row| row.run.contains(label)))
        .map(|row| row.run.position.x)
}

/// Flag every run of `page` with the columns it is aligned with.
///
/// The Characteristic header is required; a missing secondary header leaves
/// its column empty. Returns the headers that were found.
pub fn resolve_columns(
    page: &mut SegmentedPage<'_>,
    labels: &ColumnLabels,
    tolerance: f64,
) -> Result<Vec<ColumnHeader>> {
    let mut headers = Vec::with_capacity(Column::ALL.len());
    for column in Column::ALL {
        let label = labels.label(column);
        match locate_header(page, label) {
            Some(x) => headers.push(ColumnHeader { column, x }),
            None if column == Column::Characteristic => {
                return Err(Error::layout_not_recognized(label));
            },
            None => log::debug!("Column header '{}' not found, {} left empty", label, column),
        }
    }

    let mut overlapping = 0usize;
    for row in page.rows_mut() {
        for header in &headers {
            if within_tolerance(row.run.position.x, header.x, tolerance) {
                row.columns |= header.column.flag();
            }
        }
        if row.columns.bits().count_ones() > 1 {
            overlapping += 1;
        }
    }
    if overlapping > 0 {
        log::debug!("{} runs aligned with more than one column header", overlapping);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::extractors::TextFragment;
    use crate::layout::segmentation::segment;
    use crate::layout::PageRunTable;

    fn header_table(extra: &[(&str, f64, f64)]) -> PageRunTable {
        let mut items = vec![
            ("Characteristic", 45.355, 595.252),
            ("Unit", 300.0, 595.252),
            ("Value", 371.339, 595.252),
            ("Lower Limit", 428.032, 595.252),
            ("Upper Limit", 490.0, 595.252),
        ];
        items.extend_from_slice(extra);
        PageRunTable::from_fragments(
            items
                .into_iter()
                .map(|(text, x, y)| TextFragment::at(text, x, y))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_flags_follow_header_x() {
        let table = header_table(&[
            ("Total thickness", 45.9, 584.0),
            ("µm", 299.2, 584.0),
            ("50", 371.339, 584.0),
            ("0", 429.0, 584.0),
            ("100", 490.5, 584.0),
            ("remark", 250.0, 584.0),
        ]);
        let config = ParserConfig::default();
        let mut page = segment(&table, &config).unwrap();
        let headers = resolve_columns(&mut page, &config.columns, config.x_tolerance).unwrap();
        assert_eq!(headers.len(), 5);

        let flags_of = |text: &str| {
            page.rows()
                .iter()
                .find(|r| r.run.text == text)
                .map(|r| r.columns)
                .unwrap()
        };
        assert_eq!(flags_of("Total thickness"), ColumnFlags::CHARACTERISTIC);
        assert_eq!(flags_of("µm"), ColumnFlags::UNIT);
        assert_eq!(flags_of("50"), ColumnFlags::VALUE);
        assert_eq!(flags_of("0"), ColumnFlags::LOWER_LIMIT);
        assert_eq!(flags_of("100"), ColumnFlags::UPPER_LIMIT);
        assert_eq!(flags_of("remark"), ColumnFlags::empty());
    }

    #[test]
    fn test_close_headers_flag_both_columns() {
        let table = header_table(&[("shared", 429.0, 584.0)]);
        let config = ParserConfig::default().with_x_tolerance(100.0);
        let mut page = segment(&table, &config).unwrap();
        resolve_columns(&mut page, &config.columns, config.x_tolerance).unwrap();
        let shared = page.rows().iter().find(|r| r.run.text == "shared").unwrap();
        assert!(shared.columns.contains(ColumnFlags::VALUE | ColumnFlags::LOWER_LIMIT));
    }

    #[test]
    fn test_missing_secondary_header_is_tolerated() {
        let table = PageRunTable::from_fragments(vec![
            TextFragment::at("Characteristic", 45.0, 595.0),
            TextFragment::at("Value", 371.0, 595.0),
        ]);
        let config = ParserConfig::default();
        let mut page = segment(&table, &config).unwrap();
        let headers = resolve_columns(&mut page, &config.columns, 1.0).unwrap();
        let columns: Vec<Column> = headers.iter().map(|h| h.column).collect();
        assert_eq!(columns, vec![Column::Characteristic, Column::Value]);
    }

    #[test]
    fn test_exact_header_preferred_over_substring() {
        let table = header_table(&[("Value added", 100.0, 700.0)]);
        let config = ParserConfig::default();
        let mut page = segment(&table, &config).unwrap();
        let headers = resolve_columns(&mut page, &config.columns, 1.0).unwrap();
        let value = headers.iter().find(|h| h.column == Column::Value).unwrap();
        assert_eq!(value.x, 371.339);
    }

    #[test]
    fn test_column_display_and_flags() {
        assert_eq!(Column::LowerLimit.to_string(), "lower_limit");
        assert_eq!(Column::ALL.len(), 5);
        let all = Column::ALL
            .iter()
            .fold(ColumnFlags::empty(), |acc, c| acc | c.flag());
        assert_eq!(all, ColumnFlags::all());
    }
}
