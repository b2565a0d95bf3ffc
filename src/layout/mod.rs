//! Layout reconstruction for certificate result pages.
//!
//! This module rebuilds the test-result table from positioned text runs:
//! - Coordinate table building (fragments → runs)
//! - Block and row segmentation (anchor propagation, gap segmentation)
//! - Column resolution by header alignment
//! - Result record assembly

pub mod columns;
pub mod records;
pub mod run_table;
pub mod segmentation;

// Re-export main types
pub use columns::{resolve_columns, Column, ColumnFlags, ColumnHeader};
pub use records::{assemble_records, AmbiguousMatch, AssembledPage, ResultRecord};
pub use run_table::{PageRunTable, TextRun};
pub use segmentation::{
    gap_segment, propagate_anchor, segment, Anchor, AnnotatedRun, LotBlock, SegmentedPage,
};

use crate::config::ParserConfig;
use crate::error::Result;

/// Run segmentation, column resolution and record assembly on one page.
pub fn extract_page_records(table: &PageRunTable, config: &ParserConfig) -> Result<AssembledPage> {
    let mut page = segment(table, config)?;
    resolve_columns(&mut page, &config.columns, config.x_tolerance)?;
    Ok(assemble_records(&page, &config.columns))
}
