//! Block and row segmentation.
//!
//! Recovers which runs belong to the same lot block (opened by a
//! date-of-manufacture anchor) and the same test group (opened by a
//! "Characteristic" header) using two techniques:
//!
//! - **Anchor propagation**: every anchor stamps its y-coordinate on the runs
//!   printed on its line; the remaining runs inherit the closest preceding
//!   stamp in emission order.
//! - **Gap segmentation**: after sorting top-to-bottom, a jump larger than the
//!   tolerance between consecutive values starts a new group id.
//!
//! ```text
//! Date of Manufacturing (DOM): 20230101         block_y = 700.0
//! Characteristic        Unit   Value   Lower    group_y = 595.2, test_group 1
//! Total thickness       µm     50      0        group_y = 595.2, test_group 1
//! Characteristic        Unit   Value   Lower    group_y = 554.9, test_group 2
//! Peel adhesion         N/cm   6.00    2.00     group_y = 554.9, test_group 2
//! ```

use std::collections::HashMap;

use super::columns::ColumnFlags;
use super::run_table::{PageRunTable, TextRun};
use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::geometry::within_tolerance;
use crate::layout::Column;

/// Reference to the anchor run controlling a propagated column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// Index of the anchor run in the page table (emission order)
    pub index: usize,
    /// The anchor's y-coordinate
    pub y: f64,
}

/// Propagate the y-coordinate of every run containing `label`.
///
/// Returns one entry per run of `table`, in emission order. Runs that precede
/// every anchor (page headers, lot header lines) stay `None`.
pub fn propagate_anchor(table: &PageRunTable, label: &str, tolerance: f64) -> Vec<Option<Anchor>> {
    let runs = table.runs();
    let mut assigned: Vec<Option<Anchor>> = vec![None; runs.len()];

    for (index, anchor_run) in table.anchors(label) {
        let anchor = Anchor {
            index,
            y: anchor_run.position.y,
        };
        for (slot, run) in assigned.iter_mut().zip(runs) {
            if within_tolerance(run.position.y, anchor.y, tolerance) {
                *slot = Some(anchor);
            }
        }
    }

    // forward fill in emission order
    let mut last = None;
    for slot in assigned.iter_mut() {
        match slot {
            Some(anchor) => last = Some(*anchor),
            None => *slot = last,
        }
    }
    assigned
}

/// Assign monotonic group ids to a sequence of values.
///
/// A new id starts whenever two consecutive values differ by more than
/// `tolerance`, or when one of them is unset and the other is not.
///
/// # Examples
///
/// ```
/// use cert_oxide::layout::segmentation::gap_segment;
///
/// let ids = gap_segment([Some(600.0), Some(599.4), Some(584.0), None], 1.0);
/// assert_eq!(ids, vec![0, 0, 1, 2]);
/// ```
pub fn gap_segment<I>(values: I, tolerance: f64) -> Vec<usize>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut ids = Vec::new();
    let mut current = 0;
    let mut previous: Option<Option<f64>> = None;

    for value in values {
        if let Some(prev) = previous {
            let breaks = match (prev, value) {
                (Some(a), Some(b)) => !within_tolerance(a, b, tolerance),
                (None, None) => false,
                _ => true,
            };
            if breaks {
                current += 1;
            }
        }
        ids.push(current);
        previous = Some(value);
    }
    ids
}

/// A lot block opened by a date-of-manufacture anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct LotBlock {
    /// Index of the anchor run in the page table
    pub anchor_index: usize,
    /// y-coordinate of the anchor
    pub y: f64,
    /// Date of manufacture printed with the anchor; may be empty
    pub date_of_manufacture: String,
}

/// A text run with its derived layout coordinates.
#[derive(Debug, Clone)]
pub struct AnnotatedRun<'a> {
    /// The underlying run
    pub run: &'a TextRun,
    /// Index into [`SegmentedPage::blocks`], if the run follows a DOM anchor
    pub block: Option<usize>,
    /// y-coordinate of the controlling DOM anchor
    pub block_y: Option<f64>,
    /// y-coordinate of the controlling "Characteristic" anchor
    pub group_y: Option<f64>,
    /// Printed line id (top-to-bottom)
    pub row_group: usize,
    /// Test-result group id (top-to-bottom)
    pub test_group: usize,
    /// Columns whose header this run is aligned with
    pub columns: ColumnFlags,
}

/// A page annotated with blocks, rows and test groups, sorted top-to-bottom.
#[derive(Debug, Clone)]
pub struct SegmentedPage<'a> {
    rows: Vec<AnnotatedRun<'a>>,
    blocks: Vec<LotBlock>,
}

impl<'a> SegmentedPage<'a> {
    /// Annotated runs, top-to-bottom; ties keep emission order.
    pub fn rows(&self) -> &[AnnotatedRun<'a>] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [AnnotatedRun<'a>] {
        &mut self.rows
    }

    /// Lot blocks in emission order of their anchors.
    pub fn blocks(&self) -> &[LotBlock] {
        &self.blocks
    }

    /// Date of manufacture of the block a row belongs to, or `""`.
    pub fn date_of_manufacture(&self, row: &AnnotatedRun<'_>) -> &str {
        row.block
            .and_then(|b| self.blocks.get(b))
            .map(|b| b.date_of_manufacture.as_str())
            .unwrap_or("")
    }

    /// Number of distinct printed lines.
    pub fn row_count(&self) -> usize {
        self.rows.last().map(|r| r.row_group + 1).unwrap_or(0)
    }
}

/// Extract the value printed with a DOM anchor.
///
/// The value normally shares the anchor's run; otherwise the nearest run to
/// the right on the same line is used.
fn block_date(table: &PageRunTable, anchor_index: usize, label: &str, tolerance: f64) -> String {
    let runs = table.runs();
    let anchor = &runs[anchor_index];
    let inline = anchor.text.replace(label, "").trim().to_string();
    if !inline.is_empty() {
        return inline;
    }

    table
        .row_at(anchor_index, tolerance)
        .into_iter()
        .flatten()
        .find(|run| run.position.x > anchor.position.x && !run.text.trim().is_empty())
        .map(|run| run.text.trim().to_string())
        .unwrap_or_default()
}

/// Segment a page into lot blocks, printed rows and test groups.
///
/// Fails with [`Error::LayoutNotRecognized`] if the page has no
/// "Characteristic" anchor.
pub fn segment<'a>(table: &'a PageRunTable, config: &ParserConfig) -> Result<SegmentedPage<'a>> {
    let characteristic = config.columns.label(Column::Characteristic);
    if table.anchors(characteristic).next().is_none() {
        return Err(Error::layout_not_recognized(characteristic));
    }

    let tolerance = config.y_tolerance;
    let block_anchors = propagate_anchor(table, &config.dom_label, tolerance);
    let group_anchors = propagate_anchor(table, characteristic, tolerance);

    let mut blocks = Vec::new();
    let mut block_of_anchor = HashMap::new();
    for (index, run) in table.anchors(&config.dom_label) {
        block_of_anchor.insert(index, blocks.len());
        blocks.push(LotBlock {
            anchor_index: index,
            y: run.position.y,
            date_of_manufacture: block_date(table, index, &config.dom_label, tolerance),
        });
    }
    if blocks.is_empty() {
        log::debug!("No '{}' anchor on page, results cannot be scoped to a lot", config.dom_label);
    }

    let mut rows: Vec<AnnotatedRun<'a>> = table
        .runs()
        .iter()
        .zip(block_anchors.iter().zip(&group_anchors))
        .map(|(run, (block_anchor, group_anchor))| AnnotatedRun {
            run,
            block: block_anchor.and_then(|a| block_of_anchor.get(&a.index).copied()),
            block_y: block_anchor.map(|a| a.y),
            group_y: group_anchor.map(|a| a.y),
            row_group: 0,
            test_group: 0,
            columns: ColumnFlags::empty(),
        })
        .collect();

    // stable: runs on the same y keep emission order
    rows.sort_by(|a, b| b.run.position.y.total_cmp(&a.run.position.y));

    let row_ids = gap_segment(rows.iter().map(|r| Some(r.run.position.y)), tolerance);
    let group_ids = gap_segment(rows.iter().map(|r| r.group_y), tolerance);
    for ((row, row_id), group_id) in rows.iter_mut().zip(row_ids).zip(group_ids) {
        row.row_group = row_id;
        row.test_group = group_id;
    }

    let page = SegmentedPage { rows, blocks };
    log::debug!(
        "Segmented {} runs into {} lines, {} lot blocks",
        page.rows.len(),
        page.row_count(),
        page.blocks.len()
    );
    Ok(page)
}
