//! Result record assembly.
//!
//! Turns a segmented, column-flagged page into one [`ResultRecord`] per
//! (lot block, test group).

use serde::{Deserialize, Serialize};

use super::columns::Column;
use super::segmentation::{AnnotatedRun, SegmentedPage};
use crate::config::ColumnLabels;

/// One printed test result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Date of manufacture of the lot block
    pub date_of_manufacture: String,
    /// Test name
    pub characteristic: String,
    /// Unit of measure
    pub unit: String,
    /// Measured value
    pub value: String,
    /// Lower limit, empty when the test defines none
    pub lower_limit: String,
    /// Upper limit, empty when the test defines none
    pub upper_limit: String,
}

impl ResultRecord {
    /// Field for a column.
    pub fn field(&self, column: Column) -> &str {
        match column {
            Column::Characteristic => &self.characteristic,
            Column::Unit => &self.unit,
            Column::Value => &self.value,
            Column::LowerLimit => &self.lower_limit,
            Column::UpperLimit => &self.upper_limit,
        }
    }

    fn field_mut(&mut self, column: Column) -> &mut String {
        match column {
            Column::Characteristic => &mut self.characteristic,
            Column::Unit => &mut self.unit,
            Column::Value => &mut self.value,
            Column::LowerLimit => &mut self.lower_limit,
            Column::UpperLimit => &mut self.upper_limit,
        }
    }
}

/// More than one run matched a column within one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousMatch {
    /// Date of manufacture of the group
    pub date_of_manufacture: String,
    /// Test group id on the page
    pub test_group: usize,
    /// Affected column
    pub column: Column,
    /// Candidate texts in emission order; the first was kept
    pub candidates: Vec<String>,
}

/// Records of one page plus the ambiguities found while building them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledPage {
    /// Records top-to-bottom
    pub records: Vec<ResultRecord>,
    /// Columns resolved by first-match tie-breaking
    pub ambiguities: Vec<AmbiguousMatch>,
}

struct Group<'p, 'a> {
    date: &'p str,
    test_group: usize,
    rows: Vec<&'p AnnotatedRun<'a>>,
}

/// Build result records from a page whose columns have been resolved.
///
/// Only rows inside a dated lot block and below a "Characteristic" header
/// take part. Groups without a header run of their own are skipped.
pub fn assemble_records(page: &SegmentedPage<'_>, labels: &ColumnLabels) -> AssembledPage {
    let mut groups: Vec<Group<'_, '_>> = Vec::new();
    for row in page.rows() {
        let date = page.date_of_manufacture(row);
        if date.is_empty() || row.run.text.is_empty() || row.group_y.is_none() {
            continue;
        }
        match groups
            .iter_mut()
            .find(|g| g.date == date && g.test_group == row.test_group)
        {
            Some(group) => group.rows.push(row),
            None => groups.push(Group {
                date,
                test_group: row.test_group,
                rows: vec![row],
            }),
        }
    }

    let header_label = labels.label(Column::Characteristic);
    let mut assembled = AssembledPage::default();
    for group in groups {
        if !group.rows.iter().any(|row| row.run.contains(header_label)) {
            log::debug!(
                "Skipping rows of lot {} without a '{}' header",
                group.date,
                header_label
            );
            continue;
        }

        let mut record = ResultRecord {
            date_of_manufacture: group.date.to_string(),
            ..ResultRecord::default()
        };
        for column in Column::ALL {
            let label = labels.label(column);
            let mut candidates: Vec<&AnnotatedRun<'_>> = group
                .rows
                .iter()
                .copied()
                .filter(|row| row.columns.contains(column.flag()) && !row.run.is_label(label))
                .collect();
            candidates.sort_by_key(|row| row.run.sequence_index);

            match candidates.as_slice() {
                [] => log::debug!(
                    "No {} for lot {} test group {}",
                    column,
                    group.date,
                    group.test_group
                ),
                [only] => *record.field_mut(column) = only.run.text.clone(),
                [first, ..] => {
                    let texts: Vec<String> =
                        candidates.iter().map(|r| r.run.text.clone()).collect();
                    log::warn!(
                        "Ambiguous {} for lot {} test group {}: {:?}, keeping '{}'",
                        column,
                        group.date,
                        group.test_group,
                        texts,
                        first.run.text
                    );
                    *record.field_mut(column) = first.run.text.clone();
                    assembled.ambiguities.push(AmbiguousMatch {
                        date_of_manufacture: group.date.to_string(),
                        test_group: group.test_group,
                        column,
                        candidates: texts,
                    });
                },
            }
        }
        assembled.records.push(record);
    }
    assembled
}
