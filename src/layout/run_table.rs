//! Coordinate table of text runs for one page.
//!
//! Converts the raw fragment stream into positioned [`TextRun`]s. Emission
//! order is preserved; visual order is recovered later by the segmentation
//! engine.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extractors::{FontDescriptor, FragmentSource, TextFragment};
use crate::geometry::{within_tolerance, Point};

/// One glyph-drawing operation with its derived position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// Drawn text
    pub text: String,
    /// Translation of the text matrix
    pub position: Point,
    /// Translation of the content matrix
    pub content_position: Point,
    /// Font metadata
    pub font: FontDescriptor,
    /// Font size
    pub font_size: f64,
    /// Index of the fragment in the raw emission stream
    pub sequence_index: usize,
}

impl TextRun {
    /// Build a run from a fragment and its stream index.
    pub fn from_fragment(fragment: TextFragment, sequence_index: usize) -> Self {
        Self {
            position: fragment.text_matrix.translation(),
            content_position: fragment.content_matrix.translation(),
            text: fragment.text,
            font: fragment.font,
            font_size: fragment.font_size,
            sequence_index,
        }
    }

    /// True when the run's text contains `label`.
    pub fn contains(&self, label: &str) -> bool {
        self.text.contains(label)
    }

    /// True when the run's trimmed text equals `label`.
    pub fn is_label(&self, label: &str) -> bool {
        self.text.trim() == label.trim()
    }
}

/// Fragments consisting only of a line break carry no position.
fn is_line_break(text: &str) -> bool {
    matches!(text, "\n" | "\r" | "\r\n")
}

/// Text runs of one page in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRunTable {
    runs: Vec<TextRun>,
}

impl PageRunTable {
    /// Build the table from a fragment stream, dropping line-break markers.
    ///
    /// # Examples
    ///
    /// ```
    /// use cert_oxide::extractors::TextFragment;
    /// use cert_oxide::layout::PageRunTable;
    ///
    /// let table = PageRunTable::from_fragments(vec![
    ///     TextFragment::at("Characteristic", 45.355, 595.252),
    ///     TextFragment::at("\n", 0.0, 0.0),
    ///     TextFragment::at("Value", 371.339, 595.252),
    /// ]);
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.runs()[1].sequence_index, 2);
    /// ```
    pub fn from_fragments<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = TextFragment>,
    {
        let runs = fragments
            .into_iter()
            .enumerate()
            .filter(|(_, fragment)| !is_line_break(&fragment.text))
            .map(|(index, fragment)| TextRun::from_fragment(fragment, index))
            .collect();
        Self { runs }
    }

    /// Build the table for one page of a [`FragmentSource`].
    pub fn from_source<S: FragmentSource + ?Sized>(source: &S, page_index: usize) -> Result<Self> {
        let mut fragments = Vec::new();
        source.visit_page(page_index, &mut |fragment| fragments.push(fragment))?;
        let table = Self::from_fragments(fragments);
        log::debug!("Page {}: {} text runs", page_index, table.len());
        Ok(table)
    }

    /// Runs in emission order.
    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// True when the page drew no text.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Runs whose text contains `label`, in emission order.
    pub fn anchors<'a>(
        &'a self,
        label: &'a str,
    ) -> impl Iterator<Item = (usize, &'a TextRun)> + 'a {
        self.runs
            .iter()
            .enumerate()
            .filter(move |(_, run)| run.contains(label))
    }

    /// Runs printed on the same line as the run at `index` (its y within
    /// `tolerance`), left to right. `None` when `index` is out of range.
    pub fn row_at(&self, index: usize, tolerance: f64) -> Option<Vec<&TextRun>> {
        let origin = self.runs.get(index)?;
        let mut row: Vec<&TextRun> = self
            .runs
            .iter()
            .filter(|run| within_tolerance(run.position.y, origin.position.y, tolerance))
            .collect();
        row.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
        Some(row)
    }
}
