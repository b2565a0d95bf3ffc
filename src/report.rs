//! Report aggregation.
//!
//! Combines the lot information of the first page with the result records of
//! every following page. A page that cannot be reconstructed contributes no
//! records and a diagnostic; it never aborts the document.
//!
//! # Usage
//!
//! ```
//! use cert_oxide::extractors::{MemoryDocument, MemoryPage, TextFragment};
//! use cert_oxide::report::ReportParser;
//!
//! let doc = MemoryDocument::new(vec![
//!     MemoryPage::from_text("Customer number: 4821"),
//!     MemoryPage::from_fragments(vec![TextFragment::at("no table here", 45.0, 600.0)]),
//! ]);
//!
//! let parsed = ReportParser::new().parse(&doc);
//! assert_eq!(parsed.report.lot_info.customer_number(), Some("4821"));
//! assert!(parsed.report.results.is_empty());
//! assert_eq!(parsed.diagnostics.failed_pages(), vec![1]);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::ParserConfig;
use crate::error::Result;
use crate::extractors::FragmentSource;
use crate::layout::{
    extract_page_records, AmbiguousMatch, AssembledPage, PageRunTable, ResultRecord,
};
use crate::lot_info::{extract_lot_info, LotInfo};

/// Lot information and all result records of one certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportData {
    /// Header fields from the first page
    pub lot_info: LotInfo,
    /// Result records in document order, never deduplicated
    pub results: Vec<ResultRecord>,
}

impl ReportData {
    /// Records grouped by date of manufacture, in order of first appearance.
    pub fn results_by_lot(&self) -> IndexMap<&str, Vec<&ResultRecord>> {
        let mut lots: IndexMap<&str, Vec<&ResultRecord>> = IndexMap::new();
        for record in &self.results {
            lots.entry(record.date_of_manufacture.as_str())
                .or_default()
                .push(record);
        }
        lots
    }
}

/// A non-fatal finding made while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A lot-info label was not found on the first page
    FieldNotParsed {
        /// Label that was searched for
        label: String,
    },
    /// Several runs matched one column of one result group
    AmbiguousColumnMatch {
        /// Page index
        page: usize,
        /// Details of the match
        detail: AmbiguousMatch,
    },
    /// A page produced no records because it could not be reconstructed
    PageFailed {
        /// Page index
        page: usize,
        /// Error message
        error: String,
    },
}

/// Per-call diagnostic accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Number of lot-info labels that were not found
    pub unparsed_count: usize,
    /// Findings in the order they were made
    pub entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// True when nothing noteworthy happened.
    pub fn is_clean(&self) -> bool {
        self.unparsed_count == 0 && self.entries.is_empty()
    }

    /// Indices of pages that failed.
    pub fn failed_pages(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Diagnostic::PageFailed { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }

    /// Number of ambiguous column matches.
    pub fn ambiguous_match_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Diagnostic::AmbiguousColumnMatch { .. }))
            .count()
    }
}

/// The outcome of parsing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReport {
    /// Extracted data
    pub report: ReportData,
    /// Findings made while extracting it
    pub diagnostics: Diagnostics,
}

/// Certificate parser.
///
/// Holds only configuration, so one parser can be shared across threads and
/// documents.
#[derive(Debug, Clone, Default)]
pub struct ReportParser {
    config: ParserConfig,
}

impl ReportParser {
    /// Create a parser with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with a custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Reconstruct the result records of one result page.
    pub fn parse_page<S>(&self, source: &S, page_index: usize) -> Result<AssembledPage>
    where
        S: FragmentSource + ?Sized,
    {
        let table = PageRunTable::from_source(source, page_index)?;
        extract_page_records(&table, &self.config)
    }

    /// Parse a whole certificate.
    ///
    /// Page 0 supplies the lot information; every other page is reconstructed
    /// independently and its records appended in page order.
    pub fn parse<S>(&self, source: &S) -> ParsedReport
    where
        S: FragmentSource + ?Sized,
    {
        let mut parsed = ParsedReport::default();
        let page_count = source.page_count();
        log::info!("Parsing certificate with {} pages", page_count);

        self.parse_lot_page(source, &mut parsed);

        for page_index in 1..page_count {
            match self.parse_page(source, page_index) {
                Ok(page) => {
                    log::debug!("Page {}: {} result records", page_index, page.records.len());
                    parsed.report.results.extend(page.records);
                    parsed.diagnostics.entries.extend(page.ambiguities.into_iter().map(
                        |detail| Diagnostic::AmbiguousColumnMatch {
                            page: page_index,
                            detail,
                        },
                    ));
                },
                Err(e) => {
                    log::warn!("Page {} skipped: {}", page_index, e);
                    parsed.diagnostics.entries.push(Diagnostic::PageFailed {
                        page: page_index,
                        error: e.to_string(),
                    });
                },
            }
        }

        log::info!(
            "Extracted {} result records ({} lot fields not parsed)",
            parsed.report.results.len(),
            parsed.diagnostics.unparsed_count
        );
        parsed
    }

    fn parse_lot_page<S>(&self, source: &S, parsed: &mut ParsedReport)
    where
        S: FragmentSource + ?Sized,
    {
        let text = if source.page_count() == 0 {
            log::warn!("Document has no pages, lot info left unparsed");
            String::new()
        } else {
            match source.page_text(0) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Lot page text unavailable: {}", e);
                    parsed.diagnostics.entries.push(Diagnostic::PageFailed {
                        page: 0,
                        error: e.to_string(),
                    });
                    String::new()
                },
            }
        };

        let extraction = extract_lot_info(&text, &self.config.lot_fields);
        parsed.diagnostics.unparsed_count += extraction.unparsed_count();
        parsed.diagnostics.entries.extend(
            extraction
                .unparsed_labels
                .into_iter()
                .map(|label| Diagnostic::FieldNotParsed { label }),
        );
        parsed.report.lot_info = extraction.lot_info;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::extractors::{MemoryDocument, MemoryPage, TextFragment};

    struct FailingSource;

    impl FragmentSource for FailingSource {
        fn page_count(&self) -> usize {
            2
        }

        fn visit_page(
            &self,
            _page_index: usize,
            _visitor: &mut dyn FnMut(TextFragment),
        ) -> Result<()> {
            Err(Error::Extraction("corrupt content stream".to_string()))
        }

        fn page_text(&self, _page_index: usize) -> Result<String> {
            Err(Error::Extraction("no text layer".to_string()))
        }
    }

    #[test]
    fn test_empty_document() {
        let parsed = ReportParser::new().parse(&MemoryDocument::default());
        assert!(parsed.report.results.is_empty());
        assert_eq!(parsed.diagnostics.unparsed_count, 7);
        assert!(parsed.report.lot_info.is_unparsed("customer_number"));
    }

    #[test]
    fn test_extractor_failures_are_isolated() {
        let parsed = ReportParser::new().parse(&FailingSource);
        assert_eq!(parsed.diagnostics.failed_pages(), vec![0, 1]);
        assert_eq!(parsed.diagnostics.unparsed_count, 7);
        assert!(parsed.report.results.is_empty());
    }

    #[test]
    fn test_parse_page_reports_layout_error() {
        let doc = MemoryDocument::new(vec![
            MemoryPage::from_text(""),
            MemoryPage::from_fragments(vec![TextFragment::at("Unit", 300.0, 595.0)]),
        ]);
        let err = ReportParser::new().parse_page(&doc, 1).unwrap_err();
        assert!(err.is_layout_error());
    }

    #[test]
    fn test_results_by_lot() {
        let record = |date: &str, name: &str| ResultRecord {
            date_of_manufacture: date.to_string(),
            characteristic: name.to_string(),
            ..ResultRecord::default()
        };
        let report = ReportData {
            lot_info: LotInfo::default(),
            results: vec![
                record("20230102", "a"),
                record("20230101", "b"),
                record("20230102", "c"),
            ],
        };
        let lots = report.results_by_lot();
        let dates: Vec<&str> = lots.keys().copied().collect();
        assert_eq!(dates, vec!["20230102", "20230101"]);
        assert_eq!(lots["20230102"].len(), 2);
    }

    #[test]
    fn test_diagnostic_serialization() {
        let diagnostic = Diagnostic::PageFailed {
            page: 2,
            error: "Layout not recognized".to_string(),
        };
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["kind"], "page_failed");
        assert_eq!(json["page"], 2);
    }
}
