//! In-memory fragment source.
//!
//! Holds pre-extracted pages, either built in code or loaded from a JSON dump
//! written by an external PDF reader:
//!
//! ```json
//! { "pages": [ { "text": "Customer number: 4821\n...", "fragments": [] },
//!              { "fragments": [ { "text": "Characteristic", "text_matrix": [8,0,0,8,45.3,595.2] } ] } ] }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::fragment::{FragmentSource, TextFragment};
use crate::error::{Error, Result};

/// One pre-extracted page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryPage {
    /// Plain page text. When absent it is rebuilt from the fragments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Fragments in content-stream order
    #[serde(default)]
    pub fragments: Vec<TextFragment>,
}

impl MemoryPage {
    /// A page that only carries plain text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            fragments: Vec::new(),
        }
    }

    /// A page that only carries fragments.
    pub fn from_fragments(fragments: Vec<TextFragment>) -> Self {
        Self {
            text: None,
            fragments,
        }
    }

    /// Plain text of the page; fragment strings are concatenated when no
    /// explicit text was recorded.
    pub fn plain_text(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.fragments.iter().map(|f| f.text.as_str()).collect(),
        }
    }
}

/// A whole document held in memory.
///
/// A dump must carry a `pages` array and nothing else, so config files and
/// written reports are rejected instead of loading as empty documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryDocument {
    /// Pages in document order
    pub pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    /// Create a document from its pages.
    pub fn new(pages: Vec<MemoryPage>) -> Self {
        Self { pages }
    }

    /// Parse a JSON fragment dump.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON fragment dump from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Open a JSON fragment dump on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading fragment dump from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn page(&self, page_index: usize) -> Result<&MemoryPage> {
        self.pages.get(page_index).ok_or(Error::PageOutOfRange {
            index: page_index,
            count: self.pages.len(),
        })
    }
}

impl FragmentSource for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn visit_page(
        &self,
        page_index: usize,
        visitor: &mut dyn FnMut(TextFragment),
    ) -> Result<()> {
        for fragment in &self.page(page_index)?.fragments {
            visitor(fragment.clone());
        }
        Ok(())
    }

    fn page_text(&self, page_index: usize) -> Result<String> {
        Ok(self.page(page_index)?.plain_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_falls_back_to_fragments() {
        let page = MemoryPage::from_fragments(vec![
            TextFragment::at("Customer number: 4821", 50.0, 700.0),
            TextFragment::at("\n", 0.0, 0.0),
            TextFragment::at("Judgement : Passed", 50.0, 680.0),
        ]);
        assert_eq!(page.plain_text(), "Customer number: 4821\nJudgement : Passed");
    }

    #[test]
    fn test_explicit_text_wins() {
        let mut page = MemoryPage::from_text("explicit");
        page.fragments.push(TextFragment::at("ignored", 0.0, 0.0));
        assert_eq!(page.plain_text(), "explicit");
    }

    #[test]
    fn test_visit_page_preserves_order() {
        let doc = MemoryDocument::new(vec![MemoryPage::from_fragments(vec![
            TextFragment::at("b", 0.0, 10.0),
            TextFragment::at("a", 0.0, 20.0),
        ])]);
        let mut seen = Vec::new();
        doc.visit_page(0, &mut |f| seen.push(f.text)).unwrap();
        assert_eq!(seen, vec!["b", "a"]);
    }

    #[test]
    fn test_page_out_of_range() {
        let doc = MemoryDocument::default();
        let err = doc.page_text(0).unwrap_err();
        assert!(matches!(err, Error::PageOutOfRange { index: 0, count: 0 }));
        assert!(doc.visit_page(3, &mut |_| {}).is_err());
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{"pages": [{"text": "Commercial Name: Tape"}, {"fragments": [{"text": "Unit"}]}]}"#;
        let doc = MemoryDocument::from_json_str(json).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_text(0).unwrap(), "Commercial Name: Tape");
        assert_eq!(doc.page_text(1).unwrap(), "Unit");
    }

    #[test]
    fn test_from_json_str_rejects_garbage() {
        assert!(matches!(MemoryDocument::from_json_str("[1, 2"), Err(Error::Json(_))));
    }

    #[test]
    fn test_dump_without_pages_is_rejected() {
        assert!(matches!(MemoryDocument::from_json_str("{}"), Err(Error::Json(_))));
    }

    #[test]
    fn test_config_file_is_not_a_dump() {
        let json = r#"{ "y_tolerance": 1.5, "columns": { "upper_limit": "Max" } }"#;
        assert!(matches!(MemoryDocument::from_json_str(json), Err(Error::Json(_))));
    }

    #[test]
    fn test_unknown_top_level_field_is_rejected() {
        let json = r#"{ "pages": [], "diagnostics": { "unparsed_count": 7 } }"#;
        assert!(matches!(MemoryDocument::from_json_str(json), Err(Error::Json(_))));
    }
}
