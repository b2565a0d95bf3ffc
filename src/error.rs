//! Error types for certificate parsing.
//!
//! Only failures that stop a page (or a whole document load) are errors.
//! Non-fatal findings such as unparsed lot fields or ambiguous column matches
//! are reported through [`crate::report::Diagnostics`] instead.

/// Result type alias for certificate parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing a certificate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required layout anchor (for example the "Characteristic" column
    /// header) is absent from the page
    #[error("Layout not recognized: anchor '{anchor}' not found")]
    LayoutNotRecognized {
        /// Label text that was searched for
        anchor: String,
    },

    /// Page index outside the document
    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange {
        /// Requested page index
        index: usize,
        /// Number of pages in the document
        count: usize,
    },

    /// The text-run extractor failed on a page
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a [`Error::LayoutNotRecognized`] for the given anchor label.
    pub fn layout_not_recognized(anchor: impl Into<String>) -> Self {
        Error::LayoutNotRecognized {
            anchor: anchor.into(),
        }
    }

    /// True when the error means the page does not follow the certificate template.
    pub fn is_layout_error(&self) -> bool {
        matches!(self, Error::LayoutNotRecognized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_not_recognized_error() {
        let err = Error::layout_not_recognized("Characteristic");
        let msg = format!("{}", err);
        assert!(msg.contains("Layout not recognized"));
        assert!(msg.contains("Characteristic"));
        assert!(err.is_layout_error());
    }

    #[test]
    fn test_page_out_of_range_error() {
        let err = Error::PageOutOfRange { index: 4, count: 2 };
        let msg = format!("{}", err);
        assert!(msg.contains("Page 4"));
        assert!(msg.contains("2 pages"));
        assert!(!err.is_layout_error());
    }

    #[test]
    fn test_extraction_error() {
        let err = Error::Extraction("bad content stream".to_string());
        assert!(format!("{}", err).contains("bad content stream"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(format!("{}", err).contains("IO error"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
