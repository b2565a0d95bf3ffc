//! Fragment events emitted by a PDF content-stream reader.

use crate::error::Result;
use crate::geometry::Matrix;
use serde::{Deserialize, Serialize};

/// Font metadata attached to a drawn fragment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FontDescriptor {
    /// Base font name (e.g. "Helvetica-Bold")
    pub name: String,
    /// Font encoding (e.g. "WinAnsiEncoding")
    pub encoding: String,
    /// Font subtype (e.g. "Type1", "TrueType")
    pub subtype: String,
    /// Dictionary type, normally "Font"
    #[serde(rename = "type")]
    pub font_type: String,
}

impl FontDescriptor {
    /// Create a descriptor for a named font with otherwise empty metadata.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One text-drawing operation as reported by the extractor.
///
/// Emission order follows the content stream, which is not necessarily the
/// visual reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Decoded text
    pub text: String,
    /// Current transformation matrix (CTM) at the time of drawing
    #[serde(default)]
    pub content_matrix: Matrix,
    /// Text matrix (Tm) at the time of drawing
    #[serde(default)]
    pub text_matrix: Matrix,
    /// Font metadata
    #[serde(default)]
    pub font: FontDescriptor,
    /// Font size in text space units
    #[serde(default)]
    pub font_size: f64,
}

impl TextFragment {
    /// Create a fragment drawn at `(x, y)` with an identity CTM.
    pub fn at(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            content_matrix: Matrix::IDENTITY,
            text_matrix: Matrix::translate(x, y),
            font: FontDescriptor::default(),
            font_size: 0.0,
        }
    }

    /// Set the font and size.
    pub fn with_font(mut self, font: FontDescriptor, font_size: f64) -> Self {
        self.font = font;
        self.font_size = font_size;
        self
    }
}

/// A document that can replay its pages as fragment streams.
///
/// Implementations wrap a real PDF reader. Pages are zero-indexed; page 0 is
/// the lot-information page of a certificate.
pub trait FragmentSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Invoke `visitor` once per text fragment drawn on `page_index`, in
    /// content-stream order.
    fn visit_page(&self, page_index: usize, visitor: &mut dyn FnMut(TextFragment)) -> Result<()>;

    /// Plain extracted text of `page_index`, lines separated by `'\n'`.
    fn page_text(&self, page_index: usize) -> Result<String>;
}

impl<T: FragmentSource + ?Sized> FragmentSource for &T {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn visit_page(
        &self,
        page_index: usize,
        visitor: &mut dyn FnMut(TextFragment),
    ) -> Result<()> {
        (**self).visit_page(page_index, visitor)
    }

    fn page_text(&self, page_index: usize) -> Result<String> {
        (**self).page_text(page_index)
    }
}
