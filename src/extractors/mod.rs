//! Text-run extraction interface.
//!
//! The engine never reads PDF bytes itself. A PDF reader adapts itself to
//! [`FragmentSource`] and replays each page's text-drawing operations as
//! [`TextFragment`] events in content-stream order.

pub mod fragment;
pub mod memory;

pub use fragment::{FontDescriptor, FragmentSource, TextFragment};
pub use memory::{MemoryDocument, MemoryPage};
