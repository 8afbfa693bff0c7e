//! PPTX (Office Open XML) backend for exercise decks.
//!
//! Writes a `Deck` as a .pptx package (a ZIP archive of XML parts) and reads
//! generated packages back for inspection.

pub mod parser;
mod templates;
pub mod writer;

pub use parser::{PptxReader, SlideSummary};
pub use writer::PptxWriter;
