//! Document to plain-text extraction.
//!
//! Every extractor is a pure, single-pass function of the document bytes:
//! no retries, no partial results. Structure (headings, tables, styling) is
//! flattened away.

pub mod docx;
pub mod pdf;
pub mod text;

pub use docx::extract_docx;
pub use pdf::extract_pdf;
pub use text::extract_txt;

use crate::document::{Document, DocumentFormat};
use crate::error::Result;
use tracing::debug;

pub fn extract(format: DocumentFormat, bytes: &[u8]) -> Result<String> {
    let text = match format {
        DocumentFormat::Pdf => extract_pdf(bytes)?,
        DocumentFormat::Docx => extract_docx(bytes)?,
        DocumentFormat::Txt => extract_txt(bytes)?,
    };
    debug!("extracted {} chars from {} bytes of {format}", text.chars().count(), bytes.len());
    Ok(text)
}

pub fn extract_document(doc: &Document) -> Result<String> {
    extract(doc.format, &doc.bytes)
}
