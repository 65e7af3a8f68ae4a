use crate::document::DocumentFormat;
use crate::error::{Error, Result};
use lopdf::Document as PdfDocument;

/// Concatenate the text of every page in page order, with no separator.
pub fn extract_pdf(bytes: &[u8]) -> Result<String> {
    let doc = PdfDocument::load_mem(bytes).map_err(|e| Error::unreadable(DocumentFormat::Pdf, e))?;

    let mut text = String::new();
    // get_pages is keyed by page number, so iteration is already in document order.
    for (page_num, _page_id) in doc.get_pages() {
        let page = doc
            .extract_text(&[page_num])
            .map_err(|e| Error::unreadable(DocumentFormat::Pdf, format!("page {page_num}: {e}")))?;
        text.push_str(&page);
    }
    Ok(text)
}
