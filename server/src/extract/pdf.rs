use anyhow::Context;
use lopdf::Document;

use crate::error::AppResult;

/// Extract the text layer of a PDF, page by page, in page order.
///
/// A page that yields no text contributes nothing rather than aborting the
/// whole document, so the result may be empty for scanned PDFs.
pub(super) fn extract_text(bytes: &[u8]) -> AppResult<String> {
    let doc = Document::load_mem(bytes).context("failed to parse PDF document")?;

    let mut content = String::new();
    for (page_number, _object_id) in doc.get_pages() {
        match doc.extract_text(&[page_number]) {
            Ok(text) => content.push_str(&text),
            Err(e) => {
                tracing::warn!(page = page_number, "no text extracted from page: {}", e);
            }
        }
    }

    Ok(content)
}
