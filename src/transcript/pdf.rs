use anyhow::{Context, Result};
use lopdf::Document;

/// Concatenated page text plus how many pages yielded nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub pages_skipped: usize,
}

/// Best-effort text extraction: a page whose text cannot be decoded is
/// skipped and counted, never fatal. Only a document that fails to load
/// at all is an error.
pub fn extract_text(bytes: &[u8]) -> Result<ExtractedText> {
    let doc = Document::load_mem(bytes).context("loading PDF document")?;

    let mut text = String::new();
    let mut pages_skipped = 0;
    for &page_no in doc.get_pages().keys() {
        match doc.extract_text(&[page_no]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(_) => pages_skipped += 1,
        }
    }

    Ok(ExtractedText {
        text,
        pages_skipped,
    })
}
