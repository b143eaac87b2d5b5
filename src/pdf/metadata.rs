//! Document summaries: page counts, field counts, Info metadata

use std::path::Path;

use lopdf::{Dictionary, Document, Object};

use crate::error::{Error, Result};
use crate::pdf::fields::{decode_pdf_string, fields_from_doc};

/// Summary of a single PDF document
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Number of named form fields discovered
    pub field_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Summarize a PDF file: pages, fillable fields, Info metadata.
pub fn summarize(path: &Path) -> Result<DocumentSummary> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;

    let page_count = doc.get_pages().len();
    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    let field_count = fields_from_doc(&doc).len();
    let (title, author) = info_strings(&doc);

    Ok(DocumentSummary {
        page_count,
        field_count,
        title,
        author,
    })
}

/// Count the number of pages in a PDF file.
pub fn count_pages(path: &Path) -> Result<usize> {
    summarize(path).map(|summary| summary.page_count)
}

/// Title and author from the trailer's Info dictionary (reference or inline).
fn info_strings(doc: &Document) -> (Option<String>, Option<String>) {
    let info = doc.trailer.get(b"Info").ok().and_then(|obj| match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    });

    match info.and_then(|obj| obj.as_dict().ok()) {
        Some(dict) => (entry_string(dict, b"Title"), entry_string(dict, b"Author")),
        None => (None, None),
    }
}

fn entry_string(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|obj| obj.as_str().ok())
        .map(decode_pdf_string)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_nonexistent_file() {
        let result = summarize(Path::new("nonexistent.pdf"));
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(result.is_err());
    }

    // Summaries of real documents are covered in tests/integration.rs
}
