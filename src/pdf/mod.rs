//! PDF form-filling module

pub mod fields;
pub mod fill;
pub mod metadata;
pub mod scan;

// Re-export commonly used items
pub use fields::{discover_fields, FieldMap};
pub use fill::{fill_batch, fill_document, BatchFillOptions, BatchReport};
pub use metadata::{count_pages, summarize, DocumentSummary};
pub use scan::{scan_documents, DEFAULT_PATTERN};
