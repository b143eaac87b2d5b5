//! PDF Form Fill Library
//!
//! A cross-platform library for batch-filling PDF forms.
//! This library provides functionality to:
//! - Scan a folder for PDF documents
//! - Discover AcroForm/widget field names and current values from a template
//! - Fill matching fields across a whole folder of PDFs
//! - Summarize documents (page counts, field counts, Info metadata)
//!
//! # Example
//!
//! ```no_run
//! use pdf_formfill::pdf::{discover_fields, fill_batch, BatchFillOptions};
//! use std::path::{Path, PathBuf};
//!
//! let mut values = discover_fields(Path::new("forms/application.pdf"))
//!     .expect("Failed to read template fields");
//! values.insert("Name".to_string(), "Jane Doe".to_string());
//!
//! let options = BatchFillOptions {
//!     source_dir: PathBuf::from("forms"),
//!     documents: vec!["application.pdf".to_string()],
//!     values,
//!     output_dir: PathBuf::from("forms/filled_forms"),
//!     prefix: "filled_".to_string(),
//! };
//!
//! fill_batch(&options, |_, _, _| {}).expect("Failed to fill PDFs");
//! ```

pub mod error;
pub mod pdf;

// Re-export commonly used items
pub use error::{Error, Result};
