//! Document-set scanning
//!
//! Produces the ordered snapshot of file names a batch run operates on.
//! The snapshot is taken once and not re-validated; files removed after the
//! scan surface as per-document errors during filling.

use std::fs;
use std::path::Path;

use glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};

/// Default file pattern for scanning a folder of forms.
pub const DEFAULT_PATTERN: &str = "*.pdf";

/// List the file names in `dir` matching `pattern`, sorted.
///
/// Matching is case-insensitive so `FORM.PDF` is picked up by `*.pdf`.
/// An empty result is a setup error: there is nothing for a batch to do.
pub fn scan_documents(dir: &Path, pattern: &str) -> Result<Vec<String>> {
    if !dir.exists() {
        return Err(Error::FileNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let matcher = Pattern::new(pattern).map_err(|e| Error::InvalidGlob(e.to_string()))?;
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if matcher.matches_with(&name, options) {
            names.push(name);
        }
    }

    if names.is_empty() {
        return Err(Error::NoFilesMatched(format!(
            "{} in {}",
            pattern,
            dir.display()
        )));
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_missing_directory() {
        let result = scan_documents(Path::new("nonexistent-dir"), DEFAULT_PATTERN);
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_scan_invalid_pattern() {
        let result = scan_documents(&std::env::temp_dir(), "[");
        assert!(matches!(result.unwrap_err(), Error::InvalidGlob(_)));
    }

    // Scanning real folders is covered in tests/integration.rs
}
