//! Batch form filling
//!
//! Applies one field map to every document in a folder snapshot. Documents
//! are processed one at a time; a failure is recorded and the batch moves
//! on. Outputs are written to a temporary file and renamed into place so an
//! interrupted save never leaves a truncated PDF behind.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::error::{Error, Result};
use crate::pdf::fields::{dict_string, resolve, FieldMap};

/// Options for a batch fill run
#[derive(Debug, Clone)]
pub struct BatchFillOptions {
    /// Directory holding the source documents
    pub source_dir: PathBuf,
    /// Document file names within `source_dir`, in processing order
    pub documents: Vec<String>,
    /// Field values applied to every document
    pub values: FieldMap,
    /// Directory receiving the filled copies
    pub output_dir: PathBuf,
    /// Prefix prepended to each output file name
    pub prefix: String,
}

/// Outcome of a batch fill run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Documents written successfully
    pub succeeded: Vec<String>,
    /// Documents that failed, with the error that stopped each one
    pub failed: Vec<(String, Error)>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn error_count(&self) -> usize {
        self.failed.len()
    }
}

/// Fill every document in the options' snapshot with the same field values.
///
/// `progress` is invoked once per document, before it is processed, with
/// the 1-based index, the total count, and the file name.
///
/// Setup problems (empty snapshot, all-empty field map, unwritable output
/// directory) abort the whole batch before any document is touched.
/// Per-document failures are collected in the report and never stop the
/// remaining documents.
pub fn fill_batch<F>(options: &BatchFillOptions, mut progress: F) -> Result<BatchReport>
where
    F: FnMut(usize, usize, &str),
{
    if options.documents.is_empty() {
        return Err(Error::General("No documents to process".to_string()));
    }
    if options.values.values().all(|value| value.is_empty()) {
        return Err(Error::NoFillValues);
    }

    fs::create_dir_all(&options.output_dir).map_err(|source| Error::OutputDir {
        dir: options.output_dir.clone(),
        source,
    })?;

    let total = options.documents.len();
    let mut report = BatchReport::default();

    for (index, name) in options.documents.iter().enumerate() {
        progress(index + 1, total, name);

        let input = options.source_dir.join(name);
        let output = options.output_dir.join(format!("{}{}", options.prefix, name));

        match fill_document(&input, &output, &options.values) {
            Ok(_) => report.succeeded.push(name.clone()),
            Err(err) => report.failed.push((name.clone(), err)),
        }
    }

    Ok(report)
}

/// Fill one document and write it to `output`.
///
/// All pages of the source are carried into the output unchanged; only the
/// value slots of matching fields are touched. Returns the number of field
/// objects that received a value. Zero matches is a valid outcome: the
/// document is copied through as-is.
pub fn fill_document(input: &Path, output: &Path, values: &FieldMap) -> Result<usize> {
    if !input.exists() {
        return Err(Error::FileNotFound(input.to_path_buf()));
    }

    let mut doc = Document::load(input)?;
    if doc.get_pages().is_empty() {
        return Err(Error::EmptyPdf(input.to_path_buf()));
    }

    let updated = set_field_values(&mut doc, values);
    stamp_mod_date(&mut doc);

    // Write through a temporary file so a failed save leaves no partial output
    let tmp = output.with_extension("tmp");
    if let Err(err) = doc.save(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::Pdf(lopdf::Error::IO(err)));
    }
    if output.exists() {
        fs::remove_file(output)?;
    }
    fs::rename(&tmp, output)?;

    Ok(updated)
}

/// Set /V on every field object whose name appears in the map, then flag
/// the form for appearance regeneration. Returns the number of objects
/// updated.
fn set_field_values(doc: &mut Document, values: &FieldMap) -> usize {
    let targets = named_field_targets(doc);
    let mut updated = 0;

    for (name, id) in targets {
        let value = match values.get(&name) {
            Some(value) => value,
            None => continue,
        };
        if let Ok(Object::Dictionary(ref mut dict)) = doc.get_object_mut(id) {
            dict.set(
                "V",
                Object::String(value.clone().into_bytes(), StringFormat::Literal),
            );
            updated += 1;
        }
    }

    if updated > 0 {
        flag_need_appearances(doc);
    }

    updated
}

/// Collect (name, object id) pairs for every named field object: the
/// AcroForm tree first, then page annotations for forms only reachable
/// that way. Each object is visited once.
fn named_field_targets(doc: &Document) -> Vec<(String, ObjectId)> {
    let mut seen: HashSet<ObjectId> = HashSet::new();
    let mut targets = Vec::new();

    if let Ok(catalog) = doc.catalog() {
        if let Ok(Object::Dictionary(acroform)) =
            catalog.get(b"AcroForm").map(|obj| resolve(doc, obj))
        {
            if let Ok(Object::Array(entries)) =
                acroform.get(b"Fields").map(|obj| resolve(doc, obj))
            {
                for entry in entries {
                    if let Object::Reference(id) = entry {
                        collect_field_targets(doc, *id, &mut seen, &mut targets);
                    }
                }
            }
        }
    }

    for (_page_num, page_id) in doc.get_pages() {
        let page_dict = match doc.get_object(page_id).and_then(|obj| obj.as_dict()) {
            Ok(dict) => dict,
            Err(_) => continue,
        };
        let annots = match page_dict.get(b"Annots").map(|obj| resolve(doc, obj)) {
            Ok(Object::Array(annots)) => annots,
            _ => continue,
        };
        for entry in annots {
            if let Object::Reference(id) = entry {
                push_named_target(doc, *id, &mut seen, &mut targets);
            }
        }
    }

    targets
}

/// Record one field object and recurse through its Kids. The seen set
/// doubles as a cycle guard against malformed field trees.
fn collect_field_targets(
    doc: &Document,
    id: ObjectId,
    seen: &mut HashSet<ObjectId>,
    out: &mut Vec<(String, ObjectId)>,
) {
    if !seen.insert(id) {
        return;
    }

    let dict = match doc.get_object(id).and_then(|obj| obj.as_dict()) {
        Ok(dict) => dict,
        Err(_) => return,
    };

    if let Some(name) = dict_string(doc, dict, b"T") {
        if !name.is_empty() {
            out.push((name, id));
        }
    }

    if let Ok(Object::Array(kids)) = dict.get(b"Kids").map(|obj| resolve(doc, obj)) {
        for kid in kids {
            if let Object::Reference(kid_id) = kid {
                collect_field_targets(doc, *kid_id, seen, out);
            }
        }
    }
}

fn push_named_target(
    doc: &Document,
    id: ObjectId,
    seen: &mut HashSet<ObjectId>,
    out: &mut Vec<(String, ObjectId)>,
) {
    if !seen.insert(id) {
        return;
    }
    if let Ok(dict) = doc.get_object(id).and_then(|obj| obj.as_dict()) {
        if let Some(name) = dict_string(doc, dict, b"T") {
            if !name.is_empty() {
                out.push((name, id));
            }
        }
    }
}

/// Ask conforming viewers to regenerate widget appearance streams, so the
/// values written to /V actually render. Documents without an AcroForm
/// dictionary are left alone.
fn flag_need_appearances(doc: &mut Document) {
    let root_id = match doc.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => *id,
        _ => return,
    };

    let acroform_ref = match doc
        .get_object(root_id)
        .and_then(|obj| obj.as_dict())
        .and_then(|dict| dict.get(b"AcroForm"))
    {
        Ok(Object::Reference(id)) => Some(*id),
        Ok(Object::Dictionary(_)) => None,
        _ => return,
    };

    match acroform_ref {
        Some(id) => {
            if let Ok(Object::Dictionary(ref mut acroform)) = doc.get_object_mut(id) {
                acroform.set("NeedAppearances", Object::Boolean(true));
            }
        }
        None => {
            // AcroForm dictionary written inline in the catalog
            if let Ok(Object::Dictionary(ref mut catalog)) = doc.get_object_mut(root_id) {
                if let Ok(Object::Dictionary(ref mut acroform)) = catalog.get_mut(b"AcroForm") {
                    acroform.set("NeedAppearances", Object::Boolean(true));
                }
            }
        }
    }
}

/// Stamp the modification date into the Info dictionary, creating one when
/// the document has none.
fn stamp_mod_date(doc: &mut Document) {
    let stamp = Local::now().format("D:%Y%m%d%H%M%S").to_string();
    let mod_date = Object::String(stamp.into_bytes(), StringFormat::Literal);

    // Trailer may hold the Info dictionary inline
    if let Ok(Object::Dictionary(ref mut info)) = doc.trailer.get_mut(b"Info") {
        info.set("ModDate", mod_date);
        return;
    }

    let info_id = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };

    match info_id {
        Some(id) => {
            if let Ok(Object::Dictionary(ref mut info)) = doc.get_object_mut(id) {
                info.set("ModDate", mod_date);
            }
        }
        None => {
            let mut info = Dictionary::new();
            info.set("ModDate", mod_date);
            let id = doc.add_object(Object::Dictionary(info));
            doc.trailer.set("Info", Object::Reference(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> FieldMap {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_fill_document_missing_input() {
        let result = fill_document(
            Path::new("nonexistent.pdf"),
            Path::new("out.pdf"),
            &values(&[("Name", "x")]),
        );
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_batch_rejects_empty_snapshot() {
        let options = BatchFillOptions {
            source_dir: PathBuf::from("."),
            documents: vec![],
            values: values(&[("Name", "x")]),
            output_dir: PathBuf::from("unused"),
            prefix: "filled_".to_string(),
        };
        assert!(fill_batch(&options, |_, _, _| {}).is_err());
    }

    #[test]
    fn test_batch_rejects_all_empty_values() {
        // The guard runs before the output directory is created
        let options = BatchFillOptions {
            source_dir: PathBuf::from("."),
            documents: vec!["a.pdf".to_string()],
            values: values(&[("Name", ""), ("Email", "")]),
            output_dir: PathBuf::from("should-not-exist"),
            prefix: "filled_".to_string(),
        };
        let result = fill_batch(&options, |_, _, _| {});
        assert!(matches!(result.unwrap_err(), Error::NoFillValues));
        assert!(!Path::new("should-not-exist").exists());
    }

    // End-to-end filling against generated form PDFs lives in
    // tests/integration.rs
}
