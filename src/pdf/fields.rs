//! Form field discovery
//!
//! Walks a template document for named form fields, trying the document's
//! interactive-form dictionary first and falling back to page widget
//! annotations when the AcroForm route yields nothing.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};

/// Mapping from field name to field value.
///
/// Built once from a template document, then applied unchanged to every
/// document in a batch. Values may be empty.
pub type FieldMap = BTreeMap<String, String>;

/// Discover the named form fields of a template document.
///
/// Returns an empty map when the document parses but carries no fillable
/// fields; callers must treat that as "nothing to fill" rather than an
/// error.
pub fn discover_fields(path: &Path) -> Result<FieldMap> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    Ok(fields_from_doc(&doc))
}

/// Field discovery on an already-loaded document.
///
/// Strategy order: AcroForm field tree, then widget annotations. The first
/// strategy that produces fields wins; failures inside one strategy fall
/// through to the next.
pub(crate) fn fields_from_doc(doc: &Document) -> FieldMap {
    let fields = acroform_fields(doc);
    if !fields.is_empty() {
        return fields;
    }
    widget_annotation_fields(doc)
}

/// Enumerate the catalog's AcroForm field tree.
fn acroform_fields(doc: &Document) -> FieldMap {
    let mut fields = FieldMap::new();

    let catalog = match doc.catalog() {
        Ok(catalog) => catalog,
        Err(_) => return fields,
    };

    // A missing AcroForm entry simply means the document has no form
    let acroform = match catalog.get(b"AcroForm").map(|obj| resolve(doc, obj)) {
        Ok(obj) => obj,
        Err(_) => return fields,
    };
    let acroform = match acroform.as_dict() {
        Ok(dict) => dict,
        Err(_) => return fields,
    };

    let entries = match acroform.get(b"Fields").map(|obj| resolve(doc, obj)) {
        Ok(Object::Array(entries)) => entries,
        _ => return fields,
    };

    for entry in entries {
        if let Object::Reference(id) = entry {
            collect_field(doc, *id, &mut fields);
        }
    }

    fields
}

/// Record one field object, then recurse through its Kids.
fn collect_field(doc: &Document, id: ObjectId, out: &mut FieldMap) {
    let dict = match doc.get_object(id).and_then(|obj| obj.as_dict()) {
        Ok(dict) => dict,
        Err(_) => return,
    };

    if let Some(name) = dict_string(doc, dict, b"T") {
        if !name.is_empty() {
            let value = dict_string(doc, dict, b"V").unwrap_or_default();
            out.insert(name, value);
        }
    }

    // Non-terminal fields hold their widgets and nested fields in Kids
    if let Ok(Object::Array(kids)) = dict.get(b"Kids").map(|obj| resolve(doc, obj)) {
        for kid in kids {
            if let Object::Reference(kid_id) = kid {
                collect_field(doc, *kid_id, out);
            }
        }
    }
}

/// Scan every page's annotation list for named form widgets.
fn widget_annotation_fields(doc: &Document) -> FieldMap {
    let mut fields = FieldMap::new();

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
            let annot = match resolve(doc, entry).as_dict() {
                Ok(dict) => dict,
                Err(_) => continue,
            };
            if !is_widget(annot) {
                continue;
            }
            if let Some(name) = dict_string(doc, annot, b"T") {
                if !name.is_empty() {
                    let value = dict_string(doc, annot, b"V").unwrap_or_default();
                    fields.entry(name).or_insert(value);
                }
            }
        }
    }

    fields
}

fn is_widget(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name.as_slice() == b"Widget")
}

/// Read a text entry from a dictionary, resolving indirect references and
/// decoding PDF string encodings. Name objects are accepted too since
/// choice-field values are written as names.
pub(crate) fn dict_string(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let obj = dict.get(key).ok()?;
    match resolve(doc, obj) {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Name(bytes) => Some(decode_pdf_string(bytes)),
        _ => None,
    }
}

/// Follow an indirect reference to its object; other objects pass through.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Decode a PDF text string: UTF-16 with BOM, else UTF-8 (lossy).
///
/// Desktop form editors commonly write /T and /V as UTF-16BE.
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_nonexistent_file() {
        let result = discover_fields(Path::new("nonexistent.pdf"));
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_decode_utf16be_string() {
        // "Name" with a UTF-16BE BOM
        let bytes = [0xFE, 0xFF, 0x00, b'N', 0x00, b'a', 0x00, b'm', 0x00, b'e'];
        assert_eq!(decode_pdf_string(&bytes), "Name");
    }

    #[test]
    fn test_decode_utf16le_string() {
        let bytes = [0xFF, 0xFE, b'O', 0x00, b'K', 0x00];
        assert_eq!(decode_pdf_string(&bytes), "OK");
    }

    #[test]
    fn test_decode_plain_utf8() {
        assert_eq!(decode_pdf_string(b"Signature"), "Signature");
    }

    // Discovery against real form documents is covered in tests/integration.rs
}
