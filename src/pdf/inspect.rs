//! Reading back written PDFs
//!
//! Used by the `info` command and by tests to check that output parses with an
//! independent reader.

use std::path::Path;
use lopdf::{Dictionary, Document, Object};
use crate::error::{Error, Result};

/// Summary of a PDF file
#[derive(Debug, Clone, Default)]
pub struct PdfSummary {
    /// Page count from the `/Count` of the root `/Pages` node
    pub page_count: usize,
    /// Number of indirect objects
    pub object_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
    /// `/BaseFont` names referenced from page resources, in page order
    pub fonts: Vec<String>,
}

/// Summarize a PDF file
pub fn inspect(path: &Path) -> Result<PdfSummary> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let doc = Document::load(path)?;
    summarize(&doc)
}

/// Summarize PDF bytes held in memory
pub fn inspect_bytes(bytes: &[u8]) -> Result<PdfSummary> {
    let doc = Document::load_mem(bytes)?;
    summarize(&doc)
}

fn summarize(doc: &Document) -> Result<PdfSummary> {
    let page_count = count_pages_from_catalog(doc)?;

    let mut title = None;
    let mut author = None;
    if let Ok(Object::Reference(info_id)) = doc.trailer.get(b"Info") {
        if let Ok(Object::Dictionary(info)) = doc.get_object(*info_id) {
            title = text_entry(info, b"Title");
            author = text_entry(info, b"Author");
        }
    }

    let mut fonts = Vec::new();
    for page_id in doc.get_pages().values() {
        for name in page_font_names(doc, *page_id) {
            if !fonts.contains(&name) {
                fonts.push(name);
            }
        }
    }

    Ok(PdfSummary {
        page_count,
        object_count: doc.objects.len(),
        title,
        author,
        fonts,
    })
}

/// Count pages by reading the Count field from the Pages dictionary
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog_id = match doc.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => *id,
        Ok(_) => return Err(Error::General("Root is not a reference".to_string())),
        Err(_) => return Err(Error::General("No Root in trailer".to_string())),
    };
    let catalog = doc.get_dictionary(catalog_id)?;

    let pages_id = match catalog.get(b"Pages") {
        Ok(Object::Reference(id)) => *id,
        Ok(_) => return Err(Error::General("Pages is not a reference".to_string())),
        Err(_) => return Err(Error::General("No Pages in catalog".to_string())),
    };
    let pages = doc.get_dictionary(pages_id)?;

    match pages.get(b"Count") {
        Ok(Object::Integer(n)) => Ok(*n as usize),
        Ok(_) => Err(Error::General("Count is not an integer".to_string())),
        Err(_) => Err(Error::General("No Count in Pages".to_string())),
    }
}

fn page_font_names(doc: &Document, page_id: lopdf::ObjectId) -> Vec<String> {
    let mut names = Vec::new();
    let Ok(page) = doc.get_dictionary(page_id) else {
        return names;
    };
    let Some(resources) = resolve_dict(doc, page.get(b"Resources").ok()) else {
        return names;
    };
    let Some(font_dict) = resolve_dict(doc, resources.get(b"Font").ok()) else {
        return names;
    };
    for (_, value) in font_dict.iter() {
        if let Some(font) = resolve_dict(doc, Some(value)) {
            if let Ok(Object::Name(base)) = font.get(b"BaseFont") {
                names.push(String::from_utf8_lossy(base).into_owned());
            }
        }
    }
    names
}

fn resolve_dict<'a>(doc: &'a Document, object: Option<&'a Object>) -> Option<&'a Dictionary> {
    match object? {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

fn text_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key) {
        Ok(Object::String(bytes, _)) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}
