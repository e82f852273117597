//! Page tree assembly
//!
//! Pages are kept in registration order, which is the document's page order.
//! At finalization all content streams are written first, then one id is
//! reserved for the `/Pages` node so that every page dictionary can name its
//! parent before the parent (which lists the children) is written.

use std::io::{Seek, Write};

use log::debug;

use crate::error::Result;
use crate::pdf::dict::{array, Dictionary};
use crate::pdf::font::{Font, FontRef};
use crate::pdf::ledger::ObjectId;
use crate::pdf::stream::StreamPayload;
use crate::pdf::writer::Writer;

/// Procedure sets listed in every page's resources
const PROC_SET: &str = "[ /PDF /Text ]";

/// Handle to a page registered with a [`Writer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRef(pub(crate) usize);

/// A queued page
#[derive(Debug, Default)]
pub struct Page {
    content: StreamPayload,
    fonts: Vec<FontRef>,
    content_id: Option<ObjectId>,
    dictionary_id: Option<ObjectId>,
}

impl Page {
    fn new(content: StreamPayload) -> Self {
        Self {
            content,
            ..Default::default()
        }
    }

    /// Add `font` to this page's resources. Attaching twice is a no-op.
    pub fn attach_font(&mut self, font: FontRef) {
        if !self.fonts.contains(&font) {
            self.fonts.push(font);
        }
    }

    pub fn fonts(&self) -> &[FontRef] {
        &self.fonts
    }

    /// Id of the written content stream
    pub fn content_id(&self) -> Option<ObjectId> {
        self.content_id
    }

    /// Id of the written page dictionary
    pub fn dictionary_id(&self) -> Option<ObjectId> {
        self.dictionary_id
    }

    fn dictionary(&self, content: ObjectId, parent: ObjectId, fonts: &[Font]) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("/Type", "/Page");
        dict.set("/Contents", content.reference());
        dict.set("/Parent", parent.reference());

        if !self.fonts.is_empty() {
            let font_dict: Dictionary = self
                .fonts
                .iter()
                .filter_map(|f| fonts.get(f.0))
                .map(|f| (f.internal_name().to_string(), f.id().reference()))
                .collect();
            let mut resources = Dictionary::new();
            resources.set("/Font", font_dict.render(2));
            resources.set("/ProcSet", PROC_SET);
            dict.set("/Resources", resources.render(1));
        }
        dict
    }
}

/// All pages of a document, in order
#[derive(Debug, Default)]
pub struct PageTree {
    pages: Vec<Page>,
    id: Option<ObjectId>,
}

impl PageTree {
    pub(crate) fn push(&mut self, content: StreamPayload) -> PageRef {
        self.pages.push(Page::new(content));
        PageRef(self.pages.len() - 1)
    }

    pub fn get(&self, page: PageRef) -> Option<&Page> {
        self.pages.get(page.0)
    }

    pub(crate) fn get_mut(&mut self, page: PageRef) -> Option<&mut Page> {
        self.pages.get_mut(page.0)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    /// Id of the written `/Pages` node
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }
}

impl<W: Write + Seek> Writer<W> {
    /// Write contents, page dictionaries and the `/Pages` node. Returns the
    /// id of the `/Pages` node.
    pub(crate) fn write_page_tree(&mut self, tree: &mut PageTree, fonts: &[Font]) -> Result<ObjectId> {
        let mut contents = Vec::with_capacity(tree.pages.len());
        for page in tree.pages.iter_mut() {
            let id = self.write_stream(std::mem::take(&mut page.content))?;
            page.content_id = Some(id);
            contents.push(id);
        }

        let mut tree_object = self.new_object()?;
        let parent = tree_object.id();

        let mut kids = Vec::with_capacity(tree.pages.len());
        for (page, content) in tree.pages.iter_mut().zip(contents) {
            let mut object = self.new_object()?;
            object.dict(&page.dictionary(content, parent, fonts));
            let id = self.commit(object)?;
            page.dictionary_id = Some(id);
            kids.push(id.reference());
        }

        let media_box = self.options().media_box.media_box();
        let mut dict = Dictionary::new();
        dict.set("/Type", "/Pages");
        dict.set("/Kids", array(&kids));
        dict.set("/Count", tree.pages.len().to_string());
        dict.set("/MediaBox", array(media_box));
        tree_object.dict(&dict);
        let id = self.commit(tree_object)?;
        tree.id = Some(id);

        debug!("Wrote page tree {} with {} pages", id, kids.len());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_pages_keep_registration_order() {
        let mut tree = PageTree::default();
        let a = tree.push(StreamPayload::new("A"));
        let b = tree.push(StreamPayload::new("B"));
        assert_eq!(a, PageRef(0));
        assert_eq!(b, PageRef(1));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(b).unwrap().content.data(), b"B");
    }

    #[test]
    fn test_attach_font_deduplicates() {
        let mut page = Page::new(StreamPayload::new(""));
        page.attach_font(FontRef(0));
        page.attach_font(FontRef(1));
        page.attach_font(FontRef(0));
        assert_eq!(page.fonts(), &[FontRef(0), FontRef(1)]);
    }

    #[test]
    fn test_page_without_fonts_has_no_resources() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        let content = writer.new_object().unwrap().id();
        let parent = writer.new_object().unwrap().id();
        let dict = Page::new(StreamPayload::new("")).dictionary(content, parent, &[]);
        assert_eq!(dict.get("/Contents"), Some("1 0 R"));
        assert_eq!(dict.get("/Parent"), Some("2 0 R"));
        assert!(!dict.contains_key("/Resources"));
    }

    #[test]
    fn test_write_page_tree_ids() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        let mut tree = PageTree::default();
        tree.push(StreamPayload::new("A"));
        tree.push(StreamPayload::new("B"));

        let id = writer.write_page_tree(&mut tree, &[]).unwrap();

        // Contents 1 and 2, tree 3, page dictionaries 4 and 5
        assert_eq!(id.number(), 3);
        let pages: Vec<_> = tree.iter().collect();
        assert_eq!(pages[0].content_id().unwrap().number(), 1);
        assert_eq!(pages[1].content_id().unwrap().number(), 2);
        assert_eq!(pages[0].dictionary_id().unwrap().number(), 4);
        assert_eq!(pages[1].dictionary_id().unwrap().number(), 5);
        assert_eq!(tree.id(), Some(id));
        assert!(writer.ledger().ensure_complete().is_ok());
    }
}
