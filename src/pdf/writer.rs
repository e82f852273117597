//! The document writer: output sink, object commit protocol and authoring API
//!
//! Writing happens in two phases. While authoring, fonts and pages are
//! registered and character usage is collected; nothing but the header and
//! caller-committed objects reaches the sink. [`Writer::finish`] then writes
//! page contents, page dictionaries, the page tree, the catalog, every font
//! subset and finally the cross-reference table and trailer.
//!
//! The sink is append-only. The writer counts the bytes it writes to know
//! object offsets and never seeks; forward references are resolved by
//! reserving ids early. Only the starting position is queried, once.

use std::io::{Seek, Write};
use std::path::PathBuf;

use log::{debug, info};

use crate::error::{Error, LedgerError, Result};
use crate::pdf::font::MAX_CODEPOINT;
use crate::pdf::dict::Dictionary;
use crate::pdf::font::{Font, FontRef, FontSubsetter};
use crate::pdf::ledger::{ObjectId, ObjectLedger};
use crate::pdf::object::PdfObject;
use crate::pdf::options::WriterOptions;
use crate::pdf::pages::{PageRef, PageTree};
use crate::pdf::stream::StreamPayload;

/// Writes one PDF document to `W`.
///
/// # Example
///
/// ```
/// use pdf_emitter::pdf::Writer;
/// use std::io::Cursor;
///
/// let mut writer = Writer::new(Cursor::new(Vec::new()))?;
/// writer.add_page("0 0 m 100 100 l S")?;
/// writer.finish()?;
/// let bytes = writer.into_inner().into_inner();
/// assert!(bytes.ends_with(b"%%EOF\n"));
/// # Ok::<(), pdf_emitter::Error>(())
/// ```
pub struct Writer<W: Write + Seek> {
    sink: W,
    ledger: ObjectLedger,
    options: WriterOptions,
    pub(crate) pages: PageTree,
    pub(crate) fonts: Vec<Font>,
    subsetter: Option<Box<dyn FontSubsetter>>,
    offset: u64,
    at_line_start: bool,
    finished: bool,
}

impl<W: Write + Seek> Writer<W> {
    /// Start a document with default options. Writes the file header.
    pub fn new(sink: W) -> Result<Self> {
        Self::with_options(sink, WriterOptions::default())
    }

    /// Start a document. Writes the file header.
    pub fn with_options(mut sink: W, options: WriterOptions) -> Result<Self> {
        let offset = sink.stream_position()?;
        let mut writer = Self {
            sink,
            ledger: ObjectLedger::new(),
            options,
            pages: PageTree::default(),
            fonts: Vec::new(),
            subsetter: None,
            offset,
            at_line_start: true,
            finished: false,
        };
        let header = format!("%PDF-{}", writer.options.version);
        writer.out(&header)?;
        // Binary marker so transfer tools keep 8-bit stream data intact
        writer.write_raw(b"%\xE2\xE3\xCF\xD3\n")?;
        Ok(writer)
    }

    /// Use `subsetter` to produce embedded font programs at finalization.
    pub fn with_subsetter<S: FontSubsetter + 'static>(mut self, subsetter: S) -> Self {
        self.subsetter = Some(Box::new(subsetter));
        self
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    pub fn ledger(&self) -> &ObjectLedger {
        &self.ledger
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Give back the sink. Call after [`finish`](Self::finish).
    pub fn into_inner(self) -> W {
        self.sink
    }

    // ---- authoring API ----

    /// Register a font file. Its object id is reserved immediately so pages
    /// can reference it; the font itself is written by `finish`.
    pub fn register_font(&mut self, path: impl Into<PathBuf>) -> Result<FontRef> {
        self.ensure_open()?;
        let object = self.new_object()?;
        let font = Font::new(object, format!("/F{}", self.fonts.len() + 1), path.into());
        debug!(
            "Registered font {} ({}) as object {}",
            font.internal_name(),
            font.path().display(),
            font.id()
        );
        self.fonts.push(font);
        Ok(FontRef(self.fonts.len() - 1))
    }

    /// Mark every character of `text` as used in `font`.
    pub fn mark_used(&mut self, font: FontRef, text: &str) -> Result<()> {
        self.mark_codepoints(font, text.chars().map(u32::from))
    }

    /// Mark raw codepoints as used in `font`. Codepoints above `U+10FFFF`
    /// are rejected and nothing from the batch is marked.
    pub fn mark_codepoints<I>(&mut self, font: FontRef, codepoints: I) -> Result<()>
    where
        I: IntoIterator<Item = u32>,
    {
        self.ensure_open()?;
        let codepoints: Vec<u32> = codepoints.into_iter().collect();
        let font = self.font_mut(font)?;
        if let Some(&codepoint) = codepoints.iter().find(|&&cp| cp > MAX_CODEPOINT) {
            return Err(Error::InvalidCodepoint {
                font: font.internal_name().to_string(),
                codepoint,
            });
        }
        font.mark_used(codepoints);
        Ok(())
    }

    /// Resource name of `font`, e.g. `/F1`, for use in content streams.
    pub fn internal_name(&self, font: FontRef) -> Result<&str> {
        self.fonts
            .get(font.0)
            .map(|f| f.internal_name())
            .ok_or(Error::UnknownFont(font))
    }

    /// Queue a page whose content stream is complete.
    pub fn add_page(&mut self, content: impl Into<StreamPayload>) -> Result<PageRef> {
        self.ensure_open()?;
        Ok(self.pages.push(content.into()))
    }

    /// List `font` in the resources of `page`.
    pub fn attach_font(&mut self, page: PageRef, font: FontRef) -> Result<()> {
        self.ensure_open()?;
        if font.0 >= self.fonts.len() {
            return Err(Error::UnknownFont(font));
        }
        self.pages
            .get_mut(page)
            .ok_or(Error::UnknownPage(page))?
            .attach_font(font);
        Ok(())
    }

    /// Attach `font` to `page` and mark the characters of `text` used.
    pub fn use_text(&mut self, page: PageRef, font: FontRef, text: &str) -> Result<()> {
        self.attach_font(page, font)?;
        self.mark_used(font, text)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    // ---- deferred objects ----

    /// Reserve an id and return an empty object to fill and commit later.
    pub fn new_object(&mut self) -> Result<PdfObject> {
        let id = self.ledger.reserve()?;
        Ok(PdfObject::new(id, self.ledger.document()))
    }

    /// Write a deferred object to the sink. The object must come from this
    /// writer's [`new_object`](Self::new_object).
    pub fn commit(&mut self, object: PdfObject) -> Result<ObjectId> {
        if object.document() != self.ledger.document() {
            return Err(LedgerError::ForeignObject(object.id()).into());
        }
        let (id, data) = object.into_parts();
        self.start_object(id)?;
        self.write_raw(&data)?;
        self.end_object()?;
        debug!("Committed object {} ({} bytes)", id, data.len());
        Ok(id)
    }

    /// Write a dictionary as a new object.
    pub fn write_dict(&mut self, dict: &Dictionary) -> Result<ObjectId> {
        let mut object = self.new_object()?;
        object.dict(dict);
        self.commit(object)
    }

    /// Write a stream as a new object.
    pub fn write_stream(&mut self, payload: StreamPayload) -> Result<ObjectId> {
        let mut object = self.new_object()?;
        payload.write_into(&mut object);
        self.commit(object)
    }

    // ---- finalization ----

    /// Write all queued pages, fonts, the catalog and the cross-reference
    /// table. Can run once; on error the output is unusable and the writer
    /// accepts no further objects.
    pub fn finish(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.finished = true;
        let result = self.write_document();
        self.ledger.freeze();
        result
    }

    fn write_document(&mut self) -> Result<()> {
        for font in &self.fonts {
            font.ensure_used()?;
        }
        let subsetter = self.subsetter.take();
        if subsetter.is_none() {
            if let Some(font) = self.fonts.first() {
                return Err(Error::FontLoad {
                    path: font.path().to_path_buf(),
                    message: "no font subsetter configured".to_string(),
                });
            }
        }

        let mut pages = std::mem::take(&mut self.pages);
        let fonts = std::mem::take(&mut self.fonts);
        let page_count = pages.len();
        let font_count = fonts.len();

        let pages_id = self.write_page_tree(&mut pages, &fonts)?;

        let mut catalog = Dictionary::new();
        catalog.set("/Type", "/Catalog");
        catalog.set("/Pages", pages_id.reference());
        let catalog_id = self.write_dict(&catalog)?;

        let info_id = match self.options.info.to_dictionary() {
            Some(dict) => Some(self.write_dict(&dict)?),
            None => None,
        };

        if let Some(subsetter) = subsetter.as_deref() {
            for font in fonts {
                self.finish_font(font, subsetter)?;
            }
        }

        self.write_xref(catalog_id, info_id)?;
        self.sink.flush()?;

        info!(
            "Finished PDF: {} pages, {} fonts, {} objects",
            page_count,
            font_count,
            self.ledger.next_id() - 1
        );
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finished {
            return Err(LedgerError::Frozen.into());
        }
        Ok(())
    }

    fn font_mut(&mut self, font: FontRef) -> Result<&mut Font> {
        self.fonts.get_mut(font.0).ok_or(Error::UnknownFont(font))
    }

    // ---- low-level output ----

    /// Current byte position of the sink
    pub(crate) fn position(&self) -> u64 {
        self.offset
    }

    pub(crate) fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink.write_all(bytes)?;
        self.offset += bytes.len() as u64;
        if let Some(&last) = bytes.last() {
            self.at_line_start = last == b'\n';
        }
        Ok(())
    }

    /// Write `line` followed by a newline
    pub(crate) fn out(&mut self, line: &str) -> Result<()> {
        self.write_raw(line.as_bytes())?;
        self.write_raw(b"\n")
    }

    /// Write a newline unless the output is already at the start of a line
    fn eol(&mut self) -> Result<()> {
        if !self.at_line_start {
            self.write_raw(b"\n")?;
        }
        Ok(())
    }

    /// Record the offset of `id` and write its `N 0 obj` header.
    ///
    /// The header is preceded by a newline, so the object starts one byte
    /// after the current position.
    fn start_object(&mut self, id: ObjectId) -> Result<u64> {
        let begin = self.position() + 1;
        self.ledger.record_offset(id, begin)?;
        self.write_raw(format!("\n{} 0 obj\n", id).as_bytes())?;
        Ok(begin)
    }

    fn end_object(&mut self) -> Result<()> {
        self.eol()?;
        self.out("endobj")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn output(writer: Writer<Cursor<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&writer.into_inner().into_inner()).into_owned()
    }

    #[test]
    fn test_header_is_written() {
        let writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        assert!(output(writer).starts_with("%PDF-1.7\n%"));
    }

    #[test]
    fn test_commit_records_offset_of_header() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        let mut object = writer.new_object().unwrap();
        object.write_bytes(b"42");
        let id = writer.commit(object).unwrap();

        let offset = writer.ledger().offset(id).unwrap() as usize;
        let bytes = writer.into_inner().into_inner();
        assert!(bytes[offset..].starts_with(b"1 0 obj\n42\nendobj\n"));
    }

    #[test]
    fn test_endobj_starts_on_new_line() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        let mut object = writer.new_object().unwrap();
        object.write_bytes(b"<< >>\n");
        writer.commit(object).unwrap();

        let text = output(writer);
        assert!(text.contains("1 0 obj\n<< >>\nendobj\n"));
    }

    #[test]
    fn test_write_stream_returns_committed_id() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        let id = writer.write_stream(StreamPayload::new("q Q")).unwrap();
        assert_eq!(id.number(), 1);
        assert!(writer.ledger().offset(id).is_some());
        assert!(output(writer).contains("/Length 3\n>>\nstream\nq Q\nendstream\n"));
    }

    #[test]
    fn test_internal_names_are_numbered_per_writer() {
        let mut first = Writer::new(Cursor::new(Vec::new())).unwrap();
        let mut second = Writer::new(Cursor::new(Vec::new())).unwrap();
        let a = first.register_font("a.pfb").unwrap();
        let b = first.register_font("b.pfb").unwrap();
        let c = second.register_font("c.pfb").unwrap();

        assert_eq!(first.internal_name(a).unwrap(), "/F1");
        assert_eq!(first.internal_name(b).unwrap(), "/F2");
        assert_eq!(second.internal_name(c).unwrap(), "/F1");
    }

    #[test]
    fn test_unknown_handles_are_rejected() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        let page = writer.add_page("").unwrap();
        let result = writer.attach_font(page, FontRef(3));
        assert!(matches!(result, Err(Error::UnknownFont(FontRef(3)))));

        let font = writer.register_font("a.pfb").unwrap();
        let result = writer.attach_font(PageRef(9), font);
        assert!(matches!(result, Err(Error::UnknownPage(PageRef(9)))));
    }

    #[test]
    fn test_fonts_without_subsetter_fail() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        let font = writer.register_font("a.pfb").unwrap();
        writer.mark_used(font, "A").unwrap();

        let result = writer.finish();
        assert!(matches!(result, Err(Error::FontLoad { .. })));
    }

    #[test]
    fn test_out_of_range_codepoints_are_rejected() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        let font = writer.register_font("a.pfb").unwrap();

        let result = writer.mark_codepoints(font, [0, u32::MAX]);
        assert!(matches!(
            result,
            Err(Error::InvalidCodepoint { codepoint: u32::MAX, .. })
        ));
        assert!(writer.fonts[0].used().is_empty());

        writer.mark_codepoints(font, [0x41, 0x10FFFF]).unwrap();
        assert_eq!(writer.fonts[0].used().len(), 2);
    }

    #[test]
    fn test_failed_finish_rejects_further_objects() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        let mut pending = writer.new_object().unwrap();
        pending.write_bytes(b"1");
        writer.register_font("a.pfb").unwrap();

        assert!(matches!(writer.finish(), Err(Error::EmptySubset { .. })));
        assert!(writer.ledger().is_frozen());
        assert!(matches!(
            writer.new_object(),
            Err(Error::Ledger(LedgerError::Frozen))
        ));
        assert!(matches!(
            writer.commit(pending),
            Err(Error::Ledger(LedgerError::Frozen))
        ));
        assert!(!output(writer).contains(" 0 obj"));
    }

    #[test]
    fn test_object_from_other_writer_is_rejected() {
        let mut first = Writer::new(Cursor::new(Vec::new())).unwrap();
        let mut second = Writer::new(Cursor::new(Vec::new())).unwrap();
        let object = first.new_object().unwrap();
        let id = object.id();

        let result = second.commit(object);
        assert!(matches!(
            result,
            Err(Error::Ledger(LedgerError::ForeignObject(foreign))) if foreign == id
        ));
        assert!(second.ledger().offsets().is_empty());
    }

    /// Cursor that counts seek calls
    struct CountingSink {
        inner: Cursor<Vec<u8>>,
        seeks: usize,
    }

    impl Write for CountingSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.inner.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.inner.flush()
        }
    }

    impl Seek for CountingSink {
        fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
            self.seeks += 1;
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_offsets_are_counted_without_seeking() {
        let mut inner = Cursor::new(b"prefix".to_vec());
        inner.set_position(6);
        let sink = CountingSink { inner, seeks: 0 };

        let mut writer = Writer::new(sink).unwrap();
        let first = writer.write_stream(StreamPayload::new("q Q")).unwrap();
        let second = writer.write_dict(&Dictionary::new()).unwrap();
        let first_offset = writer.ledger().offset(first).unwrap() as usize;
        let second_offset = writer.ledger().offset(second).unwrap() as usize;

        let sink = writer.into_inner();
        assert_eq!(sink.seeks, 1);
        let bytes = sink.inner.into_inner();
        assert!(bytes.starts_with(b"prefix%PDF-1.7\n"));
        assert!(bytes[first_offset..].starts_with(b"1 0 obj\n"));
        assert!(bytes[second_offset..].starts_with(b"2 0 obj\n"));
    }

    #[test]
    fn test_authoring_after_finish_is_rejected() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        writer.finish().unwrap();
        assert!(writer.is_finished());
        assert!(matches!(
            writer.add_page("x"),
            Err(Error::Ledger(LedgerError::Frozen))
        ));
        assert!(matches!(
            writer.new_object(),
            Err(Error::Ledger(LedgerError::Frozen))
        ));
    }
}
