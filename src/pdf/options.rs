//! Writer configuration

use chrono::NaiveDateTime;

use crate::layout::PageDimensions;
use crate::pdf::dict::{literal_string, Dictionary};

/// Document identifier written to the trailer when none is configured
pub const DEFAULT_DOCUMENT_ID: &str = "72081BF410BDCCB959F83B2B25A355D7";

/// What to emit for a codepoint inside `[FirstChar, LastChar]` for which the
/// subsetter returned no width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
    /// Emit width 0 and log a warning
    #[default]
    ZeroWidth,
    /// Abort finalization with `Error::MissingWidth`
    Fail,
}

/// Entries for the optional `/Info` dictionary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<NaiveDateTime>,
}

impl DocumentInfo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.producer.is_none()
            && self.creation_date.is_none()
    }

    /// The `/Info` dictionary, or `None` when no field is set
    pub fn to_dictionary(&self) -> Option<Dictionary> {
        if self.is_empty() {
            return None;
        }
        let mut dict = Dictionary::new();
        if let Some(title) = &self.title {
            dict.set("/Title", literal_string(title));
        }
        if let Some(author) = &self.author {
            dict.set("/Author", literal_string(author));
        }
        if let Some(producer) = &self.producer {
            dict.set("/Producer", literal_string(producer));
        }
        if let Some(date) = &self.creation_date {
            dict.set("/CreationDate", literal_string(&format_pdf_date(date)));
        }
        Some(dict)
    }
}

/// `D:YYYYMMDDHHmmSS`
pub fn format_pdf_date(date: &NaiveDateTime) -> String {
    date.format("D:%Y%m%d%H%M%S").to_string()
}

/// Options for writing a document
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Version in the `%PDF-` header line
    pub version: String,
    /// Default page box for all pages, written on the page tree
    pub media_box: PageDimensions,
    /// Hex string used for both halves of the trailer `/ID`
    pub document_id: String,
    /// Width array gap handling
    pub gap_policy: GapPolicy,
    /// Optional document information dictionary
    pub info: DocumentInfo,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            media_box: PageDimensions::letter(),
            document_id: DEFAULT_DOCUMENT_ID.to_string(),
            gap_policy: GapPolicy::ZeroWidth,
            info: DocumentInfo::default(),
        }
    }
}
