//! Error types for the PDF emitter

use std::path::PathBuf;
use thiserror::Error;

use crate::pdf::{FontRef, ObjectId, PageRef};

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF emitter
#[derive(Error, Debug)]
pub enum Error {
    /// PDF parsing error (inspection of written files)
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error on the output sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Font source could not be read or parsed
    #[error("Cannot load font {}: {message}", .path.display())]
    FontLoad { path: PathBuf, message: String },

    /// The subsetter could not produce a reduced font program
    #[error("Cannot subset font {}{}: {message}", .path.display(), codepoint_suffix(.codepoint))]
    Subset {
        path: PathBuf,
        codepoint: Option<u32>,
        message: String,
    },

    /// Font registered but no character was ever marked used
    #[error("Font {font} ({}) has no used characters", .path.display())]
    EmptySubset { font: String, path: PathBuf },

    /// Codepoint outside the Unicode range
    #[error("Font {font}: codepoint {codepoint:#x} is out of range")]
    InvalidCodepoint { font: String, codepoint: u32 },

    /// Width array gap without metrics while gaps are not allowed
    #[error("Font {} has no width for codepoint {codepoint}", .path.display())]
    MissingWidth { path: PathBuf, codepoint: u32 },

    /// Object bookkeeping error (programming bug)
    #[error("Internal ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Font handle not issued by this writer
    #[error("Unknown font handle: {0:?}")]
    UnknownFont(FontRef),

    /// Page handle not issued by this writer
    #[error("Unknown page handle: {0:?}")]
    UnknownPage(PageRef),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// General error
    #[error("{0}")]
    General(String),
}

/// Object ledger violations. These never describe bad input, only misuse of the writer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Offset recorded for an id that was never handed out
    #[error("object {0} was never reserved")]
    Unreserved(ObjectId),

    /// Offset recorded twice for the same id
    #[error("object {0} was already written")]
    AlreadyRecorded(ObjectId),

    /// Reserved id still without an offset when the xref table is built
    #[error("object {0} was reserved but never written")]
    Uncommitted(ObjectId),

    /// Object reserved by a different writer
    #[error("object {0} belongs to another document")]
    ForeignObject(ObjectId),

    /// The document was already finished
    #[error("document is already finished")]
    Frozen,
}

fn codepoint_suffix(codepoint: &Option<u32>) -> String {
    match codepoint {
        Some(cp) => format!(" (codepoint {})", cp),
        None => String::new(),
    }
}
