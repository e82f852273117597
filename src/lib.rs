//! PDF Emitter Library
//!
//! A low-level, append-only PDF writer. It assigns object ids, records the
//! byte offset of every object as it is written and finishes the file with a
//! cross-reference table and trailer. This library provides functionality to:
//! - Reserve object ids ahead of time for forward references
//! - Queue pages with finished content streams
//! - Embed Type 1 fonts subset to the characters actually used
//! - Read written files back for inspection
//!
//! # Example
//!
//! ```
//! use pdf_emitter::pdf::Writer;
//! use std::io::Cursor;
//!
//! let mut writer = Writer::new(Cursor::new(Vec::new()))?;
//! writer.add_page("0 0 m 200 200 l S")?;
//! writer.add_page("0 200 m 200 0 l S")?;
//! writer.finish()?;
//!
//! let bytes = writer.into_inner().into_inner();
//! let summary = pdf_emitter::pdf::inspect_bytes(&bytes)?;
//! assert_eq!(summary.page_count, 2);
//! # Ok::<(), pdf_emitter::Error>(())
//! ```

pub mod error;
pub mod pdf;
pub mod layout;

// Re-export commonly used items
pub use error::{Error, LedgerError, Result};
pub use pdf::Writer;
