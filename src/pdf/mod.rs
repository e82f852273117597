//! PDF writing module

pub mod dict;
pub mod font;
pub mod inspect;
pub mod ledger;
pub mod object;
pub mod options;
pub mod pages;
pub mod stream;
pub mod writer;
pub mod xref;

// Re-export commonly used items
pub use dict::Dictionary;
pub use font::{Font, FontRef, FontSubsetter, SubsetFont, SubsetterError};
pub use inspect::{inspect, inspect_bytes, PdfSummary};
pub use ledger::{ObjectId, ObjectLedger};
pub use object::PdfObject;
pub use options::{DocumentInfo, GapPolicy, WriterOptions};
pub use pages::{Page, PageRef, PageTree};
pub use stream::StreamPayload;
pub use writer::Writer;
