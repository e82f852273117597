//! Cross-reference table and trailer

use std::io::{Seek, Write};

use crate::error::{LedgerError, Result};
use crate::pdf::dict::Dictionary;
use crate::pdf::ledger::ObjectId;
use crate::pdf::writer::Writer;

/// Entry 0: head of the free list
pub const FREE_ENTRY: &str = "0000000000 65535 f \n";

/// One 20-byte in-use entry
pub fn xref_entry(offset: u64) -> String {
    format!("{:010} 00000 n \n", offset)
}

impl<W: Write + Seek> Writer<W> {
    /// Write `xref`, one entry per id below the ledger's next id, the trailer,
    /// `startxref` and `%%EOF`. Fails before writing anything if a reserved
    /// id was never committed.
    pub(crate) fn write_xref(&mut self, catalog: ObjectId, info: Option<ObjectId>) -> Result<()> {
        self.ledger().ensure_complete()?;

        let size = self.ledger().next_id();
        let mut table = String::with_capacity(20 * size as usize + 16);
        table.push_str(&format!("xref\n0 {}\n", size));
        table.push_str(FREE_ENTRY);
        for (expected, (id, offset)) in (1..size).zip(self.ledger().offsets()) {
            if id.number() != expected {
                return Err(LedgerError::Uncommitted(*id).into());
            }
            table.push_str(&xref_entry(*offset));
        }

        let mut trailer = Dictionary::new();
        trailer.set("/Size", size.to_string());
        trailer.set("/Root", catalog.reference());
        if let Some(info) = info {
            trailer.set("/Info", info.reference());
        }
        let document_id = format!("<{}>", self.options().document_id);
        trailer.set("/ID", format!("[{} {}]", document_id, document_id));

        let xref_start = self.position();
        self.write_raw(table.as_bytes())?;
        self.out("trailer")?;
        self.out(&trailer.render(0))?;
        self.out("startxref")?;
        self.out(&xref_start.to_string())?;
        self.out("%%EOF")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Cursor;

    #[test]
    fn test_entries_are_twenty_bytes() {
        assert_eq!(FREE_ENTRY.len(), 20);
        assert_eq!(xref_entry(1234).len(), 20);
        assert_eq!(xref_entry(1234), "0000001234 00000 n \n");
    }

    #[test]
    fn test_xref_lists_every_object() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        let first = writer.write_stream("abc".into()).unwrap();
        let catalog = writer.write_dict(&Dictionary::new()).unwrap();
        writer.write_xref(catalog, None).unwrap();

        let first_offset = writer.ledger().offset(first).unwrap();
        let catalog_offset = writer.ledger().offset(catalog).unwrap();
        let text = String::from_utf8_lossy(&writer.into_inner().into_inner()).into_owned();

        let expected = format!(
            "xref\n0 3\n{}{}{}trailer\n",
            FREE_ENTRY,
            xref_entry(first_offset),
            xref_entry(catalog_offset)
        );
        assert!(text.contains(&expected));
        assert!(text.contains("/Size 3\n"));
        assert!(text.contains("/Root 2 0 R\n"));
        assert!(text.ends_with("%%EOF\n"));
    }

    #[test]
    fn test_uncommitted_object_fails() {
        let mut writer = Writer::new(Cursor::new(Vec::new())).unwrap();
        let pending = writer.new_object().unwrap();
        let catalog = writer.write_dict(&Dictionary::new()).unwrap();

        let result = writer.write_xref(catalog, None);
        assert!(matches!(
            result,
            Err(Error::Ledger(LedgerError::Uncommitted(id))) if id == pending.id()
        ));
        let text = String::from_utf8_lossy(&writer.into_inner().into_inner()).into_owned();
        assert!(!text.contains("xref"));
    }
}
