//! Object numbering and byte-offset bookkeeping

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::LedgerError;

/// Identifier of an indirect object.
///
/// Generation numbers are always zero, so only the object number is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    /// The object number
    pub fn number(self) -> u32 {
        self.0
    }

    /// Indirect reference syntax, e.g. `12 0 R`
    pub fn reference(self) -> String {
        format!("{} 0 R", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of ledger tokens, so objects can be matched to the ledger that
/// reserved them.
static NEXT_DOCUMENT: AtomicU64 = AtomicU64::new(1);

/// Hands out object ids and remembers where each object starts in the output.
///
/// One ledger belongs to one document. Ids start at 1 and are never reused;
/// id 0 is the free-list head of the cross-reference table.
#[derive(Debug)]
pub struct ObjectLedger {
    document: u64,
    next_id: u32,
    offsets: BTreeMap<ObjectId, u64>,
    frozen: bool,
}

impl Default for ObjectLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectLedger {
    pub fn new() -> Self {
        Self {
            document: NEXT_DOCUMENT.fetch_add(1, Ordering::Relaxed),
            next_id: 1,
            offsets: BTreeMap::new(),
            frozen: false,
        }
    }

    /// Token identifying this ledger among all ledgers of the process
    pub fn document(&self) -> u64 {
        self.document
    }

    /// Reserve the next unused id. The object may be written much later.
    pub fn reserve(&mut self) -> Result<ObjectId, LedgerError> {
        if self.frozen {
            return Err(LedgerError::Frozen);
        }
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        Ok(id)
    }

    /// Record the byte offset at which object `id` begins. Allowed once per id.
    pub fn record_offset(&mut self, id: ObjectId, offset: u64) -> Result<(), LedgerError> {
        if self.frozen {
            return Err(LedgerError::Frozen);
        }
        if id.0 == 0 || id.0 >= self.next_id {
            return Err(LedgerError::Unreserved(id));
        }
        if self.offsets.contains_key(&id) {
            return Err(LedgerError::AlreadyRecorded(id));
        }
        self.offsets.insert(id, offset);
        Ok(())
    }

    /// Offset of a written object
    pub fn offset(&self, id: ObjectId) -> Option<u64> {
        self.offsets.get(&id).copied()
    }

    /// All recorded offsets, ordered by id
    pub fn offsets(&self) -> &BTreeMap<ObjectId, u64> {
        &self.offsets
    }

    /// The next id that would be handed out. Equals the xref entry count.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Fails with the lowest reserved id that has no offset.
    pub fn ensure_complete(&self) -> Result<(), LedgerError> {
        match (1..self.next_id)
            .map(ObjectId)
            .find(|id| !self.offsets.contains_key(id))
        {
            Some(id) => Err(LedgerError::Uncommitted(id)),
            None => Ok(()),
        }
    }

    /// Stop accepting reservations and offsets.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut ledger = ObjectLedger::new();
        let a = ledger.reserve().unwrap();
        let b = ledger.reserve().unwrap();
        assert_eq!(a.number(), 1);
        assert_eq!(b.number(), 2);
        assert_eq!(ledger.next_id(), 3);
    }

    #[test]
    fn test_reference_syntax() {
        let mut ledger = ObjectLedger::new();
        let id = ledger.reserve().unwrap();
        assert_eq!(id.reference(), "1 0 R");
        assert_eq!(id.to_string(), "1");
    }

    #[test]
    fn test_record_offset_twice_fails() {
        let mut ledger = ObjectLedger::new();
        let id = ledger.reserve().unwrap();
        ledger.record_offset(id, 15).unwrap();
        assert_eq!(
            ledger.record_offset(id, 40),
            Err(LedgerError::AlreadyRecorded(id))
        );
        assert_eq!(ledger.offset(id), Some(15));
    }

    #[test]
    fn test_record_unreserved_fails() {
        let mut ledger = ObjectLedger::new();
        let result = ledger.record_offset(ObjectId(4), 10);
        assert_eq!(result, Err(LedgerError::Unreserved(ObjectId(4))));

        let result = ledger.record_offset(ObjectId(0), 10);
        assert_eq!(result, Err(LedgerError::Unreserved(ObjectId(0))));
    }

    #[test]
    fn test_ensure_complete_reports_first_gap() {
        let mut ledger = ObjectLedger::new();
        let a = ledger.reserve().unwrap();
        let b = ledger.reserve().unwrap();
        let c = ledger.reserve().unwrap();
        ledger.record_offset(a, 10).unwrap();
        ledger.record_offset(c, 30).unwrap();

        assert_eq!(ledger.ensure_complete(), Err(LedgerError::Uncommitted(b)));

        ledger.record_offset(b, 20).unwrap();
        assert!(ledger.ensure_complete().is_ok());
    }

    #[test]
    fn test_ledgers_have_distinct_tokens() {
        let a = ObjectLedger::new();
        let b = ObjectLedger::new();
        assert_ne!(a.document(), b.document());
    }

    #[test]
    fn test_frozen_ledger_rejects_changes() {
        let mut ledger = ObjectLedger::new();
        let id = ledger.reserve().unwrap();
        ledger.freeze();
        assert!(ledger.is_frozen());
        assert_eq!(ledger.reserve(), Err(LedgerError::Frozen));
        assert_eq!(ledger.record_offset(id, 9), Err(LedgerError::Frozen));
    }
}
