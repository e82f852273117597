//! Deferred objects: an id reserved now, bytes written on commit

use crate::pdf::dict::Dictionary;
use crate::pdf::ledger::ObjectId;

/// One document object whose body is buffered until it is committed with
/// [`Writer::commit`](crate::pdf::Writer::commit).
///
/// Committing consumes the object, so it can be written at most once, and
/// only by the writer whose ledger reserved it.
#[derive(Debug)]
pub struct PdfObject {
    id: ObjectId,
    document: u64,
    data: Vec<u8>,
}

impl PdfObject {
    pub(crate) fn new(id: ObjectId, document: u64) -> Self {
        Self {
            id,
            document,
            data: Vec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Append a rendered dictionary to the body
    pub fn dict(&mut self, dict: &Dictionary) {
        self.data.extend_from_slice(dict.render(0).as_bytes());
    }

    /// Append raw bytes to the body
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Token of the ledger that reserved this object
    pub(crate) fn document(&self) -> u64 {
        self.document
    }

    pub(crate) fn into_parts(self) -> (ObjectId, Vec<u8>) {
        (self.id, self.data)
    }
}
