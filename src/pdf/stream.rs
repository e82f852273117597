//! Stream payloads

use crate::pdf::dict::Dictionary;
use crate::pdf::object::PdfObject;

/// Bytes plus the stream dictionary.
///
/// `/Length` is computed when the stream is written; any value set by the
/// caller is overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamPayload {
    data: Vec<u8>,
    dict: Dictionary,
}

impl StreamPayload {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            dict: Dictionary::new(),
        }
    }

    pub fn with_dict(data: impl Into<Vec<u8>>, dict: Dictionary) -> Self {
        Self {
            data: data.into(),
            dict,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn dict(&self) -> &Dictionary {
        &self.dict
    }

    pub fn dict_mut(&mut self) -> &mut Dictionary {
        &mut self.dict
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fill `object` with `dict`, `stream`, the bytes verbatim and `endstream`.
    pub(crate) fn write_into(mut self, object: &mut PdfObject) {
        self.dict.set("/Length", self.data.len().to_string());
        object.dict(&self.dict);
        object.write_bytes(b"\nstream\n");
        object.write_bytes(&self.data);
        object.write_bytes(b"\nendstream\n");
    }
}

impl From<Vec<u8>> for StreamPayload {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for StreamPayload {
    fn from(data: &[u8]) -> Self {
        Self::new(data)
    }
}

impl From<&str> for StreamPayload {
    fn from(data: &str) -> Self {
        Self::new(data.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::ledger::ObjectLedger;

    #[test]
    fn test_length_is_computed() {
        let mut ledger = ObjectLedger::new();
        let mut object = PdfObject::new(ledger.reserve().unwrap(), ledger.document());

        let mut payload = StreamPayload::new("BT ET");
        payload.dict_mut().set("/Length", "999");
        payload.write_into(&mut object);

        let body = String::from_utf8(object.data().to_vec()).unwrap();
        assert_eq!(body, "<<\n  /Length 5\n>>\nstream\nBT ET\nendstream\n");
    }

    #[test]
    fn test_binary_data_is_verbatim() {
        let mut ledger = ObjectLedger::new();
        let mut object = PdfObject::new(ledger.reserve().unwrap(), ledger.document());
        let bytes = vec![0u8, 0xff, b'(', b'\\', 0x80];

        StreamPayload::new(bytes.clone()).write_into(&mut object);

        let data = object.data();
        let start = data
            .windows(8)
            .position(|w| w == b"\nstream\n")
            .unwrap()
            + 8;
        assert_eq!(&data[start..start + bytes.len()], bytes.as_slice());
    }
}
