use ahash::AHashMap;

use crate::{
    layout::{SIZE_VOFFSET, VTABLE_HEADER_SIZE},
    scalar::Scalar,
};

/// A field written into the object under construction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldLoc {
    /// Reverse location of the field's first byte.
    pub off: usize,
    /// Offset of the field's entry within the vtable.
    pub vtable_offset: u16,
}

/// Size of the vtable needed for `fields`: the header plus one entry per slot
/// up to the highest slot present. Absent trailing slots are not stored.
pub(crate) fn vtable_byte_len(fields: &[FieldLoc]) -> usize {
    fields
        .iter()
        .map(|f| f.vtable_offset as usize + SIZE_VOFFSET)
        .max()
        .unwrap_or(VTABLE_HEADER_SIZE)
        .max(VTABLE_HEADER_SIZE)
}

/// Serializes a vtable into a zeroed slice of exactly its byte length.
pub(crate) struct VTableWriter<'a> {
    buf: &'a mut [u8],
}

impl<'a> VTableWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> VTableWriter<'a> {
        debug_assert!(buf.len() >= VTABLE_HEADER_SIZE);
        VTableWriter { buf }
    }

    pub fn write_header(&mut self, object_size: u16) {
        let vtable_size = self.buf.len() as u16;
        vtable_size.write_le(&mut self.buf[0..2]);
        object_size.write_le(&mut self.buf[2..4]);
    }

    pub fn write_field_offset(&mut self, vtable_offset: u16, field_offset: u16) {
        let pos = vtable_offset as usize;
        field_offset.write_le(&mut self.buf[pos..pos + SIZE_VOFFSET]);
    }
}

/// Vtables already written to the buffer, keyed by their exact bytes.
///
/// The key covers the header too, so two objects only share a vtable when
/// every entry, the object size and the vtable size are identical.
#[derive(Debug, Default)]
pub(crate) struct VTableCache {
    by_content: AHashMap<Box<[u8]>, usize>,
}

impl VTableCache {
    /// Returns the reverse location of a written vtable equal to `bytes`.
    pub fn find(&self, bytes: &[u8]) -> Option<usize> {
        self.by_content.get(bytes).copied()
    }

    pub fn insert(&mut self, bytes: &[u8], rev_pos: usize) {
        self.by_content.insert(bytes.into(), rev_pos);
    }

    pub fn len(&self) -> usize {
        self.by_content.len()
    }

    pub fn clear(&mut self) {
        self.by_content.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vtable_byte_len() {
        assert_eq!(vtable_byte_len(&[]), 4);
        let fields = [
            FieldLoc {
                off: 8,
                vtable_offset: 4,
            },
            FieldLoc {
                off: 12,
                vtable_offset: 10,
            },
        ];
        assert_eq!(vtable_byte_len(&fields), 12);
    }

    #[test]
    fn test_vtable_writer_layout() {
        let mut bytes = [0u8; 8];
        let mut writer = VTableWriter::new(&mut bytes);
        writer.write_header(12);
        writer.write_field_offset(6, 4);
        assert_eq!(bytes, [8, 0, 12, 0, 0, 0, 4, 0]);
    }

    #[test]
    fn test_cache_exact_match_only() {
        let mut cache = VTableCache::default();
        cache.insert(&[6, 0, 8, 0, 4, 0], 20);
        assert_eq!(cache.find(&[6, 0, 8, 0, 4, 0]), Some(20));
        // same entries, different object size
        assert_eq!(cache.find(&[6, 0, 12, 0, 4, 0]), None);
        assert_eq!(cache.find(&[6, 0, 8, 0]), None);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert_eq!(cache.find(&[6, 0, 8, 0, 4, 0]), None);
    }
}
