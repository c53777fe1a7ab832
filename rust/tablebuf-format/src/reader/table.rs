use tablebuf_common::{Result, error::Error};

use crate::{
    layout::{SIZE_SOFFSET, SIZE_VOFFSET, VTABLE_HEADER_SIZE},
    scalar::Scalar,
};

use super::{
    Follow, ForwardsUOffset, Inline, Vector, checked_range, read_scalar_at, root_table_position,
};

/// The field-offset table of one object.
#[derive(Clone, Copy)]
pub struct VTable<'a> {
    bytes: &'a [u8],
    loc: usize,
}

impl<'a> VTable<'a> {
    /// Resolves and validates the header of the vtable at `loc`.
    ///
    /// # Errors
    ///
    /// Returns a malformed-buffer error if the declared size is smaller than
    /// the header, odd, or runs past the end of the buffer.
    pub fn new(buf: &'a [u8], loc: usize) -> Result<VTable<'a>> {
        let size = read_scalar_at::<u16>(buf, loc)? as usize;
        if size < VTABLE_HEADER_SIZE || size % SIZE_VOFFSET != 0 {
            return Err(Error::malformed(
                "vtable",
                format!("invalid vtable size {size} at position {loc}"),
            ));
        }
        let bytes = checked_range(buf, loc, size, "vtable")?;
        Ok(VTable { bytes, loc })
    }

    /// Resolves the vtable of the table at `table_pos`.
    pub fn of_table(buf: &'a [u8], table_pos: usize) -> Result<VTable<'a>> {
        let soffset = read_scalar_at::<i32>(buf, table_pos)? as i64;
        let loc = table_pos as i64 - soffset;
        if loc < 0 || loc as usize >= buf.len() {
            return Err(Error::malformed(
                "soffset",
                format!("vtable offset {soffset} at position {table_pos} is out of range"),
            ));
        }
        VTable::new(buf, loc as usize)
    }

    /// Absolute position of the vtable.
    pub fn loc(&self) -> usize {
        self.loc
    }

    /// Size of the vtable in bytes, header included.
    pub fn num_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Number of field slots the vtable declares.
    pub fn num_fields(&self) -> usize {
        (self.bytes.len() - VTABLE_HEADER_SIZE) / SIZE_VOFFSET
    }

    /// Inline size of the object, including its vtable back-reference.
    pub fn object_inline_size(&self) -> usize {
        u16::read_le(&self.bytes[2..4]) as usize
    }

    /// Field offset stored for the slot at `vtable_offset`; 0 when the field is
    /// absent, the slot lies past the end of this vtable, or `vtable_offset`
    /// points into the header.
    #[inline]
    pub fn get(&self, vtable_offset: u16) -> u16 {
        let pos = vtable_offset as usize;
        if pos < VTABLE_HEADER_SIZE || pos + SIZE_VOFFSET > self.bytes.len() {
            return 0;
        }
        u16::read_le(&self.bytes[pos..pos + SIZE_VOFFSET])
    }

    /// The raw vtable bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl std::fmt::Debug for VTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VTable")
            .field("loc", &self.loc)
            .field("num_fields", &self.num_fields())
            .field("object_inline_size", &self.object_inline_size())
            .finish()
    }
}

/// A borrowed view of one table inside a finished buffer.
///
/// Construction resolves the vtable once; field accessors then decode in place.
#[derive(Clone, Copy)]
pub struct Table<'a> {
    buf: &'a [u8],
    loc: usize,
    vtable: VTable<'a>,
}

impl<'a> Table<'a> {
    pub fn new(buf: &'a [u8], loc: usize) -> Result<Table<'a>> {
        checked_range(buf, loc, SIZE_SOFFSET, "table")?;
        let vtable = VTable::of_table(buf, loc)?;
        Ok(Table { buf, loc, vtable })
    }

    /// The root table of a buffer.
    pub fn root(buf: &'a [u8]) -> Result<Table<'a>> {
        Table::new(buf, root_table_position(buf, false)?)
    }

    /// The root table of a size-prefixed buffer.
    pub fn size_prefixed_root(buf: &'a [u8]) -> Result<Table<'a>> {
        Table::new(buf, root_table_position(buf, true)?)
    }

    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }

    /// Absolute position of the table.
    pub fn loc(&self) -> usize {
        self.loc
    }

    pub fn vtable(&self) -> VTable<'a> {
        self.vtable
    }

    /// Offset of the field from the start of the table, 0 if absent.
    #[inline]
    pub fn field_offset(&self, vtable_offset: u16) -> u16 {
        self.vtable.get(vtable_offset)
    }

    #[inline]
    pub fn has_field(&self, vtable_offset: u16) -> bool {
        self.field_offset(vtable_offset) != 0
    }

    /// Decodes the field at `vtable_offset`, or `None` if it is absent.
    pub fn get<T: Follow<'a>>(&self, vtable_offset: u16) -> Result<Option<T::Inner>> {
        match self.field_offset(vtable_offset) {
            0 => Ok(None),
            off => T::follow(self.buf, self.loc + off as usize).map(Some),
        }
    }

    /// Decodes the field at `vtable_offset`, substituting `default` if it is absent.
    pub fn get_or<T: Follow<'a>>(&self, vtable_offset: u16, default: T::Inner) -> Result<T::Inner> {
        Ok(self.get::<T>(vtable_offset)?.unwrap_or(default))
    }

    pub fn get_str(&self, vtable_offset: u16) -> Result<Option<&'a str>> {
        self.get::<ForwardsUOffset<&'a str>>(vtable_offset)
    }

    pub fn get_table(&self, vtable_offset: u16) -> Result<Option<Table<'a>>> {
        self.get::<ForwardsUOffset<Table<'a>>>(vtable_offset)
    }

    pub fn get_vector<T: Follow<'a> + Inline>(
        &self,
        vtable_offset: u16,
    ) -> Result<Option<Vector<'a, T>>> {
        self.get::<ForwardsUOffset<Vector<'a, T>>>(vtable_offset)
    }
}

impl PartialEq for Table<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.buf, other.buf) && self.loc == other.loc
    }
}

impl std::fmt::Debug for Table<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("loc", &self.loc)
            .field("vtable", &self.vtable)
            .finish()
    }
}

impl<'a> Follow<'a> for Table<'a> {
    type Inner = Table<'a>;

    #[inline]
    fn follow(buf: &'a [u8], loc: usize) -> Result<Table<'a>> {
        Table::new(buf, loc)
    }
}

#[cfg(test)]
mod tests {
    use tablebuf_common::error::ErrorKind;

    use super::*;

    // root -> table at 10, vtable at 4 declaring a single i32 slot
    const ONE_FIELD: [u8; 18] = [10, 0, 0, 0, 6, 0, 8, 0, 4, 0, 6, 0, 0, 0, 42, 0, 0, 0];

    #[test]
    fn test_table_get_and_defaults() {
        let table = Table::root(&ONE_FIELD).unwrap();
        assert_eq!(table.loc(), 10);
        assert_eq!(table.vtable().loc(), 4);
        assert_eq!(table.vtable().num_fields(), 1);
        assert_eq!(table.vtable().object_inline_size(), 8);
        assert_eq!(table.get::<i32>(4).unwrap(), Some(42));
        // a slot an older writer never knew about
        assert_eq!(table.get::<i32>(6).unwrap(), None);
        assert_eq!(table.get_or::<i32>(6, -1).unwrap(), -1);
        assert!(table.has_field(4));
        assert!(!table.has_field(8));
    }

    #[test]
    fn test_header_offsets_are_not_fields() {
        let table = Table::root(&ONE_FIELD).unwrap();
        assert_eq!(table.field_offset(0), 0);
        assert_eq!(table.field_offset(2), 0);
        assert_eq!(table.get::<i32>(2).unwrap(), None);
        assert_eq!(table.field_offset(4), 4);
    }

    #[test]
    fn test_vtable_smaller_than_header() {
        let mut buf = ONE_FIELD;
        buf[4] = 2;
        let e = Table::root(&buf).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::MalformedBuffer { element, .. } if element == "vtable"));
    }

    #[test]
    fn test_odd_vtable_size() {
        let mut buf = ONE_FIELD;
        buf[4] = 5;
        assert!(Table::root(&buf).is_err());
    }

    #[test]
    fn test_vtable_past_end() {
        let mut buf = ONE_FIELD;
        buf[4] = 200;
        assert!(Table::root(&buf).is_err());
    }

    #[test]
    fn test_soffset_out_of_range() {
        let mut buf = ONE_FIELD;
        buf[10] = 100;
        let e = Table::root(&buf).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::MalformedBuffer { element, .. } if element == "soffset"));

        let mut buf = ONE_FIELD;
        // -100: vtable would lie past the end
        buf[10..14].copy_from_slice(&(-100i32).to_le_bytes());
        assert!(Table::root(&buf).is_err());
    }

    #[test]
    fn test_field_past_end_is_malformed() {
        let mut buf = ONE_FIELD;
        buf[8] = 30;
        let table = Table::root(&buf).unwrap();
        let e = table.get::<i32>(4).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::MalformedBuffer { .. }));
    }
}
