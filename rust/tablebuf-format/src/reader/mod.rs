//! Zero-copy access to finished buffers.
//!
//! Readers borrow the buffer and decode values in place on each access. There
//! is no up-front validation pass: every read is bounds-checked, a structurally
//! corrupt region surfaces as a malformed-buffer error on the access that hits
//! it, and an absent field is never an error.

use tablebuf_common::{Result, error::Error};

use crate::{
    layout::{FILE_IDENTIFIER_LENGTH, SIZE_PREFIX_LENGTH, SIZE_UOFFSET},
    scalar::{NativeStruct, Scalar},
};

mod follow;
mod table;
mod vector;

pub use follow::{Follow, ForwardsUOffset, Inline};
pub use table::{Table, VTable};
pub use vector::{Vector, VectorIter};

/// Reads a scalar at an absolute position.
#[inline]
pub fn read_scalar_at<T: Scalar>(buf: &[u8], pos: usize) -> Result<T> {
    let bytes = checked_range(buf, pos, T::SIZE, "scalar")?;
    Ok(T::read_le(bytes))
}

/// Reads a fixed-layout struct at an absolute position.
#[inline]
pub fn read_struct_at<S: NativeStruct>(buf: &[u8], pos: usize) -> Result<S> {
    let bytes = checked_range(buf, pos, S::SIZE, "struct")?;
    Ok(S::read_from(bytes))
}

/// Returns `buf[pos..pos + len]`, or a malformed-buffer error naming `element`.
pub(crate) fn checked_range<'a>(
    buf: &'a [u8],
    pos: usize,
    len: usize,
    element: &str,
) -> Result<&'a [u8]> {
    match pos.checked_add(len) {
        Some(end) if end <= buf.len() => Ok(&buf[pos..end]),
        _ => Err(Error::malformed(
            element,
            format!(
                "{len} bytes at position {pos} exceed buffer length {}",
                buf.len()
            ),
        )),
    }
}

/// Follows one relative reference: `pos + read_u32(pos)`.
pub fn indirect(buf: &[u8], pos: usize) -> Result<usize> {
    let relative = read_scalar_at::<u32>(buf, pos)? as usize;
    let target = pos + relative;
    if target >= buf.len() {
        return Err(Error::malformed(
            "uoffset",
            format!(
                "offset {relative} at position {pos} points past buffer length {}",
                buf.len()
            ),
        ));
    }
    Ok(target)
}

/// Absolute position of the root table.
pub fn root_table_position(buf: &[u8], size_prefixed: bool) -> Result<usize> {
    if size_prefixed {
        size_prefixed_len(buf)?;
        indirect(buf, SIZE_PREFIX_LENGTH)
    } else {
        indirect(buf, 0)
    }
}

/// Length of the payload declared by a size-prefixed buffer, excluding the
/// prefix itself.
pub fn size_prefixed_len(buf: &[u8]) -> Result<usize> {
    let len = read_scalar_at::<u32>(buf, 0)? as usize;
    if SIZE_PREFIX_LENGTH + len > buf.len() {
        return Err(Error::malformed(
            "size_prefix",
            format!(
                "declared size {len} exceeds available {} bytes",
                buf.len() - SIZE_PREFIX_LENGTH
            ),
        ));
    }
    Ok(len)
}

/// Checks for a 4-byte file identifier after the root offset.
pub fn buffer_has_identifier(buf: &[u8], identifier: &str, size_prefixed: bool) -> bool {
    let start = SIZE_UOFFSET + if size_prefixed { SIZE_PREFIX_LENGTH } else { 0 };
    identifier.len() == FILE_IDENTIFIER_LENGTH
        && buf.get(start..start + FILE_IDENTIFIER_LENGTH) == Some(identifier.as_bytes())
}

/// Offset of a field within the table at `table_pos`, or 0 if the field is
/// absent, including when the slot lies past the end of an older, shorter vtable.
pub fn field_offset(buf: &[u8], table_pos: usize, slot_vtable_offset: u16) -> Result<u16> {
    Ok(VTable::of_table(buf, table_pos)?.get(slot_vtable_offset))
}

/// Decodes the root of a buffer as `T`.
pub fn root<'a, T: Follow<'a>>(buf: &'a [u8]) -> Result<T::Inner> {
    T::follow(buf, root_table_position(buf, false)?)
}

/// Decodes the root of a size-prefixed buffer as `T`.
pub fn size_prefixed_root<'a, T: Follow<'a>>(buf: &'a [u8]) -> Result<T::Inner> {
    T::follow(buf, root_table_position(buf, true)?)
}
