//! Wire layout constants shared by the builder and the readers.
//!
//! All multi-byte values are little-endian:
//! * root: `[u32 root_offset][payload...]`, or size-prefixed
//!   `[u32 total_size][u32 root_offset][payload...]`, with an optional
//!   4-byte file identifier right after the root offset.
//! * table: `[i32 soffset_to_vtable][field bytes...]`, `vtable = table - soffset`.
//! * vtable: `[u16 vtable_size][u16 object_size][u16 field_offset]*`, 0 = absent.
//! * string: `[u32 len][len bytes of UTF-8][0]`.
//! * vector: `[u32 count][count * element_size bytes]`.

/// Size of an unsigned forward offset (`uoffset`).
pub const SIZE_UOFFSET: usize = 4;

/// Size of the signed table-to-vtable offset (`soffset`).
pub const SIZE_SOFFSET: usize = 4;

/// Size of a vtable entry (`voffset`).
pub const SIZE_VOFFSET: usize = 2;

/// Size of the optional total-size prefix.
pub const SIZE_PREFIX_LENGTH: usize = 4;

/// Length of the optional file identifier.
pub const FILE_IDENTIFIER_LENGTH: usize = 4;

/// The two reserved leading vtable entries: vtable size and object size.
pub const VTABLE_HEADER_SIZE: usize = 2 * SIZE_VOFFSET;

/// Largest buffer the format can address; offsets are stored in 32 bits and
/// the vtable back-reference is signed.
pub const MAX_BUFFER_SIZE: usize = i32::MAX as usize;

/// Largest vtable or object inline size, since both are recorded as `u16`.
pub const MAX_VTABLE_SIZE: usize = u16::MAX as usize;

/// Default alignment of a finished buffer's total length.
pub const DEFAULT_BUFFER_ALIGNMENT: usize = 8;

/// Largest number of field slots a table can declare while its vtable size
/// still fits in a `u16`.
pub const MAX_FIELDS: usize = (MAX_VTABLE_SIZE - VTABLE_HEADER_SIZE) / SIZE_VOFFSET;

/// Maps a zero-based field slot index to its offset within the vtable.
///
/// `index` must be below [`MAX_FIELDS`].
#[inline]
pub const fn field_index_to_vtable_offset(index: usize) -> u16 {
    (VTABLE_HEADER_SIZE + index * SIZE_VOFFSET) as u16
}

/// Inverse of [`field_index_to_vtable_offset`].
#[inline]
pub const fn vtable_offset_to_field_index(vtable_offset: u16) -> usize {
    (vtable_offset as usize - VTABLE_HEADER_SIZE) / SIZE_VOFFSET
}
