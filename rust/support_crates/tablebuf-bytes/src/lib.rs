//! Byte regions used by the tablebuf builder and readers: a backward-growing
//! construction buffer and a shared immutable view of finished data.

use std::{
    ops::{Bound, Range, RangeBounds},
    sync::Arc,
};

pub mod align;
pub mod downward;

pub use downward::DownwardBuf;

/// A contiguous, immutable memory region that can be shared with other buffers and across
/// thread boundaries.
///
/// `Bytes` can be sliced and cloned without copying the underlying data.
#[derive(Clone)]
pub struct Bytes {
    data: Arc<Vec<u8>>,
    range: Range<usize>,
}

impl Bytes {
    /// Creates a new empty `Bytes`.
    pub fn new() -> Bytes {
        Bytes {
            data: Arc::new(Vec::new()),
            range: 0..0,
        }
    }

    /// Wraps `range` of a shared allocation.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn from_shared(data: Arc<Vec<u8>>, range: Range<usize>) -> Bytes {
        assert!(range.start <= range.end && range.end <= data.len());
        Bytes { data, range }
    }

    /// Creates a new `Bytes` by copying data from a slice.
    pub fn copy_from_slice(data: &[u8]) -> Bytes {
        Bytes::from(data.to_vec())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Start of this view within the shared allocation.
    #[inline]
    pub fn offset_in_allocation(&self) -> usize {
        self.range.start
    }

    /// Creates a new `Bytes` by slicing the current `Bytes` within the given range.
    ///
    /// This operation is zero-copy; it does not allocate new memory.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Bytes {
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e + 1,
            Bound::Excluded(&e) => e,
            Bound::Unbounded => self.len(),
        };
        assert!(start <= end, "slice start {start} is past end {end}");
        assert!(end <= self.len(), "slice end {end} is out of bounds");
        Bytes {
            data: self.data.clone(),
            range: self.range.start + start..self.range.start + end,
        }
    }

    /// Returns `true` if both values view the same bytes of the same allocation.
    pub fn ptr_eq(&self, other: &Bytes) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.range == other.range
    }

    /// Copies the viewed bytes into a new vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_ref().to_vec()
    }
}

impl std::ops::Deref for Bytes {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.data[self.range.clone()]
    }
}

impl AsRef<[u8]> for Bytes {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl Default for Bytes {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Bytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bytes").field("len", &self.len()).finish()
    }
}

impl PartialEq for Bytes {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

impl Eq for Bytes {}

impl From<Vec<u8>> for Bytes {
    fn from(vec: Vec<u8>) -> Self {
        let len = vec.len();
        Bytes {
            data: Arc::new(vec),
            range: 0..len,
        }
    }
}

impl From<&[u8]> for Bytes {
    fn from(s: &[u8]) -> Self {
        Self::copy_from_slice(s)
    }
}

impl From<&str> for Bytes {
    fn from(s: &str) -> Self {
        Self::copy_from_slice(s.as_bytes())
    }
}
