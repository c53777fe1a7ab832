use std::sync::Arc;

use crate::Bytes;

/// A byte region that grows from its high end toward its low end.
///
/// Data is always stored at the tail of the underlying allocation: `head` marks
/// the first used byte and everything in `buf[head..]` is live. Positions are
/// usually measured from the end of the region ("reverse locations"), which do
/// not change when the region grows and the live bytes move to a larger
/// allocation.
pub struct DownwardBuf {
    buf: Vec<u8>,
    head: usize,
}

impl DownwardBuf {
    const MIN_CAPACITY: usize = 16;

    /// Creates an empty region with no allocation.
    pub fn new() -> DownwardBuf {
        Self::with_capacity(0)
    }

    /// Creates an empty region able to hold `capacity` bytes without reallocating.
    pub fn with_capacity(capacity: usize) -> DownwardBuf {
        DownwardBuf {
            buf: vec![0; capacity],
            head: capacity,
        }
    }

    /// Number of live bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len() - self.head
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the underlying allocation.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Claims `n` zeroed bytes in front of the live data, growing the
    /// allocation if needed. Returns the new length.
    pub fn make_space(&mut self, n: usize) -> usize {
        if n > self.head {
            self.grow(n);
        }
        debug_assert!(n <= self.head);
        self.head -= n;
        self.buf[self.head..self.head + n].fill(0);
        self.len()
    }

    /// Prepends a copy of `data`.
    pub fn push_slice(&mut self, data: &[u8]) -> usize {
        self.make_space(data.len());
        self.buf[self.head..self.head + data.len()].copy_from_slice(data);
        self.len()
    }

    /// Releases the first `n` live bytes, as if they were never written.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the current length.
    pub fn unwind(&mut self, n: usize) {
        assert!(n <= self.len());
        self.head += n;
    }

    /// Drops all live data while keeping the allocation.
    pub fn clear(&mut self) {
        self.head = self.buf.len();
    }

    /// The live bytes, lowest address first.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[self.head..]
    }

    /// `len` bytes starting at the reverse location `rev_pos`, i.e. at index
    /// `self.len() - rev_pos` within [`as_slice`](Self::as_slice).
    ///
    /// # Panics
    ///
    /// Panics if the range is not within the live data.
    #[inline]
    pub fn rev_slice(&self, rev_pos: usize, len: usize) -> &[u8] {
        let start = self.buf.len() - rev_pos;
        &self.buf[start..start + len]
    }

    /// Mutable counterpart of [`rev_slice`](Self::rev_slice).
    #[inline]
    pub fn rev_slice_mut(&mut self, rev_pos: usize, len: usize) -> &mut [u8] {
        let start = self.buf.len() - rev_pos;
        assert!(start >= self.head);
        &mut self.buf[start..start + len]
    }

    /// Converts the region into an immutable [`Bytes`] covering exactly the live
    /// data. The allocation is shared, not copied.
    pub fn into_bytes(self) -> Bytes {
        let end = self.buf.len();
        Bytes::from_shared(Arc::new(self.buf), self.head..end)
    }

    fn grow(&mut self, additional: usize) {
        let used = self.len();
        let old_cap = self.buf.len();
        let new_cap = (old_cap * 2)
            .max(used + additional)
            .max(Self::MIN_CAPACITY);
        self.buf.resize(new_cap, 0);
        let new_head = new_cap - used;
        self.buf.copy_within(self.head..old_cap, new_head);
        self.head = new_head;
    }
}

impl Default for DownwardBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DownwardBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownwardBuf")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downward_push_order() {
        let mut buf = DownwardBuf::new();
        assert!(buf.is_empty());
        buf.push_slice(b"world");
        buf.push_slice(b"hello ");
        assert_eq!(buf.as_slice(), b"hello world");
        assert_eq!(buf.len(), 11);
    }

    #[test]
    fn test_downward_grow_preserves_rev_positions() {
        let mut buf = DownwardBuf::with_capacity(4);
        buf.push_slice(&[1, 2, 3, 4]);
        let rev = buf.len();
        assert_eq!(buf.rev_slice(rev, 4), &[1, 2, 3, 4]);

        for i in 0..100u8 {
            buf.push_slice(&[i]);
        }
        assert!(buf.capacity() >= 104);
        assert_eq!(buf.rev_slice(rev, 4), &[1, 2, 3, 4]);
        assert_eq!(buf.as_slice()[0], 99);
    }

    #[test]
    fn test_downward_make_space_zeroes() {
        let mut buf = DownwardBuf::with_capacity(8);
        buf.push_slice(&[0xff; 8]);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.make_space(8), 8);
        assert_eq!(buf.as_slice(), &[0; 8]);
    }

    #[test]
    fn test_downward_unwind_and_patch() {
        let mut buf = DownwardBuf::new();
        buf.push_slice(&[9, 9]);
        buf.push_slice(&[7, 7, 7]);
        buf.unwind(3);
        assert_eq!(buf.as_slice(), &[9, 9]);

        buf.rev_slice_mut(2, 1)[0] = 1;
        assert_eq!(buf.as_slice(), &[1, 9]);
    }

    #[test]
    fn test_downward_into_bytes() {
        let mut buf = DownwardBuf::with_capacity(64);
        buf.push_slice(b"data");
        let bytes = buf.into_bytes();
        assert_eq!(&bytes[..], b"data");
        assert_eq!(bytes.len(), 4);
    }
}
