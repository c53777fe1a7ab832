use std::marker::PhantomData;

use tablebuf_common::{Result, error::Error};

use crate::layout::SIZE_UOFFSET;

use super::{Follow, Inline, checked_range, read_scalar_at};

/// A borrowed view of a `[u32 count][elements]` vector.
pub struct Vector<'a, T> {
    buf: &'a [u8],
    /// Position of the first element.
    loc: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Follow<'a> + Inline> Vector<'a, T> {
    /// Resolves the vector whose length prefix is at `loc`, checking that all
    /// elements lie within the buffer.
    pub fn new(buf: &'a [u8], loc: usize) -> Result<Vector<'a, T>> {
        let len = read_scalar_at::<u32>(buf, loc)? as usize;
        let start = loc + SIZE_UOFFSET;
        let byte_len = len
            .checked_mul(T::SIZE)
            .ok_or_else(|| Error::malformed("vector", format!("length {len} overflows")))?;
        checked_range(buf, start, byte_len, "vector")?;
        Ok(Vector {
            buf,
            loc: start,
            len,
            _marker: PhantomData,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute position of the first element.
    pub fn loc(&self) -> usize {
        self.loc
    }

    /// Decodes element `index`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if `index` is out of range.
    pub fn get(&self, index: usize) -> Result<T::Inner> {
        if index >= self.len {
            return Err(Error::invalid_arg(
                "index",
                format!("index {index} out of range for vector of length {}", self.len),
            ));
        }
        T::follow(self.buf, self.loc + index * T::SIZE)
    }

    pub fn iter(&self) -> VectorIter<'a, T> {
        VectorIter {
            vector: *self,
            next: 0,
        }
    }
}

impl<'a> Vector<'a, u8> {
    /// The elements as a byte slice, without copying.
    pub fn as_slice(&self) -> &'a [u8] {
        &self.buf[self.loc..self.loc + self.len]
    }
}

impl<T> Clone for Vector<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Vector<'_, T> {}

impl<T> std::fmt::Debug for Vector<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vector")
            .field("loc", &self.loc)
            .field("len", &self.len)
            .finish()
    }
}

impl<'a, T: Follow<'a> + Inline> Follow<'a> for Vector<'a, T> {
    type Inner = Vector<'a, T>;

    #[inline]
    fn follow(buf: &'a [u8], loc: usize) -> Result<Vector<'a, T>> {
        Vector::new(buf, loc)
    }
}

/// Decodes vector elements one at a time.
pub struct VectorIter<'a, T> {
    vector: Vector<'a, T>,
    next: usize,
}

impl<'a, T: Follow<'a> + Inline> Iterator for VectorIter<'a, T> {
    type Item = Result<T::Inner>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.vector.len {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.vector.get(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.len - self.next;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use tablebuf_common::error::ErrorKind;

    use super::*;
    use crate::reader::ForwardsUOffset;

    #[test]
    fn test_scalar_vector() {
        let buf = [3u8, 0, 0, 0, 1, 0, 2, 0, 3, 0];
        let v = Vector::<u16>::new(&buf, 0).unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v.get(2).unwrap(), 3);
        let items = v.iter().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(items, vec![1, 2, 3]);

        let e = v.get(3).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::InvalidArgument { .. }));
    }

    #[test]
    fn test_vector_count_past_end() {
        let buf = [4u8, 0, 0, 0, 1, 0, 2, 0, 3, 0];
        let e = Vector::<u16>::new(&buf, 0).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::MalformedBuffer { element, .. } if element == "vector"));
    }

    #[test]
    fn test_byte_vector_slice() {
        let buf = [2u8, 0, 0, 0, 7, 9];
        let v = Vector::<u8>::new(&buf, 0).unwrap();
        assert_eq!(v.as_slice(), &[7, 9]);
        assert!(!v.is_empty());
    }

    #[test]
    fn test_vector_of_strings_reports_bad_element() {
        // two offsets: the first to "a", the second past the end
        let buf = [
            2u8, 0, 0, 0, // count
            8, 0, 0, 0, // -> 12
            100, 0, 0, 0, // -> out of range
            1, 0, 0, 0, b'a', 0,
        ];
        let v = Vector::<ForwardsUOffset<&str>>::new(&buf, 0).unwrap();
        let mut iter = v.iter();
        assert_eq!(iter.next().unwrap().unwrap(), "a");
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }
}
