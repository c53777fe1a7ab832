/// Returns the number of padding bytes that must be added to a region of `len`
/// bytes so that its size becomes a multiple of `alignment`.
///
/// A backward-growing buffer calls this with `used + size` to make the position
/// of the next `size`-byte value, measured from the end of the buffer, a multiple
/// of `alignment`.
///
/// ```
/// use tablebuf_bytes::align::padding_len;
///
/// assert_eq!(padding_len(0, 8), 0);
/// assert_eq!(padding_len(1, 8), 7);
/// assert_eq!(padding_len(6, 4), 2);
/// assert_eq!(padding_len(16, 8), 0);
/// ```
#[inline]
pub fn padding_len(len: usize, alignment: usize) -> usize {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    len.wrapping_neg() & (alignment - 1)
}

/// Checks if a position is aligned to the specified alignment boundary.
///
/// ```
/// use tablebuf_bytes::align::is_aligned;
///
/// assert!(is_aligned(0, 8));
/// assert!(is_aligned(24, 8));
/// assert!(!is_aligned(6, 4));
/// ```
#[inline]
pub fn is_aligned(n: usize, alignment: usize) -> bool {
    debug_assert_ne!(alignment, 0);
    debug_assert!(alignment.is_power_of_two());
    (n & (alignment - 1)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_makes_aligned() {
        for alignment in [1usize, 2, 4, 8, 16] {
            for len in 0..64 {
                let padded = len + padding_len(len, alignment);
                assert!(is_aligned(padded, alignment));
                assert!(padded - len < alignment);
                assert!(padding_len(len, alignment) < alignment);
            }
        }
    }
}
