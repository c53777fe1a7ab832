use std::marker::PhantomData;

use tablebuf_common::Result;

use crate::{layout::SIZE_UOFFSET, scalar::Scalar};

use super::{checked_range, indirect, read_scalar_at};

/// Decodes a value of some wire type found at an absolute buffer position.
///
/// `Inner` is the decoded, usually borrowed, representation: a scalar value,
/// a `&str` into the buffer, or another view such as [`Table`](super::Table).
pub trait Follow<'a> {
    type Inner;

    fn follow(buf: &'a [u8], loc: usize) -> Result<Self::Inner>;
}

/// A wire type with a fixed inline size, usable as a vector element.
pub trait Inline {
    const SIZE: usize;
}

/// A `u32` forward reference to a `T` stored elsewhere in the buffer.
pub struct ForwardsUOffset<T>(PhantomData<T>);

impl<'a, T: Follow<'a>> Follow<'a> for ForwardsUOffset<T> {
    type Inner = T::Inner;

    #[inline]
    fn follow(buf: &'a [u8], loc: usize) -> Result<T::Inner> {
        T::follow(buf, indirect(buf, loc)?)
    }
}

impl<T> Inline for ForwardsUOffset<T> {
    const SIZE: usize = SIZE_UOFFSET;
}

macro_rules! impl_follow_scalar {
    ($($ty:ty),*) => {
        $(
            impl<'a> Follow<'a> for $ty {
                type Inner = $ty;

                #[inline]
                fn follow(buf: &'a [u8], loc: usize) -> Result<$ty> {
                    read_scalar_at::<$ty>(buf, loc)
                }
            }

            impl Inline for $ty {
                const SIZE: usize = <$ty as Scalar>::SIZE;
            }
        )*
    };
}

impl_follow_scalar!(bool, u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl<'a> Follow<'a> for &'a [u8] {
    type Inner = &'a [u8];

    fn follow(buf: &'a [u8], loc: usize) -> Result<&'a [u8]> {
        let len = read_scalar_at::<u32>(buf, loc)? as usize;
        checked_range(buf, loc + SIZE_UOFFSET, len, "string")
    }
}

impl<'a> Follow<'a> for &'a str {
    type Inner = &'a str;

    fn follow(buf: &'a [u8], loc: usize) -> Result<&'a str> {
        let bytes = <&'a [u8]>::follow(buf, loc)?;
        Ok(std::str::from_utf8(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use tablebuf_common::error::ErrorKind;

    use super::*;

    #[test]
    fn test_follow_string() {
        let buf = [4u8, 0, 0, 0, 2, 0, 0, 0, b'h', b'i', 0];
        assert_eq!(<ForwardsUOffset<&str>>::follow(&buf, 0).unwrap(), "hi");
        assert_eq!(<&[u8]>::follow(&buf, 4).unwrap(), b"hi");
    }

    #[test]
    fn test_follow_string_out_of_bounds() {
        let buf = [9u8, 0, 0, 0, b'h'];
        let e = <&str>::follow(&buf, 0).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::MalformedBuffer { element, .. } if element == "string"));
    }

    #[test]
    fn test_follow_invalid_utf8() {
        let buf = [2u8, 0, 0, 0, 0xc3, 0x28, 0];
        let e = <&str>::follow(&buf, 0).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::MalformedBuffer { .. }));
    }

    #[test]
    fn test_follow_scalars() {
        let buf = [1u8, 0xff, 0x34, 0x12];
        assert!(bool::follow(&buf, 0).unwrap());
        assert_eq!(i8::follow(&buf, 1).unwrap(), -1);
        assert_eq!(u16::follow(&buf, 2).unwrap(), 0x1234);
        assert!(u32::follow(&buf, 2).is_err());
        assert_eq!(<u64 as Inline>::SIZE, 8);
        assert_eq!(<ForwardsUOffset<&str> as Inline>::SIZE, 4);
    }
}
