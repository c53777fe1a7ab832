use byteorder::{ByteOrder, LittleEndian};

/// A fixed-width value stored inline in little-endian byte order.
///
/// Every scalar is aligned to its own size within a finished buffer.
pub trait Scalar: Copy + PartialEq + std::fmt::Debug {
    /// Width of the encoded value in bytes, which is also its alignment.
    const SIZE: usize;

    /// Decodes the value from the first `SIZE` bytes of `bytes`.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encodes the value into the first `SIZE` bytes of `bytes`.
    fn write_le(self, bytes: &mut [u8]);
}

impl Scalar for u8 {
    const SIZE: usize = 1;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0]
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8]) {
        bytes[0] = self;
    }
}

impl Scalar for i8 {
    const SIZE: usize = 1;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8]) {
        bytes[0] = self as u8;
    }
}

impl Scalar for bool {
    const SIZE: usize = 1;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8]) {
        bytes[0] = self as u8;
    }
}

macro_rules! impl_scalar {
    ($ty:ty, $read:ident, $write:ident) => {
        impl Scalar for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                LittleEndian::$read(bytes)
            }

            #[inline]
            fn write_le(self, bytes: &mut [u8]) {
                LittleEndian::$write(bytes, self)
            }
        }
    };
}

impl_scalar!(u16, read_u16, write_u16);
impl_scalar!(i16, read_i16, write_i16);
impl_scalar!(u32, read_u32, write_u32);
impl_scalar!(i32, read_i32, write_i32);
impl_scalar!(u64, read_u64, write_u64);
impl_scalar!(i64, read_i64, write_i64);
impl_scalar!(f32, read_f32, write_f32);
impl_scalar!(f64, read_f64, write_f64);

/// A fixed-layout struct stored inline in tables and vectors.
///
/// Unlike tables, structs have no vtable: every member is always present and
/// the encoded size is fixed by the schema.
pub trait NativeStruct: Sized {
    /// Encoded size in bytes, including internal padding.
    const SIZE: usize;

    /// Alignment of the encoded struct: the widest member's size.
    const ALIGNMENT: usize;

    /// Encodes the struct into exactly `SIZE` bytes.
    fn write_to(&self, bytes: &mut [u8]);

    /// Decodes the struct from exactly `SIZE` bytes.
    fn read_from(bytes: &[u8]) -> Self;
}
