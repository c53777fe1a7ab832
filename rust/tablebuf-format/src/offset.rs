use std::marker::PhantomData;

/// Position of a finished object (table, string, vector) inside a buffer that
/// is still under construction.
///
/// The value is measured from the end of the buffer, so it stays valid while
/// the buffer grows toward its low end. It is only meaningful for the builder
/// that produced it.
pub struct Offset<T: ?Sized> {
    value: u32,
    _marker: PhantomData<fn(&T)>,
}

/// Marker for a table offset whose concrete schema type is not known yet.
pub enum AnyTable {}

impl<T: ?Sized> Offset<T> {
    #[inline]
    pub(crate) fn new(value: u32) -> Offset<T> {
        Offset {
            value,
            _marker: PhantomData,
        }
    }

    /// Distance from the end of the buffer to the start of the object.
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Reinterprets the offset as pointing at a different type.
    #[inline]
    pub fn cast<U: ?Sized>(self) -> Offset<U> {
        Offset::new(self.value)
    }

    /// Forgets the concrete table type, e.g. for a union value.
    #[inline]
    pub fn as_any_table(self) -> Offset<AnyTable> {
        self.cast()
    }
}

impl<T: ?Sized> Clone for Offset<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Offset<T> {}

impl<T: ?Sized> PartialEq for Offset<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: ?Sized> Eq for Offset<T> {}

impl<T: ?Sized> std::fmt::Debug for Offset<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Offset").field(&self.value).finish()
    }
}
