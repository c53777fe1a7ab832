use tablebuf_common::Result;

use crate::{
    offset::{AnyTable, Offset},
    scalar::{NativeStruct, Scalar},
};

use super::Builder;

/// A table under construction.
///
/// The session holds the builder's only mutable borrow, so no other object,
/// string or vector can be started until [`finish`](Self::finish) consumes the
/// session, and a session cannot be finished twice.
#[must_use = "a table session must be finished to produce an offset"]
pub struct TableWriter<'b> {
    builder: &'b mut Builder,
}

impl<'b> TableWriter<'b> {
    pub(super) fn new(builder: &'b mut Builder) -> TableWriter<'b> {
        TableWriter { builder }
    }

    pub fn add_scalar<T: Scalar>(&mut self, slot: usize, value: T, default: T) -> Result<&mut Self> {
        self.builder.add_field_slot(slot, value, default)?;
        Ok(self)
    }

    pub fn add_offset<T: ?Sized>(&mut self, slot: usize, target: Option<Offset<T>>) -> Result<&mut Self> {
        self.builder.add_field_offset(slot, target)?;
        Ok(self)
    }

    pub fn add_struct<S: NativeStruct>(&mut self, slot: usize, value: &S) -> Result<&mut Self> {
        self.builder.add_field_struct(slot, value)?;
        Ok(self)
    }

    /// Finishes the table and releases the builder.
    pub fn finish(self) -> Result<Offset<AnyTable>> {
        self.builder.end_object()
    }
}
