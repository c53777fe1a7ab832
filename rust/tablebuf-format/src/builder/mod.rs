//! Construction of table buffers.
//!
//! The [`Builder`] writes from the end of its allocation toward the start, so
//! every value is complete before anything that references it is written and
//! offsets only ever point forward.

use log::{debug, trace};
use tablebuf_bytes::{Bytes, DownwardBuf, align::padding_len};
use tablebuf_common::{Result, error::Error, verify_arg};

use crate::{
    layout::{
        FILE_IDENTIFIER_LENGTH, MAX_FIELDS, MAX_VTABLE_SIZE, SIZE_PREFIX_LENGTH, SIZE_UOFFSET,
        SIZE_VOFFSET, VTABLE_HEADER_SIZE, field_index_to_vtable_offset,
    },
    offset::{AnyTable, Offset},
    reader,
    scalar::{NativeStruct, Scalar},
};

mod config;
mod session;
mod vtable;

pub use config::{BuilderConfig, DEFAULT_INITIAL_CAPACITY};
pub use session::TableWriter;

use vtable::{FieldLoc, VTableCache, VTableWriter, vtable_byte_len};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    ObjectOpen {
        /// Reverse location where the object's fields begin.
        start: usize,
        num_fields: usize,
    },
    VectorOpen {
        len: usize,
        pushed: usize,
        elem_size: usize,
    },
}

impl State {
    fn describe(&self) -> &'static str {
        match self {
            State::Idle => "no object or vector is open",
            State::ObjectOpen { .. } => "an object is open",
            State::VectorOpen { .. } => "a vector is open",
        }
    }
}

/// Assembles a single buffer of tables, strings and vectors.
///
/// A builder is a single-owner, single-threaded object. Objects are written
/// one at a time: `start_object`, field writes, `end_object`. Strings, vectors
/// and nested tables must be created before the object that refers to them is
/// started.
pub struct Builder {
    buf: DownwardBuf,
    config: BuilderConfig,
    /// Largest alignment requested so far.
    min_align: usize,
    state: State,
    field_locs: Vec<FieldLoc>,
    vtables: VTableCache,
    vtables_reused: usize,
}

impl Builder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Builder {
        Self::make(BuilderConfig::default())
    }

    /// Creates a builder with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_config(config: BuilderConfig) -> Result<Builder> {
        config.validate()?;
        Ok(Self::make(config))
    }

    fn make(config: BuilderConfig) -> Builder {
        Builder {
            buf: DownwardBuf::with_capacity(config.initial_capacity),
            config,
            min_align: 1,
            state: State::Idle,
            field_locs: Vec::new(),
            vtables: VTableCache::default(),
            vtables_reused: 0,
        }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of distinct vtables written so far.
    pub fn vtable_count(&self) -> usize {
        self.vtables.len()
    }

    /// Discards everything written and returns to the idle state, keeping the
    /// allocation for the next buffer.
    pub fn reset(&mut self) {
        debug!(
            "builder reset: {} bytes, {} vtables, {} vtable reuses",
            self.buf.len(),
            self.vtables.len(),
            self.vtables_reused
        );
        self.buf.clear();
        self.min_align = 1;
        self.state = State::Idle;
        self.field_locs.clear();
        self.vtables.clear();
        self.vtables_reused = 0;
    }

    /// Begins a table with `num_fields` vtable slots.
    ///
    /// # Errors
    ///
    /// Fails with an invalid-state error if an object or vector is already open,
    /// and with a capacity error if `num_fields` slots cannot be addressed by a
    /// 16-bit vtable.
    pub fn start_object(&mut self, num_fields: usize) -> Result<()> {
        self.require_idle("start_object")?;
        if num_fields > MAX_FIELDS {
            let vt_len = num_fields
                .saturating_mul(SIZE_VOFFSET)
                .saturating_add(VTABLE_HEADER_SIZE);
            return Err(Error::capacity_exceeded(vt_len, MAX_VTABLE_SIZE));
        }
        self.field_locs.clear();
        self.state = State::ObjectOpen {
            start: self.buf.len(),
            num_fields,
        };
        Ok(())
    }

    /// Begins a table and returns a session that keeps the builder borrowed
    /// until the table is finished.
    pub fn table(&mut self, num_fields: usize) -> Result<TableWriter<'_>> {
        self.start_object(num_fields)?;
        Ok(TableWriter::new(self))
    }

    /// Writes a scalar field into the open object unless it equals `default`.
    ///
    /// Elided fields are absent from the vtable and read back as the default.
    pub fn add_field_slot<T: Scalar>(&mut self, slot: usize, value: T, default: T) -> Result<()> {
        self.require_slot("add_field_slot", slot)?;
        if value == default && !self.config.force_defaults {
            return Ok(());
        }
        let off = self.push_scalar(value)?;
        self.track_field(slot, off);
        Ok(())
    }

    /// Writes a scalar field into the open object regardless of defaults.
    pub fn add_field_slot_always<T: Scalar>(&mut self, slot: usize, value: T) -> Result<()> {
        self.require_slot("add_field_slot_always", slot)?;
        let off = self.push_scalar(value)?;
        self.track_field(slot, off);
        Ok(())
    }

    /// Writes a reference to a previously finished object into the open object.
    ///
    /// The stored value is the distance from the field to `target`. `None` is
    /// the null reference and leaves the slot absent.
    pub fn add_field_offset<T: ?Sized>(
        &mut self,
        slot: usize,
        target: Option<Offset<T>>,
    ) -> Result<()> {
        self.require_slot("add_field_offset", slot)?;
        let Some(target) = target else {
            return Ok(());
        };
        let off = self.push_uoffset(target.value())?;
        self.track_field(slot, off);
        Ok(())
    }

    /// Writes a fixed-layout struct inline into the open object.
    pub fn add_field_struct<S: NativeStruct>(&mut self, slot: usize, value: &S) -> Result<()> {
        self.require_slot("add_field_struct", slot)?;
        let off = self.push_struct(value)?;
        self.track_field(slot, off);
        Ok(())
    }

    /// Finishes the open object: writes its vtable (or reuses an identical one)
    /// and the object's back-reference to it.
    ///
    /// # Errors
    ///
    /// Fails with an invalid-state error if no object is open, and with a
    /// capacity error if the object or its vtable exceeds 16-bit offsets.
    pub fn end_object(&mut self) -> Result<Offset<AnyTable>> {
        let State::ObjectOpen { start, .. } = self.state else {
            return Err(Error::invalid_state("end_object", self.state.describe()));
        };

        // Placeholder for the soffset, patched once the vtable location is known.
        let object_rev = self.push_scalar::<i32>(0)?;
        let object_size = object_rev - start;
        if object_size > MAX_VTABLE_SIZE {
            return Err(Error::capacity_exceeded(object_size, MAX_VTABLE_SIZE));
        }

        let vt_len = vtable_byte_len(&self.field_locs);
        if vt_len > MAX_VTABLE_SIZE {
            return Err(Error::capacity_exceeded(vt_len, MAX_VTABLE_SIZE));
        }
        self.check_capacity(vt_len)?;
        self.buf.make_space(vt_len);
        let vt_rev = self.buf.len();
        {
            let mut writer = VTableWriter::new(self.buf.rev_slice_mut(vt_rev, vt_len));
            writer.write_header(object_size as u16);
            for field in &self.field_locs {
                writer.write_field_offset(field.vtable_offset, (object_rev - field.off) as u16);
            }
        }

        let existing = if self.config.dedup_vtables {
            self.vtables.find(self.buf.rev_slice(vt_rev, vt_len))
        } else {
            None
        };
        let final_vt_rev = match existing {
            Some(existing) => {
                self.buf.unwind(vt_len);
                self.vtables_reused += 1;
                trace!("vtable cache hit: {vt_len} bytes at rev {existing}");
                existing
            }
            None => {
                if self.config.dedup_vtables {
                    self.vtables.insert(self.buf.rev_slice(vt_rev, vt_len), vt_rev);
                }
                trace!("vtable cache miss: {vt_len} bytes written at rev {vt_rev}");
                vt_rev
            }
        };

        let soffset = final_vt_rev as i64 - object_rev as i64;
        (soffset as i32).write_le(self.buf.rev_slice_mut(object_rev, 4));

        self.field_locs.clear();
        self.state = State::Idle;
        Ok(Offset::new(object_rev as u32))
    }

    /// Writes a string as `[u32 len][bytes][0]`.
    pub fn create_string(&mut self, s: &str) -> Result<Offset<str>> {
        Ok(self.create_byte_string(s.as_bytes())?.cast())
    }

    /// Writes a byte string with the same layout as [`create_string`](Self::create_string).
    pub fn create_byte_string(&mut self, data: &[u8]) -> Result<Offset<[u8]>> {
        self.require_idle("create_string")?;
        self.align(data.len() + 1, SIZE_UOFFSET)?;
        self.buf.make_space(1);
        self.buf.push_slice(data);
        self.push_scalar(data.len() as u32)?;
        Ok(Offset::new(self.buf.len() as u32))
    }

    /// Writes a vector of scalars as `[u32 count][elements]`.
    pub fn create_vector<T: Scalar>(&mut self, items: &[T]) -> Result<Offset<[T]>> {
        self.require_idle("create_vector")?;
        let byte_len = self.vector_byte_len(items.len(), T::SIZE)?;
        self.align(byte_len, T::SIZE.max(SIZE_UOFFSET))?;
        self.buf.make_space(byte_len);
        let rev = self.buf.len();
        let dst = self.buf.rev_slice_mut(rev, byte_len);
        for (chunk, &item) in dst.chunks_exact_mut(T::SIZE).zip(items) {
            item.write_le(chunk);
        }
        self.push_scalar(items.len() as u32)?;
        Ok(Offset::new(self.buf.len() as u32))
    }

    /// Writes a vector of fixed-layout structs.
    pub fn create_vector_of_structs<S: NativeStruct>(&mut self, items: &[S]) -> Result<Offset<[S]>> {
        self.require_idle("create_vector_of_structs")?;
        let byte_len = self.vector_byte_len(items.len(), S::SIZE)?;
        self.align(byte_len, S::ALIGNMENT.max(SIZE_UOFFSET))?;
        self.buf.make_space(byte_len);
        let rev = self.buf.len();
        let dst = self.buf.rev_slice_mut(rev, byte_len);
        for (chunk, item) in dst.chunks_exact_mut(S::SIZE).zip(items) {
            item.write_to(chunk);
        }
        self.push_scalar(items.len() as u32)?;
        Ok(Offset::new(self.buf.len() as u32))
    }

    /// Writes a vector of references to previously finished objects.
    pub fn create_vector_of_offsets<T: ?Sized>(
        &mut self,
        items: &[Offset<T>],
    ) -> Result<Offset<[Offset<T>]>> {
        self.require_idle("create_vector_of_offsets")?;
        let byte_len = self.vector_byte_len(items.len(), SIZE_UOFFSET)?;
        self.align(byte_len, SIZE_UOFFSET)?;
        for item in items.iter().rev() {
            self.push_uoffset(item.value())?;
        }
        self.push_scalar(items.len() as u32)?;
        Ok(Offset::new(self.buf.len() as u32))
    }

    /// Begins a vector of `len` elements of `elem_size` bytes each, which are
    /// then pushed last element first.
    pub fn start_vector(&mut self, len: usize, elem_size: usize, alignment: usize) -> Result<()> {
        self.require_idle("start_vector")?;
        verify_arg!(alignment, alignment.is_power_of_two());
        let byte_len = self.vector_byte_len(len, elem_size)?;
        self.align(byte_len, alignment.max(SIZE_UOFFSET))?;
        self.state = State::VectorOpen {
            len,
            pushed: 0,
            elem_size,
        };
        Ok(())
    }

    /// Pushes a scalar element into the open vector.
    pub fn push_vector_element<T: Scalar>(&mut self, value: T) -> Result<()> {
        self.require_vector_slot("push_vector_element", T::SIZE)?;
        self.push_scalar(value)?;
        self.count_vector_element();
        Ok(())
    }

    /// Pushes a reference element into the open vector.
    pub fn push_vector_offset<T: ?Sized>(&mut self, target: Offset<T>) -> Result<()> {
        self.require_vector_slot("push_vector_offset", SIZE_UOFFSET)?;
        self.push_uoffset(target.value())?;
        self.count_vector_element();
        Ok(())
    }

    /// Finishes the open vector by writing its element count.
    pub fn end_vector<T: ?Sized>(&mut self) -> Result<Offset<T>> {
        let State::VectorOpen { len, pushed, .. } = self.state else {
            return Err(Error::invalid_state("end_vector", self.state.describe()));
        };
        if pushed != len {
            return Err(Error::invalid_arg(
                "len",
                format!("vector declared with {len} elements, {pushed} pushed"),
            ));
        }
        self.state = State::Idle;
        self.push_scalar(len as u32)?;
        Ok(Offset::new(self.buf.len() as u32))
    }

    /// Finishes the buffer with `root` as its root table.
    ///
    /// The builder is consumed: a finished buffer cannot be extended.
    pub fn finish<T: ?Sized>(self, root: Offset<T>, size_prefixed: bool) -> Result<FinishedBuffer> {
        self.finish_impl(root.value(), None, size_prefixed)
    }

    /// Finishes the buffer with a 4-byte file identifier after the root offset.
    pub fn finish_with_identifier<T: ?Sized>(
        self,
        root: Offset<T>,
        identifier: &str,
        size_prefixed: bool,
    ) -> Result<FinishedBuffer> {
        verify_arg!(identifier, identifier.len() == FILE_IDENTIFIER_LENGTH);
        self.finish_impl(root.value(), Some(identifier.as_bytes()), size_prefixed)
    }

    fn finish_impl(
        mut self,
        root: u32,
        identifier: Option<&[u8]>,
        size_prefixed: bool,
    ) -> Result<FinishedBuffer> {
        self.require_idle("finish")?;

        let prefix_len = if size_prefixed { SIZE_PREFIX_LENGTH } else { 0 };
        let ident_len = identifier.map_or(0, <[u8]>::len);
        let alignment = self.min_align.max(self.config.alignment);
        self.align(SIZE_UOFFSET + prefix_len + ident_len, alignment)?;
        if let Some(identifier) = identifier {
            self.check_capacity(identifier.len())?;
            self.buf.push_slice(identifier);
        }
        self.push_uoffset(root)?;
        if size_prefixed {
            let size = self.buf.len() as u32;
            self.push_scalar(size)?;
        }

        debug!(
            "finished buffer: {} bytes, alignment {}, {} vtables, {} vtable reuses",
            self.buf.len(),
            alignment,
            self.vtables.len(),
            self.vtables_reused
        );
        Ok(FinishedBuffer {
            bytes: self.buf.into_bytes(),
            size_prefixed,
        })
    }

    fn require_idle(&self, operation: &str) -> Result<()> {
        match self.state {
            State::Idle => Ok(()),
            other => Err(Error::invalid_state(operation, other.describe())),
        }
    }

    fn require_slot(&self, operation: &str, slot: usize) -> Result<()> {
        match self.state {
            State::ObjectOpen { num_fields, .. } => {
                if slot < num_fields {
                    Ok(())
                } else {
                    Err(Error::invalid_arg(
                        "slot",
                        format!("slot {slot} is out of range for {num_fields} fields"),
                    ))
                }
            }
            other => Err(Error::invalid_state(operation, other.describe())),
        }
    }

    fn require_vector_slot(&self, operation: &str, size: usize) -> Result<()> {
        match self.state {
            State::VectorOpen { elem_size, .. } if size != elem_size => Err(Error::invalid_arg(
                "elem_size",
                format!("vector declared with {elem_size}-byte elements, got {size} bytes"),
            )),
            State::VectorOpen { len, pushed, .. } if pushed < len => Ok(()),
            State::VectorOpen { len, .. } => Err(Error::invalid_arg(
                "len",
                format!("vector declared with {len} elements is full"),
            )),
            other => Err(Error::invalid_state(operation, other.describe())),
        }
    }

    fn count_vector_element(&mut self) {
        if let State::VectorOpen { pushed, .. } = &mut self.state {
            *pushed += 1;
        }
    }

    fn track_field(&mut self, slot: usize, off: usize) {
        self.field_locs.push(FieldLoc {
            off,
            vtable_offset: field_index_to_vtable_offset(slot),
        });
    }

    fn vector_byte_len(&self, len: usize, elem_size: usize) -> Result<usize> {
        len.checked_mul(elem_size)
            .filter(|&n| n <= self.config.max_size)
            .ok_or_else(|| Error::capacity_exceeded(len.saturating_mul(elem_size), self.config.max_size))
    }

    fn check_capacity(&self, additional: usize) -> Result<()> {
        let requested = self.buf.len().saturating_add(additional);
        if requested > self.config.max_size {
            return Err(Error::capacity_exceeded(requested, self.config.max_size));
        }
        Ok(())
    }

    /// Pads so that the `len` bytes written next end on an `alignment` boundary
    /// (measured from the end of the buffer), and checks that the padding and
    /// those bytes fit.
    fn align(&mut self, len: usize, alignment: usize) -> Result<()> {
        self.min_align = self.min_align.max(alignment);
        let pad = padding_len(self.buf.len().wrapping_add(len), alignment);
        self.check_capacity(pad.saturating_add(len))?;
        self.buf.make_space(pad);
        Ok(())
    }

    fn push_scalar<T: Scalar>(&mut self, value: T) -> Result<usize> {
        self.align(T::SIZE, T::SIZE)?;
        let len = self.buf.make_space(T::SIZE);
        value.write_le(self.buf.rev_slice_mut(len, T::SIZE));
        Ok(len)
    }

    fn push_struct<S: NativeStruct>(&mut self, value: &S) -> Result<usize> {
        self.align(S::SIZE, S::ALIGNMENT)?;
        let len = self.buf.make_space(S::SIZE);
        value.write_to(self.buf.rev_slice_mut(len, S::SIZE));
        Ok(len)
    }

    /// Pushes the forward distance from the new value to the object at `target`.
    fn push_uoffset(&mut self, target: u32) -> Result<usize> {
        let target = target as usize;
        if target == 0 || target > self.buf.len() {
            return Err(Error::invalid_arg(
                "offset",
                format!(
                    "offset {target} does not refer to an object in this buffer of {} bytes",
                    self.buf.len()
                ),
            ));
        }
        self.align(SIZE_UOFFSET, SIZE_UOFFSET)?;
        let relative = self.buf.len() + SIZE_UOFFSET - target;
        self.push_scalar(relative as u32)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("len", &self.buf.len())
            .field("state", &self.state)
            .field("vtables", &self.vtables.len())
            .finish()
    }
}

/// An immutable, finished buffer.
#[derive(Debug, Clone)]
pub struct FinishedBuffer {
    bytes: Bytes,
    size_prefixed: bool,
}

impl FinishedBuffer {
    /// The finished bytes, starting with the root offset (or the size prefix).
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Starting read position of the data within the builder's allocation.
    pub fn start_position(&self) -> usize {
        self.bytes.offset_in_allocation()
    }

    pub fn is_size_prefixed(&self) -> bool {
        self.size_prefixed
    }

    /// Absolute position of the root table within [`data`](Self::data).
    pub fn root_position(&self) -> Result<usize> {
        reader::root_table_position(&self.bytes, self.size_prefixed)
    }
}

impl std::ops::Deref for FinishedBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.bytes
    }
}

impl AsRef<[u8]> for FinishedBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
