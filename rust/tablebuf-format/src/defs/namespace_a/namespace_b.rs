use tablebuf_common::{Result, error::Error};

use crate::{
    builder::Builder,
    layout::field_index_to_vtable_offset,
    offset::{AnyTable, Offset},
    reader::{Follow, ForwardsUOffset, Inline, Table, read_struct_at},
    scalar::{NativeStruct, Scalar},
};

/// `NamespaceA.NamespaceB.EnumInNestedNS`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum EnumInNestedNS {
    #[default]
    A = 0,
    B = 1,
    C = 2,
}

impl EnumInNestedNS {
    pub const FULLY_QUALIFIED_NAME: &'static str = "NamespaceA.NamespaceB.EnumInNestedNS";
    pub const ENUM_VALUES: [EnumInNestedNS; 3] =
        [EnumInNestedNS::A, EnumInNestedNS::B, EnumInNestedNS::C];

    pub const fn name(self) -> &'static str {
        match self {
            EnumInNestedNS::A => "A",
            EnumInNestedNS::B => "B",
            EnumInNestedNS::C => "C",
        }
    }
}

impl TryFrom<i8> for EnumInNestedNS {
    type Error = Error;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            0 => Ok(EnumInNestedNS::A),
            1 => Ok(EnumInNestedNS::B),
            2 => Ok(EnumInNestedNS::C),
            other => Err(Error::malformed(
                Self::FULLY_QUALIFIED_NAME,
                format!("unknown enum value {other}"),
            )),
        }
    }
}

impl From<EnumInNestedNS> for i8 {
    fn from(value: EnumInNestedNS) -> i8 {
        value as i8
    }
}

/// `NamespaceA.NamespaceB.StructInNestedNS`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StructInNestedNS {
    pub a: i32,
    pub b: i32,
}

impl StructInNestedNS {
    pub const FULLY_QUALIFIED_NAME: &'static str = "NamespaceA.NamespaceB.StructInNestedNS";

    pub fn new(a: i32, b: i32) -> StructInNestedNS {
        StructInNestedNS { a, b }
    }
}

impl NativeStruct for StructInNestedNS {
    const SIZE: usize = 8;
    const ALIGNMENT: usize = 4;

    fn write_to(&self, bytes: &mut [u8]) {
        self.a.write_le(&mut bytes[0..4]);
        self.b.write_le(&mut bytes[4..8]);
    }

    fn read_from(bytes: &[u8]) -> Self {
        StructInNestedNS {
            a: i32::read_le(&bytes[0..4]),
            b: i32::read_le(&bytes[4..8]),
        }
    }
}

impl<'a> Follow<'a> for StructInNestedNS {
    type Inner = StructInNestedNS;

    #[inline]
    fn follow(buf: &'a [u8], loc: usize) -> Result<StructInNestedNS> {
        read_struct_at(buf, loc)
    }
}

impl Inline for StructInNestedNS {
    const SIZE: usize = <Self as NativeStruct>::SIZE;
}

/// `NamespaceA.NamespaceB.TableInNestedNS`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableInNestedNS {
    pub foo: i32,
}

impl TableInNestedNS {
    pub const FULLY_QUALIFIED_NAME: &'static str = "NamespaceA.NamespaceB.TableInNestedNS";
    pub const VT_FOO: u16 = field_index_to_vtable_offset(0);
    const NUM_FIELDS: usize = 1;

    pub fn start(builder: &mut Builder) -> Result<()> {
        builder.start_object(Self::NUM_FIELDS)
    }

    pub fn add_foo(builder: &mut Builder, foo: i32) -> Result<()> {
        builder.add_field_slot(0, foo, 0)
    }

    pub fn end(builder: &mut Builder) -> Result<Offset<TableInNestedNS>> {
        Ok(builder.end_object()?.cast())
    }

    pub fn create(builder: &mut Builder, foo: i32) -> Result<Offset<TableInNestedNS>> {
        Self::start(builder)?;
        Self::add_foo(builder, foo)?;
        Self::end(builder)
    }

    pub fn pack(&self, builder: &mut Builder) -> Result<Offset<TableInNestedNS>> {
        Self::create(builder, self.foo)
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct TableInNestedNSRef<'a>(Table<'a>);

table_ref!(TableInNestedNSRef);

impl<'a> TableInNestedNSRef<'a> {
    pub fn foo(&self) -> Result<i32> {
        self.0.get_or::<i32>(TableInNestedNS::VT_FOO, 0)
    }

    pub fn unpack(&self) -> Result<TableInNestedNS> {
        let mut value = TableInNestedNS::default();
        self.unpack_to(&mut value)?;
        Ok(value)
    }

    pub fn unpack_to(&self, value: &mut TableInNestedNS) -> Result<()> {
        value.foo = self.foo()?;
        Ok(())
    }
}

impl<'a> TryFrom<TableInNestedNSRef<'a>> for TableInNestedNS {
    type Error = Error;

    fn try_from(value: TableInNestedNSRef<'a>) -> Result<Self> {
        value.unpack()
    }
}

/// Type tag of `NamespaceA.NamespaceB.UnionInNestedNS`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UnionInNestedNSType {
    #[default]
    None = 0,
    TableInNestedNS = 1,
}

impl TryFrom<u8> for UnionInNestedNSType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(UnionInNestedNSType::None),
            1 => Ok(UnionInNestedNSType::TableInNestedNS),
            other => Err(Error::malformed(
                UnionInNestedNS::FULLY_QUALIFIED_NAME,
                format!("unknown union tag {other}"),
            )),
        }
    }
}

/// `NamespaceA.NamespaceB.UnionInNestedNS`
///
/// On the wire a union occupies two slots: a `u8` type tag and a reference to
/// the member table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnionInNestedNS {
    TableInNestedNS(Box<TableInNestedNS>),
}

impl UnionInNestedNS {
    pub const FULLY_QUALIFIED_NAME: &'static str = "NamespaceA.NamespaceB.UnionInNestedNS";

    pub fn union_type(&self) -> UnionInNestedNSType {
        match self {
            UnionInNestedNS::TableInNestedNS(_) => UnionInNestedNSType::TableInNestedNS,
        }
    }

    /// Writes the member table and returns its untyped offset.
    pub fn pack(&self, builder: &mut Builder) -> Result<Offset<AnyTable>> {
        match self {
            UnionInNestedNS::TableInNestedNS(table) => Ok(table.pack(builder)?.as_any_table()),
        }
    }
}

/// A decoded union value borrowing from the buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnionInNestedNSRef<'a> {
    TableInNestedNS(TableInNestedNSRef<'a>),
}

impl<'a> UnionInNestedNSRef<'a> {
    /// Decodes the union member stored at `value_slot` of `table`, as selected
    /// by `tag`. A `None` tag, or a tag whose member is absent, yields `None`.
    pub(crate) fn read(
        table: &Table<'a>,
        tag: UnionInNestedNSType,
        value_slot: u16,
    ) -> Result<Option<UnionInNestedNSRef<'a>>> {
        match tag {
            UnionInNestedNSType::None => Ok(None),
            UnionInNestedNSType::TableInNestedNS => Ok(table
                .get::<ForwardsUOffset<TableInNestedNSRef<'a>>>(value_slot)?
                .map(UnionInNestedNSRef::TableInNestedNS)),
        }
    }

    pub fn union_type(&self) -> UnionInNestedNSType {
        match self {
            UnionInNestedNSRef::TableInNestedNS(_) => UnionInNestedNSType::TableInNestedNS,
        }
    }

    pub fn unpack(&self) -> Result<UnionInNestedNS> {
        match self {
            UnionInNestedNSRef::TableInNestedNS(table) => {
                Ok(UnionInNestedNS::TableInNestedNS(Box::new(table.unpack()?)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tablebuf_common::error::ErrorKind;

    use super::*;

    #[test]
    fn test_enum_conversion() {
        for value in EnumInNestedNS::ENUM_VALUES {
            assert_eq!(EnumInNestedNS::try_from(i8::from(value)).unwrap(), value);
        }
        assert_eq!(EnumInNestedNS::C.name(), "C");
        let e = EnumInNestedNS::try_from(3).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::MalformedBuffer { .. }));
    }

    #[test]
    fn test_struct_layout() {
        let mut bytes = [0u8; 8];
        StructInNestedNS::new(1, -1).write_to(&mut bytes);
        assert_eq!(bytes, [1, 0, 0, 0, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(StructInNestedNS::read_from(&bytes), StructInNestedNS::new(1, -1));
    }

    #[test]
    fn test_nested_table() {
        let mut builder = Builder::new();
        let root = TableInNestedNS::create(&mut builder, 1234).unwrap();
        let finished = builder.finish(root, false).unwrap();
        let table = TableInNestedNSRef::root(finished.data()).unwrap();
        assert_eq!(table.foo().unwrap(), 1234);
        assert_eq!(table.unpack().unwrap(), TableInNestedNS { foo: 1234 });
    }

    #[test]
    fn test_nested_table_default_foo() {
        let mut builder = Builder::new();
        let root = TableInNestedNS::create(&mut builder, 0).unwrap();
        let finished = builder.finish(root, false).unwrap();
        let table = TableInNestedNSRef::root(finished.data()).unwrap();
        assert!(!table.as_table().has_field(TableInNestedNS::VT_FOO));
        assert_eq!(table.foo().unwrap(), 0);
    }

    #[test]
    fn test_union_tag() {
        assert_eq!(
            UnionInNestedNSType::try_from(1).unwrap(),
            UnionInNestedNSType::TableInNestedNS
        );
        assert!(UnionInNestedNSType::try_from(2).is_err());
        let value = UnionInNestedNS::TableInNestedNS(Box::new(TableInNestedNS { foo: 3 }));
        assert_eq!(value.union_type(), UnionInNestedNSType::TableInNestedNS);
    }
}
