use tablebuf_common::{Result, error::Error};

use crate::{
    builder::Builder,
    defs::{check_unpack_depth, namespace_c::{TableInC, TableInCRef}},
    layout::field_index_to_vtable_offset,
    offset::{AnyTable, Offset},
    reader::{ForwardsUOffset, Table},
};

pub mod namespace_b;

use namespace_b::{
    EnumInNestedNS, StructInNestedNS, TableInNestedNS, TableInNestedNSRef, UnionInNestedNS,
    UnionInNestedNSRef, UnionInNestedNSType,
};

/// `NamespaceA.TableInFirstNS`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableInFirstNS {
    pub foo_table: Option<Box<TableInNestedNS>>,
    pub foo_enum: EnumInNestedNS,
    pub foo_union: Option<UnionInNestedNS>,
    pub foo_struct: Option<StructInNestedNS>,
}

impl TableInFirstNS {
    pub const FULLY_QUALIFIED_NAME: &'static str = "NamespaceA.TableInFirstNS";
    pub const VT_FOO_TABLE: u16 = field_index_to_vtable_offset(0);
    pub const VT_FOO_ENUM: u16 = field_index_to_vtable_offset(1);
    pub const VT_FOO_UNION_TYPE: u16 = field_index_to_vtable_offset(2);
    pub const VT_FOO_UNION: u16 = field_index_to_vtable_offset(3);
    pub const VT_FOO_STRUCT: u16 = field_index_to_vtable_offset(4);
    const NUM_FIELDS: usize = 5;

    pub fn start(builder: &mut Builder) -> Result<()> {
        builder.start_object(Self::NUM_FIELDS)
    }

    pub fn add_foo_table(
        builder: &mut Builder,
        foo_table: Option<Offset<TableInNestedNS>>,
    ) -> Result<()> {
        builder.add_field_offset(0, foo_table)
    }

    pub fn add_foo_enum(builder: &mut Builder, foo_enum: EnumInNestedNS) -> Result<()> {
        builder.add_field_slot(1, i8::from(foo_enum), i8::from(EnumInNestedNS::A))
    }

    pub fn add_foo_union_type(builder: &mut Builder, tag: UnionInNestedNSType) -> Result<()> {
        builder.add_field_slot(2, tag as u8, UnionInNestedNSType::None as u8)
    }

    pub fn add_foo_union(builder: &mut Builder, foo_union: Option<Offset<AnyTable>>) -> Result<()> {
        builder.add_field_offset(3, foo_union)
    }

    pub fn add_foo_struct(builder: &mut Builder, foo_struct: Option<&StructInNestedNS>) -> Result<()> {
        match foo_struct {
            Some(value) => builder.add_field_struct(4, value),
            None => Ok(()),
        }
    }

    pub fn end(builder: &mut Builder) -> Result<Offset<TableInFirstNS>> {
        Ok(builder.end_object()?.cast())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create(
        builder: &mut Builder,
        foo_table: Option<Offset<TableInNestedNS>>,
        foo_enum: EnumInNestedNS,
        foo_union_type: UnionInNestedNSType,
        foo_union: Option<Offset<AnyTable>>,
        foo_struct: Option<&StructInNestedNS>,
    ) -> Result<Offset<TableInFirstNS>> {
        Self::start(builder)?;
        Self::add_foo_table(builder, foo_table)?;
        Self::add_foo_union(builder, foo_union)?;
        Self::add_foo_struct(builder, foo_struct)?;
        Self::add_foo_union_type(builder, foo_union_type)?;
        Self::add_foo_enum(builder, foo_enum)?;
        Self::end(builder)
    }

    /// Writes this object and everything it references.
    pub fn pack(&self, builder: &mut Builder) -> Result<Offset<TableInFirstNS>> {
        let foo_table = self
            .foo_table
            .as_ref()
            .map(|table| table.pack(builder))
            .transpose()?;
        let foo_union = self
            .foo_union
            .as_ref()
            .map(|value| value.pack(builder))
            .transpose()?;
        let foo_union_type = self
            .foo_union
            .as_ref()
            .map_or(UnionInNestedNSType::None, UnionInNestedNS::union_type);
        Self::create(
            builder,
            foo_table,
            self.foo_enum,
            foo_union_type,
            foo_union,
            self.foo_struct.as_ref(),
        )
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct TableInFirstNSRef<'a>(Table<'a>);

table_ref!(TableInFirstNSRef);

impl<'a> TableInFirstNSRef<'a> {
    pub fn foo_table(&self) -> Result<Option<TableInNestedNSRef<'a>>> {
        self.0
            .get::<ForwardsUOffset<TableInNestedNSRef<'a>>>(TableInFirstNS::VT_FOO_TABLE)
    }

    pub fn foo_enum(&self) -> Result<EnumInNestedNS> {
        let raw = self
            .0
            .get_or::<i8>(TableInFirstNS::VT_FOO_ENUM, i8::from(EnumInNestedNS::A))?;
        EnumInNestedNS::try_from(raw)
    }

    pub fn foo_union_type(&self) -> Result<UnionInNestedNSType> {
        let raw = self.0.get_or::<u8>(
            TableInFirstNS::VT_FOO_UNION_TYPE,
            UnionInNestedNSType::None as u8,
        )?;
        UnionInNestedNSType::try_from(raw)
    }

    pub fn foo_union(&self) -> Result<Option<UnionInNestedNSRef<'a>>> {
        let tag = self.foo_union_type()?;
        UnionInNestedNSRef::read(&self.0, tag, TableInFirstNS::VT_FOO_UNION)
    }

    /// The `foo_union` member if it is a `TableInNestedNS`.
    pub fn foo_union_as_table_in_nested_ns(&self) -> Result<Option<TableInNestedNSRef<'a>>> {
        Ok(match self.foo_union()? {
            Some(UnionInNestedNSRef::TableInNestedNS(table)) => Some(table),
            None => None,
        })
    }

    pub fn foo_struct(&self) -> Result<Option<StructInNestedNS>> {
        self.0.get::<StructInNestedNS>(TableInFirstNS::VT_FOO_STRUCT)
    }

    pub fn unpack(&self) -> Result<TableInFirstNS> {
        let mut value = TableInFirstNS::default();
        self.unpack_to(&mut value)?;
        Ok(value)
    }

    pub fn unpack_to(&self, value: &mut TableInFirstNS) -> Result<()> {
        value.foo_table = match self.foo_table()? {
            Some(table) => Some(Box::new(table.unpack()?)),
            None => None,
        };
        value.foo_enum = self.foo_enum()?;
        value.foo_union = match self.foo_union()? {
            Some(member) => Some(member.unpack()?),
            None => None,
        };
        value.foo_struct = self.foo_struct()?;
        Ok(())
    }
}

impl<'a> TryFrom<TableInFirstNSRef<'a>> for TableInFirstNS {
    type Error = Error;

    fn try_from(value: TableInFirstNSRef<'a>) -> Result<Self> {
        value.unpack()
    }
}

/// `NamespaceA.SecondTableInA`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecondTableInA {
    pub refer_to_c: Option<Box<TableInC>>,
}

impl SecondTableInA {
    pub const FULLY_QUALIFIED_NAME: &'static str = "NamespaceA.SecondTableInA";
    pub const VT_REFER_TO_C: u16 = field_index_to_vtable_offset(0);
    const NUM_FIELDS: usize = 1;

    pub fn start(builder: &mut Builder) -> Result<()> {
        builder.start_object(Self::NUM_FIELDS)
    }

    pub fn add_refer_to_c(builder: &mut Builder, refer_to_c: Option<Offset<TableInC>>) -> Result<()> {
        builder.add_field_offset(0, refer_to_c)
    }

    pub fn end(builder: &mut Builder) -> Result<Offset<SecondTableInA>> {
        Ok(builder.end_object()?.cast())
    }

    pub fn create(
        builder: &mut Builder,
        refer_to_c: Option<Offset<TableInC>>,
    ) -> Result<Offset<SecondTableInA>> {
        Self::start(builder)?;
        Self::add_refer_to_c(builder, refer_to_c)?;
        Self::end(builder)
    }

    /// Writes this object and everything it references.
    pub fn pack(&self, builder: &mut Builder) -> Result<Offset<SecondTableInA>> {
        let refer_to_c = self
            .refer_to_c
            .as_ref()
            .map(|table| table.pack(builder))
            .transpose()?;
        Self::create(builder, refer_to_c)
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct SecondTableInARef<'a>(Table<'a>);

table_ref!(SecondTableInARef);

impl<'a> SecondTableInARef<'a> {
    pub fn refer_to_c(&self) -> Result<Option<TableInCRef<'a>>> {
        self.0
            .get::<ForwardsUOffset<TableInCRef<'a>>>(SecondTableInA::VT_REFER_TO_C)
    }

    pub fn unpack(&self) -> Result<SecondTableInA> {
        let mut value = SecondTableInA::default();
        self.unpack_to(&mut value)?;
        Ok(value)
    }

    /// Fails with `MalformedBuffer` past [`MAX_UNPACK_DEPTH`](crate::defs::MAX_UNPACK_DEPTH) nested tables.
    pub fn unpack_to(&self, value: &mut SecondTableInA) -> Result<()> {
        self.unpack_to_depth(value, 0)
    }

    pub(crate) fn unpack_to_depth(&self, value: &mut SecondTableInA, depth: usize) -> Result<()> {
        check_unpack_depth(SecondTableInA::FULLY_QUALIFIED_NAME, depth)?;
        value.refer_to_c = match self.refer_to_c()? {
            Some(table) => {
                let mut c = TableInC::default();
                table.unpack_to_depth(&mut c, depth + 1)?;
                Some(Box::new(c))
            }
            None => None,
        };
        Ok(())
    }
}

impl<'a> TryFrom<SecondTableInARef<'a>> for SecondTableInA {
    type Error = Error;

    fn try_from(value: SecondTableInARef<'a>) -> Result<Self> {
        value.unpack()
    }
}
