use tablebuf_common::{Result, error::Error};

use crate::{
    builder::Builder,
    defs::{
        check_unpack_depth,
        namespace_a::{SecondTableInA, SecondTableInARef, TableInFirstNS, TableInFirstNSRef},
    },
    layout::field_index_to_vtable_offset,
    offset::Offset,
    reader::{ForwardsUOffset, Table},
};

/// `NamespaceC.TableInC`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableInC {
    pub refer_to_a1: Option<Box<TableInFirstNS>>,
    pub refer_to_a2: Option<Box<SecondTableInA>>,
}

impl TableInC {
    pub const FULLY_QUALIFIED_NAME: &'static str = "NamespaceC.TableInC";
    pub const VT_REFER_TO_A1: u16 = field_index_to_vtable_offset(0);
    pub const VT_REFER_TO_A2: u16 = field_index_to_vtable_offset(1);
    const NUM_FIELDS: usize = 2;

    pub fn start(builder: &mut Builder) -> Result<()> {
        builder.start_object(Self::NUM_FIELDS)
    }

    pub fn add_refer_to_a1(
        builder: &mut Builder,
        refer_to_a1: Option<Offset<TableInFirstNS>>,
    ) -> Result<()> {
        builder.add_field_offset(0, refer_to_a1)
    }

    pub fn add_refer_to_a2(
        builder: &mut Builder,
        refer_to_a2: Option<Offset<SecondTableInA>>,
    ) -> Result<()> {
        builder.add_field_offset(1, refer_to_a2)
    }

    pub fn end(builder: &mut Builder) -> Result<Offset<TableInC>> {
        Ok(builder.end_object()?.cast())
    }

    pub fn create(
        builder: &mut Builder,
        refer_to_a1: Option<Offset<TableInFirstNS>>,
        refer_to_a2: Option<Offset<SecondTableInA>>,
    ) -> Result<Offset<TableInC>> {
        Self::start(builder)?;
        Self::add_refer_to_a2(builder, refer_to_a2)?;
        Self::add_refer_to_a1(builder, refer_to_a1)?;
        Self::end(builder)
    }

    pub fn pack(&self, builder: &mut Builder) -> Result<Offset<TableInC>> {
        let refer_to_a1 = self
            .refer_to_a1
            .as_ref()
            .map(|table| table.pack(builder))
            .transpose()?;
        let refer_to_a2 = self
            .refer_to_a2
            .as_ref()
            .map(|table| table.pack(builder))
            .transpose()?;
        Self::create(builder, refer_to_a1, refer_to_a2)
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct TableInCRef<'a>(Table<'a>);

table_ref!(TableInCRef);

impl<'a> TableInCRef<'a> {
    pub fn refer_to_a1(&self) -> Result<Option<TableInFirstNSRef<'a>>> {
        self.0
            .get::<ForwardsUOffset<TableInFirstNSRef<'a>>>(TableInC::VT_REFER_TO_A1)
    }

    pub fn refer_to_a2(&self) -> Result<Option<SecondTableInARef<'a>>> {
        self.0
            .get::<ForwardsUOffset<SecondTableInARef<'a>>>(TableInC::VT_REFER_TO_A2)
    }

    pub fn unpack(&self) -> Result<TableInC> {
        let mut value = TableInC::default();
        self.unpack_to(&mut value)?;
        Ok(value)
    }

    /// Fails with `MalformedBuffer` past [`MAX_UNPACK_DEPTH`](crate::defs::MAX_UNPACK_DEPTH) nested tables.
    pub fn unpack_to(&self, value: &mut TableInC) -> Result<()> {
        self.unpack_to_depth(value, 0)
    }

    pub(crate) fn unpack_to_depth(&self, value: &mut TableInC, depth: usize) -> Result<()> {
        check_unpack_depth(TableInC::FULLY_QUALIFIED_NAME, depth)?;
        value.refer_to_a1 = match self.refer_to_a1()? {
            Some(table) => Some(Box::new(table.unpack()?)),
            None => None,
        };
        value.refer_to_a2 = match self.refer_to_a2()? {
            Some(table) => {
                let mut a2 = SecondTableInA::default();
                table.unpack_to_depth(&mut a2, depth + 1)?;
                Some(Box::new(a2))
            }
            None => None,
        };
        Ok(())
    }
}

impl<'a> TryFrom<TableInCRef<'a>> for TableInC {
    type Error = Error;

    fn try_from(value: TableInCRef<'a>) -> Result<Self> {
        value.unpack()
    }
}

#[cfg(test)]
mod tests {
    use tablebuf_common::error::ErrorKind;

    use super::*;

    #[test]
    fn test_table_in_c_references() {
        let mut builder = Builder::new();
        let second = SecondTableInA::create(&mut builder, None).unwrap();
        let first = TableInFirstNS::create(
            &mut builder,
            None,
            Default::default(),
            Default::default(),
            None,
            None,
        )
        .unwrap();
        let root = TableInC::create(&mut builder, Some(first), Some(second)).unwrap();
        let finished = builder.finish(root, false).unwrap();

        let table = TableInCRef::root(finished.data()).unwrap();
        assert!(table.refer_to_a1().unwrap().is_some());
        let a2 = table.refer_to_a2().unwrap().unwrap();
        assert!(a2.refer_to_c().unwrap().is_none());
        assert_eq!(
            table.unpack().unwrap(),
            TableInC {
                refer_to_a1: Some(Box::default()),
                refer_to_a2: Some(Box::default()),
            }
        );
    }

    fn nested_chain(builder: &mut Builder, levels: usize) -> Offset<TableInC> {
        let mut c = TableInC::create(builder, None, None).unwrap();
        for _ in 0..levels {
            let a2 = SecondTableInA::create(builder, Some(c)).unwrap();
            c = TableInC::create(builder, None, Some(a2)).unwrap();
        }
        c
    }

    #[test]
    fn test_unpack_depth_limit() {
        let mut builder = Builder::new();
        let root = nested_chain(&mut builder, 10);
        let finished = builder.finish(root, false).unwrap();
        let mut value = TableInCRef::root(finished.data()).unwrap().unpack().unwrap();
        let mut levels = 0;
        while let Some(a2) = value.refer_to_a2 {
            value = *a2.refer_to_c.unwrap();
            levels += 1;
        }
        assert_eq!(levels, 10);

        let mut builder = Builder::new();
        let root = nested_chain(&mut builder, crate::defs::MAX_UNPACK_DEPTH + 6);
        let finished = builder.finish(root, false).unwrap();
        let table = TableInCRef::root(finished.data()).unwrap();
        let e = table.unpack().unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::MalformedBuffer { .. }));
        let a2 = table.refer_to_a2().unwrap().unwrap();
        assert!(matches!(
            a2.unpack().unwrap_err().kind(),
            ErrorKind::MalformedBuffer { .. }
        ));
    }

    #[test]
    fn test_table_in_c_empty() {
        let mut builder = Builder::new();
        let root = TableInC::create(&mut builder, None, None).unwrap();
        let finished = builder.finish(root, false).unwrap();
        let table = TableInCRef::root(finished.data()).unwrap();
        assert_eq!(table.as_table().vtable().num_fields(), 0);
        assert_eq!(table.unpack().unwrap(), TableInC::default());
    }
}
