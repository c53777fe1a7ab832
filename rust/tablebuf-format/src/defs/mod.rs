//! Typed accessors for the namespace test schema.
//!
//! Each table has an owned type, used for building and unpacking, and a
//! borrowed `*Ref` view decoding fields in place from a finished buffer.
//!
//! ```text
//! namespace NamespaceA.NamespaceB;
//! table TableInNestedNS { foo: int; }
//! union UnionInNestedNS { TableInNestedNS }
//! enum EnumInNestedNS: byte { A, B, C }
//! struct StructInNestedNS { a: int; b: int; }
//!
//! namespace NamespaceA;
//! table TableInFirstNS {
//!     foo_table: NamespaceB.TableInNestedNS;
//!     foo_enum: NamespaceB.EnumInNestedNS;
//!     foo_union: NamespaceB.UnionInNestedNS;
//!     foo_struct: NamespaceB.StructInNestedNS;
//! }
//! table SecondTableInA { refer_to_c: NamespaceC.TableInC; }
//!
//! namespace NamespaceC;
//! table TableInC {
//!     refer_to_a1: NamespaceA.TableInFirstNS;
//!     refer_to_a2: NamespaceA.SecondTableInA;
//! }
//! ```

/// Implements the buffer plumbing shared by every `*Ref` table view.
macro_rules! table_ref {
    ($name:ident) => {
        impl<'a> $name<'a> {
            /// Reads the root table of `buf` as this type.
            pub fn root(buf: &'a [u8]) -> ::tablebuf_common::Result<$name<'a>> {
                $crate::reader::Table::root(buf).map($name)
            }

            /// Reads the root table of a size-prefixed `buf` as this type.
            pub fn size_prefixed_root(buf: &'a [u8]) -> ::tablebuf_common::Result<$name<'a>> {
                $crate::reader::Table::size_prefixed_root(buf).map($name)
            }

            /// The untyped table view.
            pub fn as_table(&self) -> $crate::reader::Table<'a> {
                self.0
            }
        }

        impl<'a> $crate::reader::Follow<'a> for $name<'a> {
            type Inner = $name<'a>;

            #[inline]
            fn follow(buf: &'a [u8], loc: usize) -> ::tablebuf_common::Result<$name<'a>> {
                $crate::reader::Table::new(buf, loc).map($name)
            }
        }

        impl ::std::fmt::Debug for $name<'_> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0.loc()).finish()
            }
        }
    };
}

pub mod namespace_a;
pub mod namespace_c;

/// Deepest `TableInC`/`SecondTableInA` nesting that `unpack` follows.
///
/// The two tables reference each other, so an untrusted buffer could
/// otherwise drive unbounded recursion.
pub const MAX_UNPACK_DEPTH: usize = 64;

fn check_unpack_depth(table: &str, depth: usize) -> ::tablebuf_common::Result<()> {
    if depth > MAX_UNPACK_DEPTH {
        return Err(::tablebuf_common::error::Error::malformed(
            table,
            format!("nesting exceeds {MAX_UNPACK_DEPTH} levels"),
        ));
    }
    Ok(())
}
