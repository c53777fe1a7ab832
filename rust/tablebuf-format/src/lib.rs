//! Zero-copy table/vtable binary encoding: a backward-growing buffer builder,
//! bounds-checked in-place readers, and accessor definitions for the namespace
//! test schema built on top of them.

pub mod builder;
pub mod defs;
pub mod layout;
pub mod message;
pub mod offset;
pub mod reader;
pub mod scalar;

pub use builder::{Builder, BuilderConfig, FinishedBuffer, TableWriter};
pub use offset::{AnyTable, Offset};
pub use reader::{ForwardsUOffset, Follow, Inline, Table, VTable, Vector};
pub use scalar::{NativeStruct, Scalar};
