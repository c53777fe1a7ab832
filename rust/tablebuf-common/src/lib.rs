//! Core definitions (errors and result helpers), relied upon by all tablebuf-* crates.

pub mod error;
pub mod result;

pub use result::Result;
