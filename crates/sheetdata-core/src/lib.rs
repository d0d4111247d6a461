//! Sheetdata Core Types and Definitions
//!
//! This crate provides the foundational types shared by every stage of the
//! sheetdata compiler. It includes:
//!
//! - **Cells**: Spreadsheet-style coordinates ([`cell::CellRef`])
//! - **Grids**: The immutable cell matrix and its rectangular views ([`grid`] module)
//! - **Notation**: Identifier casing conversion ([`notation::Notation`])
//! - **Schema**: The schema model produced by the parser ([`schema`] module)
//! - **Values**: Materialized data trees ([`value::Value`])

pub mod cell;
pub mod grid;
pub mod notation;
pub mod schema;
pub mod value;
