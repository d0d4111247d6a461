//! # Sheetdata Parser
//!
//! Reads the schema section of a sheet grid: the blocks above the `[Name]`
//! marker that declare enums, records, interfaces, constants and the
//! Design entity.
//!
//! ## Usage
//!
//! ```
//! # use sheetdata_core::grid::Grid;
//! # use sheetdata_parser::{ParseConfig, error::ParseError, parse_sheet};
//!
//! fn main() -> Result<(), ParseError> {
//!     let grid = Grid::from_rows(vec![
//!         vec!["[Enum]", "Grade"],
//!         vec!["Name", "Value"],
//!         vec!["Common", ""],
//!         vec!["Rare", "5"],
//!     ]);
//!     let schema = parse_sheet("Item", grid.view(), &ParseConfig::default())?;
//!     let (_, grade) = schema.enums().next().unwrap();
//!     assert_eq!(grade.members[1].value, 5);
//!     Ok(())
//! }
//! ```

pub mod error;

mod binder;
mod blocks;
mod config;
mod parser;
mod type_expr;

pub use config::ParseConfig;
pub use parser::{DATA_MARKER, NAME_MARKER, header_tag, is_header, parse_sheet};
