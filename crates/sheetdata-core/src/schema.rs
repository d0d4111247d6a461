//! Schema model for one sheet.
//!
//! The parser turns a grid into a [`SheetSchema`]: an ordered list of
//! [`Block`]s, each carrying the typed element rows of its declaration.
//! Type names inside blocks are kept as parsed [`TypeExpr`]s; resolving them
//! against the enums and records known to a compilation run produces
//! [`FieldType`]s.

mod block;
mod model;
mod types;

pub use block::{
    Block, BlockBody, BlockKind, ConstantField, DesignBlock, DesignField, EnumBlock, EnumMember,
    RecordBlock, RecordField,
};
pub use model::{DesignEntity, SheetSchema};
pub use types::{ConvertError, FieldType, ScalarType, TypeExpr};
