//! Declaration blocks and their element rows.

use std::fmt;

use crate::{
    cell::CellRef,
    schema::types::{ScalarType, TypeExpr},
};

/// The closed set of declaration block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Description,
    Enum,
    Record,
    Interface,
    Constant,
    Design,
}

impl BlockKind {
    /// The canonical Pascal-cased header tag.
    pub fn tag(self) -> &'static str {
        match self {
            BlockKind::Description => "Description",
            BlockKind::Enum => "Enum",
            BlockKind::Record => "Record",
            BlockKind::Interface => "Interface",
            BlockKind::Constant => "Constant",
            BlockKind::Design => "Design",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One declaration in a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Entity identifier from the header row; absent for Description,
    /// Constant and Design blocks.
    pub name: Option<String>,
    /// Header cell tokens after the tag, as written.
    pub options: Vec<String>,
    pub summary: Option<String>,
    /// The header cell.
    pub origin: CellRef,
    pub body: BlockBody,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match &self.body {
            BlockBody::Description(_) => BlockKind::Description,
            BlockBody::Enum(_) => BlockKind::Enum,
            BlockBody::Record(_) => BlockKind::Record,
            BlockBody::Interface => BlockKind::Interface,
            BlockBody::Constant(_) => BlockKind::Constant,
            BlockBody::Design(_) => BlockKind::Design,
        }
    }

    /// Returns the block name, or an empty string for unnamed kinds.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Kind-specific block contents.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockBody {
    Description(String),
    Enum(EnumBlock),
    Record(RecordBlock),
    Interface,
    Constant(Vec<ConstantField>),
    Design(DesignBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumBlock {
    /// Emitted at namespace scope rather than inside the sheet entity.
    pub global: bool,
    /// Integer backing type.
    pub backing: ScalarType,
    pub members: Vec<EnumMember>,
}

impl EnumBlock {
    /// Look up a member by its declared name.
    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    /// Explicit `Value` cell, when present.
    pub explicit: Option<i128>,
    /// The member's numeric value, explicit or continued from the previous
    /// member.
    pub value: i128,
    pub comment: Option<String>,
    pub origin: CellRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordBlock {
    pub global: bool,
    pub fields: Vec<RecordField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub ty: TypeExpr,
    pub optional: bool,
    pub comment: Option<String>,
    pub origin: CellRef,
    pub type_cell: CellRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignBlock {
    /// Inherited interface names, in input notation.
    pub interfaces: Vec<String>,
    pub fields: Vec<DesignField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignField {
    pub name: String,
    pub ty: TypeExpr,
    pub primary_key: bool,
    /// Target entity of a foreign key, as written.
    pub reference: Option<String>,
    pub optional: bool,
    pub comment: Option<String>,
    pub origin: CellRef,
    pub type_cell: CellRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantField {
    pub name: String,
    pub ty: TypeExpr,
    /// Raw value text: a literal for scalars and enums, JSON otherwise.
    pub value: String,
    pub comment: Option<String>,
    pub origin: CellRef,
    pub type_cell: CellRef,
    pub value_cell: CellRef,
}
