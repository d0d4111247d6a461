use crate::{
    cell::CellRef,
    schema::block::{
        Block, BlockBody, BlockKind, ConstantField, DesignBlock, DesignField, EnumBlock,
        RecordBlock,
    },
};

/// The parsed schema of one sheet.
///
/// Blocks keep their sheet order. Accessors filter them by kind; a sheet has
/// at most one Description, Design and Constant block.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSchema {
    sheet: String,
    blocks: Vec<Block>,
}

impl SheetSchema {
    pub fn new(sheet: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            sheet: sheet.into(),
            blocks,
        }
    }

    /// The sheet name the schema was parsed from.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn description(&self) -> Option<&str> {
        self.blocks.iter().find_map(|b| match &b.body {
            BlockBody::Description(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Enum blocks with their names.
    pub fn enums(&self) -> impl Iterator<Item = (&Block, &EnumBlock)> {
        self.blocks.iter().filter_map(|b| match &b.body {
            BlockBody::Enum(e) => Some((b, e)),
            _ => None,
        })
    }

    /// Record blocks with their names.
    pub fn records(&self) -> impl Iterator<Item = (&Block, &RecordBlock)> {
        self.blocks.iter().filter_map(|b| match &b.body {
            BlockBody::Record(r) => Some((b, r)),
            _ => None,
        })
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Block> {
        self.blocks
            .iter()
            .filter(|b| b.kind() == BlockKind::Interface)
    }

    pub fn design(&self) -> Option<(&Block, &DesignBlock)> {
        self.blocks.iter().find_map(|b| match &b.body {
            BlockBody::Design(d) => Some((b, d)),
            _ => None,
        })
    }

    pub fn constant(&self) -> Option<(&Block, &[ConstantField])> {
        self.blocks.iter().find_map(|b| match &b.body {
            BlockBody::Constant(c) => Some((b, c.as_slice())),
            _ => None,
        })
    }

    /// Returns `true` if the sheet declares a data entity.
    pub fn has_entity(&self) -> bool {
        self.design().is_some() || self.constant().is_some()
    }

    /// The Design block viewed as the sheet's data entity.
    pub fn design_entity(&self) -> Option<DesignEntity<'_>> {
        self.design().map(|(block, design)| DesignEntity {
            origin: block.origin,
            fields: &design.fields,
            interfaces: &design.interfaces,
        })
    }
}

/// The primary data type of a sheet with a Design block.
#[derive(Debug, Clone, Copy)]
pub struct DesignEntity<'a> {
    origin: CellRef,
    fields: &'a [DesignField],
    interfaces: &'a [String],
}

impl<'a> DesignEntity<'a> {
    /// The Design block header cell.
    pub fn origin(&self) -> CellRef {
        self.origin
    }

    pub fn fields(&self) -> &'a [DesignField] {
        self.fields
    }

    pub fn interfaces(&self) -> &'a [String] {
        self.interfaces
    }

    /// Primary key fields in declaration order; composite when more than one.
    pub fn key_fields(&self) -> impl Iterator<Item = &'a DesignField> + use<'a> {
        self.fields.iter().filter(|f| f.primary_key)
    }

    pub fn field(&self, name: &str) -> Option<&'a DesignField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ScalarType, TypeExpr};

    fn field(name: &str, pk: bool) -> DesignField {
        DesignField {
            name: name.into(),
            ty: TypeExpr::Scalar(ScalarType::Int),
            primary_key: pk,
            reference: None,
            optional: false,
            comment: None,
            origin: CellRef::new(2, 0),
            type_cell: CellRef::new(2, 1),
        }
    }

    fn design_block(fields: Vec<DesignField>) -> Block {
        Block {
            name: None,
            options: Vec::new(),
            summary: None,
            origin: CellRef::new(0, 0),
            body: BlockBody::Design(DesignBlock {
                interfaces: vec!["Named".into()],
                fields,
            }),
        }
    }

    #[test]
    fn test_design_entity_key_fields() {
        let schema = SheetSchema::new(
            "Item",
            vec![design_block(vec![
                field("Group", true),
                field("Id", true),
                field("Count", false),
            ])],
        );

        let entity = schema.design_entity().unwrap();
        let keys: Vec<_> = entity.key_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(keys, vec!["Group", "Id"]);
        assert_eq!(entity.interfaces(), ["Named".to_owned()]);
        assert!(entity.field("Count").is_some());
        assert!(schema.has_entity());
        assert!(schema.constant().is_none());
    }

    #[test]
    fn test_schema_without_entity() {
        let schema = SheetSchema::new(
            "Shared",
            vec![Block {
                name: Some("Grade".into()),
                options: vec!["Global".into()],
                summary: None,
                origin: CellRef::new(0, 0),
                body: BlockBody::Interface,
            }],
        );

        assert!(!schema.has_entity());
        assert!(schema.design_entity().is_none());
        assert_eq!(schema.interfaces().count(), 1);
        assert_eq!(schema.sheet(), "Shared");
    }
}
