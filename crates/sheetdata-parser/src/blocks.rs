//! Block readers and the block registry.
//!
//! The registry maps each canonical block tag to its kind, whether the
//! block may appear more than once per sheet, and the function reading its
//! rows. Readers receive a view whose first row is the block header.

use indexmap::IndexMap;
use log::debug;

use sheetdata_core::{
    cell::CellRef,
    grid::GridView,
    schema::{
        Block, BlockBody, BlockKind, ConstantField, DesignBlock, DesignField, EnumBlock,
        EnumMember, RecordBlock, RecordField, ScalarType, TypeExpr,
    },
};

use crate::{
    binder::{BoundColumns, ElementField, ElementRow},
    config::ParseConfig,
    error::{Diagnostic, ErrorCode, Result},
    type_expr::parse_type,
};

/// Separators of the tokens in a block header cell.
const OPTION_SEPARATORS: [char; 3] = ['[', ']', ':'];

type ReadFn = fn(&BlockHeader<'_>, &ParseConfig) -> Result<BlockBody>;

/// A registered block kind.
pub(crate) struct BlockEntry {
    pub kind: BlockKind,
    pub allow_multiple: bool,
    read: ReadFn,
}

static REGISTRY: [BlockEntry; 6] = [
    BlockEntry {
        kind: BlockKind::Description,
        allow_multiple: false,
        read: read_description,
    },
    BlockEntry {
        kind: BlockKind::Enum,
        allow_multiple: true,
        read: read_enum,
    },
    BlockEntry {
        kind: BlockKind::Record,
        allow_multiple: true,
        read: read_record,
    },
    BlockEntry {
        kind: BlockKind::Interface,
        allow_multiple: true,
        read: read_interface,
    },
    BlockEntry {
        kind: BlockKind::Constant,
        allow_multiple: false,
        read: read_constant,
    },
    BlockEntry {
        kind: BlockKind::Design,
        allow_multiple: false,
        read: read_design,
    },
];

/// Look up a block kind by its canonical Pascal tag.
pub(crate) fn lookup(tag: &str) -> Option<&'static BlockEntry> {
    REGISTRY.iter().find(|entry| entry.kind.tag() == tag)
}

/// Split a header cell into its tokens.
pub(crate) fn header_tokens(cell: &str) -> Vec<&str> {
    cell.split(OPTION_SEPARATORS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// The header row of one block, with its options split out.
pub(crate) struct BlockHeader<'a> {
    view: GridView<'a>,
    options: Vec<String>,
}

impl<'a> BlockHeader<'a> {
    pub fn new(view: GridView<'a>) -> Self {
        let options = view
            .cell(0, 0)
            .map(header_tokens)
            .unwrap_or_default()
            .into_iter()
            .skip(1)
            .map(str::to_owned)
            .collect();
        Self { view, options }
    }

    /// Returns `true` if the header carries `option` (given in Pascal form).
    fn has_option(&self, option: &str, config: &ParseConfig) -> bool {
        let wanted = config.input_name(option);
        self.options.iter().any(|o| *o == wanted)
    }

    /// The block name cell, required for named kinds.
    fn name(&self, kind: BlockKind) -> Result<String> {
        match self.view.cell(0, 1) {
            Some(name) => Ok(name.trim().to_owned()),
            None => Err(Diagnostic::error(format!("`{kind}` block has no name"))
                .with_code(ErrorCode::E105)
                .with_label(self.view.cell_ref(0, 1), "expected a name here")),
        }
    }

    fn summary(&self) -> Option<String> {
        self.view.cell(0, 2).map(|s| s.trim().to_owned())
    }

    fn origin(&self) -> CellRef {
        self.view.cell_ref(0, 0)
    }
}

/// Read one block from a view starting at its header row.
pub(crate) fn read_block(
    entry: &BlockEntry,
    view: GridView<'_>,
    config: &ParseConfig,
) -> Result<Block> {
    let header = BlockHeader::new(view);
    let name = match entry.kind {
        BlockKind::Enum | BlockKind::Record | BlockKind::Interface => {
            Some(header.name(entry.kind)?)
        }
        _ => None,
    };
    let body = (entry.read)(&header, config)?;

    debug!(
        kind = entry.kind.tag(),
        cell = header.origin().to_a1(),
        rows = view.row_count();
        "Read block"
    );

    Ok(Block {
        name,
        options: header.options.clone(),
        summary: header.summary(),
        origin: header.origin(),
        body,
    })
}

fn read_description(header: &BlockHeader<'_>, _config: &ParseConfig) -> Result<BlockBody> {
    match header.view.cell(1, 0) {
        Some(text) => Ok(BlockBody::Description(text.trim().to_owned())),
        None => Err(Diagnostic::error("`Description` block has no text")
            .with_code(ErrorCode::E107)
            .with_label(header.view.cell_ref(1, 0), "expected the description here")),
    }
}

fn read_interface(_header: &BlockHeader<'_>, _config: &ParseConfig) -> Result<BlockBody> {
    Ok(BlockBody::Interface)
}

const ENUM_FIELDS: &[ElementField] = &[
    ElementField::essential("Name"),
    ElementField::optional("Value"),
    ElementField::optional("Comment"),
];

fn read_enum(header: &BlockHeader<'_>, config: &ParseConfig) -> Result<BlockBody> {
    let global = header.has_option("Global", config);
    let backing = header
        .options
        .iter()
        .filter_map(|o| ScalarType::from_keyword(o))
        .find(|s| s.is_integer())
        .unwrap_or(config.enum_default_type());
    // `integer_range` is `Some` for every integer backing type.
    let (min, max) = backing.integer_range().unwrap_or((0, 0));

    let bound = BoundColumns::bind(header.view, ENUM_FIELDS, config)?;
    let mut names = NameSet::default();
    let mut members = Vec::new();
    let mut next: i128 = 0;

    for row in bound.rows(config) {
        let row = row?;
        let name = required_text(&row, "Name")?;
        names.insert(&name, row.cell_ref("Name"))?;

        let explicit = match row.text("Value") {
            Some(text) => Some(text.parse::<i128>().map_err(|_| {
                enum_value_error(&row, format!("`{text}` is not an integer"), backing)
            })?),
            None => None,
        };
        let value = explicit.unwrap_or(next);
        if value < min || value > max {
            return Err(enum_value_error(
                &row,
                format!("value {value} of `{name}` does not fit in `{backing}`"),
                backing,
            ));
        }
        next = value + 1;

        members.push(EnumMember {
            name,
            explicit,
            value,
            comment: row.text("Comment").map(str::to_owned),
            origin: row.origin(),
        });
    }

    Ok(BlockBody::Enum(EnumBlock {
        global,
        backing,
        members,
    }))
}

fn enum_value_error(row: &ElementRow<'_, '_>, message: String, backing: ScalarType) -> Diagnostic {
    Diagnostic::error(message)
        .with_code(ErrorCode::E203)
        .with_label(row.cell_ref("Value"), "invalid enum value")
        .with_help(format!("the enum is backed by `{backing}`"))
}

const RECORD_FIELDS: &[ElementField] = &[
    ElementField::essential("Name"),
    ElementField::essential("Type"),
    ElementField::optional("Optional"),
    ElementField::optional("Comment"),
];

fn read_record(header: &BlockHeader<'_>, config: &ParseConfig) -> Result<BlockBody> {
    let global = header.has_option("Global", config);
    let bound = BoundColumns::bind(header.view, RECORD_FIELDS, config)?;
    let mut names = NameSet::default();
    let mut fields = Vec::new();

    for row in bound.rows(config) {
        let row = row?;
        let name = required_text(&row, "Name")?;
        names.insert(&name, row.cell_ref("Name"))?;
        let ty = type_cell(&row)?;
        let optional = optional_flag(&row, &ty)?;

        fields.push(RecordField {
            name,
            ty,
            optional,
            comment: row.text("Comment").map(str::to_owned),
            origin: row.origin(),
            type_cell: row.cell_ref("Type"),
        });
    }

    Ok(BlockBody::Record(RecordBlock { global, fields }))
}

const CONSTANT_FIELDS: &[ElementField] = &[
    ElementField::essential("Name"),
    ElementField::essential("Type"),
    ElementField::essential("Value"),
    ElementField::optional("Comment"),
];

fn read_constant(header: &BlockHeader<'_>, config: &ParseConfig) -> Result<BlockBody> {
    let bound = BoundColumns::bind(header.view, CONSTANT_FIELDS, config)?;
    let mut names = NameSet::default();
    let mut fields = Vec::new();

    for row in bound.rows(config) {
        let row = row?;
        let name = required_text(&row, "Name")?;
        names.insert(&name, row.cell_ref("Name"))?;
        let ty = type_cell(&row)?;

        fields.push(ConstantField {
            name,
            ty,
            value: row.raw("Value").unwrap_or_default().to_owned(),
            comment: row.text("Comment").map(str::to_owned),
            origin: row.origin(),
            type_cell: row.cell_ref("Type"),
            value_cell: row.cell_ref("Value"),
        });
    }

    Ok(BlockBody::Constant(fields))
}

const DESIGN_FIELDS: &[ElementField] = &[
    ElementField::essential("Name"),
    ElementField::essential("Type"),
    ElementField::essential_or_empty("IsPrimaryKey"),
    ElementField::optional("Reference"),
    ElementField::optional("Optional"),
    ElementField::optional("Comment"),
];

fn read_design(header: &BlockHeader<'_>, config: &ParseConfig) -> Result<BlockBody> {
    let interfaces = header
        .view
        .cell(0, 1)
        .map(|cell| {
            cell.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let bound = BoundColumns::bind(header.view, DESIGN_FIELDS, config)?;
    let mut names = NameSet::default();
    let mut fields = Vec::new();

    for row in bound.rows(config) {
        let row = row?;
        let name = required_text(&row, "Name")?;
        names.insert(&name, row.cell_ref("Name"))?;
        let ty = type_cell(&row)?;
        let optional = optional_flag(&row, &ty)?;

        fields.push(DesignField {
            name,
            ty,
            primary_key: row.flag("IsPrimaryKey")?,
            reference: row.text("Reference").map(str::to_owned),
            optional,
            comment: row.text("Comment").map(str::to_owned),
            origin: row.origin(),
            type_cell: row.cell_ref("Type"),
        });
    }

    if !fields.iter().any(|f| f.primary_key) {
        return Err(Diagnostic::error("`Design` block has no primary key")
            .with_code(ErrorCode::E201)
            .with_label(header.origin(), "block declared here")
            .with_help("set `IsPrimaryKey` to `true` on at least one field"));
    }

    Ok(BlockBody::Design(DesignBlock { interfaces, fields }))
}

/// Read an essential text cell; binding already guarantees it is non-blank.
fn required_text(row: &ElementRow<'_, '_>, field: &str) -> Result<String> {
    row.text(field).map(str::to_owned).ok_or_else(|| {
        Diagnostic::error(format!("missing `{field}` element"))
            .with_code(ErrorCode::E104)
            .with_label(row.cell_ref(field), "this cell must not be blank")
    })
}

fn type_cell(row: &ElementRow<'_, '_>) -> Result<TypeExpr> {
    let text = required_text(row, "Type")?;
    parse_type(&text).ok_or_else(|| {
        Diagnostic::error(format!("`{text}` is not a valid type"))
            .with_code(ErrorCode::E108)
            .with_label(row.cell_ref("Type"), "invalid type expression")
            .with_help("use a scalar keyword, a type name, `List<T>` or `T?`")
    })
}

fn optional_flag(row: &ElementRow<'_, '_>, ty: &TypeExpr) -> Result<bool> {
    let optional = row.flag("Optional")?;
    if optional && !ty.is_nullable() {
        return Err(Diagnostic::error(format!(
            "only nullable fields can be optional, found `{ty}`"
        ))
        .with_code(ErrorCode::E106)
        .with_label(row.cell_ref("Optional"), "field is not nullable")
        .with_help(format!("declare the type as `{ty}?`")));
    }
    Ok(optional)
}

/// Element names seen so far in one block.
#[derive(Default)]
struct NameSet {
    seen: IndexMap<String, CellRef>,
}

impl NameSet {
    fn insert(&mut self, name: &str, cell: CellRef) -> Result<()> {
        if let Some(&first) = self.seen.get(name) {
            return Err(Diagnostic::error(format!("element `{name}` is declared twice"))
                .with_code(ErrorCode::E202)
                .with_label(cell, "duplicate element")
                .with_secondary_label(first, "first declared here"));
        }
        self.seen.insert(name.to_owned(), cell);
        Ok(())
    }
}
