//! Named type resolution for one sheet.
//!
//! A sheet sees its own enums and records plus the `Global` enums and
//! records of every other sheet in the run. Its own declarations shadow
//! global ones. A type cell may name a type by its declared name or by its
//! generated name.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::trace;

use sheetdata_core::{
    cell::CellRef,
    schema::{Block, EnumBlock, FieldType, RecordBlock, ScalarType, SheetSchema, TypeExpr},
    value::Value,
};
use sheetdata_parser::error::{Diagnostic, ErrorCode};

use crate::naming::Naming;

/// A field with its resolved type and generated property name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    /// Declared name, in input notation.
    pub name: String,
    /// Property name in generated code and JSON.
    pub emitted: String,
    pub ty: FieldType,
    /// Omitted from JSON when null.
    pub optional: bool,
}

/// An ordered set of resolved fields: a record type or the sheet entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordShape {
    fields: Vec<ResolvedField>,
}

impl RecordShape {
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    /// Find a field by declared name, in any notation the sheet may use.
    pub fn field(&self, name: &str, naming: &Naming<'_>) -> Option<&ResolvedField> {
        self.fields
            .iter()
            .find(|f| f.name == name || f.emitted == name)
            .or_else(|| {
                let wanted = naming.public_variable(name);
                self.fields
                    .iter()
                    .find(|f| naming.public_variable(&f.name) == wanted)
            })
    }
}

/// Declared named types before resolution.
#[derive(Clone, Copy)]
enum Declared<'a> {
    Enum(&'a EnumBlock),
    Record(&'a RecordBlock),
}

/// Every type a sheet can see, resolved.
pub struct TypeCatalog<'a> {
    naming: Naming<'a>,
    enums: IndexMap<String, &'a EnumBlock>,
    records: IndexMap<String, RecordShape>,
    /// Generated names of named types, mapped to declared names.
    aliases: HashMap<String, String>,
    entity: Option<RecordShape>,
    constants: RecordShape,
}

impl<'a> TypeCatalog<'a> {
    /// Resolve every type the sheet uses.
    ///
    /// # Errors
    ///
    /// - `E200` for a type name that is not a scalar, enum or record
    /// - `E202` for two enums or records of one sheet sharing a name
    pub fn build(
        schema: &'a SheetSchema,
        others: impl IntoIterator<Item = &'a SheetSchema>,
        naming: Naming<'a>,
    ) -> Result<Self, Diagnostic> {
        let mut declared: IndexMap<String, Declared<'a>> = IndexMap::new();
        let mut origins: HashMap<&str, CellRef> = HashMap::new();

        for (block, declaration) in declarations(schema) {
            let name = block.name_or_empty();
            if let Some(&first) = origins.get(name) {
                return Err(Diagnostic::error(format!("type `{name}` is declared twice"))
                    .with_code(ErrorCode::E202)
                    .with_label(block.origin, "duplicate type")
                    .with_secondary_label(first, "first declared here"));
            }
            origins.insert(name, block.origin);
            declared.insert(name.to_owned(), declaration);
        }

        for other in others {
            if other.sheet() == schema.sheet() {
                continue;
            }
            for (block, declaration) in declarations(other) {
                let global = match declaration {
                    Declared::Enum(e) => e.global,
                    Declared::Record(r) => r.global,
                };
                if global {
                    declared
                        .entry(block.name_or_empty().to_owned())
                        .or_insert(declaration);
                }
            }
        }

        let mut aliases = HashMap::new();
        for (name, declaration) in &declared {
            let emitted = match declaration {
                Declared::Enum(_) => naming.enum_name(name),
                Declared::Record(_) => naming.record_name(name),
            };
            if emitted != *name && !declared.contains_key(&emitted) {
                aliases.entry(emitted).or_insert_with(|| name.clone());
            }
        }

        let mut resolver = Resolver {
            declared: &declared,
            aliases: &aliases,
            records: IndexMap::new(),
            pending: Vec::new(),
        };

        for (block, _) in schema.records() {
            resolver.pending.push(block.name_or_empty().to_owned());
        }

        let entity = match schema.design_entity() {
            Some(design) => {
                let mut fields = Vec::with_capacity(design.fields().len());
                for field in design.fields() {
                    let mut ty = resolver.resolve(&field.ty, field.type_cell)?;
                    if let Some(target) = &field.reference {
                        ty = reference(ty, target.clone());
                    }
                    fields.push(ResolvedField {
                        name: field.name.clone(),
                        emitted: naming.public_variable(&field.name),
                        ty,
                        optional: field.optional,
                    });
                }
                Some(RecordShape { fields })
            }
            None => None,
        };

        let mut constants = RecordShape::default();
        if let Some((_, fields)) = schema.constant() {
            for field in fields {
                constants.fields.push(ResolvedField {
                    name: field.name.clone(),
                    emitted: naming.public_variable(&field.name),
                    ty: resolver.resolve(&field.ty, field.type_cell)?,
                    optional: false,
                });
            }
        }

        resolver.drain(&naming)?;
        let records = resolver.records;

        let enums = declared
            .iter()
            .filter_map(|(name, declaration)| match declaration {
                Declared::Enum(e) => Some((name.clone(), *e)),
                Declared::Record(_) => None,
            })
            .collect();

        trace!(sheet = schema.sheet(), records = records.len(); "Type catalog built");
        Ok(Self {
            naming,
            enums,
            records,
            aliases,
            entity,
            constants,
        })
    }

    pub fn naming(&self) -> &Naming<'a> {
        &self.naming
    }

    /// The sheet entity's Design fields.
    pub fn entity(&self) -> Option<&RecordShape> {
        self.entity.as_ref()
    }

    /// The sheet's constants, in declaration order.
    pub fn constants(&self) -> &RecordShape {
        &self.constants
    }

    pub fn enum_block(&self, name: &str) -> Option<&'a EnumBlock> {
        self.enums.get(self.canonical(name)).copied()
    }

    pub fn record(&self, name: &str) -> Option<&RecordShape> {
        self.records.get(self.canonical(name))
    }

    fn canonical<'n>(&'n self, name: &'n str) -> &'n str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Convert enum cell text into the emitted member name.
    ///
    /// Accepts the member's declared name, its generated name, or its
    /// integer value. An integer matching no member is kept as a number.
    pub fn enum_value(&self, name: &str, text: &str) -> Option<Value> {
        let block = self.enum_block(name)?;
        let text = text.trim();
        let member = block
            .members
            .iter()
            .find(|m| m.name == text || self.naming.enum_item(&m.name) == text);
        if let Some(member) = member {
            return Some(Value::Enum(self.naming.enum_item(&member.name)));
        }

        let n: i128 = text.parse().ok()?;
        let (min, max) = block.backing.integer_range()?;
        if n < min || n > max {
            return None;
        }
        Some(match block.members.iter().find(|m| m.value == n) {
            Some(member) => Value::Enum(self.naming.enum_item(&member.name)),
            None => Value::from_integer(n),
        })
    }

    /// The value of a default-constructed `ty`.
    ///
    /// Nested records inside a record stay null; lists start empty.
    pub fn zero(&self, ty: &FieldType) -> Value {
        match ty {
            FieldType::Scalar(scalar) => scalar.zero(),
            FieldType::Enum(name) => self
                .enum_block(name)
                .and_then(|block| block.members.iter().find(|m| m.value == 0))
                .map(|member| Value::Enum(self.naming.enum_item(&member.name)))
                .unwrap_or(Value::Int(0)),
            FieldType::Record(name) => match self.record(name) {
                Some(shape) => self.zero_shape(shape),
                None => Value::Null,
            },
            FieldType::List(_) => Value::List(Vec::new()),
            FieldType::Nullable(_) => Value::Null,
            FieldType::Reference { key, .. } => self.zero(key),
        }
    }

    /// A record of zeroed fields.
    pub fn zero_shape(&self, shape: &RecordShape) -> Value {
        Value::Record(
            shape
                .fields
                .iter()
                .map(|field| {
                    let value = match &field.ty {
                        FieldType::Record(_) => Value::Null,
                        ty => self.zero(ty),
                    };
                    (field.emitted.clone(), value)
                })
                .collect(),
        )
    }

    /// The filler for list slots skipped while growing a list.
    pub fn list_filler(&self, element: &FieldType) -> Value {
        match element.storage() {
            FieldType::Scalar(ScalarType::String) => Value::Null,
            ty => self.zero(ty),
        }
    }
}

fn declarations(schema: &SheetSchema) -> impl Iterator<Item = (&Block, Declared<'_>)> {
    schema
        .enums()
        .map(|(block, e)| (block, Declared::Enum(e)))
        .chain(schema.records().map(|(block, r)| (block, Declared::Record(r))))
}

fn reference(ty: FieldType, target: String) -> FieldType {
    match ty {
        FieldType::List(element) => FieldType::List(Box::new(FieldType::Reference {
            key: element,
            target,
        })),
        key => FieldType::Reference {
            key: Box::new(key),
            target,
        },
    }
}

struct Resolver<'c, 'a> {
    declared: &'c IndexMap<String, Declared<'a>>,
    aliases: &'c HashMap<String, String>,
    records: IndexMap<String, RecordShape>,
    /// Records referenced but not yet resolved.
    pending: Vec<String>,
}

impl Resolver<'_, '_> {
    fn resolve(&mut self, expr: &TypeExpr, cell: CellRef) -> Result<FieldType, Diagnostic> {
        match expr {
            TypeExpr::Scalar(scalar) => Ok(FieldType::Scalar(*scalar)),
            TypeExpr::List(inner) => Ok(FieldType::List(Box::new(self.resolve(inner, cell)?))),
            TypeExpr::Nullable(inner) => {
                Ok(FieldType::Nullable(Box::new(self.resolve(inner, cell)?)))
            }
            TypeExpr::Named(name) => {
                let key = self.aliases.get(name).unwrap_or(name);
                match self.declared.get(key) {
                    Some(Declared::Enum(_)) => Ok(FieldType::Enum(key.clone())),
                    Some(Declared::Record(_)) => {
                        self.pending.push(key.clone());
                        Ok(FieldType::Record(key.clone()))
                    }
                    None => Err(Diagnostic::error(format!("undefined type `{name}`"))
                        .with_code(ErrorCode::E200)
                        .with_label(cell, "unknown type")
                        .with_help(
                            "declare an Enum or Record block with this name, \
                             or mark one in another sheet as `Global`",
                        )),
                }
            }
        }
    }

    fn drain(&mut self, naming: &Naming<'_>) -> Result<(), Diagnostic> {
        let mut done: HashSet<String> = HashSet::new();
        while let Some(name) = self.pending.pop() {
            if !done.insert(name.clone()) {
                continue;
            }
            let Some(Declared::Record(record)) = self.declared.get(&name).copied() else {
                continue;
            };

            let mut fields = Vec::with_capacity(record.fields.len());
            for field in &record.fields {
                fields.push(ResolvedField {
                    name: field.name.clone(),
                    emitted: naming.record_property(&field.name),
                    ty: self.resolve(&field.ty, field.type_cell)?,
                    optional: field.optional,
                });
            }
            self.records.insert(name, RecordShape { fields });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sheetdata_core::{grid::Grid, notation::Notation};
    use sheetdata_parser::{ParseConfig, parse_sheet};

    use super::*;
    use crate::config::NamingConfig;

    fn schema(name: &str, rows: Vec<Vec<&str>>) -> SheetSchema {
        let grid = Grid::from_rows(rows);
        parse_sheet(name, grid.view(), &ParseConfig::default()).unwrap()
    }

    fn shared() -> SheetSchema {
        schema(
            "Shared",
            vec![
                vec!["[Enum:Global]", "Grade"],
                vec!["Name", "Value"],
                vec!["Common", ""],
                vec!["Rare", "3"],
                vec!["[Record:Global]", "ImageInfo"],
                vec!["Name", "Type"],
                vec!["AtlasName", "string"],
                vec!["[Enum]", "Hidden"],
                vec!["Name"],
                vec!["X"],
            ],
        )
    }

    fn item() -> SheetSchema {
        schema(
            "Item",
            vec![
                vec!["[Record]", "Stat"],
                vec!["Name", "Type", "Optional"],
                vec!["Kind", "string", ""],
                vec!["Bonus", "int?", "true"],
                vec!["Icon", "ImageInfo", ""],
                vec!["[Design]"],
                vec!["Name", "Type", "IsPrimaryKey", "Reference"],
                vec!["Id", "int", "true", ""],
                vec!["Grade", "Grade", "", ""],
                vec!["Stats", "List<Stat>", "", ""],
                vec!["TextIds", "List<string>", "", "Text"],
            ],
        )
    }

    #[test]
    fn test_resolves_local_and_global_types() {
        let config = NamingConfig::default();
        let shared = shared();
        let item = item();
        let others = [shared];
        let catalog =
            TypeCatalog::build(&item, &others, Naming::new(Notation::Pascal, &config)).unwrap();

        let entity = catalog.entity().unwrap();
        assert_eq!(entity.fields()[1].ty, FieldType::Enum("Grade".into()));
        assert_eq!(
            entity.fields()[3].ty,
            FieldType::List(Box::new(FieldType::Reference {
                key: Box::new(FieldType::Scalar(ScalarType::String)),
                target: "Text".into(),
            }))
        );
        assert!(catalog.record("Stat").is_some());
        assert!(catalog.record("ImageInfo").is_some());
        assert!(catalog.enum_block("Hidden").is_none());
    }

    #[test]
    fn test_undefined_type() {
        let config = NamingConfig::default();
        let sheet = schema(
            "Item",
            vec![
                vec!["[Design]"],
                vec!["Name", "Type", "IsPrimaryKey"],
                vec!["Id", "int", "true"],
                vec!["Kind", "Missing", ""],
            ],
        );
        let err = TypeCatalog::build(&sheet, [], Naming::new(Notation::Pascal, &config))
            .err()
            .unwrap();

        assert_eq!(err.code(), Some(ErrorCode::E200));
        assert_eq!(err.primary_cell().unwrap().to_a1(), "B4");
    }

    #[test]
    fn test_duplicate_type_name() {
        let config = NamingConfig::default();
        let sheet = schema(
            "Item",
            vec![
                vec!["[Enum]", "Kind"],
                vec!["Name"],
                vec!["A"],
                vec!["[Record]", "Kind"],
                vec!["Name", "Type"],
                vec!["B", "int"],
            ],
        );
        let err = TypeCatalog::build(&sheet, [], Naming::new(Notation::Pascal, &config))
            .err()
            .unwrap();

        assert_eq!(err.code(), Some(ErrorCode::E202));
        assert_eq!(err.primary_cell().unwrap().to_a1(), "A4");
    }

    #[test]
    fn test_enum_values_and_zero() {
        let config = NamingConfig::default();
        let shared = shared();
        let catalog =
            TypeCatalog::build(&shared, [], Naming::new(Notation::Pascal, &config)).unwrap();

        assert_eq!(
            catalog.enum_value("Grade", "Rare"),
            Some(Value::Enum("Rare".into()))
        );
        assert_eq!(
            catalog.enum_value("Grade", "3"),
            Some(Value::Enum("Rare".into()))
        );
        assert_eq!(catalog.enum_value("Grade", "7"), Some(Value::Int(7)));
        assert_eq!(catalog.enum_value("Grade", "Epic"), None);
        assert_eq!(
            catalog.zero(&FieldType::Enum("Grade".into())),
            Value::Enum("Common".into())
        );
        assert_eq!(
            catalog.list_filler(&FieldType::Scalar(ScalarType::String)),
            Value::Null
        );

        let zero = catalog.zero(&FieldType::Record("ImageInfo".into()));
        assert_eq!(zero.get("AtlasName"), Some(&Value::Str(String::new())));
    }

    #[test]
    fn test_generated_names_are_aliases() {
        let config = NamingConfig::default();
        let grid = Grid::from_rows(vec![
            vec!["[enum]", "item_grade"],
            vec!["name"],
            vec!["common"],
            vec!["[design]"],
            vec!["name", "type", "is_primary_key"],
            vec!["id", "int", "true"],
            vec!["grade", "ItemGrade", ""],
        ]);
        let parse_config = ParseConfig::default().with_input_notation(Notation::LowerSnake);
        let sheet = parse_sheet("item", grid.view(), &parse_config).unwrap();
        let catalog =
            TypeCatalog::build(&sheet, [], Naming::new(Notation::LowerSnake, &config)).unwrap();

        let entity = catalog.entity().unwrap();
        assert_eq!(entity.fields()[1].ty, FieldType::Enum("item_grade".into()));
        assert_eq!(entity.fields()[1].emitted, "Grade");
        assert_eq!(
            catalog.enum_value("item_grade", "Common"),
            Some(Value::Enum("Common".into()))
        );
    }
}
