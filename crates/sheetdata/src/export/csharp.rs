//! C# source emission.
//!
//! Every sheet becomes one compilation unit declaring its types. The
//! [`support`] units hold the loading helpers those types derive from and
//! are emitted once per run.

pub mod support;
mod writer;

use log::debug;

use sheetdata_core::schema::{Block, DesignEntity, EnumBlock, FieldType, RecordBlock, SheetSchema};
use sheetdata_parser::error::Diagnostic;

use crate::{
    config::PlatformConfig,
    naming::Naming,
    resolve::{ResolvedField, TypeCatalog},
};

use self::{
    support::{HelperNames, platform_namespaces},
    writer::CodeWriter,
};

/// One generated C# file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// File name including the `.cs` extension.
    pub file_name: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(type_name: &str, text: String) -> Self {
        Self {
            file_name: format!("{type_name}.cs"),
            text,
        }
    }
}

const SHEET_USINGS: [&str; 6] = [
    "System",
    "System.Linq",
    "System.Collections",
    "System.Collections.Generic",
    "Newtonsoft.Json",
    "Newtonsoft.Json.Converters",
];

/// Emit the compilation unit of one sheet.
///
/// Returns the unit and a warning for each sheet-scoped enum or record that
/// was left out because the sheet has no entity to host it.
pub fn sheet_unit(
    schema: &SheetSchema,
    catalog: &TypeCatalog<'_>,
    platforms: &[PlatformConfig],
) -> (SourceUnit, Vec<Diagnostic>) {
    let naming = *catalog.naming();
    let names = HelperNames::new(&naming);
    let class_name = naming.record_name(schema.sheet());
    let emitter = Emitter {
        catalog,
        naming,
        names: &names,
    };

    let mut warnings = Vec::new();
    let mut w = CodeWriter::new();
    for namespace in SHEET_USINGS {
        w.line(format!("using {namespace};"));
    }
    for platform in platforms {
        w.line(format!("#if {}", platform.define_name()));
        for namespace in platform_namespaces(platform) {
            w.line(format!("using {namespace};"));
        }
        w.line("#endif");
    }
    w.blank();

    let namespace = naming
        .config()
        .namespace()
        .map(|namespace| format!("namespace {namespace}"));

    w.optional_scope(namespace, |w| {
        for (block, enum_block) in schema.enums().filter(|(_, e)| e.global) {
            emitter.enum_type(w, block, enum_block);
            w.blank();
        }
        for (block, record) in schema.records().filter(|(_, r)| r.global) {
            emitter.record_type(w, block, record);
            w.blank();
        }
        for block in schema.interfaces() {
            emitter.interface_type(w, block);
            w.blank();
        }

        if schema.has_entity() {
            emitter.entity(w, schema, &class_name);
        } else {
            let scoped = schema
                .enums()
                .filter(|(_, e)| !e.global)
                .map(|(b, _)| b)
                .chain(schema.records().filter(|(_, r)| !r.global).map(|(b, _)| b));
            for block in scoped {
                warnings.push(
                    Diagnostic::warning(format!(
                        "`{}` is scoped to the sheet entity but the sheet has none; not emitted",
                        block.name_or_empty()
                    ))
                    .with_label(block.origin, "scoped declaration")
                    .with_help("add the `Global` option or a `[Design]` block"),
                );
            }
        }
    });

    debug!(
        sheet = schema.sheet(),
        class = class_name.as_str(),
        warnings = warnings.len();
        "C# unit emitted"
    );
    (SourceUnit::new(&class_name, w.finish()), warnings)
}

struct Emitter<'e, 'a> {
    catalog: &'e TypeCatalog<'a>,
    naming: Naming<'a>,
    names: &'e HelperNames,
}

impl Emitter<'_, '_> {
    /// The C# spelling of a resolved type.
    fn type_name(&self, ty: &FieldType) -> String {
        match ty {
            FieldType::Scalar(scalar) => scalar.keyword().to_owned(),
            FieldType::Enum(name) => self.naming.enum_name(name),
            FieldType::Record(name) => self.naming.record_name(name),
            FieldType::List(inner) => format!("List<{}>", self.type_name(inner)),
            FieldType::Nullable(inner) => format!("{}?", self.type_name(inner)),
            FieldType::Reference { key, .. } => self.type_name(key),
        }
    }

    fn block_summary(&self, w: &mut CodeWriter, block: &Block) {
        if let Some(summary) = &block.summary {
            w.summary(summary);
        }
    }

    fn enum_type(&self, w: &mut CodeWriter, block: &Block, enum_block: &EnumBlock) {
        self.block_summary(w, block);
        w.line("[JsonConverter(typeof(StringEnumConverter))]");
        w.scope(
            format!(
                "public enum {} : {}",
                self.naming.enum_name(block.name_or_empty()),
                enum_block.backing.keyword()
            ),
            |w| {
                for member in &enum_block.members {
                    w.member_summary(member.comment.as_deref());
                    let name = self.naming.enum_item(&member.name);
                    match member.explicit {
                        Some(value) => w.line(format!("{name} = {value},")),
                        None => w.line(format!("{name},")),
                    }
                    w.blank();
                }
            },
        );
    }

    fn record_type(&self, w: &mut CodeWriter, block: &Block, record: &RecordBlock) {
        let name = block.name_or_empty();
        self.block_summary(w, block);
        w.line("[Serializable]");
        w.scope(
            format!("public partial record {}", self.naming.record_name(name)),
            |w| {
                let Some(shape) = self.catalog.record(name) else {
                    return;
                };
                for (declared, field) in record.fields.iter().zip(shape.fields()) {
                    w.member_summary(declared.comment.as_deref());
                    if field.optional {
                        w.line("[JsonProperty(NullValueHandling = NullValueHandling.Ignore)]");
                    }
                    let initializer = if field.ty.is_list() { " = new();" } else { "" };
                    w.line(format!(
                        "public {} {} {{ get; init; }}{initializer}",
                        self.type_name(&field.ty),
                        field.emitted
                    ));
                    w.blank();
                }
            },
        );
    }

    fn interface_type(&self, w: &mut CodeWriter, block: &Block) {
        self.block_summary(w, block);
        w.scope(
            format!(
                "public partial interface {}",
                self.naming.interface_name(block.name_or_empty())
            ),
            |_| {},
        );
    }

    fn entity(&self, w: &mut CodeWriter, schema: &SheetSchema, class_name: &str) {
        if let Some(description) = schema.description() {
            w.summary(description);
        }

        let design = schema.design_entity();
        let header = match &design {
            Some(design) => {
                let key = self.key_type(design.key_fields().map(|f| &f.name));
                let helper = if schema.constant().is_some() {
                    &self.names.full
                } else {
                    &self.names.design
                };
                let mut header = format!(
                    "public sealed partial record {class_name} : {helper}<{key}, {class_name}>, {}<{key}>",
                    self.names.design_interface
                );
                for interface in design.interfaces() {
                    header.push_str(", ");
                    header.push_str(&self.naming.interface_name(interface));
                }
                header
            }
            None => format!(
                "public sealed partial record {class_name} : {}<{class_name}>",
                self.names.constant
            ),
        };

        w.scope(header, |w| {
            for (block, enum_block) in schema.enums().filter(|(_, e)| !e.global) {
                self.enum_type(w, block, enum_block);
                w.blank();
            }
            for (block, record) in schema.records().filter(|(_, r)| !r.global) {
                self.record_type(w, block, record);
                w.blank();
            }
            if let Some((_, fields)) = schema.constant() {
                for (declared, field) in fields.iter().zip(self.catalog.constants().fields()) {
                    self.constant_member(
                        w,
                        &field.emitted,
                        &field.name,
                        &field.ty,
                        declared.comment.as_deref(),
                    );
                }
                w.blank();
            }
            if let Some(design) = &design {
                self.design_members(w, design);
            }
        });
    }

    fn key_type<'f>(&self, key_fields: impl Iterator<Item = &'f String>) -> String {
        let types: Vec<String> = key_fields
            .filter_map(|name| self.entity_field(name))
            .map(|field| self.type_name(&field.ty))
            .collect();
        match types.as_slice() {
            [single] => single.clone(),
            parts => format!("({})", parts.join(", ")),
        }
    }

    fn entity_field(&self, declared: &str) -> Option<&ResolvedField> {
        self.catalog
            .entity()?
            .fields()
            .iter()
            .find(|field| field.name == declared)
    }

    fn constant_member(
        &self,
        w: &mut CodeWriter,
        public: &str,
        declared: &str,
        ty: &FieldType,
        comment: Option<&str>,
    ) {
        let type_name = self.type_name(ty);
        let private = self.naming.private_variable(declared);

        w.line(format!("[JsonProperty(nameof({public}))]"));
        w.line(format!("private static {type_name} {private} {{ get; set; }}"));
        w.blank();
        w.member_summary(comment);
        w.line("[JsonIgnore]");
        w.scope(format!("public static {type_name} {public}"), |w| {
            w.scope("get", |w| {
                w.line(format!("if (IsLoaded is false) {}();", self.names.load_data));
                w.line(format!("return {private};"));
            });
        });
        w.blank();
    }

    fn design_members(&self, w: &mut CodeWriter, design: &DesignEntity<'_>) {
        let keys: Vec<String> = design
            .key_fields()
            .map(|field| self.naming.public_variable(&field.name))
            .collect();
        let key_expr = match keys.as_slice() {
            [single] => single.clone(),
            parts => format!("({})", parts.join(", ")),
        };
        let key_type = self.key_type(design.key_fields().map(|f| &f.name));

        w.line("[JsonIgnore]");
        w.line(format!("public {key_type} {} => {key_expr};", self.names.key));
        w.blank();

        let Some(entity) = self.catalog.entity() else {
            return;
        };
        for (declared, field) in design.fields().iter().zip(entity.fields()) {
            let public = &field.emitted;
            let private = self.naming.private_variable(&field.name);
            w.member_summary(declared.comment.as_deref());

            match field.ty.list_element() {
                Some(element) => {
                    let element = self.type_name(element);
                    w.line(format!("[JsonProperty(nameof({public}))]"));
                    w.line(format!(
                        "private List<{element}> {private} {{ get; init; }} = new();"
                    ));
                    w.blank();
                    w.line("[JsonIgnore]");
                    w.line(format!(
                        "public IReadOnlyList<{element}> {public} => {private};"
                    ));
                }
                None => {
                    if field.optional {
                        w.line("[JsonProperty(NullValueHandling = NullValueHandling.Ignore)]");
                    }
                    w.line(format!(
                        "public {} {public} {{ get; init; }}",
                        self.type_name(&field.ty)
                    ));
                }
            }
            w.blank();

            if let Some(target) = &declared.reference {
                self.reference_accessor(w, public, &private, target, field.ty.is_list());
                w.blank();
            }
        }
    }

    fn reference_accessor(
        &self,
        w: &mut CodeWriter,
        public: &str,
        private: &str,
        target: &str,
        is_list: bool,
    ) {
        let target_type = self.naming.record_name(target);
        let accessor = self.naming.reference_accessor(public);
        let cache = self.naming.reference_accessor(private);
        let find = &self.names.find;

        if is_list {
            w.line("[JsonIgnore]");
            w.line(format!("private List<{target_type}> {cache};"));
            w.blank();
            w.line("[JsonIgnore]");
            w.line(format!(
                "public IReadOnlyList<{target_type}> {accessor} => \
                 {cache} ??= {public}.Select(x => {target_type}.{find}(x)).ToList();"
            ));
        } else {
            w.line("[JsonIgnore]");
            w.line(format!("private {target_type} {cache};"));
            w.blank();
            w.line("[JsonIgnore]");
            w.line(format!(
                "public {target_type} {accessor} => {cache} ??= {target_type}.{find}({public});"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use sheetdata_core::{grid::Grid, notation::Notation};
    use sheetdata_parser::{ParseConfig, parse_sheet};

    use super::*;
    use crate::config::{NamingConfig, PlatformKind};

    fn emit(rows: Vec<Vec<&str>>, others: &[SheetSchema]) -> String {
        emit_with_warnings(rows, others).0.text
    }

    fn emit_with_warnings(
        rows: Vec<Vec<&str>>,
        others: &[SheetSchema],
    ) -> (SourceUnit, Vec<Diagnostic>) {
        let grid = Grid::from_rows(rows);
        let schema = parse_sheet("Item", grid.view(), &ParseConfig::default()).unwrap();
        let config = NamingConfig::default();
        let catalog =
            TypeCatalog::build(&schema, others, Naming::new(Notation::Pascal, &config)).unwrap();
        let platforms = [PlatformConfig::new(PlatformKind::Unity, "UNITY_2022_1_OR_NEWER")];
        sheet_unit(&schema, &catalog, &platforms)
    }

    fn item_rows() -> Vec<Vec<&'static str>> {
        vec![
            vec!["[Description]"],
            vec!["Items a player can carry."],
            vec!["[Enum:Global]", "Grade", "Item quality"],
            vec!["Name", "Value", "Comment"],
            vec!["Common", "", "default"],
            vec!["Rare", "5", ""],
            vec!["[Enum:byte]", "Slot"],
            vec!["Name"],
            vec!["Head"],
            vec!["[Record]", "ImageInfo"],
            vec!["Name", "Type", "Optional", "Comment"],
            vec!["AtlasName", "string", "", "atlas"],
            vec!["Frames", "List<int>", "", ""],
            vec!["Tint", "string?", "true", ""],
            vec!["[Interface]", "Priced"],
            vec!["[Design]", "Priced"],
            vec!["Name", "Type", "IsPrimaryKey", "Reference", "Comment"],
            vec!["Id", "int", "true", "", "unique id"],
            vec!["Grade", "Grade", "", "", ""],
            vec!["Icon", "ImageInfo", "", "", ""],
            vec!["NameTextId", "string", "", "Text", ""],
            vec!["TagTextIds", "List<string>", "", "Text", ""],
        ]
    }

    #[test]
    fn test_sheet_unit_layout() {
        let text = emit(item_rows(), &[]);

        let positions: Vec<usize> = [
            "using Newtonsoft.Json.Converters;",
            "#if UNITY_2022_1_OR_NEWER\nusing UnityEngine;",
            "namespace Sheet\n{",
            "\tpublic enum Grade : int",
            "\tpublic partial interface IPriced",
            "\t/// <summary>\n\t/// Items a player can carry.\n\t/// </summary>",
            "\tpublic sealed partial record Item : DesignSheetDataHelper<int, Item>, \
             IDesignSheetData<int>, IPriced",
            "\t\tpublic enum Slot : byte",
            "\t\tpublic partial record ImageInfo",
            "\t\tpublic int Key => Id;",
        ]
        .iter()
        .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {needle:?}")))
        .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{text}");
    }

    #[test]
    fn test_enum_members() {
        let text = emit(item_rows(), &[]);

        assert!(text.contains(
            "\t/// <summary>\n\t/// Item quality\n\t/// </summary>\n\
             \t[JsonConverter(typeof(StringEnumConverter))]\n\tpublic enum Grade : int"
        ));
        assert!(text.contains(
            "\t\t/// <summary> default </summary>\n\t\tCommon,\n\n\t\tRare = 5,\n"
        ));
        assert!(text.contains("\t\t\tHead,\n"));
    }

    #[test]
    fn test_record_properties() {
        let text = emit(item_rows(), &[]);

        assert!(text.contains("\t\t\t/// <summary> atlas </summary>\n\t\t\tpublic string AtlasName { get; init; }"));
        assert!(text.contains("\t\t\tpublic List<int> Frames { get; init; } = new();"));
        assert!(text.contains(
            "\t\t\t[JsonProperty(NullValueHandling = NullValueHandling.Ignore)]\n\
             \t\t\tpublic string? Tint { get; init; }"
        ));
    }

    #[test]
    fn test_design_members_and_references() {
        let text = emit(item_rows(), &[]);

        assert!(text.contains("\t\t/// <summary> unique id </summary>\n\t\tpublic int Id { get; init; }"));
        assert!(text.contains("\t\tpublic Grade Grade { get; init; }"));
        assert!(text.contains("\t\tpublic ImageInfo Icon { get; init; }"));
        assert!(text.contains(
            "\t\tpublic Text NameTextReference => _nameTextReference ??= Text.Find(NameTextId);"
        ));
        assert!(text.contains("\t\t[JsonProperty(nameof(TagTextIds))]\n\t\tprivate List<string> _tagTextIds { get; init; } = new();"));
        assert!(text.contains("\t\tpublic IReadOnlyList<string> TagTextIds => _tagTextIds;"));
        assert!(text.contains(
            "\t\tpublic IReadOnlyList<Text> TagTextReferences => \
             _tagTextReferences ??= TagTextIds.Select(x => Text.Find(x)).ToList();"
        ));
    }

    #[test]
    fn test_constant_and_composite_key() {
        let text = emit(
            vec![
                vec!["[Constant]"],
                vec!["Name", "Type", "Value", "Comment"],
                vec!["MaxLevel", "int", "50", "level cap"],
                vec!["[Design]"],
                vec!["Name", "Type", "IsPrimaryKey"],
                vec!["SkillId", "int", "true"],
                vec!["Level", "short", "true"],
            ],
            &[],
        );

        assert!(text.contains(
            "public sealed partial record Item : FullSheetDataHelper<(int, short), Item>, \
             IDesignSheetData<(int, short)>"
        ));
        assert!(text.contains("\t\tpublic (int, short) Key => (SkillId, Level);"));
        assert!(text.contains(
            "\t\t[JsonProperty(nameof(MaxLevel))]\n\t\tprivate static int _maxLevel { get; set; }"
        ));
        assert!(text.contains(
            "\t\t/// <summary> level cap </summary>\n\t\t[JsonIgnore]\n\t\tpublic static int MaxLevel\n"
        ));
        assert!(text.contains("\t\t\t\tif (IsLoaded is false) LoadData();\n\t\t\t\treturn _maxLevel;"));
    }

    #[test]
    fn test_constant_only_sheet() {
        let text = emit(
            vec![
                vec!["[Constant]"],
                vec!["Name", "Type", "Value"],
                vec!["MaxLevel", "int", "50"],
            ],
            &[],
        );
        assert!(text.contains(
            "public sealed partial record Item : ConstantSheetDataHelper<Item>\n"
        ));
        assert!(!text.contains("Key =>"));
    }

    #[test]
    fn test_scoped_types_without_entity_are_dropped() {
        let (unit, warnings) = emit_with_warnings(
            vec![
                vec!["[Enum]", "Hidden"],
                vec!["Name"],
                vec!["A"],
                vec!["[Enum:Global]", "Shown"],
                vec!["Name"],
                vec!["B"],
            ],
            &[],
        );
        assert!(unit.text.contains("public enum Shown : int"));
        assert!(!unit.text.contains("Hidden"));
        assert!(!unit.text.contains("partial record"));

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].severity().is_warning());
        assert!(warnings[0].message().starts_with("`Hidden`"));
        assert_eq!(warnings[0].primary_cell().unwrap().to_a1(), "A1");
    }

    #[test]
    fn test_entity_sheet_has_no_warnings() {
        let (_, warnings) = emit_with_warnings(item_rows(), &[]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_global_types_from_other_sheets_are_referenced_not_emitted() {
        let shared_grid = Grid::from_rows(vec![
            vec!["[Record:Global]", "Reward"],
            vec!["Name", "Type"],
            vec!["Gold", "int"],
        ]);
        let shared =
            parse_sheet("Shared", shared_grid.view(), &ParseConfig::default()).unwrap();
        let text = emit(
            vec![
                vec!["[Design]"],
                vec!["Name", "Type", "IsPrimaryKey"],
                vec!["Id", "int", "true"],
                vec!["Rewards", "List<Reward>", ""],
            ],
            &[shared],
        );

        assert!(text.contains("private List<Reward> _rewards { get; init; } = new();"));
        assert!(!text.contains("record Reward"));
    }
}
