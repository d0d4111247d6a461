//! Shared runtime helpers the generated sheet types derive from.
//!
//! These units depend only on the configuration, so a run emits them once
//! regardless of how many sheets it compiles.

use crate::{
    config::{PlatformConfig, PlatformKind},
    naming::Naming,
};

use super::{SourceUnit, writer::CodeWriter};

/// Configured names of the helper types and their members.
#[derive(Debug, Clone)]
pub struct HelperNames {
    pub base: String,
    pub design_interface: String,
    pub design: String,
    pub constant: String,
    pub full: String,
    pub not_found: String,
    pub key: String,
    pub data: String,
    data_field: String,
    read_data: String,
    read_data_async: String,
    pub load_data: String,
    load_data_async: String,
    load_all_data_async: String,
    pub find: String,
    find_all: String,
}

impl HelperNames {
    pub fn new(naming: &Naming<'_>) -> Self {
        Self {
            base: naming.class("BaseSheetDataHelper"),
            design_interface: naming.interface("DesignSheetData"),
            design: naming.class("DesignSheetDataHelper"),
            constant: naming.class("ConstantSheetDataHelper"),
            full: naming.class("FullSheetDataHelper"),
            not_found: naming.class("SheetDataNotFoundException"),
            key: naming.member("Key"),
            data: naming.member("Data"),
            data_field: naming.private_member("data"),
            read_data: naming.function("ReadData"),
            read_data_async: naming.function("ReadDataAsync"),
            load_data: naming.function("LoadData"),
            load_data_async: naming.function("LoadDataAsync"),
            load_all_data_async: naming.function("LoadAllDataAsync"),
            find: naming.function("Find"),
            find_all: naming.function("FindAll"),
        }
    }
}

/// Every support unit, in a stable order.
pub fn support_units(naming: &Naming<'_>, platforms: &[PlatformConfig]) -> Vec<SourceUnit> {
    let names = HelperNames::new(naming);
    let namespace = naming.config().namespace();

    vec![
        base_helper(&names, namespace, platforms),
        design_interface(&names, namespace),
        design_helper(&names, namespace),
        constant_helper(&names, namespace),
        full_helper(&names, namespace),
        not_found_exception(&names, namespace),
        external_init(),
    ]
}

fn usings(w: &mut CodeWriter, namespaces: &[&str]) {
    for namespace in namespaces {
        w.line(format!("using {namespace};"));
    }
}

fn namespace_header(namespace: Option<&str>) -> Option<String> {
    namespace.map(|namespace| format!("namespace {namespace}"))
}

/// Writes one `#if`/`#elif` arm per platform and an `#else` fallback.
fn per_platform(
    w: &mut CodeWriter,
    platforms: &[PlatformConfig],
    arm: impl Fn(&mut CodeWriter, &PlatformConfig),
    fallback: &str,
) {
    for (index, platform) in platforms.iter().enumerate() {
        let directive = if index == 0 { "#if" } else { "#elif" };
        w.line(format!("{directive} {}", platform.define_name()));
        arm(w, platform);
    }
    if platforms.is_empty() {
        w.line(fallback);
        return;
    }
    w.line("#else");
    w.line(fallback);
    w.line("#endif");
}

fn base_helper(
    names: &HelperNames,
    namespace: Option<&str>,
    platforms: &[PlatformConfig],
) -> SourceUnit {
    let mut w = CodeWriter::new();
    usings(
        &mut w,
        &["System.Linq", "System.Reflection", "System.Threading.Tasks"],
    );
    for platform in platforms {
        w.line(format!("#if {}", platform.define_name()));
        usings(&mut w, &platform_namespaces(platform));
        w.line("#endif");
    }
    w.blank();

    w.optional_scope(namespace_header(namespace), |w| {
        w.scope(format!("public abstract record {}", names.base), |w| {
            per_platform(
                w,
                platforms,
                |w, platform| {
                    w.line(format!(
                        "protected static readonly string DefaultDirectory = \"{}\";",
                        platform.default_directory()
                    ));
                },
                "protected static readonly string DefaultDirectory = string.Empty;",
            );
            w.blank();

            w.scope(
                format!("protected static string {}<T>()", names.read_data),
                |w| {
                    per_platform(
                        w,
                        platforms,
                        |w, platform| match platform.kind() {
                            PlatformKind::Unity => {
                                w.line(
                                    "var textAsset = Addressables.LoadAssetAsync<TextAsset>\
                                     ($\"{DefaultDirectory}/{typeof(T).Name}\").WaitForCompletion();",
                                );
                                w.line("var json = textAsset.text;");
                            }
                            PlatformKind::Dotnet => w.line(
                                "var json = System.IO.File.ReadAllText\
                                 ($\"{DefaultDirectory}/{typeof(T).Name}.json\");",
                            ),
                        },
                        "var json = string.Empty;",
                    );
                    w.blank();
                    w.line("return json;");
                },
            );
            w.blank();

            w.scope(
                format!(
                    "protected static async Task<string> {}<T>()",
                    names.read_data_async
                ),
                |w| {
                    per_platform(
                        w,
                        platforms,
                        |w, platform| match platform.kind() {
                            PlatformKind::Unity => {
                                w.line(
                                    "var textAsset = await Addressables.LoadAssetAsync<TextAsset>\
                                     ($\"{DefaultDirectory}/{typeof(T).Name}\").Task;",
                                );
                                w.line("var json = textAsset.text;");
                            }
                            PlatformKind::Dotnet => w.line(
                                "var json = await System.IO.File.ReadAllTextAsync\
                                 ($\"{DefaultDirectory}/{typeof(T).Name}.json\");",
                            ),
                        },
                        "var json = string.Empty;",
                    );
                    w.blank();
                    w.line("return json;");
                },
            );
            w.blank();

            w.scope(
                format!("public static async Task {}()", names.load_all_data_async),
                |w| {
                    w.line(format!(
                        "var sheetTypes = typeof({base}).Assembly.GetTypes()\
                         .Where(x => x.IsAbstract is false && x.IsSubclassOf(typeof({base})));",
                        base = names.base
                    ));
                    w.line(format!(
                        "var methodInfos = sheetTypes.Select(x => x.GetMethod(\"{}\", \
                         BindingFlags.Static | BindingFlags.FlattenHierarchy | BindingFlags.Public));",
                        names.load_data_async
                    ));
                    w.line(
                        "var loadFunctions = methodInfos\
                         .Select(x => x?.Invoke(null, new object[] { })).Cast<Task>();",
                    );
                    w.line("await Task.WhenAll(loadFunctions);");
                },
            );
        });
    });

    SourceUnit::new(&names.base, w.finish())
}

/// `using` namespaces a platform's loading code needs, plus configured ones.
pub fn platform_namespaces(platform: &PlatformConfig) -> Vec<&str> {
    let builtin: &[&str] = match platform.kind() {
        PlatformKind::Unity => &["UnityEngine", "UnityEngine.AddressableAssets"],
        PlatformKind::Dotnet => &[],
    };
    let mut namespaces: Vec<&str> = builtin.to_vec();
    for namespace in platform.namespaces() {
        if !namespaces.contains(&namespace.as_str()) {
            namespaces.push(namespace);
        }
    }
    namespaces
}

fn design_interface(names: &HelperNames, namespace: Option<&str>) -> SourceUnit {
    let mut w = CodeWriter::new();
    w.optional_scope(namespace_header(namespace), |w| {
        w.scope(
            format!("public interface {}<out T>", names.design_interface),
            |w| w.line(format!("public T {} {{ get; }}", names.key)),
        );
    });
    SourceUnit::new(&names.design_interface, w.finish())
}

fn keyed_header(names: &HelperNames, class: &str) -> String {
    format!(
        "public abstract record {class}<TKey, TValue> : {} where TValue : {}<TKey>",
        names.base, names.design_interface
    )
}

fn find_functions(w: &mut CodeWriter, names: &HelperNames, values: &str, guard: Option<&str>) {
    w.scope(
        format!(
            "public static TValue {}(TKey key, bool throwNotFoundException = false)",
            names.find
        ),
        |w| {
            if let Some(guard) = guard {
                w.line(guard);
            }
            let lookup = values.trim_end_matches(".Values");
            w.scope(
                format!(
                    "if ({lookup}.TryGetValue(key, out var result) is false && throwNotFoundException)"
                ),
                |w| w.line(format!("throw new {}<TValue>(key);", names.not_found)),
            );
            w.line("return result;");
        },
    );
    w.blank();

    w.scope(
        format!("public static TValue {}(Predicate<TValue> match)", names.find),
        |w| {
            if let Some(guard) = guard {
                w.line(guard);
            }
            w.line(format!("return {values}.FirstOrDefault(match.Invoke);"));
        },
    );
    w.blank();

    w.scope(
        format!(
            "public static IEnumerable<TValue> {}(Predicate<TValue> match)",
            names.find_all
        ),
        |w| {
            if let Some(guard) = guard {
                w.line(guard);
            }
            w.line(format!("return {values}.Where(match.Invoke);"));
        },
    );
}

fn design_helper(names: &HelperNames, namespace: Option<&str>) -> SourceUnit {
    let mut w = CodeWriter::new();
    usings(
        &mut w,
        &[
            "System",
            "System.Collections.Generic",
            "System.Linq",
            "System.Threading.Tasks",
            "Newtonsoft.Json",
        ],
    );
    w.blank();

    let data = &names.data_field;
    w.optional_scope(namespace_header(namespace), |w| {
        w.scope(keyed_header(names, &names.design), |w| {
            w.line(format!(
                "private static Lazy<Dictionary<TKey, TValue>> {data} = new({});",
                names.load_data
            ));
            w.blank();
            w.line(format!(
                "public static IEnumerable<TValue> {} => {data}.Value.Values;",
                names.data
            ));
            w.blank();

            w.scope(
                format!("private static Dictionary<TKey, TValue> {}()", names.load_data),
                |w| {
                    w.line(format!("var json = {}<TValue>();", names.read_data));
                    w.blank();
                    w.scope(
                        "if (JsonConvert.DeserializeObject<List<TValue>>(json) is not { } data)",
                        |w| w.line("throw new Exception($\"{typeof(TValue).Name} was not loaded.\");"),
                    );
                    w.line(format!(
                        "return data.ToDictionary(x => x.{key}, x => x);",
                        key = names.key
                    ));
                },
            );
            w.blank();

            w.scope(
                format!("public static async Task {}()", names.load_data_async),
                |w| {
                    w.line(format!("var json = await {}<TValue>();", names.read_data_async));
                    w.blank();
                    w.scope(
                        "if (JsonConvert.DeserializeObject<List<TValue>>(json) is not { } data)",
                        |w| w.line("throw new Exception($\"{typeof(TValue).Name} was not loaded.\");"),
                    );
                    w.blank();
                    w.line(format!(
                        "var dataDictionary = data.ToDictionary(x => x.{}, x => x);",
                        names.key
                    ));
                    w.line(format!(
                        "{data} = new Lazy<Dictionary<TKey, TValue>>(dataDictionary);"
                    ));
                },
            );
            w.blank();

            find_functions(w, names, &format!("{data}.Value.Values"), None);
        });
    });

    SourceUnit::new(&names.design, w.finish())
}

fn constant_helper(names: &HelperNames, namespace: Option<&str>) -> SourceUnit {
    let mut w = CodeWriter::new();
    usings(&mut w, &["System", "System.Threading.Tasks", "Newtonsoft.Json"]);
    w.blank();

    w.optional_scope(namespace_header(namespace), |w| {
        w.scope(
            format!(
                "public abstract record {}<T> : {}",
                names.constant, names.base
            ),
            |w| {
                w.line("protected static bool IsLoaded;");
                w.blank();

                w.scope(
                    format!("protected static void {}()", names.load_data),
                    |w| {
                        w.line("IsLoaded = true;");
                        w.line(format!("var json = {}<T>();", names.read_data));
                        w.blank();
                        w.line("if (JsonConvert.DeserializeObject<T>(json) is { }) return;");
                        w.line("throw new Exception($\"{typeof(T).Name} was not loaded.\");");
                    },
                );
                w.blank();

                w.scope(
                    format!("public static async Task {}()", names.load_data_async),
                    |w| {
                        w.line("IsLoaded = true;");
                        w.line(format!("var json = await {}<T>();", names.read_data_async));
                        w.blank();
                        w.line("if (JsonConvert.DeserializeObject<T>(json) is { }) return;");
                        w.line("throw new Exception($\"{typeof(T).Name} was not loaded.\");");
                    },
                );
            },
        );
    });

    SourceUnit::new(&names.constant, w.finish())
}

fn full_helper(names: &HelperNames, namespace: Option<&str>) -> SourceUnit {
    let mut w = CodeWriter::new();
    usings(
        &mut w,
        &[
            "System",
            "System.Collections.Generic",
            "System.Linq",
            "System.Threading.Tasks",
            "Newtonsoft.Json",
        ],
    );
    w.blank();

    let data = &names.data_field;
    let guard = format!("if (IsLoaded is false) {}();", names.load_data);
    let load_body = |w: &mut CodeWriter, read: String| {
        w.line("IsLoaded = true;");
        w.line(read);
        w.blank();
        w.line("var (_, data) = JsonConvert.DeserializeObject<(TValue, List<TValue>)>(json);");
        w.scope("if (data is null)", |w| {
            w.line("throw new Exception($\"{typeof(TValue).Name} was not loaded.\");");
        });
        w.line(format!(
            "{data} = data.ToDictionary(x => x.{}, x => x);",
            names.key
        ));
    };

    w.optional_scope(namespace_header(namespace), |w| {
        w.scope(keyed_header(names, &names.full), |w| {
            w.line("protected static bool IsLoaded;");
            w.line(format!("private static Dictionary<TKey, TValue> {data};"));
            w.blank();
            w.scope(
                format!("public static IEnumerable<TValue> {}", names.data),
                |w| {
                    w.scope("get", |w| {
                        w.line(&guard);
                        w.line(format!("return {data}.Values;"));
                    });
                },
            );
            w.blank();

            w.scope(
                format!("protected static void {}()", names.load_data),
                |w| load_body(w, format!("var json = {}<TValue>();", names.read_data)),
            );
            w.blank();

            w.scope(
                format!("public static async Task {}()", names.load_data_async),
                |w| {
                    load_body(
                        w,
                        format!("var json = await {}<TValue>();", names.read_data_async),
                    )
                },
            );
            w.blank();

            find_functions(w, names, &format!("{data}.Values"), Some(&guard));
        });
    });

    SourceUnit::new(&names.full, w.finish())
}

fn not_found_exception(names: &HelperNames, namespace: Option<&str>) -> SourceUnit {
    let mut w = CodeWriter::new();
    usings(&mut w, &["System"]);
    w.blank();

    let class = &names.not_found;
    let key = &names.key;
    w.optional_scope(namespace_header(namespace), |w| {
        w.scope(format!("public class {class}<T> : Exception"), |w| {
            w.line("public Type DataType => typeof(T);");
            w.line(format!("public object {key} {{ get; private set; }}"));
            w.blank();
            w.scope(
                format!(
                    "public {class}(object key) : base($\"{{typeof(T).Name}} does not exist. ({key}: {{key}})\")"
                ),
                |w| w.line(format!("{key} = key;")),
            );
        });
    });

    SourceUnit::new(class, w.finish())
}

fn external_init() -> SourceUnit {
    let mut w = CodeWriter::new();
    w.scope("namespace System.Runtime.CompilerServices", |w| {
        w.scope("public sealed class IsExternalInit", |_| {});
    });
    SourceUnit::new("IsExternalInit", w.finish())
}

#[cfg(test)]
mod tests {
    use sheetdata_core::notation::Notation;

    use super::*;
    use crate::config::NamingConfig;

    fn units(platforms: &[PlatformConfig]) -> Vec<SourceUnit> {
        let config = NamingConfig::default();
        support_units(&Naming::new(Notation::Pascal, &config), platforms)
    }

    #[test]
    fn test_unit_file_names() {
        let names: Vec<_> = units(&[]).into_iter().map(|u| u.file_name).collect();
        assert_eq!(
            names,
            vec![
                "BaseSheetDataHelper.cs",
                "IDesignSheetData.cs",
                "DesignSheetDataHelper.cs",
                "ConstantSheetDataHelper.cs",
                "FullSheetDataHelper.cs",
                "SheetDataNotFoundException.cs",
                "IsExternalInit.cs",
            ]
        );
    }

    #[test]
    fn test_base_helper_branches_per_platform() {
        let platforms = [
            PlatformConfig::new(PlatformKind::Unity, "UNITY_2022_1_OR_NEWER"),
            PlatformConfig::new(PlatformKind::Dotnet, "NET6_0_OR_GREATER")
                .with_default_directory("Data"),
        ];
        let base = &units(&platforms)[0].text;

        assert!(base.contains("#if UNITY_2022_1_OR_NEWER\nusing UnityEngine;\n"));
        assert!(base.contains(
            "\t\t#elif NET6_0_OR_GREATER\n\t\tprotected static readonly string DefaultDirectory = \"Data\";\n"
        ));
        assert!(base.contains("System.IO.File.ReadAllTextAsync"));
        assert!(base.contains("WaitForCompletion()"));
        assert!(base.contains("\t\t#else\n"));
    }

    #[test]
    fn test_base_helper_without_platforms() {
        let base = &units(&[])[0].text;

        assert!(!base.contains("#if"));
        assert!(base.contains("protected static readonly string DefaultDirectory = string.Empty;"));
    }

    #[test]
    fn test_full_helper_guards_lookups() {
        let full = &units(&[])[4].text;

        assert!(full.contains(
            "public abstract record FullSheetDataHelper<TKey, TValue> : BaseSheetDataHelper \
             where TValue : IDesignSheetData<TKey>"
        ));
        assert!(full.contains("if (_data.TryGetValue(key, out var result) is false"));
        assert_eq!(full.matches("if (IsLoaded is false) LoadData();").count(), 4);
    }

    #[test]
    fn test_custom_function_notation() {
        let config: NamingConfig = toml::from_str("function_name = \"camel\"").unwrap();
        let units = support_units(&Naming::new(Notation::Pascal, &config), &[]);

        assert!(units[2].text.contains("public static async Task loadDataAsync()"));
        assert!(units[2].text.contains("_data.Value.TryGetValue(key"));
    }
}
