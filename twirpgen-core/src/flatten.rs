//! # Parameter Flattening
//!
//! Converts a request or response message into an ordered list of typed Go values.
//!
//! * Every field of the request becomes one positional parameter, in declaration order.
//! * Every field of the response becomes one named return value, in declaration order; the
//!   emitted signature appends a trailing `_ error`.
//! * On failure the wrapper returns the zero value of every return field followed by the
//!   error, so both return paths have the same arity.
//!
//! Names are the un-exported Go field names (`Greeting` → `greeting`), claimed through a
//! [`NameScope`] so they never clash with keywords, generated locals, import aliases or each
//! other.
use crate::{
    error::GenerateError,
    goident::GoPackages,
    naming::{message_field_go_names, unexport},
    resolver::{ImportResolver, NameScope},
};
use prost_reflect::{FieldDescriptor, Kind, MessageDescriptor};

/// A Go type expression together with its zero value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoType {
    pub expr: String,
    pub zero: &'static str,
}

impl GoType {
    fn new(expr: impl Into<String>, zero: &'static str) -> Self {
        Self {
            expr: expr.into(),
            zero,
        }
    }

    fn nillable(expr: impl Into<String>) -> Self {
        Self::new(expr, "nil")
    }
}

/// A message field with its Go struct field name and resolved Go type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatField {
    pub go_name: String,
    pub go_type: GoType,
}

/// A named, typed entry of a parameter or return list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub go_type: GoType,
}

impl Parameter {
    /// `name type`, as written in a Go signature.
    pub fn declaration(&self) -> String {
        format!("{} {}", self.name, self.go_type.expr)
    }
}

/// Resolves the Go type of every field of `message`, in declaration order.
///
/// Types from other packages are referenced through `resolver`, which binds their imports.
///
/// # Returns
///
/// * `Ok(Vec<FlatField>)` - One entry per field.
/// * `Err(GenerateError::UnsupportedField)` - A field belongs to a real oneof.
/// * `Err(GenerateError)` - A referenced type has no Go package or its import conflicts.
pub fn flatten_fields(
    message: &MessageDescriptor,
    packages: &GoPackages,
    resolver: &mut ImportResolver,
) -> Result<Vec<FlatField>, GenerateError> {
    let fields: Vec<FieldDescriptor> = message.fields().collect();
    let go_names = message_field_go_names(fields.iter().map(|f| f.name()));

    fields
        .iter()
        .zip(go_names)
        .map(|(field, go_name)| {
            if field.containing_oneof().is_some() && !is_proto3_optional(field) {
                return Err(GenerateError::UnsupportedField {
                    message: message.full_name().to_string(),
                    field: field.name().to_string(),
                });
            }
            Ok(FlatField {
                go_name,
                go_type: field_go_type(field, packages, resolver)?,
            })
        })
        .collect()
}

/// One positional parameter per request field.
pub fn flatten_parameters(fields: &[FlatField], scope: &mut NameScope) -> Vec<Parameter> {
    name_fields(fields, scope)
}

/// One named return value per response field. The trailing error is not included.
pub fn flatten_returns(fields: &[FlatField], scope: &mut NameScope) -> Vec<Parameter> {
    name_fields(fields, scope)
}

/// The failure path: `return <zero>, ..., <err_expr>`.
///
/// ```
/// use twirpgen_core::flatten::error_return;
///
/// assert_eq!(error_return(&[], "err"), "return err");
/// ```
pub fn error_return(returns: &[Parameter], err_expr: &str) -> String {
    let values: Vec<&str> = returns
        .iter()
        .map(|r| r.go_type.zero)
        .chain([err_expr])
        .collect();
    format!("return {}", values.join(", "))
}

fn name_fields(fields: &[FlatField], scope: &mut NameScope) -> Vec<Parameter> {
    fields
        .iter()
        .map(|field| Parameter {
            name: scope.claim(&unexport(&field.go_name)),
            go_type: field.go_type.clone(),
        })
        .collect()
}

fn is_proto3_optional(field: &FieldDescriptor) -> bool {
    field.field_descriptor_proto().proto3_optional()
}

fn field_go_type(
    field: &FieldDescriptor,
    packages: &GoPackages,
    resolver: &mut ImportResolver,
) -> Result<GoType, GenerateError> {
    if let Kind::Message(entry) = field.kind()
        && field.is_map()
    {
        let key = element_go_type(&entry.map_entry_key_field().kind(), packages, resolver)?;
        let value = element_go_type(&entry.map_entry_value_field().kind(), packages, resolver)?;
        return Ok(GoType::nillable(format!("map[{}]{}", key.expr, value.expr)));
    }

    let element = element_go_type(&field.kind(), packages, resolver)?;

    if field.is_list() {
        return Ok(GoType::nillable(format!("[]{}", element.expr)));
    }

    // Scalars and enums with explicit presence (proto2, proto3 `optional`) are pointers.
    if field.supports_presence() && !matches!(field.kind(), Kind::Message(_) | Kind::Bytes) {
        return Ok(GoType::nillable(format!("*{}", element.expr)));
    }

    Ok(element)
}

fn element_go_type(
    kind: &Kind,
    packages: &GoPackages,
    resolver: &mut ImportResolver,
) -> Result<GoType, GenerateError> {
    let go_type = match kind {
        Kind::Double => GoType::new("float64", "0"),
        Kind::Float => GoType::new("float32", "0"),
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => GoType::new("int32", "0"),
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => GoType::new("int64", "0"),
        Kind::Uint32 | Kind::Fixed32 => GoType::new("uint32", "0"),
        Kind::Uint64 | Kind::Fixed64 => GoType::new("uint64", "0"),
        Kind::Bool => GoType::new("bool", "false"),
        Kind::String => GoType::new("string", r#""""#),
        Kind::Bytes => GoType::nillable("[]byte"),
        Kind::Enum(e) => GoType::new(resolver.reference(&packages.enum_ident(e)?)?, "0"),
        Kind::Message(m) => {
            GoType::nillable(format!("*{}", resolver.reference(&packages.message_ident(m)?)?))
        }
    };
    Ok(go_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::PluginOptions, goident::GoImportPath};
    use prost_reflect::DescriptorPool;
    use twirpgen_fixtures::{
        BOOL, BYTES, DOUBLE, FieldType, FileBuilder, INT32, INT64, MessageBuilder, STRING, UINT64,
        prost_types::FileDescriptorSet,
    };

    fn pool() -> DescriptorPool {
        let common = FileBuilder::new("common/v1/common.proto", "common.v1")
            .go_package("example.com/common/v1;commonv1")
            .message(MessageBuilder::new("Page").field("size", INT32))
            .enumeration("Color", &["COLOR_UNSPECIFIED", "COLOR_RED"])
            .build();

        let local = FileBuilder::new("local/local.proto", "local")
            .go_package("example.com/local")
            .import("common/v1/common.proto")
            .message(
                MessageBuilder::new("Everything")
                    .field("name", STRING)
                    .field("count", INT32)
                    .field("total", INT64)
                    .field("big", UINT64)
                    .field("ratio", DOUBLE)
                    .field("enabled", BOOL)
                    .field("blob", BYTES)
                    .field("color", FieldType::enumeration("common.v1.Color"))
                    .field("page", FieldType::message("common.v1.Page"))
                    .field("inner", FieldType::message("local.Everything.Inner"))
                    .repeated("tags", STRING)
                    .repeated("pages", FieldType::message("common.v1.Page"))
                    .map("labels", STRING, INT64)
                    .optional("nickname", STRING)
                    .nested(MessageBuilder::new("Inner")),
            )
            .message(
                MessageBuilder::new("Choice")
                    .oneof_field("value", "text", STRING)
                    .oneof_field("value", "number", INT64),
            )
            .message(
                MessageBuilder::new("Clashing")
                    .field("type", STRING)
                    .field("err", STRING)
                    .field("commonv1", STRING),
            )
            .build();

        DescriptorPool::from_file_descriptor_set(FileDescriptorSet {
            file: vec![common, local],
        })
        .unwrap()
    }

    fn setup() -> (DescriptorPool, GoPackages, ImportResolver) {
        let pool = pool();
        let packages = GoPackages::new(&pool, &PluginOptions::default());
        let resolver = ImportResolver::new(GoImportPath::new("example.com/local"), []);
        (pool, packages, resolver)
    }

    #[test]
    fn test_go_types_and_zero_values() {
        let (pool, packages, mut resolver) = setup();
        let message = pool.get_message_by_name("local.Everything").unwrap();

        let fields = flatten_fields(&message, &packages, &mut resolver).unwrap();
        let rendered: Vec<(&str, &str, &str)> = fields
            .iter()
            .map(|f| (f.go_name.as_str(), f.go_type.expr.as_str(), f.go_type.zero))
            .collect();

        assert_eq!(
            rendered,
            vec![
                ("Name", "string", r#""""#),
                ("Count", "int32", "0"),
                ("Total", "int64", "0"),
                ("Big", "uint64", "0"),
                ("Ratio", "float64", "0"),
                ("Enabled", "bool", "false"),
                ("Blob", "[]byte", "nil"),
                ("Color", "commonv1.Color", "0"),
                ("Page", "*commonv1.Page", "nil"),
                ("Inner", "*Everything_Inner", "nil"),
                ("Tags", "[]string", "nil"),
                ("Pages", "[]*commonv1.Page", "nil"),
                ("Labels", "map[string]int64", "nil"),
                ("Nickname", "*string", "nil"),
            ]
        );
        assert_eq!(
            resolver.imports(),
            vec![(
                "commonv1".to_string(),
                GoImportPath::new("example.com/common/v1")
            )]
        );
    }

    #[test]
    fn test_proto2_scalars_and_enums_are_pointers() {
        let legacy = FileBuilder::new("legacy/legacy.proto", "legacy")
            .proto2()
            .go_package("example.com/legacy")
            .enumeration("Kind", &["KIND_A", "KIND_B"])
            .message(MessageBuilder::new("Page").field("size", INT32))
            .message(
                MessageBuilder::new("Req")
                    .field("id", INT32)
                    .required("name", STRING)
                    .field("kind", FieldType::enumeration("legacy.Kind"))
                    .field("blob", BYTES)
                    .repeated("tags", STRING)
                    .field("page", FieldType::message("legacy.Page")),
            )
            .build();
        let pool = DescriptorPool::from_file_descriptor_set(FileDescriptorSet {
            file: vec![legacy],
        })
        .unwrap();
        let packages = GoPackages::new(&pool, &PluginOptions::default());
        let mut resolver = ImportResolver::new(GoImportPath::new("example.com/legacy"), []);
        let message = pool.get_message_by_name("legacy.Req").unwrap();

        let fields = flatten_fields(&message, &packages, &mut resolver).unwrap();
        let rendered: Vec<(&str, &str)> = fields
            .iter()
            .map(|f| (f.go_type.expr.as_str(), f.go_type.zero))
            .collect();

        assert_eq!(
            rendered,
            vec![
                ("*int32", "nil"),
                ("*string", "nil"),
                ("*Kind", "nil"),
                ("[]byte", "nil"),
                ("[]string", "nil"),
                ("*Page", "nil"),
            ]
        );
    }

    #[test]
    fn test_field_names_avoid_getters_of_earlier_fields() {
        let file = FileBuilder::new("names/names.proto", "names")
            .go_package("example.com/names")
            .message(
                MessageBuilder::new("Pair")
                    .field("foo", STRING)
                    .field("get_foo", STRING)
                    .field("reset", STRING),
            )
            .build();
        let pool = DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })
            .unwrap();
        let packages = GoPackages::new(&pool, &PluginOptions::default());
        let mut resolver = ImportResolver::new(GoImportPath::new("example.com/names"), []);
        let message = pool.get_message_by_name("names.Pair").unwrap();

        let fields = flatten_fields(&message, &packages, &mut resolver).unwrap();
        let go_names: Vec<&str> = fields.iter().map(|f| f.go_name.as_str()).collect();
        assert_eq!(go_names, vec!["Foo", "GetFoo_", "Reset_"]);

        let mut scope = NameScope::for_signature(&resolver);
        let names: Vec<String> = flatten_parameters(&fields, &mut scope)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["foo", "getFoo_", "reset_"]);
    }

    #[test]
    fn test_oneof_fields_are_unsupported() {
        let (pool, packages, mut resolver) = setup();
        let message = pool.get_message_by_name("local.Choice").unwrap();

        let err = flatten_fields(&message, &packages, &mut resolver).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::UnsupportedField { ref message, ref field }
                if message == "local.Choice" && field == "text"
        ));
    }

    #[test]
    fn test_names_avoid_keywords_locals_and_aliases() {
        let (pool, packages, mut resolver) = setup();
        let everything = pool.get_message_by_name("local.Everything").unwrap();
        let clashing = pool.get_message_by_name("local.Clashing").unwrap();

        // Binds the `commonv1` alias before names are claimed.
        flatten_fields(&everything, &packages, &mut resolver).unwrap();
        let fields = flatten_fields(&clashing, &packages, &mut resolver).unwrap();

        let mut scope = NameScope::for_signature(&resolver);
        let names: Vec<String> = flatten_parameters(&fields, &mut scope)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["type_", "err_", "commonv1_"]);

        // Returns share the scope with the parameters of the same signature.
        let returns = flatten_returns(&fields, &mut scope);
        assert_eq!(returns[0].name, "type__");
        assert_eq!(returns[0].declaration(), "type__ string");
    }

    #[test]
    fn test_error_return_preserves_arity() {
        let (pool, packages, mut resolver) = setup();
        let message = pool.get_message_by_name("local.Everything").unwrap();
        let fields = flatten_fields(&message, &packages, &mut resolver).unwrap();
        let mut scope = NameScope::for_signature(&resolver);
        let returns = flatten_returns(&fields, &mut scope);

        let statement = error_return(&returns, "err");
        assert_eq!(
            statement,
            r#"return "", 0, 0, 0, 0, false, nil, 0, nil, nil, nil, nil, nil, nil, err"#
        );
        let values = statement.trim_start_matches("return ").split(", ").count();
        assert_eq!(values, returns.len() + 1);
    }
}
