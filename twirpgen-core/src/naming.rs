//! Go naming conventions used while emitting source.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `say_hello` | [`go_camel_case`] | `SayHello` |
//! | `Greeting` | [`unexport`] | `greeting` |
//! | `my-pkg/v1` | [`go_sanitized`] | `my_pkg_v1` |
//! | `github.com/acme/foo/v1` | [`base_name`] | `v1` |

use std::collections::HashSet;

/// Go keywords. None of them may be used as an identifier.
pub const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Go predeclared identifiers. Generated locals never shadow them.
pub const GO_PREDECLARED: &[&str] = &[
    "any",
    "append",
    "bool",
    "byte",
    "cap",
    "clear",
    "close",
    "comparable",
    "complex",
    "complex128",
    "complex64",
    "copy",
    "delete",
    "error",
    "false",
    "float32",
    "float64",
    "imag",
    "int",
    "int16",
    "int32",
    "int64",
    "int8",
    "iota",
    "len",
    "make",
    "max",
    "min",
    "new",
    "nil",
    "panic",
    "print",
    "println",
    "real",
    "recover",
    "rune",
    "string",
    "true",
    "uint",
    "uint16",
    "uint32",
    "uint64",
    "uint8",
    "uintptr",
];

/// Method names of generated protobuf message structs. Fields never take these names.
const MESSAGE_METHOD_NAMES: &[&str] = &[
    "Reset",
    "String",
    "ProtoMessage",
    "Marshal",
    "Unmarshal",
    "ExtensionRangeArray",
    "ExtensionMap",
    "Descriptor",
];

pub fn is_go_keyword(name: &str) -> bool {
    GO_KEYWORDS.contains(&name)
}

/// Converts a protobuf identifier into an exported Go identifier.
///
/// Underscores followed by a lowercase letter are dropped and the letter upper-cased,
/// a leading underscore becomes `X`, and dots become underscores unless they precede a
/// lowercase letter.
///
/// ```
/// use twirpgen_core::naming::go_camel_case;
///
/// assert_eq!(go_camel_case("say_hello"), "SayHello");
/// assert_eq!(go_camel_case("_id"), "XId");
/// assert_eq!(go_camel_case("http2_port"), "Http2Port");
/// ```
pub fn go_camel_case(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len() + 1);
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let next_is_lower = bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase);

        if c == b'.' && next_is_lower {
            // Skip over '.' in ".{{lowercase}}".
        } else if c == b'.' {
            out.push('_');
        } else if c == b'_' && (i == 0 || bytes[i - 1] == b'.') {
            out.push('X');
        } else if c == b'_' && next_is_lower {
            // Skip over '_' in "_{{lowercase}}".
        } else if c.is_ascii_digit() {
            out.push(c as char);
        } else {
            out.push(c.to_ascii_uppercase() as char);
            while bytes.get(i + 1).is_some_and(u8::is_ascii_lowercase) {
                i += 1;
                out.push(bytes[i] as char);
            }
        }
        i += 1;
    }

    out
}

/// Lower-cases the first letter of an exported Go name, leaving the rest unchanged.
///
/// ```
/// use twirpgen_core::naming::unexport;
///
/// assert_eq!(unexport("Greeter"), "greeter");
/// assert_eq!(unexport("HTTPClient"), "hTTPClient");
/// assert_eq!(unexport(""), "");
/// ```
pub fn unexport(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Go struct field names generated for the fields of one message, in declaration order.
///
/// A name is suffixed with `_` while it is taken by a message method, an earlier field or an
/// earlier field's `Get<Name>` getter, or while its own getter would be taken.
///
/// ```
/// use twirpgen_core::naming::message_field_go_names;
///
/// assert_eq!(
///     message_field_go_names(["foo", "get_foo", "foo_bar", "fooBar"]),
///     vec!["Foo", "GetFoo_", "FooBar", "FooBar_"]
/// );
/// ```
pub fn message_field_go_names<'a>(
    field_names: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let mut used: HashSet<String> = MESSAGE_METHOD_NAMES
        .iter()
        .map(|name| name.to_string())
        .collect();

    field_names
        .into_iter()
        .map(|field_name| {
            let mut name = go_camel_case(field_name);
            while used.contains(&name) || used.contains(&format!("Get{name}")) {
                name.push('_');
            }
            used.insert(format!("Get{name}"));
            used.insert(name.clone());
            name
        })
        .collect()
}

/// Turns an arbitrary string into a valid Go identifier.
///
/// ```
/// use twirpgen_core::naming::go_sanitized;
///
/// assert_eq!(go_sanitized("my-pkg.v1"), "my_pkg_v1");
/// assert_eq!(go_sanitized("2fa"), "_2fa");
/// assert_eq!(go_sanitized("type"), "_type");
/// ```
pub fn go_sanitized(s: &str) -> String {
    let mut out: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    let starts_ok = out
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');

    if !starts_ok || is_go_keyword(&out) {
        out.insert(0, '_');
    }
    out
}

/// Last element of a slash separated import path.
pub fn base_name(import_path: &str) -> &str {
    import_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(import_path)
}

/// Default Go package name of an import path: its sanitized base name.
pub fn default_package_name(import_path: &str) -> String {
    go_sanitized(base_name(import_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_go_camel_case() {
        assert_eq!(go_camel_case("name"), "Name");
        assert_eq!(go_camel_case("user_id"), "UserId");
        assert_eq!(go_camel_case("SayHello"), "SayHello");
        assert_eq!(go_camel_case("Outer.Inner"), "Outer_Inner");
        assert_eq!(go_camel_case("foo_2bar"), "Foo_2Bar");
        assert_eq!(go_camel_case("__x"), "XX");
    }

    #[test]
    fn test_field_names_avoid_message_methods() {
        assert_eq!(
            message_field_go_names(["descriptor", "string", "display_name"]),
            vec!["Descriptor_", "String_", "DisplayName"]
        );
    }

    #[test]
    fn test_field_names_avoid_earlier_fields_and_getters() {
        assert_eq!(
            message_field_go_names(["foo", "get_foo", "foo_bar", "fooBar", "FooBar"]),
            vec!["Foo", "GetFoo_", "FooBar", "FooBar_", "FooBar__"]
        );
        // `Foo` would need a `GetFoo` getter, already a field name.
        assert_eq!(message_field_go_names(["get_foo", "foo"]), vec!["GetFoo", "Foo_"]);
        assert_eq!(message_field_go_names(["reset"]), vec!["Reset_"]);
    }

    #[test]
    fn test_package_names() {
        assert_eq!(base_name("github.com/acme/foo/v1"), "v1");
        assert_eq!(base_name("foo"), "foo");
        assert_eq!(default_package_name("github.com/acme/go-utils"), "go_utils");
        assert_eq!(default_package_name("example.com/select"), "_select");
    }

    proptest! {
        #[test]
        fn prop_unexport_only_touches_first_char(name in "[A-Z][A-Za-z0-9]{0,12}") {
            let lowered = unexport(&name);
            prop_assert_eq!(&lowered[1..], &name[1..]);
            prop_assert!(lowered.chars().next().is_some_and(|c| c.is_ascii_lowercase()));
        }

        #[test]
        fn prop_go_camel_case_is_exported_identifier(name in "[a-z][a-z0-9_]{0,16}") {
            let go_name = go_camel_case(&name);
            prop_assert!(go_name.chars().next().is_some_and(|c| c.is_ascii_uppercase()));
            prop_assert!(go_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }

        #[test]
        fn prop_go_sanitized_is_identifier(raw in "\\PC{1,16}") {
            let ident = go_sanitized(&raw);
            prop_assert!(!is_go_keyword(&ident));
            prop_assert!(ident.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_'));
            prop_assert!(ident.chars().all(|c| c.is_alphanumeric() || c == '_'));
        }
    }
}
