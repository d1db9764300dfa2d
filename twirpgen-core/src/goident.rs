//! # Go identifiers
//!
//! A [`GoIdent`] is a symbol living in some Go package: the unit of work of the
//! [`ImportResolver`](crate::resolver::ImportResolver). [`GoPackages`] maps every file of the
//! request to its Go package so message and enum descriptors can be turned into idents.
use crate::{
    config::PluginOptions,
    error::GenerateError,
    naming::{default_package_name, go_camel_case},
};
use prost_reflect::{DescriptorPool, EnumDescriptor, FileDescriptor, MessageDescriptor};
use std::{collections::HashMap, fmt};

pub const CONTEXT_IMPORT_PATH: &str = "context";
pub const ZAP_IMPORT_PATH: &str = "go.uber.org/zap";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GoImportPath(String);

impl GoImportPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends a path element.
    pub fn join(&self, child: &str) -> Self {
        if self.0.is_empty() {
            Self(child.to_string())
        } else if child.is_empty() {
            self.clone()
        } else {
            Self(format!("{}/{}", self.0, child))
        }
    }
}

impl fmt::Display for GoImportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Go package: import path plus the name it declares in its `package` clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GoPackage {
    pub import_path: GoImportPath,
    pub name: String,
}

impl GoPackage {
    pub fn new(import_path: GoImportPath, name: impl Into<String>) -> Self {
        Self {
            import_path,
            name: name.into(),
        }
    }

    /// A package whose name is the sanitized base of its import path (`go.uber.org/zap` → `zap`).
    pub fn from_import_path(import_path: &str) -> Self {
        Self::new(
            GoImportPath::new(import_path),
            default_package_name(import_path),
        )
    }

    /// Parses a `go_package` value: `path` or `path;name`.
    pub fn parse(go_package: &str) -> Self {
        match go_package.split_once(';') {
            Some((path, name)) if !name.is_empty() => {
                Self::new(GoImportPath::new(path), name.to_string())
            }
            Some((path, _)) => Self::from_import_path(path),
            None => Self::from_import_path(go_package),
        }
    }

    pub fn ident(&self, name: impl Into<String>) -> GoIdent {
        GoIdent {
            package: self.clone(),
            name: name.into(),
        }
    }
}

/// A named symbol in a Go package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GoIdent {
    pub package: GoPackage,
    pub name: String,
}

/// Go packages of every file in the request, keyed by proto file name.
#[derive(Debug, Clone, Default)]
pub struct GoPackages {
    by_file: HashMap<String, GoPackage>,
}

impl GoPackages {
    /// Resolves the Go package of each file: an `M` mapping wins over the `go_package` option.
    /// Files with neither are left out and fail on lookup.
    pub fn new(pool: &DescriptorPool, options: &PluginOptions) -> Self {
        let by_file = pool
            .files()
            .filter_map(|file| {
                let go_package = options
                    .import_mappings
                    .get(file.name())
                    .map(String::as_str)
                    .or_else(|| {
                        file.file_descriptor_proto()
                            .options
                            .as_ref()
                            .and_then(|o| o.go_package.as_deref())
                    })
                    .filter(|p| !p.is_empty())?;
                Some((file.name().to_string(), GoPackage::parse(go_package)))
            })
            .collect();

        Self { by_file }
    }

    pub fn file(&self, file: &FileDescriptor) -> Result<&GoPackage, GenerateError> {
        self.by_file
            .get(file.name())
            .ok_or_else(|| GenerateError::MissingGoPackage(file.name().to_string()))
    }

    /// Ident of the Go struct generated for a message (`Outer.Inner` → `Outer_Inner`).
    pub fn message_ident(&self, message: &MessageDescriptor) -> Result<GoIdent, GenerateError> {
        let package = self.file(&message.parent_file())?;
        Ok(package.ident(message_go_name(message)))
    }

    pub fn enum_ident(&self, enum_desc: &EnumDescriptor) -> Result<GoIdent, GenerateError> {
        let package = self.file(&enum_desc.parent_file())?;
        let name = match enum_desc.parent_message() {
            Some(parent) => format!(
                "{}_{}",
                message_go_name(&parent),
                go_camel_case(enum_desc.name())
            ),
            None => go_camel_case(enum_desc.name()),
        };
        Ok(package.ident(name))
    }
}

fn message_go_name(message: &MessageDescriptor) -> String {
    match message.parent_message() {
        Some(parent) => format!(
            "{}_{}",
            message_go_name(&parent),
            go_camel_case(message.name())
        ),
        None => go_camel_case(message.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twirpgen_fixtures::{FileBuilder, MessageBuilder, STRING, prost_types::FileDescriptorSet};

    #[test]
    fn test_parse_go_package() {
        let package = GoPackage::parse("github.com/acme/foo/v1;foov1");
        assert_eq!(package.import_path.as_str(), "github.com/acme/foo/v1");
        assert_eq!(package.name, "foov1");

        let package = GoPackage::parse("github.com/acme/go-foo");
        assert_eq!(package.import_path.as_str(), "github.com/acme/go-foo");
        assert_eq!(package.name, "go_foo");
    }

    #[test]
    fn test_nested_message_and_mapping_override() {
        let file = FileBuilder::new("nested.proto", "nested")
            .go_package("example.com/nested")
            .message(
                MessageBuilder::new("outer")
                    .field("id", STRING)
                    .nested(MessageBuilder::new("inner_thing")),
            )
            .build();
        let unmapped = FileBuilder::new("bare.proto", "bare").build();

        let pool = DescriptorPool::from_file_descriptor_set(FileDescriptorSet {
            file: vec![file, unmapped],
        })
        .unwrap();

        let options = PluginOptions::parse(Some("Mnested.proto=example.com/other;otherpb")).unwrap();
        let packages = GoPackages::new(&pool, &options);

        let inner = pool.get_message_by_name("nested.outer.inner_thing").unwrap();
        let ident = packages.message_ident(&inner).unwrap();
        assert_eq!(ident.name, "Outer_InnerThing");
        assert_eq!(ident.package.import_path.as_str(), "example.com/other");
        assert_eq!(ident.package.name, "otherpb");

        let bare = pool.get_file_by_name("bare.proto").unwrap();
        assert!(matches!(
            packages.file(&bare),
            Err(GenerateError::MissingGoPackage(name)) if name == "bare.proto"
        ));
    }
}
