//! # Generation Units
//!
//! A generation unit is every file to generate that shares one Go import path. It yields one
//! unit-level file (the provider) and one file-level file per member declaring services.
//!
//! Units and their members keep first-seen order, and services are aggregated in file order
//! then declaration order, so the output never depends on hashing.
use crate::{
    error::GenerateError,
    goident::{GoImportPath, GoPackage, GoPackages},
    naming::{go_camel_case, unexport},
    resolver::NameScope,
};
use prost_reflect::{FileDescriptor, ServiceDescriptor};
use std::collections::HashMap;

/// Package-level identifiers the unit-level file declares.
pub const PROVIDER_TYPE: &str = "provider";
pub const PROVIDER_CONSTRUCTOR: &str = "NewProvider";

/// A file to generate, paired with its Go package.
#[derive(Debug, Clone)]
pub struct GoPackageFile {
    pub file: FileDescriptor,
    pub package: GoPackage,
}

impl GoPackageFile {
    pub fn new(file: FileDescriptor, packages: &GoPackages) -> Result<Self, GenerateError> {
        let package = packages.file(&file)?.clone();
        Ok(Self { file, package })
    }

    pub fn services(&self) -> impl Iterator<Item = ServiceDescriptor> + '_ {
        self.file.services()
    }

    pub fn has_services(&self) -> bool {
        self.file.services().next().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct GenerationUnit {
    pub package: GoPackage,
    pub files: Vec<GoPackageFile>,
}

impl GenerationUnit {
    pub fn import_path(&self) -> &GoImportPath {
        &self.package.import_path
    }

    /// Every service of the unit, in file order then declaration order.
    pub fn services(&self) -> Vec<ServiceDescriptor> {
        self.files.iter().flat_map(|f| f.services()).collect()
    }

    pub fn has_services(&self) -> bool {
        self.files.iter().any(GoPackageFile::has_services)
    }

    /// Members that declare at least one service, in file order.
    pub fn service_files(&self) -> impl Iterator<Item = &GoPackageFile> {
        self.files.iter().filter(|f| f.has_services())
    }

    /// Names of the unexported wrapper types, keyed by the service's full name.
    ///
    /// A wrapper is named after its service (`Greeter` → `greeter`); a name already taken by
    /// the provider or an earlier service gets a trailing underscore.
    pub fn wrapper_names(&self) -> HashMap<String, String> {
        let mut scope = NameScope::new([PROVIDER_TYPE, PROVIDER_CONSTRUCTOR]);
        self.services()
            .into_iter()
            .map(|service| {
                let name = scope.claim(&unexport(&go_camel_case(service.name())));
                (service.full_name().to_string(), name)
            })
            .collect()
    }
}

/// Partitions `files` into generation units keyed by Go import path.
///
/// # Returns
///
/// * `Ok(Vec<GenerationUnit>)` - One unit per distinct import path, in first-seen order.
///   Units without services are kept; callers decide to skip them.
/// * `Err(GenerateError::ResolutionConflict)` - Two files share an import path but declare
///   different Go package names.
pub fn group(files: Vec<GoPackageFile>) -> Result<Vec<GenerationUnit>, GenerateError> {
    let mut units: Vec<GenerationUnit> = vec![];
    let mut index: HashMap<GoImportPath, usize> = HashMap::new();

    for file in files {
        match index.get(&file.package.import_path) {
            Some(&position) => {
                let unit = &mut units[position];
                if unit.package.name != file.package.name {
                    return Err(GenerateError::ResolutionConflict {
                        import_path: unit.package.import_path.to_string(),
                        bound: unit.package.name.clone(),
                        requested: file.package.name.clone(),
                    });
                }
                unit.files.push(file);
            }
            None => {
                index.insert(file.package.import_path.clone(), units.len());
                units.push(GenerationUnit {
                    package: file.package.clone(),
                    files: vec![file],
                });
            }
        }
    }

    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginOptions;
    use prost_reflect::DescriptorPool;
    use twirpgen_fixtures::{
        FileBuilder, MessageBuilder, ServiceBuilder, prost_types::FileDescriptorSet,
        split_package_files,
    };

    fn package_files(pool: &DescriptorPool, names: &[&str]) -> Vec<GoPackageFile> {
        let packages = GoPackages::new(pool, &PluginOptions::default());
        names
            .iter()
            .map(|name| GoPackageFile::new(pool.get_file_by_name(name).unwrap(), &packages).unwrap())
            .collect()
    }

    #[test]
    fn test_files_sharing_a_package_merge_in_file_order() {
        let mut files = split_package_files();
        files.push(
            FileBuilder::new("pkg/c/empty.proto", "pkg.c")
                .go_package("pkg/c")
                .message(MessageBuilder::new("Nothing"))
                .build(),
        );
        let pool = DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: files })
            .unwrap();

        let units = group(package_files(
            &pool,
            &["pkg/b/users.proto", "pkg/c/empty.proto", "pkg/b/teams.proto"],
        ))
        .unwrap();

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].import_path().as_str(), "pkg/b");
        assert_eq!(units[0].files.len(), 2);
        let services: Vec<_> = units[0]
            .services()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(services, vec!["UserService", "TeamService"]);

        assert_eq!(units[1].import_path().as_str(), "pkg/c");
        assert!(!units[1].has_services());
        assert_eq!(units[1].service_files().count(), 0);
    }

    #[test]
    fn test_conflicting_package_names_are_rejected() {
        let first = FileBuilder::new("x/one.proto", "x")
            .go_package("example.com/x;xpb")
            .build();
        let second = FileBuilder::new("x/two.proto", "x")
            .go_package("example.com/x;xv1")
            .build();
        let pool = DescriptorPool::from_file_descriptor_set(FileDescriptorSet {
            file: vec![first, second],
        })
        .unwrap();

        let err = group(package_files(&pool, &["x/one.proto", "x/two.proto"])).unwrap_err();
        assert!(matches!(err, GenerateError::ResolutionConflict { .. }));
    }

    #[test]
    fn test_wrapper_names_avoid_the_provider() {
        let file = FileBuilder::new("p/p.proto", "p")
            .go_package("example.com/p")
            .message(MessageBuilder::new("Msg"))
            .service(ServiceBuilder::new("Provider").unary("Get", "p.Msg", "p.Msg"))
            .service(ServiceBuilder::new("user_service").unary("Get", "p.Msg", "p.Msg"))
            .build();
        let pool =
            DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })
                .unwrap();

        let units = group(package_files(&pool, &["p/p.proto"])).unwrap();
        let names = units[0].wrapper_names();
        assert_eq!(names["p.Provider"], "provider_");
        assert_eq!(names["p.user_service"], "userService");
    }
}
