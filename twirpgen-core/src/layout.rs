//! # Output Layout
//!
//! Every generation unit (Go package `P` named `N`) involves three companion packages:
//!
//! | suffix | contents | default location |
//! |--------|----------|------------------|
//! | `api` | service interfaces | `P/Napi` |
//! | `apiclient` | the `Provider` interface | `P/Napiclient` |
//! | `apiclienttwirp` | the generated code | `P/Napiclienttwirp` |
//!
//! `named_go_package=<suffix>=<root>` moves a companion package under `<root>`, keeping the
//! unit's import path (minus `go_import_path_prefix`) as the directory structure below it.
//!
//! [`UnitLayout`] also decides the names of the generated files, depending on the
//! [`PathsMode`] and `module` options.
use crate::{
    config::{PathsMode, PluginOptions},
    error::GenerateError,
    goident::{GoImportPath, GoPackage},
    unit::GenerationUnit,
};
use prost_reflect::FileDescriptor;

pub const API_SUFFIX: &str = "api";
pub const APICLIENT_SUFFIX: &str = "apiclient";
pub const GENERATED_SUFFIX: &str = "apiclienttwirp";

/// Where the generated code of one unit lives, and the packages it refers to.
#[derive(Debug, Clone)]
pub struct UnitLayout {
    /// The unit's own package, where the Twirp clients are generated.
    pub base: GoPackage,
    pub api: GoPackage,
    pub apiclient: GoPackage,
    /// The package the emitted files declare.
    pub generated: GoPackage,
    paths: PathsMode,
    module: Option<String>,
}

impl UnitLayout {
    pub fn new(unit: &GenerationUnit, options: &PluginOptions) -> Self {
        let base = unit.package.clone();
        Self {
            api: named_package(&base, API_SUFFIX, options),
            apiclient: named_package(&base, APICLIENT_SUFFIX, options),
            generated: named_package(&base, GENERATED_SUFFIX, options),
            base,
            paths: options.paths,
            module: options.module.clone(),
        }
    }

    /// Name of the unit-level file: `<dir>/<package name>.go`.
    ///
    /// With `paths=source_relative` the directory sits next to the unit's first file.
    pub fn unit_file_name(&self, unit: &GenerationUnit) -> Result<String, GenerateError> {
        let anchor = unit.files.first().map(|f| &f.file);
        let dir = self.output_dir(anchor)?;
        Ok(join(&dir, &format!("{}.go", self.generated.name)))
    }

    /// Name of the file-level file of `file`: `<dir>/<proto stem>.apiclienttwirp.go`.
    pub fn service_file_name(&self, file: &FileDescriptor) -> Result<String, GenerateError> {
        let dir = self.output_dir(Some(file))?;
        Ok(join(
            &dir,
            &format!("{}.{GENERATED_SUFFIX}.go", proto_stem(file.name())),
        ))
    }

    fn output_dir(&self, file: Option<&FileDescriptor>) -> Result<String, GenerateError> {
        match (self.paths, file) {
            (PathsMode::SourceRelative, Some(file)) => {
                Ok(join(proto_dir(file.name()), &self.generated.name))
            }
            _ => self.strip_module(self.generated.import_path.as_str()),
        }
    }

    fn strip_module(&self, dir: &str) -> Result<String, GenerateError> {
        let Some(module) = &self.module else {
            return Ok(dir.to_string());
        };

        if dir == module {
            return Ok(String::new());
        }
        dir.strip_prefix(module.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .map(str::to_string)
            .ok_or_else(|| GenerateError::ModulePrefix {
                name: dir.to_string(),
                module: module.clone(),
            })
    }
}

/// The companion package of `base` for `suffix`.
///
/// ```
/// use twirpgen_core::{config::PluginOptions, goident::GoPackage, layout::named_package};
///
/// let base = GoPackage::parse("github.com/acme/pet/v1;petv1");
/// let api = named_package(&base, "api", &PluginOptions::default());
/// assert_eq!(api.import_path.as_str(), "github.com/acme/pet/v1/petv1api");
/// assert_eq!(api.name, "petv1api");
/// ```
pub fn named_package(base: &GoPackage, suffix: &str, options: &PluginOptions) -> GoPackage {
    let name = format!("{}{suffix}", base.name);

    let import_path = match options.named_roots.get(suffix) {
        Some(root) => {
            let relative = relative_import_path(base.import_path.as_str(), options);
            GoImportPath::new(root.as_str()).join(relative).join(&name)
        }
        None => base.import_path.join(&name),
    };

    GoPackage::new(import_path, name)
}

// Import paths outside `go_import_path_prefix` are kept whole.
fn relative_import_path<'a>(import_path: &'a str, options: &PluginOptions) -> &'a str {
    options
        .go_import_path_prefix
        .as_deref()
        .and_then(|prefix| import_path.strip_prefix(prefix))
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(import_path)
}

fn proto_dir(name: &str) -> &str {
    name.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn proto_stem(name: &str) -> &str {
    let base = name.rsplit_once('/').map(|(_, base)| base).unwrap_or(name);
    base.strip_suffix(".proto").unwrap_or(base)
}

fn join(dir: &str, child: &str) -> String {
    match (dir.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (_, true) => dir.to_string(),
        _ => format!("{dir}/{child}"),
    }
}
