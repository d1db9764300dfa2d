//! # Plugin Options
//!
//! `protoc` forwards everything after `--go-apiclienttwirp_opt=` as a single comma separated
//! parameter string. This module parses it into [`PluginOptions`].
//!
//! | Parameter | Effect |
//! |-----------|--------|
//! | `M<file>=<import path>[;<name>]` | Go package of a proto file lacking (or overriding) `go_package` |
//! | `paths=import\|source_relative` | Place outputs by Go import path (default) or next to the proto file |
//! | `module=<prefix>` | Strip a module prefix from import-path based output names |
//! | `named_go_package=<suffix>=<root>` | Relocate the `api`, `apiclient` or `apiclienttwirp` package |
//! | `go_import_path_prefix=<prefix>` | Prefix removed from import paths before joining them with a named root |
//! | `httpclient=<import path>` | Import path of the HTTP client library |
//! | `twirpclient=<import path>` | Import path of the Twirp client options library |
use crate::error::GenerateError;
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_HTTPCLIENT_IMPORT_PATH: &str =
    "github.com/bufbuild/buf/internal/pkg/transport/http/httpclient";
pub const DEFAULT_TWIRPCLIENT_IMPORT_PATH: &str =
    "github.com/bufbuild/buf/internal/pkg/transport/twirp/twirpclient";

/// Where generated files are written relative to the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathsMode {
    /// Directory derived from the Go import path.
    #[default]
    Import,
    /// Directory of the proto file the unit was generated from.
    SourceRelative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOptions {
    /// `M` mappings keyed by proto file name, value as written (`path` or `path;name`).
    pub import_mappings: HashMap<String, String>,
    pub paths: PathsMode,
    pub module: Option<String>,
    /// Named package roots keyed by suffix (`api`, `apiclient`, `apiclienttwirp`).
    pub named_roots: BTreeMap<String, String>,
    pub go_import_path_prefix: Option<String>,
    pub httpclient_import_path: String,
    pub twirpclient_import_path: String,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            import_mappings: HashMap::new(),
            paths: PathsMode::default(),
            module: None,
            named_roots: BTreeMap::new(),
            go_import_path_prefix: None,
            httpclient_import_path: DEFAULT_HTTPCLIENT_IMPORT_PATH.to_string(),
            twirpclient_import_path: DEFAULT_TWIRPCLIENT_IMPORT_PATH.to_string(),
        }
    }
}

impl PluginOptions {
    /// Parses the request parameter.
    ///
    /// # Returns
    ///
    /// * `Ok(PluginOptions)` - Defaults overridden by every recognized `key=value` pair.
    /// * `Err(GenerateError::InvalidParameter)` - On unknown keys or malformed values.
    pub fn parse(parameter: Option<&str>) -> Result<Self, GenerateError> {
        let mut options = PluginOptions::default();
        let Some(parameter) = parameter else {
            return Ok(options);
        };

        for part in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| GenerateError::InvalidParameter(part.to_string()))?;

            if value.is_empty() {
                return Err(GenerateError::InvalidParameter(part.to_string()));
            }

            match key {
                "paths" => {
                    options.paths = match value {
                        "import" => PathsMode::Import,
                        "source_relative" => PathsMode::SourceRelative,
                        _ => return Err(GenerateError::InvalidParameter(part.to_string())),
                    }
                }
                "module" => options.module = Some(value.trim_end_matches('/').to_string()),
                "named_go_package" => {
                    let (suffix, root) = value
                        .split_once('=')
                        .filter(|(suffix, root)| !suffix.is_empty() && !root.is_empty())
                        .ok_or_else(|| GenerateError::InvalidParameter(part.to_string()))?;
                    options
                        .named_roots
                        .insert(suffix.to_string(), root.trim_end_matches('/').to_string());
                }
                "go_import_path_prefix" => {
                    options.go_import_path_prefix = Some(value.trim_end_matches('/').to_string())
                }
                "httpclient" => options.httpclient_import_path = value.to_string(),
                "twirpclient" => options.twirpclient_import_path = value.to_string(),
                key if key.len() > 1 && key.starts_with('M') => {
                    options
                        .import_mappings
                        .insert(key[1..].to_string(), value.to_string());
                }
                _ => return Err(GenerateError::InvalidParameter(part.to_string())),
            }
        }

        Ok(options)
    }
}
