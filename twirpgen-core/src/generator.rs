//! # Generator
//!
//! Drives one plugin invocation from a `CodeGeneratorRequest` to the generated files.
//!
//! 1. The request's descriptors are loaded into a [`DescriptorPool`] and the parameter is
//!    parsed into [`PluginOptions`].
//! 2. The files listed in `file_to_generate` are grouped into [`GenerationUnit`]s.
//! 3. Each unit declaring services yields a unit-level file ([`provider`]) followed by one
//!    file-level file per member declaring services ([`service`]), in file order.
//!
//! The first error aborts the run: either every artifact is produced or none is.
pub mod provider;
pub mod service;

use crate::{
    config::PluginOptions,
    emit::{EmittedArtifact, GoFile},
    error::GenerateError,
    goident::{CONTEXT_IMPORT_PATH, GoIdent, GoPackage, GoPackages, ZAP_IMPORT_PATH},
    layout::UnitLayout,
    naming::{go_camel_case, unexport},
    unit::{self, GenerationUnit, GoPackageFile, PROVIDER_CONSTRUCTOR, PROVIDER_TYPE},
};
use prost_reflect::{DescriptorPool, ServiceDescriptor};
use prost_types::{
    FileDescriptorSet,
    compiler::{CodeGeneratorRequest, CodeGeneratorResponse, code_generator_response::Feature},
};
use std::collections::{HashMap, HashSet};

/// Loaded request state for one plugin invocation.
#[derive(Debug, Clone)]
pub struct Generator {
    pool: DescriptorPool,
    options: PluginOptions,
    file_to_generate: Vec<String>,
}

impl Generator {
    /// Loads the descriptors and options of `request`.
    ///
    /// # Returns
    ///
    /// * `Ok(Generator)` - Ready to [`generate`](Generator::generate).
    /// * `Err(GenerateError::Descriptor)` - The descriptors do not form a valid pool.
    /// * `Err(GenerateError::InvalidParameter)` - The parameter string is malformed.
    pub fn new(request: &CodeGeneratorRequest) -> Result<Self, GenerateError> {
        let pool = DescriptorPool::from_file_descriptor_set(FileDescriptorSet {
            file: request.proto_file.clone(),
        })?;
        let options = PluginOptions::parse(request.parameter.as_deref())?;

        Ok(Self {
            pool,
            options,
            file_to_generate: request.file_to_generate.clone(),
        })
    }

    /// Produces every artifact of the request, in unit order.
    pub fn generate(&self) -> Result<Vec<EmittedArtifact>, GenerateError> {
        let packages = GoPackages::new(&self.pool, &self.options);

        let files = self
            .file_to_generate
            .iter()
            .map(|name| {
                let file = self
                    .pool
                    .get_file_by_name(name)
                    .ok_or_else(|| GenerateError::UnknownFile(name.clone()))?;
                GoPackageFile::new(file, &packages)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let units = unit::group(files)?;
        let mut artifacts = vec![];
        let mut names = HashSet::new();

        for unit in &units {
            if !unit.has_services() {
                tracing::debug!(import_path = %unit.import_path(), "Skipping unit without services");
                continue;
            }

            let unit_artifacts = self
                .generate_unit(unit, &packages)
                .map_err(|err| err.in_unit(unit.import_path().as_str()))?;

            for artifact in unit_artifacts {
                if !names.insert(artifact.name.clone()) {
                    return Err(GenerateError::GroupingConflict {
                        name: artifact.name,
                    });
                }
                tracing::debug!(name = %artifact.name, "Emitted file");
                artifacts.push(artifact);
            }
        }

        tracing::info!(
            units = units.len(),
            files = artifacts.len(),
            "Generated Twirp API clients"
        );
        Ok(artifacts)
    }

    fn generate_unit(
        &self,
        unit: &GenerationUnit,
        packages: &GoPackages,
    ) -> Result<Vec<EmittedArtifact>, GenerateError> {
        tracing::debug!(
            import_path = %unit.import_path(),
            files = unit.files.len(),
            "Generating unit"
        );

        let context = UnitContext {
            unit,
            layout: UnitLayout::new(unit, &self.options),
            packages,
            options: &self.options,
            wrappers: unit.wrapper_names(),
        };

        let mut artifacts = vec![provider::generate(&context)?];
        for file in unit.service_files() {
            artifacts.push(service::generate(&context, file)?);
        }
        Ok(artifacts)
    }
}

/// Runs the generator over `request` and packs the outcome into the plugin response.
///
/// A generation failure is not a plugin failure: it is reported through the response's
/// `error` field, without any file.
pub fn generate_response(request: &CodeGeneratorRequest) -> CodeGeneratorResponse {
    let result = Generator::new(request).and_then(|generator| generator.generate());

    match result {
        Ok(artifacts) => CodeGeneratorResponse {
            supported_features: Some(Feature::Proto3Optional as u64),
            file: artifacts.into_iter().map(Into::into).collect(),
            ..Default::default()
        },
        Err(err) => {
            tracing::debug!(error = %err, "Generation failed");
            CodeGeneratorResponse {
                error: Some(err.to_string()),
                supported_features: Some(Feature::Proto3Optional as u64),
                ..Default::default()
            }
        }
    }
}

/// Everything the templates of one unit share.
pub(crate) struct UnitContext<'a> {
    pub unit: &'a GenerationUnit,
    pub layout: UnitLayout,
    pub packages: &'a GoPackages,
    pub options: &'a PluginOptions,
    pub wrappers: HashMap<String, String>,
}

impl UnitContext<'_> {
    /// Starts a file of the generated package, reserving every package-level declaration.
    pub fn go_file(&self, name: String, source: Option<String>) -> GoFile {
        let declared = [PROVIDER_TYPE, PROVIDER_CONSTRUCTOR]
            .into_iter()
            .chain(self.wrappers.values().map(String::as_str));
        GoFile::new(name, self.layout.generated.clone(), source, declared)
    }

    /// Name of the unexported struct wrapping `service`.
    pub fn wrapper_name(&self, service: &ServiceDescriptor) -> String {
        self.wrappers
            .get(service.full_name())
            .cloned()
            .unwrap_or_else(|| unexport(&go_camel_case(service.name())))
    }

    pub fn context_ident(&self) -> GoIdent {
        GoPackage::from_import_path(CONTEXT_IMPORT_PATH).ident("Context")
    }

    pub fn logger_ident(&self) -> GoIdent {
        GoPackage::from_import_path(ZAP_IMPORT_PATH).ident("Logger")
    }

    pub fn http_client_ident(&self) -> GoIdent {
        GoPackage::from_import_path(&self.options.httpclient_import_path).ident("Client")
    }

    pub fn new_client_options_ident(&self) -> GoIdent {
        GoPackage::from_import_path(&self.options.twirpclient_import_path)
            .ident("NewClientOptions")
    }
}
