//! # Errors
//!
//! Every failure the engine can report. None of them is recovered locally: a single error
//! aborts the whole run and is surfaced to the plugin host, which reports it to the user.
use crate::shape::MethodShape;

/// A method descriptor that is not strictly unary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Method '{method}' is {shape}, only unary methods are supported")]
pub struct ShapeError {
    /// Fully qualified method name (e.g. `pkg.a.Greeter.SayHello`).
    pub method: String,
    pub shape: MethodShape,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error("Two generated files resolve to the same name '{name}'")]
    GroupingConflict { name: String },

    #[error(
        "Go import path '{import_path}' is bound to package name '{bound}' but '{requested}' was requested"
    )]
    ResolutionConflict {
        import_path: String,
        bound: String,
        requested: String,
    },

    #[error("Unable to determine the Go import path for '{0}', set the go_package option or pass M{0}=<import path>")]
    MissingGoPackage(String),

    #[error("Field '{field}' of message '{message}' belongs to a oneof and cannot be flattened")]
    UnsupportedField { message: String, field: String },

    #[error("Invalid plugin parameter: '{0}'")]
    InvalidParameter(String),

    #[error("Generated file '{name}' does not start with module prefix '{module}'")]
    ModulePrefix { name: String, module: String },

    #[error("File '{0}' is listed for generation but missing from the request")]
    UnknownFile(String),

    #[error("Failed to build descriptor pool: '{0}'")]
    Descriptor(#[from] prost_reflect::DescriptorError),

    /// Wraps a failure with the generation unit (Go import path) it happened in.
    #[error("{import_path}: {source}")]
    InUnit {
        import_path: String,
        #[source]
        source: Box<GenerateError>,
    },
}

impl GenerateError {
    pub(crate) fn in_unit(self, import_path: &str) -> Self {
        match self {
            err @ GenerateError::InUnit { .. } => err,
            err => GenerateError::InUnit {
                import_path: import_path.to_string(),
                source: Box::new(err),
            },
        }
    }
}
