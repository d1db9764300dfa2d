//! # Twirpgen Core
//!
//! `twirpgen-core` is the engine behind the `protoc-gen-go-apiclienttwirp` plugin. It turns the
//! service descriptors of a `CodeGeneratorRequest` into Go source implementing the
//! `apiclient.Provider` surface on top of Twirp generated clients.
//!
//! ## Key Components
//!
//! * **[`Generator`]:** The main entry point. Loads a request and produces the
//!   [`EmittedArtifact`]s, or the first error.
//! * **[`generate_response`]:** Wraps the generator into the `CodeGeneratorResponse` the
//!   plugin hands back to `protoc`.
//!
//! ## Pipeline
//!
//! * **[`unit`]:** Groups the files to generate into generation units by Go import path.
//! * **[`shape`]:** Rejects every method that is not strictly unary.
//! * **[`flatten`]:** Turns request and response messages into parameter and return lists.
//! * **[`resolver`]:** Binds import aliases and local names without collisions, per file.
//! * **[`emit`]:** Builds the text of one Go file line by line.
//!
//! ## Re-exports
//!
//! This crate re-exports `prost`, `prost-reflect` and `prost-types` to ensure that consumers
//! use compatible versions of these underlying dependencies.
pub mod comments;
pub mod config;
pub mod emit;
pub mod error;
pub mod flatten;
pub mod generator;
pub mod goident;
pub mod layout;
pub mod naming;
pub mod resolver;
pub mod shape;
pub mod unit;

pub use config::PluginOptions;
pub use emit::EmittedArtifact;
pub use error::{GenerateError, ShapeError};
pub use generator::{Generator, generate_response};

// Re-exports
pub use prost;
pub use prost_reflect;
pub use prost_types;
