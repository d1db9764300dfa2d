//! # protoc-gen-go-apiclienttwirp
//!
//! The plugin executable `protoc` spawns for `--go-apiclienttwirp_out`. This file drives one
//! invocation:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and sets up logging.
//! 2. **Input**: Decodes a `CodeGeneratorRequest` from stdin (or `--request`).
//! 3. **Generation**: Delegates to [`twirpgen_core::generate_response`].
//! 4. **Output**: Encodes the `CodeGeneratorResponse` to stdout.
//!
//! Generation errors travel inside the response for `protoc` to report; the process only
//! fails when the request cannot be read or the response cannot be written.

mod cli;
mod logging;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use prost::Message;
use prost_types::compiler::CodeGeneratorRequest;
use std::io::{Read, Write};

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    logging::init(args.log_level.as_deref())?;

    let bytes = match &args.request {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read request file '{}'", path.display()))?,
        None => {
            let mut bytes = vec![];
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("Failed to read request from stdin")?;
            bytes
        }
    };

    let mut request =
        CodeGeneratorRequest::decode(bytes.as_slice()).context("Failed to decode request")?;
    if let Some(parameter) = args.parameter {
        request.parameter = Some(parameter);
    }

    tracing::debug!(
        files = request.file_to_generate.len(),
        parameter = request.parameter.as_deref().unwrap_or_default(),
        "Received request"
    );

    let response = twirpgen_core::generate_response(&request);
    if let Some(error) = &response.error {
        tracing::warn!(%error, "Generation failed");
    }

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&response.encode_to_vec())
        .context("Failed to write response")?;
    stdout.flush().context("Failed to flush response")?;

    Ok(())
}
