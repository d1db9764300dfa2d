//! # CLI
//!
//! This module defines the command-line interface of `protoc-gen-go-apiclienttwirp` using `clap`.
//!
//! `protoc` runs the plugin without arguments and talks to it over stdin/stdout. The flags
//! exist to replay a captured request by hand.
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "protoc-gen-go-apiclienttwirp",
    version,
    about = "protoc plugin generating Go API client wrappers over Twirp"
)]
pub struct Cli {
    /// Read the encoded CodeGeneratorRequest from this file instead of stdin
    #[arg(long)]
    pub request: Option<PathBuf>,

    /// Override the request parameter (e.g. "paths=source_relative,module=github.com/acme/gen")
    #[arg(long)]
    pub parameter: Option<String>,

    /// Log filter in tracing EnvFilter syntax, takes precedence over TWIRPGEN_LOG
    #[arg(long)]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["protoc-gen-go-apiclienttwirp"]).unwrap();
        assert!(cli.request.is_none());
        assert!(cli.parameter.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "protoc-gen-go-apiclienttwirp",
            "--request",
            "request.bin",
            "--parameter",
            "paths=source_relative",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.request, Some(PathBuf::from("request.bin")));
        assert_eq!(cli.parameter.as_deref(), Some("paths=source_relative"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
