//! OpenAPI Inspect - Command-line tool for reading OpenAPI documents in the terminal.
//!
//! This binary loads OpenAPI specification documents (JSON or YAML) and prints
//! one table per operation, with its parameters and a flattened view of the
//! primary success response schema.
//!
//! # Usage
//!
//! ```bash
//! openapi-inspect [OPTIONS] <PATH>
//! ```
//!
//! # Examples
//!
//! Inspect a single document:
//! ```bash
//! openapi-inspect openapi.yaml
//! ```
//!
//! Inspect every document under a directory, only `/users` paths:
//! ```bash
//! openapi-inspect ./docs -i '/users*'
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-inspect ./docs -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_inspect::cli;

fn main() -> Result<()> {
    // Parse once for the verbose flag, validate after the logger is up
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI Inspect starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    Ok(())
}
