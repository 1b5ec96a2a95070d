//! OpenAPI from samples - command-line tool for generating and checking OpenAPI documents.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-samples [OPTIONS] <COMMAND>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation from endpoint descriptors:
//! ```bash
//! openapi-from-samples generate endpoints.json -o openapi.yaml
//! ```
//!
//! Generate JSON documentation:
//! ```bash
//! openapi-from-samples generate endpoints.json -f json -o openapi.json
//! ```
//!
//! Check an existing document, with verbose logging:
//! ```bash
//! openapi-from-samples check openapi.yaml -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_samples::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag, initialize logging, then validate
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from samples starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Done");

    Ok(())
}
