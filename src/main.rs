//! WADL generator - command-line tool for describing web application routes.
//!
//! # Usage
//!
//! ```bash
//! wadl-from-source [OPTIONS] <INPUT>
//! ```
//!
//! # Examples
//!
//! Describe an Actix-Web project:
//! ```bash
//! wadl-from-source ./my-api-project -o application.yaml
//! ```
//!
//! Describe a route manifest with XML Schema types:
//! ```bash
//! wadl-from-source routes.yaml --types xsd -f json -o application.json
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use wadl_from_source::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists, validate afterwards
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("WADL generator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;
    cli::run(args)?;

    info!("WADL document generation completed successfully");

    Ok(())
}
