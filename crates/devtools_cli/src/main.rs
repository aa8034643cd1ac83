//! devtools CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 4: Template error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use devtools_templates::{ErrorKind, TemplateError};

mod commands;

use commands::{Cli, CommandFailure, Commands, TemplateCommand};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose {
        "debug"
    } else if cli.global.quiet {
        "error"
    } else {
        "warn"
    };

    // RUST_LOG wins over the verbosity flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("devtools={default_level}")));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::Template(command) => match command {
            TemplateCommand::List(args) => commands::list::execute(args, &cli.global),
            TemplateCommand::Show(args) => commands::show::execute(args, &cli.global),
            TemplateCommand::Categories(args) => commands::categories::execute(args, &cli.global),
            TemplateCommand::Validate(args) => commands::validate::execute(args, &cli.global),
            TemplateCommand::Init(args) => commands::init::execute(args, &cli.global),
        },
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Map an error to its exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(failure) = cause.downcast_ref::<CommandFailure>() {
            return match failure {
                CommandFailure::InvalidArgument(_) => ExitCodes::INVALID_ARGS,
                CommandFailure::Validation(_) => ExitCodes::VALIDATION_FAILURE,
                CommandFailure::Template(_) => ExitCodes::TEMPLATE_ERROR,
            };
        }
        if let Some(error) = cause.downcast_ref::<TemplateError>() {
            return match error.kind() {
                ErrorKind::NotFound | ErrorKind::MalformedCatalog => ExitCodes::GENERAL_ERROR,
                ErrorKind::MissingVariables => ExitCodes::INVALID_ARGS,
                ErrorKind::TemplateNotFound
                | ErrorKind::TemplateFileMissing
                | ErrorKind::RenderFailure => ExitCodes::TEMPLATE_ERROR,
            };
        }
    }
    ExitCodes::GENERAL_ERROR
}
