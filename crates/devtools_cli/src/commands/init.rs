//! Init command - Render a template into a directory.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::{CommandFailure, GlobalArgs};

#[derive(Args)]
pub struct InitArgs {
    /// Template identifier
    template_id: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Template variables (KEY=VALUE), repeatable
    #[arg(short = 'v', long = "var", value_parser = parse_variable)]
    vars: Vec<(String, String)>,
}

/// Parse a `KEY=VALUE` pair, splitting on the first `=`.
fn parse_variable(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("Invalid variable format: {s}. Use key=value")),
    }
}

pub fn execute(args: InitArgs, global: &GlobalArgs) -> Result<()> {
    let engine = global.engine()?;
    let variables: HashMap<String, String> = args.vars.into_iter().collect();

    let Some(missing) = engine.missing_variables(&args.template_id, &variables) else {
        eprintln!("Run 'devtools template list' to see available templates");
        return Err(
            CommandFailure::Template(format!("Template '{}' not found", args.template_id)).into(),
        );
    };

    if !missing.is_empty() {
        let example = missing
            .iter()
            .map(|v| format!("--var {v}=<value>"))
            .collect::<Vec<_>>()
            .join(" ");
        eprintln!("Required variables: {}", missing.join(", "));
        eprintln!();
        eprintln!("Example:");
        eprintln!("  devtools template init {} {}", args.template_id, example);
        return Err(CommandFailure::InvalidArgument(format!(
            "Missing required variables: {}",
            missing.join(", ")
        ))
        .into());
    }

    info!("Initializing template {} into {:?}", args.template_id, args.output);
    let result = engine.render(&args.template_id, &args.output, &variables);

    if !result.success {
        let message = result
            .error_message()
            .unwrap_or_else(|| "Template rendering failed".to_string());
        return Err(CommandFailure::Template(message).into());
    }

    println!("✅ Template '{}' initialized successfully", result.template_id);
    println!("Output: {}", result.output_path.display());
    for file in &result.files_created {
        println!("  Created: {}", file.display());
    }

    Ok(())
}
