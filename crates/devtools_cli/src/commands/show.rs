//! Show command - Show template details and variables.

use anyhow::Result;
use clap::Args;

use super::{CommandFailure, GlobalArgs};

#[derive(Args)]
pub struct ShowArgs {
    /// Template identifier
    template_id: String,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

pub fn execute(args: ShowArgs, global: &GlobalArgs) -> Result<()> {
    let engine = global.engine()?;
    let template = engine.get(&args.template_id).ok_or_else(|| {
        CommandFailure::Template(format!("Template '{}' not found", args.template_id))
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(template)?);
        return Ok(());
    }

    println!();
    println!("{}", template.name);
    println!("ID: {}", template.id);
    println!();
    println!("Category: {}", template.category.to_uppercase());
    println!("Language: {}", template.language);
    println!();
    println!("Description:");
    println!("{}", template.description);

    if !template.variables.is_empty() {
        println!();
        println!("Required Variables:");
        for var in &template.variables {
            println!("  • {}", var);
        }
    }

    if !template.supports.is_empty() {
        println!();
        println!("Supports:");
        for feature in &template.supports {
            println!("  • {}", feature);
        }
    }

    println!();
    println!("File: {}", template.path);

    Ok(())
}
