//! List command - List available templates.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::output::{truncate, Table};
use super::GlobalArgs;

#[derive(Args)]
pub struct ListArgs {
    /// Filter by category (ci, docker, k8s, terraform)
    #[arg(short, long)]
    category: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn execute(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    let engine = global.engine()?;
    let templates = engine.list(args.category.as_deref());
    info!("Listing {} template(s)", templates.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    if templates.is_empty() {
        println!("⚠️  No templates found");
        return Ok(());
    }

    let mut table = Table::new(
        "📦 DevOps Templates Registry",
        &["ID", "Name", "Category", "Language", "Description"],
    );
    for t in &templates {
        table.add_row(vec![
            t.id.clone(),
            t.name.clone(),
            t.category.to_uppercase(),
            t.language.clone(),
            truncate(&t.description, 60),
        ]);
    }

    table.print();
    println!();
    println!("Total: {} templates", templates.len());

    Ok(())
}
