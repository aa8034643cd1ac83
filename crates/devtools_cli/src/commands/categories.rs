//! Categories command - List template categories.

use anyhow::Result;
use clap::Args;

use super::output::Table;
use super::GlobalArgs;

#[derive(Args)]
pub struct CategoriesArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn execute(args: CategoriesArgs, global: &GlobalArgs) -> Result<()> {
    let engine = global.engine()?;
    let categories = engine.categories();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    let mut table = Table::new(
        "📚 Template Categories",
        &["ID", "Name", "Templates", "Description"],
    );
    for c in categories {
        table.add_row(vec![
            c.id,
            c.name,
            c.template_count.to_string(),
            c.description,
        ]);
    }
    table.print();

    Ok(())
}
