//! Validate command - Check that a template's file exists.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::{CommandFailure, GlobalArgs};

#[derive(Args)]
pub struct ValidateArgs {
    /// Template identifier
    template_id: String,
}

pub fn execute(args: ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let engine = global.engine()?;
    info!("Validating template: {}", args.template_id);

    if engine.validate(&args.template_id) {
        println!("✅ Template '{}' is valid", args.template_id);
        Ok(())
    } else {
        Err(CommandFailure::Validation(format!(
            "Template '{}' is invalid or not found",
            args.template_id
        ))
        .into())
    }
}
