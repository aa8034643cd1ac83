//! CLI command definitions.
//!
//! Every command loads the template registry once, performs a single
//! operation through the [`TemplateEngine`] and prints the result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::debug;

use devtools_templates::{RegistryLoader, TemplateEngine, TemplateSyntax};

pub mod categories;
pub mod init;
pub mod list;
pub mod output;
pub mod show;
pub mod validate;

/// DevTools CLI - DevOps templates (CI/CD, Docker, K8s, Terraform)
#[derive(Parser)]
#[command(name = "devtools")]
#[command(version, about = "DevTools CLI - DevOps templates (CI/CD, Docker, K8s, Terraform)")]
#[command(long_about = r#"
DevTools CLI manages a catalog of DevOps boilerplate: CI pipelines,
Dockerfiles, Kubernetes manifests and Terraform stacks.

EXAMPLES:
  devtools template list
  devtools template list --category docker
  devtools template show python-fastapi
  devtools template init github-actions-ci --var PYTHON_VERSION=3.11
  devtools template init python-fastapi -o docker --var APP_NAME=myapi --var PORT=8000

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  4 - Template error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Templates directory containing registry.json
    #[arg(
        long,
        global = true,
        env = "DEVTOOLS_TEMPLATES_DIR",
        default_value = "templates"
    )]
    pub templates_dir: PathBuf,

    /// Explicit registry file (overrides --templates-dir)
    #[arg(long, global = true, env = "DEVTOOLS_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Placeholder syntax used when rendering (jinja, placeholder)
    #[arg(
        long,
        global = true,
        env = "DEVTOOLS_TEMPLATE_SYNTAX",
        default_value_t = TemplateSyntax::Jinja
    )]
    pub syntax: TemplateSyntax,
}

impl GlobalArgs {
    /// Load the registry and build an engine over it.
    pub fn engine(&self) -> Result<TemplateEngine> {
        let loader = match &self.registry {
            Some(path) => RegistryLoader::new(path),
            None => RegistryLoader::for_templates_dir(&self.templates_dir),
        };
        debug!("Using registry {:?} with {} syntax", loader.catalog_path(), self.syntax);

        let registry = loader.load().with_context(|| {
            format!(
                "Failed to load template registry from {}",
                loader.catalog_path().display()
            )
        })?;
        Ok(TemplateEngine::with_substitutor(
            registry,
            self.syntax.substitutor(),
        ))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// DevOps template management (CI/CD, Docker, K8s, Terraform)
    #[command(subcommand)]
    Template(TemplateCommand),
}

#[derive(Subcommand)]
pub enum TemplateCommand {
    /// List available DevOps templates
    List(list::ListArgs),

    /// Show template details and variables
    Show(show::ShowArgs),

    /// List template categories
    Categories(categories::CategoriesArgs),

    /// Validate that a template file exists
    Validate(validate::ValidateArgs),

    /// Initialize a template with variables
    Init(init::InitArgs),
}

/// Command outcomes that map onto a dedicated exit code.
#[derive(Error, Debug)]
pub enum CommandFailure {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Template(String),
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
    fn test_global_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "devtools",
            "template",
            "list",
            "--templates-dir",
            "/srv/templates",
            "--syntax",
            "placeholder",
        ])
        .unwrap();

        assert_eq!(cli.global.templates_dir, PathBuf::from("/srv/templates"));
        assert_eq!(cli.global.syntax, TemplateSyntax::Placeholder);
        assert!(matches!(
            cli.command,
            Commands::Template(TemplateCommand::List(_))
        ));
    }

    #[test]
    fn test_unknown_syntax_rejected() {
        let result = Cli::try_parse_from(["devtools", "--syntax", "mustache", "template", "categories"]);
        assert!(result.is_err());
    }
}
