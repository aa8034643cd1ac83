//! # devtools_templates
//!
//! Registry and rendering engine for DevOps boilerplate templates.
//!
//! A catalog file (`registry.json` or `registry.yaml`) declares categories
//! such as `ci`, `docker`, `k8s` and `terraform`, each listing template
//! descriptors with the variables they require. The engine lists, looks up
//! and validates those templates and renders one into a target directory.
//!
//! ## Example
//!
//! ```rust,no_run
//! use devtools_templates::{RegistryLoader, TemplateEngine};
//! use std::collections::HashMap;
//!
//! let registry = RegistryLoader::for_templates_dir("templates").load().unwrap();
//! let engine = TemplateEngine::new(registry);
//!
//! let mut variables = HashMap::new();
//! variables.insert("PYTHON_VERSION".to_string(), "3.11".to_string());
//!
//! let result = engine.render("github-actions-ci", "./.github/workflows", &variables);
//! assert!(result.success);
//! ```

pub mod engine;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod renderer;

pub use engine::{RenderResult, TemplateEngine};
pub use error::{ErrorKind, TemplateError, TemplateResult};
pub use loader::{CatalogFormat, RegistryLoader, CATALOG_FILE_NAMES};
pub use manifest::{Category, CategorySummary, Registry, TemplateDescriptor};
pub use renderer::{JinjaSubstitutor, PlaceholderSubstitutor, Substitute, TemplateSyntax};
