//! In-memory template index.
//!
//! The index mirrors the catalog: categories in declaration order, each
//! holding its template descriptors in declaration order. It is built once
//! by [`RegistryLoader`](crate::loader::RegistryLoader) and never mutated
//! afterwards.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Metadata describing one template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateDescriptor {
    /// Identifier, unique across the whole registry
    pub id: String,
    /// Display name
    pub name: String,
    /// Path of the template body, relative to the templates root
    pub path: String,
    /// Source-language tag (e.g. "yaml", "dockerfile", "hcl")
    pub language: String,
    /// Supported feature labels
    pub supports: Vec<String>,
    /// Required variable names, in declaration order
    pub variables: Vec<String>,
    pub description: String,
    /// Identifier of the owning category
    pub category: String,
}

impl TemplateDescriptor {
    /// File name the rendered output is written under.
    pub fn file_name(&self) -> Option<&str> {
        Path::new(&self.path).file_name().and_then(|n| n.to_str())
    }
}

/// A named grouping of templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub templates: Vec<TemplateDescriptor>,
}

/// Per-category summary returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub template_count: usize,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            description: category.description.clone(),
            template_count: category.templates.len(),
        }
    }
}

/// Loaded catalog of categories and templates.
#[derive(Debug, Clone)]
pub struct Registry {
    version: String,
    categories: Vec<Category>,
    templates_root: PathBuf,
}

impl Registry {
    pub fn new(
        version: impl Into<String>,
        templates_root: impl Into<PathBuf>,
        categories: Vec<Category>,
    ) -> Self {
        Self {
            version: version.into(),
            categories,
            templates_root: templates_root.into(),
        }
    }

    /// Catalog version marker.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Directory that descriptor paths are relative to.
    pub fn templates_root(&self) -> &Path {
        &self.templates_root
    }

    /// Categories in catalog order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Get a category by ID.
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// All descriptors, category by category, in catalog order.
    pub fn templates(&self) -> impl Iterator<Item = &TemplateDescriptor> {
        self.categories.iter().flat_map(|c| c.templates.iter())
    }

    /// Get a template by ID. The first declared match wins.
    pub fn get(&self, id: &str) -> Option<&TemplateDescriptor> {
        self.templates().find(|t| t.id == id)
    }

    /// Number of templates across all categories.
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.templates.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolved location of a template body on disk.
    pub fn template_path(&self, descriptor: &TemplateDescriptor) -> PathBuf {
        self.templates_root.join(&descriptor.path)
    }
}
