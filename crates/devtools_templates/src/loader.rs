//! Catalog loading functionality.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{TemplateError, TemplateResult};
use crate::manifest::{Category, Registry, TemplateDescriptor};

/// Catalog file names probed inside a templates directory, in order.
pub const CATALOG_FILE_NAMES: [&str; 3] = ["registry.json", "registry.yaml", "registry.yml"];

/// On-disk catalog format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    /// Pick the format from a file extension. Anything but yaml/yml is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                CatalogFormat::Yaml
            }
            _ => CatalogFormat::Json,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VersionMarker {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for VersionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionMarker::Text(s) => f.write_str(s),
            VersionMarker::Integer(n) => write!(f, "{n}"),
            VersionMarker::Float(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: VersionMarker,
    #[serde(deserialize_with = "ordered_categories")]
    categories: Vec<(String, CatalogCategory)>,
}

#[derive(Debug, Deserialize)]
struct CatalogCategory {
    name: String,
    description: String,
    templates: Vec<CatalogTemplate>,
}

#[derive(Debug, Deserialize)]
struct CatalogTemplate {
    id: String,
    name: String,
    path: String,
    language: String,
    supports: Vec<String>,
    variables: Vec<String>,
    description: String,
}

/// Deserialize the `categories` mapping without losing declaration order.
fn ordered_categories<'de, D>(deserializer: D) -> Result<Vec<(String, CatalogCategory)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedCategories;

    impl<'de> Visitor<'de> for OrderedCategories {
        type Value = Vec<(String, CatalogCategory)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of category id to category")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries: Vec<(String, CatalogCategory)> = Vec::new();
            while let Some((id, category)) = map.next_entry::<String, CatalogCategory>()? {
                if entries.iter().any(|(existing, _)| *existing == id) {
                    return Err(de::Error::custom(format!("duplicate category '{id}'")));
                }
                entries.push((id, category));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedCategories)
}

/// Registry loader.
pub struct RegistryLoader {
    catalog_path: PathBuf,
}

impl RegistryLoader {
    /// Create a loader for an explicit catalog file.
    pub fn new(catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
        }
    }

    /// Create a loader for the catalog inside a templates directory.
    ///
    /// Probes [`CATALOG_FILE_NAMES`] and falls back to `registry.json` so a
    /// missing catalog is still reported against a concrete path.
    pub fn for_templates_dir(templates_dir: impl AsRef<Path>) -> Self {
        let dir = templates_dir.as_ref();
        let catalog_path = CATALOG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
            .unwrap_or_else(|| dir.join(CATALOG_FILE_NAMES[0]));
        Self::new(catalog_path)
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    /// Directory descriptor paths resolve against: the catalog's parent.
    pub fn templates_root(&self) -> PathBuf {
        match self.catalog_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Read and parse the catalog into a [`Registry`].
    pub fn load(&self) -> TemplateResult<Registry> {
        let path = &self.catalog_path;
        debug!("Loading registry from {:?}", path);

        if !path.is_file() {
            return Err(TemplateError::NotFound(path.clone()));
        }

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TemplateError::NotFound(path.clone()),
            _ => TemplateError::malformed(path, e),
        })?;

        let registry = self.parse(&content, CatalogFormat::from_path(path))?;
        info!(
            "Loaded registry v{} with {} categories, {} templates",
            registry.version(),
            registry.categories().len(),
            registry.len()
        );
        Ok(registry)
    }

    /// Parse catalog text as if it had been read from this loader's path.
    pub fn parse(&self, content: &str, format: CatalogFormat) -> TemplateResult<Registry> {
        let path = &self.catalog_path;
        let catalog: CatalogFile = match format {
            CatalogFormat::Json => {
                serde_json::from_str(content).map_err(|e| TemplateError::malformed(path, e))?
            }
            CatalogFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| TemplateError::malformed(path, e))?
            }
        };

        let mut categories = Vec::with_capacity(catalog.categories.len());
        let mut seen: Vec<(String, String)> = Vec::new();

        for (category_id, entry) in catalog.categories {
            let mut templates = Vec::with_capacity(entry.templates.len());
            for t in entry.templates {
                if let Some((_, owner)) = seen.iter().find(|(id, _)| *id == t.id) {
                    return Err(TemplateError::malformed(
                        path,
                        format!(
                            "duplicate template id '{}' in categories '{}' and '{}'",
                            t.id, owner, category_id
                        ),
                    ));
                }
                seen.push((t.id.clone(), category_id.clone()));
                templates.push(TemplateDescriptor {
                    id: t.id,
                    name: t.name,
                    path: t.path,
                    language: t.language,
                    supports: t.supports,
                    variables: t.variables,
                    description: t.description,
                    category: category_id.clone(),
                });
            }
            categories.push(Category {
                id: category_id,
                name: entry.name,
                description: entry.description,
                templates,
            });
        }

        Ok(Registry::new(
            catalog.version.to_string(),
            self.templates_root(),
            categories,
        ))
    }
}
