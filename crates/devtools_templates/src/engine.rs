//! Template engine: listing, lookup, validation and rendering.
//!
//! Render steps, in order:
//! 1. look the template up by ID
//! 2. check the template body exists under the templates root
//! 3. check every required variable is bound
//! 4. read and substitute the body
//! 5. create the output directory and write the result
//!
//! Operation-time failures are captured in [`RenderResult`]; only catalog
//! loading returns errors to the caller.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info, warn};

use crate::error::{TemplateError, TemplateResult};
use crate::loader::RegistryLoader;
use crate::manifest::{CategorySummary, Registry, TemplateDescriptor};
use crate::renderer::{JinjaSubstitutor, Substitute};

/// Outcome of a render operation.
#[derive(Debug)]
pub struct RenderResult {
    /// Whether the file was written
    pub success: bool,
    /// Requested template identifier
    pub template_id: String,
    /// Output directory as requested by the caller
    pub output_path: PathBuf,
    /// Files written, empty on failure
    pub files_created: Vec<PathBuf>,
    /// Populated on failure
    pub error: Option<TemplateError>,
}

impl RenderResult {
    pub fn success(template_id: &str, output_path: &Path, files_created: Vec<PathBuf>) -> Self {
        Self {
            success: true,
            template_id: template_id.to_string(),
            output_path: output_path.to_path_buf(),
            files_created,
            error: None,
        }
    }

    pub fn failure(template_id: &str, output_path: &Path, error: TemplateError) -> Self {
        Self {
            success: false,
            template_id: template_id.to_string(),
            output_path: output_path.to_path_buf(),
            files_created: Vec::new(),
            error: Some(error),
        }
    }

    /// Human-readable error text, if the render failed.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

/// Template engine over an immutable [`Registry`].
pub struct TemplateEngine {
    registry: Registry,
    substitutor: Box<dyn Substitute>,
}

impl TemplateEngine {
    /// Create an engine using Jinja-style substitution.
    pub fn new(registry: Registry) -> Self {
        Self::with_substitutor(registry, Box::new(JinjaSubstitutor::new()))
    }

    /// Create an engine with a specific substitution capability.
    pub fn with_substitutor(registry: Registry, substitutor: Box<dyn Substitute>) -> Self {
        Self {
            registry,
            substitutor,
        }
    }

    /// Load the catalog inside `templates_dir` and build an engine over it.
    pub fn from_templates_dir(templates_dir: impl AsRef<Path>) -> TemplateResult<Self> {
        let registry = RegistryLoader::for_templates_dir(templates_dir).load()?;
        Ok(Self::new(registry))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// List templates in catalog order, optionally restricted to one category.
    ///
    /// An unknown category yields an empty list.
    pub fn list(&self, category: Option<&str>) -> Vec<&TemplateDescriptor> {
        self.registry
            .categories()
            .iter()
            .filter(|c| category.map_or(true, |wanted| c.id == wanted))
            .flat_map(|c| c.templates.iter())
            .collect()
    }

    /// Get a template by ID.
    pub fn get(&self, template_id: &str) -> Option<&TemplateDescriptor> {
        let found = self.registry.get(template_id);
        if found.is_none() {
            debug!("Template '{}' not in registry", template_id);
        }
        found
    }

    /// One summary per category, in catalog order.
    pub fn categories(&self) -> Vec<CategorySummary> {
        self.registry
            .categories()
            .iter()
            .map(CategorySummary::from)
            .collect()
    }

    /// Whether the template is registered and its body exists on disk.
    ///
    /// The body is not parsed or rendered.
    pub fn validate(&self, template_id: &str) -> bool {
        match self.get(template_id) {
            Some(descriptor) => self.registry.template_path(descriptor).is_file(),
            None => false,
        }
    }

    /// Required variables of `template_id` absent from `variables`, in
    /// declaration order. `None` if the template is unknown.
    pub fn missing_variables(
        &self,
        template_id: &str,
        variables: &HashMap<String, String>,
    ) -> Option<Vec<String>> {
        self.get(template_id)
            .map(|descriptor| missing_from(descriptor, variables))
    }

    /// Render a template into `output_dir`.
    pub fn render(
        &self,
        template_id: &str,
        output_dir: impl AsRef<Path>,
        variables: &HashMap<String, String>,
    ) -> RenderResult {
        let output_dir = output_dir.as_ref();
        info!("Rendering template '{}' to {:?}", template_id, output_dir);

        match self.try_render(template_id, output_dir, variables) {
            Ok(file) => {
                info!("Created {:?}", file);
                RenderResult::success(template_id, output_dir, vec![file])
            }
            Err(e) => {
                warn!("Render of '{}' failed: {}", template_id, e);
                RenderResult::failure(template_id, output_dir, e)
            }
        }
    }

    fn try_render(
        &self,
        template_id: &str,
        output_dir: &Path,
        variables: &HashMap<String, String>,
    ) -> TemplateResult<PathBuf> {
        let descriptor = self
            .get(template_id)
            .ok_or_else(|| TemplateError::TemplateNotFound(template_id.to_string()))?;

        let template_path = self.registry.template_path(descriptor);
        if !template_path.is_file() {
            return Err(TemplateError::TemplateFileMissing(template_path));
        }

        let missing = missing_from(descriptor, variables);
        if !missing.is_empty() {
            return Err(TemplateError::MissingVariables(missing));
        }

        let file_name = descriptor.file_name().ok_or_else(|| {
            TemplateError::render(format!(
                "Template path has no file name: {}",
                descriptor.path
            ))
        })?;

        let body = fs::read_to_string(&template_path).map_err(TemplateError::render)?;
        let rendered = self.substitutor.render(&body, variables)?;
        debug!("Rendered {} bytes from {:?}", rendered.len(), template_path);

        fs::create_dir_all(output_dir).map_err(TemplateError::render)?;
        let target = output_dir.join(file_name);
        write_atomic(output_dir, &target, &rendered)?;

        Ok(target)
    }
}

fn missing_from(descriptor: &TemplateDescriptor, variables: &HashMap<String, String>) -> Vec<String> {
    descriptor
        .variables
        .iter()
        .filter(|v| !variables.contains_key(*v))
        .cloned()
        .collect()
}

/// Write through a temporary file in `dir` so `target` is either the old
/// content or the complete new content.
///
/// A fresh file gets the usual umask-derived mode; an existing file keeps
/// its mode.
fn write_atomic(dir: &Path, target: &Path, content: &str) -> TemplateResult<()> {
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp: NamedTempFile = builder.tempfile_in(dir).map_err(TemplateError::render)?;

    if let Ok(existing) = fs::metadata(target) {
        if existing.is_file() {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(TemplateError::render)?;
        }
    }

    tmp.write_all(content.as_bytes())
        .map_err(TemplateError::render)?;
    tmp.persist(target)
        .map_err(|e| TemplateError::render(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::manifest::Category;
    use crate::renderer::PlaceholderSubstitutor;
    use tempfile::{tempdir, TempDir};

    fn descriptor(id: &str, category: &str, path: &str, variables: &[&str]) -> TemplateDescriptor {
        TemplateDescriptor {
            id: id.to_string(),
            name: id.to_string(),
            path: path.to_string(),
            language: "yaml".to_string(),
            supports: vec![],
            variables: variables.iter().map(|v| v.to_string()).collect(),
            description: String::new(),
            category: category.to_string(),
        }
    }

    fn fixture() -> (TempDir, TemplateEngine) {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("ci")).unwrap();
        fs::write(
            temp.path().join("ci/sample.yml"),
            "Version: {{LANGUAGE_VERSION}}\n",
        )
        .unwrap();

        let registry = Registry::new(
            "1.0.0",
            temp.path(),
            vec![
                Category {
                    id: "ci".into(),
                    name: "CI/CD".into(),
                    description: "Pipelines".into(),
                    templates: vec![
                        descriptor("sample-ci", "ci", "ci/sample.yml", &["LANGUAGE_VERSION"]),
                        descriptor("ghost", "ci", "ci/ghost.yml", &[]),
                    ],
                },
                Category {
                    id: "k8s".into(),
                    name: "Kubernetes".into(),
                    description: "Manifests".into(),
                    templates: vec![descriptor("deploy", "k8s", "k8s/deploy.yaml", &["A", "B"])],
                },
            ],
        );
        (temp, TemplateEngine::new(registry))
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_list_filters_by_category() {
        let (_temp, engine) = fixture();
        let all: Vec<_> = engine.list(None).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(all, vec!["sample-ci", "ghost", "deploy"]);

        let k8s: Vec<_> = engine.list(Some("k8s")).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(k8s, vec!["deploy"]);

        assert!(engine.list(Some("nonexistent-category")).is_empty());
    }

    #[test]
    fn test_validate() {
        let (_temp, engine) = fixture();
        assert!(engine.validate("sample-ci"));
        assert!(!engine.validate("ghost"));
        assert!(!engine.validate("unknown"));
    }

    #[test]
    fn test_missing_variables_order() {
        let (_temp, engine) = fixture();
        assert_eq!(
            engine.missing_variables("deploy", &vars(&[])),
            Some(vec!["A".to_string(), "B".to_string()])
        );
        assert_eq!(
            engine.missing_variables("deploy", &vars(&[("A", "1")])),
            Some(vec!["B".to_string()])
        );
        assert_eq!(engine.missing_variables("unknown", &vars(&[])), None);
    }

    #[test]
    fn test_render_unknown_template() {
        let (temp, engine) = fixture();
        let out = temp.path().join("out");
        let result = engine.render("unknown", &out, &vars(&[]));

        assert!(!result.success);
        assert_eq!(result.template_id, "unknown");
        assert_eq!(result.error.as_ref().unwrap().kind(), ErrorKind::TemplateNotFound);
        assert_eq!(result.error_message().unwrap(), "Template 'unknown' not found");
        assert!(!out.exists());
    }

    #[test]
    fn test_render_file_missing_checked_before_variables() {
        let (temp, engine) = fixture();
        let result = engine.render("deploy", temp.path().join("out"), &vars(&[]));
        assert_eq!(
            result.error.unwrap().kind(),
            ErrorKind::TemplateFileMissing
        );
    }

    #[test]
    fn test_render_success() {
        let (temp, engine) = fixture();
        let out = temp.path().join("nested/out");
        let result = engine.render("sample-ci", &out, &vars(&[("LANGUAGE_VERSION", "3.11")]));

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.files_created, vec![out.join("sample.yml")]);
        assert_eq!(
            fs::read_to_string(out.join("sample.yml")).unwrap(),
            "Version: 3.11\n"
        );
    }

    #[test]
    fn test_render_failure_leaves_no_output() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("app.env"), "A={{A}}\nB={{B}}\n").unwrap();
        let registry = Registry::new(
            "1",
            temp.path(),
            vec![Category {
                id: "docker".into(),
                name: "Docker".into(),
                description: String::new(),
                templates: vec![descriptor("env", "docker", "app.env", &["A"])],
            }],
        );
        let engine =
            TemplateEngine::with_substitutor(registry, Box::new(PlaceholderSubstitutor::new()));

        let out = temp.path().join("out");
        let result = engine.render("env", &out, &vars(&[("A", "1")]));

        assert!(!result.success);
        assert_eq!(result.error.unwrap().kind(), ErrorKind::RenderFailure);
        assert!(!out.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_rendered_file_mode_matches_regular_write() {
        use std::os::unix::fs::PermissionsExt;

        let (temp, engine) = fixture();
        let out = temp.path().join("out");
        let result = engine.render("sample-ci", &out, &vars(&[("LANGUAGE_VERSION", "3.11")]));
        assert!(result.success, "{:?}", result.error);

        let sibling = out.join("sibling.txt");
        fs::write(&sibling, "x").unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        let rendered_mode = mode(&out.join("sample.yml"));
        let written_mode = mode(&sibling);
        assert_eq!(rendered_mode, written_mode);
    }

    #[cfg(unix)]
    #[test]
    fn test_rerender_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (temp, engine) = fixture();
        let out = temp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let target = out.join("sample.yml");
        fs::write(&target, "old\n").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o755)).unwrap();

        let result = engine.render("sample-ci", &out, &vars(&[("LANGUAGE_VERSION", "3.12")]));
        assert!(result.success, "{:?}", result.error);

        assert_eq!(fs::read_to_string(&target).unwrap(), "Version: 3.12\n");
        assert_eq!(fs::metadata(&target).unwrap().permissions().mode() & 0o777, 0o755);
    }
}
