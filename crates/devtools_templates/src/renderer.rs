//! Variable substitution.
//!
//! Rendering a template body is delegated to a [`Substitute`] implementation
//! so the placeholder syntax stays an implementation detail of the engine.
//! Both implementations fail loudly on a reference to an unbound variable
//! instead of substituting an empty string.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};

/// Turns a template body plus bindings into rendered text.
pub trait Substitute {
    /// Render `body`, failing with [`TemplateError::RenderFailure`] when a
    /// referenced variable is unbound or the body cannot be evaluated.
    fn render(&self, body: &str, bindings: &HashMap<String, String>) -> TemplateResult<String>;
}

/// Jinja-compatible substitution backed by `minijinja`.
///
/// Supports `{{ NAME }}` placeholders as well as control structures such as
/// `{% if %}` and `{% for %}`. Undefined values are errors, output is never
/// escaped and a trailing newline in the body is kept.
pub struct JinjaSubstitutor {
    env: Environment<'static>,
}

impl Default for JinjaSubstitutor {
    fn default() -> Self {
        Self::new()
    }
}

impl JinjaSubstitutor {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        // Templates produce config files, not HTML
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env }
    }
}

impl Substitute for JinjaSubstitutor {
    fn render(&self, body: &str, bindings: &HashMap<String, String>) -> TemplateResult<String> {
        self.env
            .render_str(body, bindings)
            .map_err(|e| TemplateError::render(format!("Template rendering failed: {e}")))
    }
}

/// Plain `{{NAME}}` replacement with no expression support.
pub struct PlaceholderSubstitutor {
    variable_pattern: Regex,
}

impl Default for PlaceholderSubstitutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceholderSubstitutor {
    pub fn new() -> Self {
        Self {
            // Match {{variable_name}}, inner whitespace allowed
            variable_pattern: Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
                .expect("placeholder pattern is a valid regex"),
        }
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders<'a>(&self, body: &'a str) -> Vec<&'a str> {
        let mut names: Vec<&str> = Vec::new();
        for caps in self.variable_pattern.captures_iter(body) {
            if let Some(name) = caps.get(1).map(|m| m.as_str()) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

impl Substitute for PlaceholderSubstitutor {
    fn render(&self, body: &str, bindings: &HashMap<String, String>) -> TemplateResult<String> {
        let unbound: Vec<&str> = self
            .placeholders(body)
            .into_iter()
            .filter(|name| !bindings.contains_key(*name))
            .collect();

        if !unbound.is_empty() {
            return Err(TemplateError::render(format!(
                "Undefined variables in template: {}",
                unbound.join(", ")
            )));
        }

        let rendered = self
            .variable_pattern
            .replace_all(body, |caps: &Captures| {
                bindings.get(&caps[1]).cloned().unwrap_or_default()
            })
            .into_owned();
        debug!("Substituted placeholders into {} bytes", rendered.len());
        Ok(rendered)
    }
}

/// Selectable substitution syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateSyntax {
    #[default]
    Jinja,
    Placeholder,
}

impl TemplateSyntax {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateSyntax::Jinja => "jinja",
            TemplateSyntax::Placeholder => "placeholder",
        }
    }

    /// Build the substitution capability for this syntax.
    pub fn substitutor(self) -> Box<dyn Substitute> {
        match self {
            TemplateSyntax::Jinja => Box::new(JinjaSubstitutor::new()),
            TemplateSyntax::Placeholder => Box::new(PlaceholderSubstitutor::new()),
        }
    }
}

impl FromStr for TemplateSyntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jinja" => Ok(TemplateSyntax::Jinja),
            "placeholder" => Ok(TemplateSyntax::Placeholder),
            other => Err(format!(
                "unknown template syntax '{other}' (expected 'jinja' or 'placeholder')"
            )),
        }
    }
}

impl fmt::Display for TemplateSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_jinja_substitution_keeps_trailing_newline() {
        let renderer = JinjaSubstitutor::new();
        let rendered = renderer
            .render("Version: {{LANGUAGE_VERSION}}\n", &vars(&[("LANGUAGE_VERSION", "3.11")]))
            .unwrap();
        assert_eq!(rendered, "Version: 3.11\n");
    }

    #[test]
    fn test_jinja_undefined_variable_fails() {
        let renderer = JinjaSubstitutor::new();
        let err = renderer.render("image: {{IMAGE}}", &vars(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RenderFailure);
    }

    #[test]
    fn test_jinja_undefined_in_conditional_fails() {
        let renderer = JinjaSubstitutor::new();
        let body = "{% if ENABLE_CACHE %}cache: true{% endif %}";
        assert!(renderer.render(body, &vars(&[])).is_err());

        let rendered = renderer
            .render(body, &vars(&[("ENABLE_CACHE", "yes")]))
            .unwrap();
        assert_eq!(rendered, "cache: true");
    }

    #[test]
    fn test_jinja_does_not_escape() {
        let renderer = JinjaSubstitutor::new();
        let rendered = renderer
            .render("cmd: {{CMD}}", &vars(&[("CMD", "a && b <c>")]))
            .unwrap();
        assert_eq!(rendered, "cmd: a && b <c>");
    }

    #[test]
    fn test_jinja_syntax_error_fails() {
        let renderer = JinjaSubstitutor::new();
        let err = renderer.render("{% if %}", &vars(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RenderFailure);
    }

    #[test]
    fn test_placeholder_render_content() {
        let renderer = PlaceholderSubstitutor::new();
        let content = "App: {{name}}, Version: {{ version }}, again {{name}}";
        let rendered = renderer
            .render(content, &vars(&[("name", "my-app"), ("version", "1.0.0"), ("extra", "x")]))
            .unwrap();
        assert_eq!(rendered, "App: my-app, Version: 1.0.0, again my-app");
    }

    #[test]
    fn test_placeholder_reports_all_unbound() {
        let renderer = PlaceholderSubstitutor::new();
        let err = renderer
            .render("{{B}} {{A}} {{B}} {{C}}", &vars(&[("A", "1")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Undefined variables in template: B, C");
    }

    #[test]
    fn test_syntax_from_str() {
        assert_eq!("jinja".parse::<TemplateSyntax>(), Ok(TemplateSyntax::Jinja));
        assert_eq!(
            "Placeholder".parse::<TemplateSyntax>(),
            Ok(TemplateSyntax::Placeholder)
        );
        assert!("mustache".parse::<TemplateSyntax>().is_err());
        assert_eq!(TemplateSyntax::default().to_string(), "jinja");
    }
}
