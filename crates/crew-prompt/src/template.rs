//! Construction-validated task templates

use crate::{PromptError, Result};
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use std::collections::BTreeSet;

/// A named prompt template with declared placeholders
///
/// The source uses Jinja syntax (`{{ stock_symbol }}`). Every variable the
/// source references must be declared; this is checked by [`TaskTemplate::new`].
/// At render time every declared placeholder must be supplied.
#[derive(Debug, Clone)]
pub struct TaskTemplate {
    name: String,
    source: String,
    placeholders: BTreeSet<String>,
}

impl TaskTemplate {
    /// Parse and validate a template
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        placeholders: &[&str],
    ) -> Result<Self> {
        let name = name.into();
        let source = source.into();
        let placeholders: BTreeSet<String> =
            placeholders.iter().map(|p| (*p).to_string()).collect();

        let env = environment();
        let template =
            env.template_from_str(&source)
                .map_err(|e| PromptError::TemplateParseFailed {
                    name: name.clone(),
                    detail: e.to_string(),
                })?;

        let undeclared: Vec<String> = template
            .undeclared_variables(false)
            .into_iter()
            .filter(|var| !placeholders.contains(var))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if !undeclared.is_empty() {
            return Err(PromptError::UndeclaredPlaceholder {
                name,
                placeholders: undeclared.join(", "),
            });
        }

        Ok(Self {
            name,
            source,
            placeholders,
        })
    }

    /// Template name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw template source
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared placeholders, sorted
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(String::as_str)
    }

    /// Render with the given variables
    ///
    /// `vars` must serialize to a map containing every declared placeholder.
    pub fn render<S: Serialize>(&self, vars: &S) -> Result<String> {
        let value = serde_json::to_value(vars).map_err(|e| PromptError::RenderError {
            name: self.name.clone(),
            detail: e.to_string(),
        })?;

        if let Some(missing) = self
            .placeholders
            .iter()
            .find(|p| value.get(p.as_str()).is_none_or(serde_json::Value::is_null))
        {
            return Err(PromptError::MissingValue {
                name: self.name.clone(),
                placeholder: missing.clone(),
            });
        }

        environment()
            .render_str(&self.source, minijinja::Value::from_serialize(&value))
            .map_err(|e| PromptError::RenderError {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_symbol() {
        let template = TaskTemplate::new(
            "technical",
            "Perform an in-depth technical analysis on {{ stock_symbol }}",
            &["stock_symbol"],
        )
        .unwrap();

        let rendered = template.render(&json!({ "stock_symbol": "MSFT" })).unwrap();
        assert_eq!(rendered, "Perform an in-depth technical analysis on MSFT");
        assert_eq!(template.placeholders().collect::<Vec<_>>(), vec!["stock_symbol"]);
    }

    #[test]
    fn test_undeclared_placeholder_rejected_at_construction() {
        let err = TaskTemplate::new("bad", "Analyze {{ stock_symbl }}", &["stock_symbol"])
            .unwrap_err();
        match err {
            PromptError::UndeclaredPlaceholder { name, placeholders } => {
                assert_eq!(name, "bad");
                assert_eq!(placeholders, "stock_symbl");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_error() {
        let err = TaskTemplate::new("broken", "{{ stock_symbol ", &["stock_symbol"]).unwrap_err();
        assert!(matches!(err, PromptError::TemplateParseFailed { .. }));
    }

    #[test]
    fn test_missing_value_at_render() {
        let template = TaskTemplate::new("t", "{{ stock_symbol }}", &["stock_symbol"]).unwrap();
        let err = template.render(&json!({})).unwrap_err();
        assert!(matches!(err, PromptError::MissingValue { .. }));
    }

    #[test]
    fn test_literal_braces_survive() {
        let template =
            TaskTemplate::new("t", "Counts as {'positive': n} for {{ s }}", &["s"]).unwrap();
        assert_eq!(
            template.render(&json!({ "s": "ACME" })).unwrap(),
            "Counts as {'positive': n} for ACME"
        );
    }

    #[test]
    fn test_into_core_error() {
        let err: crew_core::Error = PromptError::MissingValue {
            name: "t".into(),
            placeholder: "s".into(),
        }
        .into();
        assert!(matches!(err, crew_core::Error::Template(_)));
    }
}
