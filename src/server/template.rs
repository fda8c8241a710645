// Template engine - {{VAR}} placeholder substitution for generated files

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;

use crate::error::{GeneratorError, Result};

/// Values substituted into a template, keyed by placeholder name
pub type Variables = HashMap<&'static str, String>;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{([A-Z][A-Z0-9_]*)\}\}").expect("placeholder pattern is valid");
}

/// Replace every `{{NAME}}` in `template` with its value.
///
/// Substitution is a single pass, so values are inserted literally even if
/// they look like placeholders themselves. A placeholder with no value is an
/// error naming `file`.
pub fn render(file: &str, template: &str, variables: &Variables) -> Result<String> {
    let mut missing: Option<String> = None;
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        let name = &caps[1];
        match variables.get(name) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                caps[0].to_string()
            }
        }
    });

    if let Some(name) = missing {
        return Err(GeneratorError::UnresolvedPlaceholder {
            file: file.to_string(),
            name,
        });
    }
    Ok(rendered.into_owned())
}

/// Names of placeholders still present in `text`
pub fn leftover_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_all_occurrences() {
        let mut vars = Variables::new();
        vars.insert("RAM", "8".to_string());
        let out = render("start.sh", "-Xms{{RAM}}G -Xmx{{RAM}}G", &vars).unwrap();
        assert_eq!(out, "-Xms8G -Xmx8G");
    }

    #[test]
    fn test_missing_variable_is_reported() {
        let vars = Variables::new();
        let err = render("paper.yml", "view-distance: {{VIEW_DISTANCE}}", &vars).unwrap_err();
        match err {
            GeneratorError::UnresolvedPlaceholder { file, name } => {
                assert_eq!(file, "paper.yml");
                assert_eq!(name, "VIEW_DISTANCE");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_values_are_not_reexpanded() {
        let mut vars = Variables::new();
        vars.insert("NAME", "{{RAM}}".to_string());
        let out = render("README.md", "# {{NAME}}", &vars).unwrap();
        assert_eq!(out, "# {{RAM}}");
    }

    #[test]
    fn test_single_braces_are_left_alone() {
        let vars = Variables::new();
        let text = "format: \"{DISPLAYNAME}: {MESSAGE}\"\nwhile ($true) { }";
        assert_eq!(render("config.yml", text, &vars).unwrap(), text);
        assert!(leftover_placeholders(text).is_empty());
    }
}
