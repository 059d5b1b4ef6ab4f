//! Variable extraction.
//!
//! Turns raw stylesheet text into `@name: value;` declarations. This is a
//! pattern match over text, not a LESS parser: anything that is not shaped
//! like a declaration is skipped silently.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, ThemeError};

/// Leading character of every variable name.
pub const VARIABLE_SIGIL: char = '@';

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(@['"]?[\w-]+['"]?)[ \t]*:[ \t]*([^;]*);"#).expect("valid declaration regex")
});

/// A single `@name: value;` declaration, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

impl Declaration {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// True when the value is itself a plain variable reference (`@other`).
    pub fn is_reference(&self) -> bool {
        is_reference(&self.value)
    }
}

/// True when `value` is a bare variable reference such as `@blue-6`.
pub fn is_reference(value: &str) -> bool {
    value
        .strip_prefix(VARIABLE_SIGIL)
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_'))
}

/// Extracts every declaration from `text`, in order.
///
/// Quote characters and whitespace are stripped from names; values are trimmed.
pub fn extract_declarations(text: &str) -> Vec<Declaration> {
    DECLARATION
        .captures_iter(text)
        .map(|caps| {
            let name: String = caps[1]
                .chars()
                .filter(|c| !matches!(c, '\'' | '"') && !c.is_whitespace())
                .collect();
            Declaration::new(name, caps[2].trim())
        })
        .collect()
}

/// Name → raw expression table. Later declarations overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    entries: HashMap<String, String>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_declarations<'a, I>(declarations: I) -> Self
    where
        I: IntoIterator<Item = &'a Declaration>,
    {
        let mut table = Self::new();
        for decl in declarations {
            table.insert(decl.name.clone(), decl.value.clone());
        }
        table
    }

    /// Builds the table straight from stylesheet text.
    pub fn parse(text: &str) -> Self {
        Self::from_declarations(&extract_declarations(text))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlays `other` on top of this table; its values win.
    pub fn extend(&mut self, other: &VariableTable) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }
}

impl FromIterator<(String, String)> for VariableTable {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Reads a file and returns its variable table (imports are not followed).
pub fn read_variables(path: impl AsRef<Path>) -> Result<VariableTable> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| ThemeError::read(path, e))?;
    Ok(VariableTable::parse(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_declarations() {
        let decls = extract_declarations("@primary-color: #1890ff;\n@link-color : @primary-color ;");
        assert_eq!(
            decls,
            vec![
                Declaration::new("@primary-color", "#1890ff"),
                Declaration::new("@link-color", "@primary-color"),
            ]
        );
    }

    #[test]
    fn test_extract_strips_quotes_from_names() {
        let decls = extract_declarations("@'ant-prefix': ant;");
        assert_eq!(decls, vec![Declaration::new("@ant-prefix", "ant")]);
    }

    #[test]
    fn test_extract_several_on_one_line() {
        let decls = extract_declarations("@a: @b; @b: @c; @c: #fff;");
        let names: Vec<_> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["@a", "@b", "@c"]);
    }

    #[test]
    fn test_extract_keeps_backtick_expressions() {
        let decls =
            extract_declarations("@primary-1: color(~`colorPalette('@{primary-color}', 1) `);");
        assert_eq!(
            decls[0].value,
            "color(~`colorPalette('@{primary-color}', 1) `)"
        );
    }

    #[test]
    fn test_extract_skips_non_declarations() {
        let text = "@import 'colors';\n@media (max-width: 575px) { .a { color: red; } }\n.b { color: @x; }";
        assert!(extract_declarations(text).is_empty());
    }

    #[test]
    fn test_table_last_declaration_wins() {
        let table = VariableTable::parse("@a: red;\n@b: blue;\n@a: green;");
        assert_eq!(table.get("@a"), Some("green"));
        assert_eq!(table.get("@b"), Some("blue"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_table_extend_overrides() {
        let mut base = VariableTable::parse("@a: red; @b: blue;");
        base.extend(&VariableTable::parse("@a: black;"));
        assert_eq!(base.get("@a"), Some("black"));
        assert_eq!(base.get("@b"), Some("blue"));
    }

    #[test]
    fn test_is_reference() {
        assert!(is_reference("@blue-6"));
        assert!(!is_reference("#fff"));
        assert!(!is_reference("@"));
        assert!(!is_reference("fade(@black, 85%)"));
        assert!(!is_reference("@{primary-color}"));
    }
}
