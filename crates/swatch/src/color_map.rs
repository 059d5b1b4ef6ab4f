//! Color-map resolution and the symbol table.
//!
//! Given
//!
//! ```less
//! @primary-color: #1890ff;
//! @link-color: @primary-color;
//! ```
//!
//! the color map holds `@link-color -> #1890ff`: references are followed to
//! their terminal value and kept only if that value classifies as a color.

use std::collections::HashMap;

use crate::classify::ColorClassifier;
use crate::error::{Result, ThemeError};
use crate::vars::{is_reference, Declaration, VariableTable};

/// Follows a chain of variable references to its terminal value.
///
/// Returns `Ok(None)` for a dangling reference and
/// [`ThemeError::CycleDetected`] if the chain loops.
pub fn resolve_chain<'a>(name: &str, table: &'a VariableTable) -> Result<Option<&'a str>> {
    let mut visited: Vec<String> = Vec::new();
    let mut current = name.to_string();

    loop {
        if visited.contains(&current) {
            visited.push(current);
            return Err(ThemeError::CycleDetected { path: visited });
        }

        let Some(value) = table.get(&current) else {
            return Ok(None);
        };
        visited.push(current);

        if !is_reference(value) {
            return Ok(Some(value));
        }
        current = value.to_string();
    }
}

/// Variables whose (resolved) value is a color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMap {
    colors: HashMap<String, String>,
}

impl ColorMap {
    /// Builds the color map from declarations in source order.
    ///
    /// Reference chains are followed through the full declaration table, so
    /// forward references resolve too. Later declarations overwrite earlier ones.
    pub fn build(declarations: &[Declaration], classifier: &ColorClassifier) -> Result<Self> {
        let table = VariableTable::from_declarations(declarations);
        let mut colors = HashMap::new();

        for decl in declarations {
            let terminal = if decl.is_reference() {
                match resolve_chain(&decl.value, &table)? {
                    Some(terminal) => terminal,
                    None => continue,
                }
            } else {
                decl.value.as_str()
            };

            if classifier.is_color(terminal) {
                colors.insert(decl.name.clone(), terminal.to_string());
            }
        }

        Ok(Self { colors })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Merged view of resolved colors and raw expressions.
///
/// The raw variable table wins on collisions: a variable declared in the
/// theme's own var file keeps its symbolic expression (`@primary-color:
/// @blue-6`), and only variables it never declares fall back to the resolved
/// color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    entries: HashMap<String, String>,
}

impl SymbolTable {
    pub fn merge(colors: &ColorMap, raw: &VariableTable) -> Self {
        let mut entries: HashMap<String, String> = colors
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (name, value) in raw.iter() {
            entries.insert(name.to_string(), value.to_string());
        }
        Self { entries }
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

    /// Entries sorted by name.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort();
        entries
    }
}
