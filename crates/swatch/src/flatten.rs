//! Import flattening.
//!
//! Inlines `@import` directives recursively so a stylesheet and everything it
//! pulls in can be scanned as one text blob:
//!
//! ```less
//! // themes/default.less
//! @import '../color/colors';
//! @primary-color: @blue-6;
//! ```
//!
//! becomes the content of `color/colors.less` followed by the declaration.
//!
//! Paths starting with `~` resolve against the module root (`node_modules`),
//! everything else against the importing file's directory. A `.less`
//! extension is appended when the path has none.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, ThemeError};

const MODULE_PREFIX: char = '~';
const LESS_EXTENSION: &str = "less";

static IMPORT_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^@import\s*(?:\([^)]*\)\s*)?["']([^"']+)["']"#).expect("valid import regex")
});

/// Reads `path` and returns its content with every import inlined.
///
/// Fails with [`ThemeError::CycleDetected`] when a file imports itself,
/// directly or through other files.
pub fn flatten_imports(path: impl AsRef<Path>, module_root: impl AsRef<Path>) -> Result<String> {
    let mut stack = Vec::new();
    flatten_file(path.as_ref(), module_root.as_ref(), &mut stack)
}

/// Resolves an import target relative to the importing file's directory.
pub fn resolve_import(import: &str, directory: &Path, module_root: &Path) -> PathBuf {
    let mut target = PathBuf::from(import.trim_start_matches(MODULE_PREFIX));
    if target.extension().is_none() {
        target.set_extension(LESS_EXTENSION);
    }

    if import.starts_with(MODULE_PREFIX) {
        module_root.join(target)
    } else {
        directory.join(target)
    }
}

/// Extracts the quoted target of an `@import` line.
pub fn import_target(line: &str) -> Option<&str> {
    IMPORT_PATH
        .captures(line.trim_end())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn flatten_file(path: &Path, module_root: &Path, stack: &mut Vec<PathBuf>) -> Result<String> {
    let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if stack.contains(&key) {
        let mut chain: Vec<String> = stack.iter().map(|p| p.display().to_string()).collect();
        chain.push(key.display().to_string());
        return Err(ThemeError::CycleDetected { path: chain });
    }

    let content = fs::read_to_string(path).map_err(|e| ThemeError::read(path, e))?;
    let directory = path.parent().unwrap_or_else(|| Path::new(""));

    stack.push(key);
    let mut lines = Vec::new();
    for line in content.split('\n') {
        if !line.starts_with("@import") {
            lines.push(line.to_string());
            continue;
        }

        let target = import_target(line).ok_or_else(|| ThemeError::MalformedImport {
            path: path.to_path_buf(),
            line: line.trim().to_string(),
        })?;
        let resolved = resolve_import(target, directory, module_root);
        lines.push(flatten_file(&resolved, module_root, stack)?);
    }
    stack.pop();

    Ok(lines.join("\n"))
}
