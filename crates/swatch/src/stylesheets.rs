//! Discovery and preparation of the caller's own stylesheets.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::{Result, ThemeError};
use crate::minify::strip_block_comments;
use crate::probe::CompiledColorMap;
use crate::substitute::substitute_after_colon;

const LESS_EXTENSION: &str = "less";

static USER_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@import ["'](.*)["'];"#).expect("valid user import regex"));

/// Every `.less` file under each directory, sorted by path within a
/// directory, directories in the given order.
///
/// A directory that cannot be walked contributes nothing.
pub fn collect_stylesheets(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for dir in dirs {
        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::debug!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|ext| ext == LESS_EXTENSION))
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}

/// Hex SHA-256 of the concatenated contents of `files`.
pub fn content_hash(files: &[PathBuf]) -> Result<String> {
    let mut hasher = Sha256::new();
    for path in files {
        let content = fs::read(path).map_err(|e| ThemeError::read(path, e))?;
        hasher.update(&content);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn fragment_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Lexically normalizes `path`, folding `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Builds the source compiled for one user stylesheet.
///
/// Imports of files that are themselves in `listed` are dropped so their rules
/// are not emitted twice. Theme variable references after a `:` are replaced
/// by their compiled literals, and the variable file is imported first.
pub fn prepare_user_source(
    path: &Path,
    content: &str,
    listed: &HashSet<PathBuf>,
    compiled: &CompiledColorMap,
    var_file: &Path,
) -> String {
    let directory = path.parent().unwrap_or_else(|| Path::new(""));

    let without_duplicates = USER_IMPORT.replace_all(content, |caps: &Captures| {
        let mut target = caps[1].to_string();
        if !target.ends_with(".less") {
            target.push_str(".less");
        }
        if listed.contains(&normalize(&directory.join(&target))) {
            String::new()
        } else {
            caps[0].to_string()
        }
    });

    let substituted = substitute_after_colon(&without_duplicates, compiled);
    format!("@import \"{}\";\n{}", var_file.display(), substituted)
}

/// Strips comments from each compiled fragment and joins them, keeping only
/// the first of any byte-identical fragments.
pub fn dedupe_fragments<I>(fragments: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    fragments
        .into_iter()
        .map(|fragment| strip_block_comments(&fragment))
        .filter(|fragment| seen.insert(fragment_hash(fragment)))
        .collect::<Vec<_>>()
        .join("\n")
}
