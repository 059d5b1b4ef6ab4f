use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::CompileError;

/// Options for a single compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Directories searched for relative `@import`s.
    pub search_paths: Vec<PathBuf>,
    /// Source file the text came from, if any. Its directory is searched first.
    pub filename: Option<PathBuf>,
    /// Allow backtick-embedded JavaScript (`~\`colorPalette(...)\``) in expressions.
    pub javascript_enabled: bool,
    /// Prefix that marks module-root imports (`@import "~antd/..."`).
    pub module_prefix: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            filename: None,
            javascript_enabled: true,
            module_prefix: Some("~".to_string()),
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Search paths with the source file's directory first, if known.
    pub fn effective_search_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(self.search_paths.len() + 1);
        if let Some(dir) = self.filename.as_ref().and_then(|f| f.parent()) {
            if !dir.as_os_str().is_empty() {
                paths.push(dir.to_path_buf());
            }
        }
        for path in &self.search_paths {
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
        paths
    }
}

/// The stylesheet compiler, used by the theme pipeline as an oracle.
///
/// `compile` turns LESS source into CSS. `reduce_to_colors` strips compiled
/// CSS down to its color-bearing rules; the default delegates to
/// [`swatch_reduce::reduce_to_colors`]. Test doubles can script both.
#[async_trait]
pub trait StyleCompiler: Send + Sync {
    /// Compile `source` to CSS.
    async fn compile(&self, source: &str, options: &CompileOptions)
        -> Result<String, CompileError>;

    /// Reduce compiled CSS to color-only rules.
    fn reduce_to_colors(&self, css: &str) -> Result<String, swatch_reduce::ReduceError> {
        swatch_reduce::reduce_to_colors(css)
    }
}
