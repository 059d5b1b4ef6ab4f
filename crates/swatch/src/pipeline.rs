//! The theme extraction pipeline.
//!
//! A generation runs these stages in order, short-circuiting on a cache hit:
//!
//! 1. hash the caller's stylesheets and consult the [`ThemeCache`]
//! 2. build the symbol table from the variable file
//! 3. select the exposed variables and give each a sentinel color
//! 4. compile a probe stylesheet to learn what each variable and shade
//!    compiles to
//! 5. compile every user stylesheet with those literals substituted in
//! 6. escape theme-dependent color functions in the library source and
//!    compile it
//! 7. reduce library and user CSS to color declarations
//! 8. swap literals back for variables, append the default theme, declare
//!    each exposed variable once, minify

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use swatch_compile::{CompileOptions, StyleCompiler};

use crate::cache::ThemeCache;
use crate::classify::ColorClassifier;
use crate::color_map::{ColorMap, SymbolTable};
use crate::config::{ResolvedPaths, ThemeOptions};
use crate::error::{Result, ThemeError};
use crate::escape::escape_color_functions;
use crate::flatten::flatten_imports;
use crate::minify::{minify, strip_block_comments};
use crate::probe::{synthesize_probe, CompiledColorMap};
use crate::sentinel::{SentinelAllocator, SentinelMap};
use crate::shade::is_shade_name;
use crate::stylesheets::{
    collect_stylesheets, content_hash, dedupe_fragments, normalize, prepare_user_source,
};
use crate::substitute::{reassemble, reverse_substitute};
use crate::vars::{extract_declarations, read_variables};

/// Keeps the requested names that the symbol table knows and that are not
/// shade variables, in request order without duplicates.
pub fn select_variables(requested: &[String], symbols: &SymbolTable) -> Vec<String> {
    let mut seen = HashSet::new();
    requested
        .iter()
        .filter(|name| symbols.contains(name) && !is_shade_name(name))
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Symbol table for a variable file: resolved colors of the flattened file,
/// overlaid by the file's own raw declarations.
pub fn build_symbol_table(
    var_file: &Path,
    module_root: &Path,
    classifier: &ColorClassifier,
) -> Result<SymbolTable> {
    let flattened = flatten_imports(var_file, module_root)?;
    let colors = ColorMap::build(&extract_declarations(&flattened), classifier)?;
    let raw = read_variables(var_file)?;
    Ok(SymbolTable::merge(&colors, &raw))
}

/// Extracts color themes using an injected compiler.
#[derive(Debug, Clone)]
pub struct ThemeGenerator<C> {
    compiler: C,
    seed: Option<u64>,
}

impl<C: StyleCompiler> ThemeGenerator<C> {
    pub fn new(compiler: C) -> Self {
        Self {
            compiler,
            seed: None,
        }
    }

    /// Makes sentinel allocation deterministic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Generates the theme artifact.
    ///
    /// Never fails: any error is logged and yields `""`, leaving `cache`
    /// untouched. A cache hit returns the cached artifact without compiling.
    pub async fn generate(&self, options: &ThemeOptions, cache: &mut ThemeCache) -> String {
        match self.try_generate(options, cache).await {
            Ok(css) => css,
            Err(err) => {
                tracing::error!(error = %err, "theme generation failed");
                String::new()
            }
        }
    }

    /// Like [`generate`](Self::generate), but returns the error.
    pub async fn try_generate(&self, options: &ThemeOptions, cache: &mut ThemeCache) -> Result<String> {
        let paths = options.paths();
        let stylesheets = collect_stylesheets(&paths.styles_dirs);
        let hash = content_hash(&stylesheets)?;
        if let Some(artifact) = cache.lookup(&hash) {
            tracing::debug!(hash = %hash, "stylesheets unchanged, reusing cached theme");
            return Ok(artifact.to_string());
        }

        let classifier = ColorClassifier::with_patterns(&options.custom_color_regex_array)?;
        let symbols = build_symbol_table(&paths.var_file, &paths.module_root, &classifier)?;
        tracing::debug!(symbols = symbols.len(), "built symbol table");

        let selected = select_variables(&options.requested_variables(), &symbols);
        let mut allocator = SentinelAllocator::new(self.rng());
        let sentinels = SentinelMap::assign(&selected, &mut allocator);
        tracing::debug!(variables = ?selected, "selected theme variables");

        let palette = flatten_imports(paths.colors_file(), &paths.module_root)?;
        let probe = synthesize_probe(&palette, &sentinels);
        let probe_options = CompileOptions::new().with_search_paths(paths.probe_search_paths());
        let probe_css = self.compile_stage("probe", &probe, &probe_options).await?;
        let compiled = CompiledColorMap::scan(&strip_block_comments(&probe_css));
        tracing::debug!(colors = compiled.len(), "scanned probe output");

        let user_css = self.compile_user_stylesheets(&stylesheets, &paths, &compiled).await;

        let library = flatten_imports(&paths.component_file, &paths.module_root)?;
        let (library, escaped) = escape_color_functions(&library, &symbols, &mut allocator);
        tracing::debug!(calls = escaped.len(), "escaped color functions");
        let library = format!("{}\n{}", library, sentinels.declarations());
        let library_options = CompileOptions::new().with_search_paths(paths.library_search_paths());
        let library_css = self.compile_stage("library", &library, &library_options).await?;

        let reduced = self
            .compiler
            .reduce_to_colors(&format!("{}\n{}", library_css, user_css))?;
        let css = reverse_substitute(&reduced, &escaped, &compiled);

        let default_theme = flatten_imports(paths.default_theme_file(), &paths.module_root)?;
        let css = reassemble(&css, &default_theme, &selected, &symbols)?;
        let css = minify(&css);

        match &options.output_file_path {
            Some(path) => {
                fs::write(path, &css).map_err(|source| ThemeError::Write {
                    path: path.clone(),
                    source,
                })?;
                tracing::info!(path = %path.display(), "theme generated");
            }
            None => tracing::info!("theme generated"),
        }

        cache.store(hash, css.clone());
        Ok(css)
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    async fn compile_stage(
        &self,
        stage: &'static str,
        source: &str,
        options: &CompileOptions,
    ) -> Result<String> {
        tracing::debug!(stage, bytes = source.len(), "compiling");
        self.compiler
            .compile(source, options)
            .await
            .map_err(|source| ThemeError::Compile { stage, source })
    }

    /// Compiles each stylesheet on its own, all at once, and joins the
    /// results in file order. A file that fails contributes nothing.
    async fn compile_user_stylesheets(
        &self,
        files: &[PathBuf],
        paths: &ResolvedPaths,
        compiled: &CompiledColorMap,
    ) -> String {
        let listed: HashSet<PathBuf> = files.iter().map(|path| normalize(path)).collect();
        let jobs = files
            .iter()
            .map(|path| self.compile_user_stylesheet(path, &listed, paths, compiled));
        dedupe_fragments(join_all(jobs).await)
    }

    async fn compile_user_stylesheet(
        &self,
        path: &Path,
        listed: &HashSet<PathBuf>,
        paths: &ResolvedPaths,
        compiled: &CompiledColorMap,
    ) -> String {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable stylesheet");
                return String::new();
            }
        };

        let source = prepare_user_source(path, &content, listed, compiled, &paths.var_file);
        let options = CompileOptions::new()
            .with_search_paths(paths.user_search_paths())
            .with_filename(path);
        match self.compiler.compile(&source, &options).await {
            Ok(css) => css,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "stylesheet failed to compile, skipping");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::VariableTable;

    #[test]
    fn test_select_variables() {
        let symbols = SymbolTable::merge(
            &ColorMap::default(),
            &VariableTable::parse("@primary-color: #1890ff;\n@primary-5: #40a9ff;\n@link-color: @primary-color;"),
        );
        let requested: Vec<String> = ["@link-color", "@primary-5", "@unknown", "@primary-color", "@link-color"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            select_variables(&requested, &symbols),
            vec!["@link-color", "@primary-color"]
        );
    }
}
