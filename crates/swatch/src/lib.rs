//! Swatch - runtime-swappable color themes from LESS component libraries.
//!
//! Component libraries such as Ant Design bake their palette into thousands of
//! compiled rules. Swatch recovers which compiled colors came from which theme
//! variables and emits a small stylesheet holding only color declarations, each
//! referencing the variable symbolically. A browser-side LESS compiler can then
//! re-evaluate that stylesheet with new variable values to switch themes.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use swatch::{ThemeCache, ThemeGenerator, ThemeOptions};
//! use swatch_compile::LesscCompiler;
//!
//! # async fn demo() {
//! let options = ThemeOptions::new()
//!     .with_ant_dir("node_modules/antd")
//!     .with_styles_dir("src/styles")
//!     .with_theme_variables(["@primary-color", "@link-color"])
//!     .with_output_file("public/color.less");
//!
//! let generator = ThemeGenerator::new(LesscCompiler::new());
//! let mut cache = ThemeCache::new();
//! let css = generator.generate(&options, &mut cache).await;
//! # let _ = css;
//! # }
//! ```
//!
//! # How it works
//!
//! Every exposed variable is replaced by a unique sentinel color before the
//! library is compiled. Wherever that sentinel shows up in the output, the
//! rule depended on the variable. Shades derived through `colorPalette` are
//! learned the same way, by compiling a probe stylesheet and reading back what
//! each shade became.
//!
//! The compiler is injected through [`swatch_compile::StyleCompiler`], so the
//! pipeline runs against a scripted fake in tests.
//!
//! # Building blocks
//!
//! The stages are public and usable on their own:
//!
//! ```rust
//! use swatch::{ColorClassifier, ColorMap, extract_declarations, shade_expression};
//!
//! let decls = extract_declarations("@a: @b; @b: @c; @c: #fff;");
//! let colors = ColorMap::build(&decls, &ColorClassifier::new()).unwrap();
//! assert_eq!(colors.get("@a"), Some("#fff"));
//!
//! assert_eq!(
//!     shade_expression("@primary-5").as_deref(),
//!     Some("color(~`colorPalette(\"@{primary-color}\", 5)`)"),
//! );
//! ```

mod cache;
mod classify;
mod color_map;
mod config;
mod error;
mod escape;
mod flatten;
mod minify;
mod pipeline;
mod probe;
mod sentinel;
mod shade;
mod stylesheets;
mod substitute;
mod themes;
mod vars;

pub use cache::ThemeCache;
pub use classify::{ColorClassifier, COLOR_FUNCTIONS};
pub use color_map::{resolve_chain, ColorMap, SymbolTable};
pub use config::{
    PluginOptions, ResolvedPaths, ThemeOptions, DEFAULT_ANT_DIR, DEFAULT_LESS_FILE_PATH,
    DEFAULT_LESS_JS_PATH, DEFAULT_PREFIX,
};
pub use error::{Result, ThemeError};
pub use escape::{escape_color_functions, EscapedCalls};
pub use flatten::{flatten_imports, import_target, resolve_import};
pub use minify::{minify, strip_block_comments};
pub use pipeline::{build_symbol_table, select_variables, ThemeGenerator};
pub use probe::{synthesize_probe, CompiledColorMap};
pub use sentinel::{SentinelAllocator, SentinelMap, PRIMARY_SENTINEL, PRIMARY_VARIABLE};
pub use shade::{is_shade_name, shade_expression, shade_variable_name, SHADE_INDICES};
pub use stylesheets::{
    collect_stylesheets, content_hash, dedupe_fragments, fragment_hash, prepare_user_source,
};
pub use substitute::{
    reassemble, reverse_substitute, substitute_after_colon, FADED_PRIMARY_EXPRESSION,
    FADED_PRIMARY_LITERAL,
};
pub use themes::{
    default_theme_variables, discover_themes, tag_palette_css, ThemeManifest, ThemePlugin, Themes,
};
pub use vars::{extract_declarations, is_reference, read_variables, Declaration, VariableTable};
