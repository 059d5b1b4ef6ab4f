//! Generation options and path resolution.
//!
//! Options load from YAML. Keys may be written in snake case or in the camel
//! case used by JavaScript build configs:
//!
//! ```yaml
//! antDir: node_modules/antd
//! stylesDir: src/styles
//! themeVariables: ["@primary-color", "@link-color"]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, ThemeError};
use crate::sentinel::PRIMARY_VARIABLE;

pub const DEFAULT_ANT_DIR: &str = "node_modules/antd";
pub const MODULE_ROOT: &str = "node_modules";
pub const DEFAULT_LESS_FILE_PATH: &str = "/_next/static/color.less";
pub const DEFAULT_LESS_JS_PATH: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/less.js/4.1.1/less.min.js";
pub const DEFAULT_PREFIX: &str = "antd";

/// Options for one theme generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeOptions {
    /// Component library install directory.
    #[serde(alias = "antDir")]
    pub ant_dir: Option<PathBuf>,
    /// Directory holding the library's LESS sources (`<ant_dir>/lib`).
    #[serde(alias = "antdStylesDir")]
    pub antd_styles_dir: Option<PathBuf>,
    /// The library's bundled master stylesheet.
    #[serde(alias = "antdComponentFile")]
    pub antd_component_file: Option<PathBuf>,
    /// The caller's own stylesheet directories.
    #[serde(alias = "stylesDir", deserialize_with = "one_or_many")]
    pub styles_dir: Vec<PathBuf>,
    /// Variable file defining the theme.
    #[serde(alias = "varFile")]
    pub var_file: Option<PathBuf>,
    #[serde(alias = "outputFilePath")]
    pub output_file_path: Option<PathBuf>,
    /// Variables exposed for runtime swapping. Empty means `@primary-color`.
    #[serde(alias = "themeVariables")]
    pub theme_variables: Vec<String>,
    /// Extra regular expressions that mark a value as a color.
    #[serde(alias = "customColorRegexArray")]
    pub custom_color_regex_array: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(path)) => vec![path],
        Some(OneOrMany::Many(paths)) => paths,
    })
}

impl ThemeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| ThemeError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ThemeError::read(path, e))?;
        Self::from_yaml(&text)
    }

    pub fn with_ant_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ant_dir = Some(dir.into());
        self
    }

    pub fn with_styles_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.styles_dir.push(dir.into());
        self
    }

    pub fn with_var_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.var_file = Some(path.into());
        self
    }

    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file_path = Some(path.into());
        self
    }

    pub fn with_theme_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.theme_variables = names.into_iter().map(Into::into).collect();
        self
    }

    /// Requested theme variables, defaulting to the primary color.
    pub fn requested_variables(&self) -> Vec<String> {
        if self.theme_variables.is_empty() {
            vec![PRIMARY_VARIABLE.to_string()]
        } else {
            self.theme_variables.clone()
        }
    }

    /// Fills in every unset path from `ant_dir`.
    pub fn paths(&self) -> ResolvedPaths {
        let ant_dir = self
            .ant_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ANT_DIR));
        let styles = self
            .antd_styles_dir
            .clone()
            .unwrap_or_else(|| ant_dir.join("lib"));
        let component_file = self
            .antd_component_file
            .clone()
            .unwrap_or_else(|| ant_dir.join("dist").join("antd.less"));
        let var_file = self
            .var_file
            .clone()
            .unwrap_or_else(|| styles.join("style").join("themes").join("default.less"));

        ResolvedPaths {
            module_root: module_root(&ant_dir),
            ant_dir,
            styles,
            component_file,
            var_file,
            styles_dirs: self.styles_dir.clone(),
        }
    }
}

/// The outermost `node_modules` directory containing `ant_dir`, or
/// `node_modules` relative to the working directory.
fn module_root(ant_dir: &Path) -> PathBuf {
    let mut root = PathBuf::new();
    for component in ant_dir.components() {
        root.push(component.as_os_str());
        if component == Component::Normal(MODULE_ROOT.as_ref()) {
            return root;
        }
    }
    PathBuf::from(MODULE_ROOT)
}

/// Every path the pipeline touches, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub ant_dir: PathBuf,
    /// Library LESS sources.
    pub styles: PathBuf,
    pub component_file: PathBuf,
    pub var_file: PathBuf,
    pub module_root: PathBuf,
    /// The caller's stylesheet directories.
    pub styles_dirs: Vec<PathBuf>,
}

impl ResolvedPaths {
    pub fn colors_file(&self) -> PathBuf {
        self.styles.join("style").join("color").join("colors.less")
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.styles.join("style").join("themes")
    }

    pub fn default_theme_file(&self) -> PathBuf {
        self.themes_dir().join("default.less")
    }

    pub fn probe_search_paths(&self) -> Vec<PathBuf> {
        std::iter::once(self.styles.join("style"))
            .chain(self.styles_dirs.iter().cloned())
            .collect()
    }

    pub fn user_search_paths(&self) -> Vec<PathBuf> {
        std::iter::once(self.styles.clone())
            .chain(self.styles_dirs.iter().cloned())
            .collect()
    }

    pub fn library_search_paths(&self) -> Vec<PathBuf> {
        vec![self.styles.clone()]
    }
}

/// Options for the build-tool plugin: generation plus browser runtime wiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginOptions {
    #[serde(flatten)]
    pub theme: ThemeOptions,
    /// URL the browser runtime fetches the artifact from.
    #[serde(alias = "lessFilePath")]
    pub less_file_path: String,
    /// URL of the in-browser LESS compiler.
    #[serde(alias = "lessJSPath", alias = "lessJsPath")]
    pub less_js_path: String,
    /// Class prefix of the component library.
    pub prefix: String,
    /// Per-theme variable overrides, keyed by theme name.
    #[serde(alias = "customThemes")]
    pub custom_themes: HashMap<String, HashMap<String, String>>,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            theme: ThemeOptions::default(),
            less_file_path: DEFAULT_LESS_FILE_PATH.to_string(),
            less_js_path: DEFAULT_LESS_JS_PATH.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            custom_themes: HashMap::new(),
        }
    }
}

impl PluginOptions {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| ThemeError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ThemeError::read(path, e))?;
        Self::from_yaml(&text)
    }
}
