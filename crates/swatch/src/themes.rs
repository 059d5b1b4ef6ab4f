//! Built-in theme discovery and the build-tool plugin wrapper.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use swatch_compile::StyleCompiler;

use crate::cache::ThemeCache;
use crate::config::PluginOptions;
use crate::error::{Result, ThemeError};
use crate::pipeline::ThemeGenerator;
use crate::vars::read_variables;

const INDEX_THEME: &str = "index";
const DARK_THEME: &str = "dark";
const DEFAULT_THEME: &str = "default";

/// Theme name → variable name → value.
pub type Themes = BTreeMap<String, BTreeMap<String, String>>;

/// Reads every `<themes_dir>/*.less` except `index.less`.
///
/// Each theme's own variables are overlaid by `var_file`'s, then by the
/// caller's overrides for that theme.
pub fn discover_themes(
    themes_dir: &Path,
    var_file: &Path,
    overrides: &HashMap<String, HashMap<String, String>>,
) -> Result<Themes> {
    let base = read_variables(var_file)?;
    let entries = fs::read_dir(themes_dir).map_err(|e| ThemeError::read(themes_dir, e))?;

    let mut themes = Themes::new();
    for entry in entries {
        let path = entry.map_err(|e| ThemeError::read(themes_dir, e))?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("less") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if name == INDEX_THEME {
            continue;
        }

        let mut variables: BTreeMap<String, String> = read_variables(&path)?
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        variables.extend(base.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        if let Some(custom) = overrides.get(name) {
            variables.extend(custom.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        themes.insert(name.to_string(), variables);
    }

    Ok(themes)
}

/// Union of the `dark` and `default` themes' variable names, sorted.
pub fn default_theme_variables(themes: &Themes) -> Vec<String> {
    [DARK_THEME, DEFAULT_THEME]
        .iter()
        .filter_map(|name| themes.get(*name))
        .flat_map(|vars| vars.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// A preset tag color: foreground, light background, border.
struct TagColor {
    name: &'static str,
    color: &'static str,
    background: &'static str,
    border: &'static str,
}

const TAG_PALETTE: &[TagColor] = &[
    TagColor { name: "pink", color: "#eb2f96", background: "#fff0f6", border: "#ffadd2" },
    TagColor { name: "magenta", color: "#eb2f96", background: "#fff0f6", border: "#ffadd2" },
    TagColor { name: "red", color: "#f5222d", background: "#fff0f6", border: "#ffa39e" },
    TagColor { name: "volcano", color: "#fa541c", background: "#fff2e8", border: "#ffbb96" },
    TagColor { name: "orange", color: "#fa8c16", background: "#fff7e6", border: "#ffd591" },
    TagColor { name: "yellow", color: "#fadb14", background: "#feffe6", border: "#fffb8f" },
    TagColor { name: "gold", color: "#faad14", background: "#fffbe6", border: "#ffe58f" },
    TagColor { name: "cyan", color: "#13c2c2", background: "#e6fffb", border: "#87e8de" },
    TagColor { name: "lime", color: "#a0d911", background: "#fcffe6", border: "#eaff8f" },
    TagColor { name: "green", color: "#52c41a", background: "#f6ffed", border: "#b7eb8f" },
    TagColor { name: "blue", color: "#1890ff", background: "#e6f7ff", border: "#91d5ff" },
    TagColor { name: "geekblue", color: "#2f54eb", background: "#f0f5ff", border: "#adc6ff" },
    TagColor { name: "purple", color: "#722ed1", background: "#f9f0ff", border: "#d3adf7" },
];

/// Fixed rules for the preset tag colors, which the reducer cannot recover
/// because their values never pass through a theme variable.
pub fn tag_palette_css(prefix: &str) -> String {
    let mut css = String::from("\n");
    for tag in TAG_PALETTE {
        css.push_str(&format!(
            ".{prefix}-tag-{name} {{color: {color};background: {background};border-color: {border};}}\n",
            prefix = prefix,
            name = tag.name,
            color = tag.color,
            background = tag.background,
            border = tag.border,
        ));
        css.push_str(&format!(
            ".{prefix}-tag-{name}-inverse {{color: #fff;background: {color};border-color: {color};}}\n",
            prefix = prefix,
            name = tag.name,
            color = tag.color,
        ));
    }
    css
}

/// What the browser runtime needs to switch themes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeManifest {
    pub themes: Themes,
    pub less_file_path: String,
    #[serde(rename = "lessJSPath")]
    pub less_js_path: String,
    /// The var file's own declarations, for the LESS loader.
    pub modify_vars: BTreeMap<String, String>,
}

/// Generator, discovered themes and last emitted artifact, bundled for a
/// build tool that calls [`ThemePlugin::run`] after every build.
pub struct ThemePlugin<C> {
    options: PluginOptions,
    themes: Themes,
    modify_vars: BTreeMap<String, String>,
    generator: ThemeGenerator<C>,
    cache: ThemeCache,
    emitted: String,
}

impl<C: StyleCompiler> ThemePlugin<C> {
    /// Discovers themes and fixes the exposed variable set.
    ///
    /// With no `theme_variables` configured, every variable of the `dark` and
    /// `default` themes is exposed.
    pub fn new(mut options: PluginOptions, generator: ThemeGenerator<C>) -> Result<Self> {
        let paths = options.theme.paths();
        let themes = discover_themes(&paths.themes_dir(), &paths.var_file, &options.custom_themes)?;
        if options.theme.theme_variables.is_empty() {
            options.theme.theme_variables = default_theme_variables(&themes);
        }
        let modify_vars = read_variables(&paths.var_file)?
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Ok(Self {
            options,
            themes,
            modify_vars,
            generator,
            cache: ThemeCache::new(),
            emitted: String::new(),
        })
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    pub fn themes(&self) -> &Themes {
        &self.themes
    }

    pub fn generator(&self) -> &ThemeGenerator<C> {
        &self.generator
    }

    /// Regenerates the artifact. When it changed since the last run, the tag
    /// palette is appended to the output file. A failed run returns `""` and
    /// leaves the output file alone.
    pub async fn run(&mut self) -> Result<String> {
        if let Some(dir) = self.output_file().and_then(Path::parent) {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|source| ThemeError::Write {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }

        let artifact = self.generator.generate(&self.options.theme, &mut self.cache).await;
        if !artifact.is_empty() && artifact != self.emitted {
            self.emitted = artifact.clone();
            if let Some(path) = self.output_file() {
                append(path, &tag_palette_css(&self.options.prefix))?;
                tracing::debug!(path = %path.display(), "appended tag palette");
            }
        }
        Ok(artifact)
    }

    pub fn manifest(&self) -> ThemeManifest {
        ThemeManifest {
            themes: self.themes.clone(),
            less_file_path: self.options.less_file_path.clone(),
            less_js_path: self.options.less_js_path.clone(),
            modify_vars: self.modify_vars.clone(),
        }
    }

    fn output_file(&self) -> Option<&Path> {
        self.options.theme.output_file_path.as_deref()
    }
}

fn append(path: &Path, text: &str) -> Result<()> {
    let write_err = |source| ThemeError::Write {
        path: PathBuf::from(path),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(text.as_bytes()).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn theme_dir() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.less"), "@import './default';").unwrap();
        fs::write(
            tmp.path().join("default.less"),
            "@primary-color: #1890ff;\n@text-color: fade(#000, 85%);\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("dark.less"),
            "@primary-color: #177ddc;\n@component-background: #141414;\n",
        )
        .unwrap();
        fs::write(tmp.path().join("readme.md"), "").unwrap();
        tmp
    }

    #[test]
    fn test_discovers_themes_without_index() {
        let tmp = theme_dir();
        let var_file = tmp.path().join("default.less");
        let themes = discover_themes(tmp.path(), &var_file, &HashMap::new()).unwrap();

        let names: Vec<_> = themes.keys().cloned().collect();
        assert_eq!(names, vec!["dark", "default"]);
    }

    #[test]
    fn test_var_file_then_overrides_win() {
        let tmp = theme_dir();
        let var_file = tmp.path().join("vars.less");
        fs::write(&var_file, "@primary-color: #ff0000;\n").unwrap();

        let mut overrides = HashMap::new();
        overrides.insert(
            "dark".to_string(),
            HashMap::from([("@primary-color".to_string(), "#00ff00".to_string())]),
        );

        let themes = discover_themes(tmp.path(), &var_file, &overrides).unwrap();
        assert_eq!(themes["default"]["@primary-color"], "#ff0000");
        assert_eq!(themes["dark"]["@primary-color"], "#00ff00");
        assert_eq!(themes["dark"]["@component-background"], "#141414");
        // vars.less is a theme too: it lives in the same directory
        assert!(themes.contains_key("vars"));
    }

    #[test]
    fn test_default_theme_variables_union() {
        let tmp = theme_dir();
        let themes =
            discover_themes(tmp.path(), &tmp.path().join("default.less"), &HashMap::new()).unwrap();
        assert_eq!(
            default_theme_variables(&themes),
            vec!["@component-background", "@primary-color", "@text-color"]
        );
    }

    #[test]
    fn test_tag_palette() {
        let css = tag_palette_css("ant");
        assert!(css.contains(".ant-tag-blue {color: #1890ff;background: #e6f7ff;border-color: #91d5ff;}"));
        assert!(css.contains(".ant-tag-blue-inverse {color: #fff;background: #1890ff;border-color: #1890ff;}"));
        assert_eq!(css.matches("-inverse {").count(), TAG_PALETTE.len());
        assert_eq!(TAG_PALETTE.len(), 13);
    }

    #[test]
    fn test_manifest_serializes_camel_case() {
        let manifest = ThemeManifest {
            themes: Themes::new(),
            less_file_path: "/color.less".into(),
            less_js_path: "/less.js".into(),
            modify_vars: BTreeMap::from([("@primary-color".to_string(), "#1890ff".to_string())]),
        };
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["lessFilePath"], "/color.less");
        assert_eq!(json["lessJSPath"], "/less.js");
        assert_eq!(json["modifyVars"]["@primary-color"], "#1890ff");
    }
}
