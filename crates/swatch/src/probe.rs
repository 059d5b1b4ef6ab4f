//! Probe compilation.
//!
//! The compiler evaluates palette functions (`colorPalette`, `fade`, ...) that
//! cannot be reproduced here. To learn what a variable compiles to, a probe
//! stylesheet gives each variable its own selector:
//!
//! ```less
//! @primary-color: #123456;
//! .primary-color { color: #123456; }
//! .primary-5 { color: color(~`colorPalette("@{primary-color}", 5)`); }
//! ```
//!
//! and the compiled output is scanned for `.selector { color: value; }` to
//! recover `@primary-5 -> #<computed>`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::sentinel::SentinelMap;
use crate::shade::{shade_expression, shade_variable_name, SHADE_INDICES};

static COMPILED_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.([.a-zA-Z0-9'-]+) \{\n {2}color: (.*);").expect("valid compiled color regex")
});

/// Builds the probe stylesheet for a set of sentinel-bound variables.
///
/// Layout: palette source, sentinel declarations, then one rule per variable
/// and one rule per shade of it.
pub fn synthesize_probe(palette_source: &str, sentinels: &SentinelMap) -> String {
    let mut rules = String::new();
    for (variable, sentinel) in sentinels.iter() {
        rules.push_str(&format!("{} {{ color: {}; }}\n", selector_for(variable), sentinel));
    }
    for (variable, _) in sentinels.iter() {
        for index in SHADE_INDICES {
            let shade = shade_variable_name(variable, index);
            if let Some(expression) = shade_expression(&shade) {
                rules.push_str(&format!("{} {{ color: {}; }}\n", selector_for(&shade), expression));
            }
        }
    }

    format!("{}\n{}\n{}", palette_source, sentinels.declarations(), rules)
}

fn selector_for(variable: &str) -> String {
    format!(".{}", variable.trim_start_matches('@'))
}

/// Variable → compiled literal, in the order the probe emitted them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledColorMap {
    entries: Vec<(String, String)>,
}

impl CompiledColorMap {
    /// Scans compiled probe CSS for `.name {\n  color: value;` blocks.
    ///
    /// Only names containing `-` or a quote, and values that are `#hex` or
    /// `rgba(...)`, are kept.
    pub fn scan(css: &str) -> Self {
        let mut map = Self::default();
        for caps in COMPILED_COLOR.captures_iter(css) {
            let name = &caps[1];
            let value = caps[2].trim();
            if !(name.contains('-') || name.contains('\'')) {
                continue;
            }
            if value.starts_with("rgba") || value.starts_with('#') {
                map.insert(format!("@{}", name), value.to_string());
            }
        }
        map
    }

    pub fn insert(&mut self, variable: String, value: String) {
        match self.entries.iter_mut().find(|(name, _)| *name == variable) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((variable, value)),
        }
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for CompiledColorMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut map = Self::default();
        for (variable, value) in iter {
            map.insert(variable, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentinel::{SentinelAllocator, PRIMARY_VARIABLE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_probe_layout() {
        let mut alloc = SentinelAllocator::new(StdRng::seed_from_u64(1));
        let sentinels = SentinelMap::assign(&[PRIMARY_VARIABLE.to_string()], &mut alloc);
        let probe = synthesize_probe("@blue-6: #1890ff;", &sentinels);

        assert!(probe.starts_with("@blue-6: #1890ff;\n@primary-color: #123456;\n"));
        assert!(probe.contains(".primary-color { color: #123456; }\n"));
        assert!(probe.contains(".primary-5 { color: color(~`colorPalette(\"@{primary-color}\", 5)`); }\n"));
        assert!(probe.contains(".primary-10 {"));
        assert!(!probe.contains(".primary-6 {"));
    }

    #[test]
    fn test_probe_names_non_primary_shades_by_suffix() {
        let mut alloc = SentinelAllocator::new(StdRng::seed_from_u64(2));
        let sentinels = SentinelMap::assign(&["@info-color".to_string()], &mut alloc);
        let probe = synthesize_probe("", &sentinels);
        assert!(probe.contains(".info-color-3 { color: color(~`colorPalette(\"@{info-color}\", 3)`); }"));
    }

    #[test]
    fn test_scan_compiled_output() {
        let css = ".primary-color {\n  color: #123456;\n}\n.primary-5 {\n  color: #2e4a66;\n}\n.info-color {\n  color: rgba(1, 2, 3, 0.5);\n}\n";
        let map = CompiledColorMap::scan(css);
        assert_eq!(map.get("@primary-color"), Some("#123456"));
        assert_eq!(map.get("@primary-5"), Some("#2e4a66"));
        assert_eq!(map.get("@info-color"), Some("rgba(1, 2, 3, 0.5)"));
        let order: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["@primary-color", "@primary-5", "@info-color"]);
    }

    #[test]
    fn test_scan_skips_names_without_dash_and_non_literals() {
        let css = ".white {\n  color: #ffffff;\n}\n.text-color {\n  color: red;\n}\n";
        assert!(CompiledColorMap::scan(css).is_empty());
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut map = CompiledColorMap::default();
        map.insert("@a-1".into(), "#111".into());
        map.insert("@b-1".into(), "#222".into());
        map.insert("@a-1".into(), "#333".into());
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("@a-1", "#333"), ("@b-1", "#222")]);
    }
}
