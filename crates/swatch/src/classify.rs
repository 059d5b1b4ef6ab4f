//! Color classification of raw expressions.
//!
//! The decision sequence (first match wins):
//!
//! 1. contains `rgb` → color
//! 2. empty, or contains `px` → not a color
//! 3. contains a deferred-evaluation marker (`colorPalette`, `fade`) → color
//! 4. starts with `#` → color iff 3, 4, 6 or 8 hex digits follow
//! 5. strict `rgb/hsl/hsv(a)(...)` numeric notation → color
//! 6. any built-in color-function pattern or caller pattern → color
//! 7. otherwise not a color
//!
//! The `rgb` check deliberately precedes the `px` rejection, so
//! `rgba(0, 0, 0, 0.5) 0 0 2px` still classifies as a color.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, ThemeError};

/// LESS color functions, in the order they are tried.
pub const COLOR_FUNCTIONS: &[&str] = &[
    "color",
    "lighten",
    "darken",
    "saturate",
    "desaturate",
    "fadein",
    "fadeout",
    "fade",
    "spin",
    "mix",
    "hsv",
    "tint",
    "shade",
    "greyscale",
    "multiply",
    "contrast",
    "screen",
    "overlay",
    "average",
];

const DEFERRED_MARKERS: &[&str] = &["colorPalette", "fade"];
const HEX_LENGTHS: &[usize] = &[3, 4, 6, 8];

static FUNCTIONAL_NOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(rgb|hsl|hsv)a?\((\d+%?(deg|rad|grad|turn)?[,\s]+){2,3}[\s/]*[\d.]+%?\)$")
        .expect("valid functional notation regex")
});

static BUILTIN_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    COLOR_FUNCTIONS
        .iter()
        .map(|name| Regex::new(&format!(r"\b{}\(.*\)", name)).expect("valid color function regex"))
        .collect()
});

/// Decides whether a literal expression denotes a color.
#[derive(Debug, Clone, Default)]
pub struct ColorClassifier {
    custom: Vec<Regex>,
}

impl ColorClassifier {
    /// A classifier using only the built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// A classifier that also accepts anything matching one of `patterns`.
    pub fn with_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let custom = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| ThemeError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { custom })
    }

    pub fn is_color(&self, value: &str) -> bool {
        if value.contains("rgb") {
            return true;
        }
        if value.is_empty() || value.contains("px") {
            return false;
        }
        if DEFERRED_MARKERS.iter().any(|marker| value.contains(marker)) {
            return true;
        }
        if let Some(hex) = value.strip_prefix('#') {
            return is_hex_color(hex);
        }
        if FUNCTIONAL_NOTATION.is_match(value) {
            return true;
        }
        self.custom
            .iter()
            .chain(BUILTIN_PATTERNS.iter())
            .any(|pattern| pattern.is_match(value))
    }
}

fn is_hex_color(digits: &str) -> bool {
    HEX_LENGTHS.contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
