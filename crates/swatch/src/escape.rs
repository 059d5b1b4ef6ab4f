//! Deferred color-function escaping.
//!
//! In the library source, a call such as `fade(@primary-color, 20%)` would be
//! evaluated by the compiler and lost in a computed literal. Each distinct call
//! site whose first argument is a theme symbol is swapped for a sentinel color
//! before compiling, and swapped back afterwards.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::{Captures, Regex};

use crate::classify::COLOR_FUNCTIONS;
use crate::color_map::SymbolTable;
use crate::sentinel::SentinelAllocator;
use crate::vars::VARIABLE_SIGIL;

/// First arguments that are never escaped.
const EXCLUDED_ARGUMENTS: &[&str] = &["@black", "@white", "@color"];

static COLOR_CALL: Lazy<Regex> = Lazy::new(|| {
    let names: Vec<&str> = COLOR_FUNCTIONS
        .iter()
        .copied()
        .filter(|name| *name != "color")
        .collect();
    Regex::new(&format!(r"\b({})\(([^()]*)\)", names.join("|"))).expect("valid color call regex")
});

/// Sentinel → the call text it replaced, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscapedCalls {
    entries: Vec<(String, String)>,
}

impl EscapedCalls {
    fn sentinel_for(&self, call: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, text)| text == call)
            .map(|(sentinel, _)| sentinel.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, c)| (s.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replaces eligible color-function calls in `source` with sentinels.
///
/// Only calls without nested parentheses are considered. The first argument
/// must be a variable present in `symbols` and not one of `@black`, `@white`
/// or `@color`.
pub fn escape_color_functions<R: Rng>(
    source: &str,
    symbols: &SymbolTable,
    allocator: &mut SentinelAllocator<R>,
) -> (String, EscapedCalls) {
    let mut calls = EscapedCalls::default();

    let escaped = COLOR_CALL.replace_all(source, |caps: &Captures| {
        let call = &caps[0];
        if !is_escapable(&caps[2], symbols) {
            return call.to_string();
        }
        if let Some(sentinel) = calls.sentinel_for(call) {
            return sentinel.to_string();
        }
        let sentinel = allocator.next_color();
        calls.entries.push((sentinel.clone(), call.to_string()));
        sentinel
    });

    (escaped.into_owned(), calls)
}

fn is_escapable(arguments: &str, symbols: &SymbolTable) -> bool {
    let first = arguments.split(',').next().unwrap_or_default().trim();
    first.starts_with(VARIABLE_SIGIL)
        && !EXCLUDED_ARGUMENTS.contains(&first)
        && symbols.contains(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_map::ColorMap;
    use crate::vars::VariableTable;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn symbols(text: &str) -> SymbolTable {
        SymbolTable::merge(&ColorMap::default(), &VariableTable::parse(text))
    }

    fn allocator() -> SentinelAllocator<StdRng> {
        SentinelAllocator::new(StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_escapes_symbol_calls() {
        let table = symbols("@primary-color: #1890ff;");
        let source = ".a { color: fade(@primary-color, 20%); }";
        let (escaped, calls) = escape_color_functions(source, &table, &mut allocator());

        assert_eq!(calls.len(), 1);
        let (sentinel, call) = calls.iter().next().unwrap();
        assert_eq!(call, "fade(@primary-color, 20%)");
        assert_eq!(escaped, format!(".a {{ color: {}; }}", sentinel));
    }

    #[test]
    fn test_same_call_shares_sentinel() {
        let table = symbols("@primary-color: #1890ff;");
        let source = "a: tint(@primary-color, 10%); b: tint(@primary-color, 10%); c: tint(@primary-color, 20%);";
        let (escaped, calls) = escape_color_functions(source, &table, &mut allocator());
        assert_eq!(calls.len(), 2);
        assert!(!escaped.contains("tint("));
    }

    #[test]
    fn test_excluded_arguments_untouched() {
        let table = symbols("@black: #000;\n@white: #fff;");
        let source = "a: fade(@black, 85%); b: fade(@white, 10%); c: fade(#000, 5%); d: fade(@color, 5%);";
        let (escaped, calls) = escape_color_functions(source, &table, &mut allocator());
        assert!(calls.is_empty());
        assert_eq!(escaped, source);
    }

    #[test]
    fn test_unknown_variables_untouched() {
        let table = symbols("@primary-color: #1890ff;");
        let source = "a: darken(@btn-bg, 5%);";
        let (escaped, calls) = escape_color_functions(source, &table, &mut allocator());
        assert!(calls.is_empty());
        assert_eq!(escaped, source);
    }

    #[test]
    fn test_longer_function_names_match() {
        let table = symbols("@link-color: #1890ff;");
        let (_, calls) = escape_color_functions("x: fadeout(@link-color, 5%);", &table, &mut allocator());
        assert_eq!(calls.iter().next().map(|(_, c)| c), Some("fadeout(@link-color, 5%)"));
    }
}
