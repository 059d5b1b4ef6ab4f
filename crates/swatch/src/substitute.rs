//! Textual substitution between symbolic variables and compiled literals.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::color_map::SymbolTable;
use crate::error::{Result, ThemeError};
use crate::escape::EscapedCalls;
use crate::probe::CompiledColorMap;
use crate::shade::{is_shade_name, shade_expression};

/// The compiled value of `fade(@primary-color, 20%)` for the `#123456`
/// primary sentinel.
pub const FADED_PRIMARY_LITERAL: &str = "rgba(18, 52, 86, 0.2)";
pub const FADED_PRIMARY_EXPRESSION: &str = "fade(@primary-color, 20%)";

/// Legacy IE hack suffix emitted by the component library.
const IE_HACK: &str = "\\9";

static RESIDUAL_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)@[\w-]+:\s*.*;[/.]*").expect("valid residual declaration regex"));

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn is_hex_continuation(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Replaces every occurrence of `needle` not directly followed by a character
/// for which `continues` returns true.
fn replace_bounded(text: &str, needle: &str, replacement: &str, continues: fn(char) -> bool) -> String {
    if needle.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(needle) {
        let end = pos + needle.len();
        out.push_str(&rest[..pos]);
        if rest[end..].chars().next().is_some_and(continues) {
            out.push_str(needle);
        } else {
            out.push_str(replacement);
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Replaces variable references that follow the first `:` on each line with
/// their compiled literals.
///
/// Selectors and directives before the colon are left alone, and
/// `@primary-color` does not match inside `@primary-color-hover`.
pub fn substitute_after_colon(source: &str, compiled: &CompiledColorMap) -> String {
    source
        .split_inclusive('\n')
        .map(|line| match line.find(':') {
            Some(colon) => {
                let (head, tail) = line.split_at(colon);
                let tail = compiled.iter().fold(tail.to_string(), |acc, (name, value)| {
                    replace_bounded(&acc, name, value, is_name_char)
                });
                format!("{}{}", head, tail)
            }
            None => line.to_string(),
        })
        .collect()
}

/// Turns reduced CSS back into symbolic form.
///
/// In order: restores escaped color-function calls, replaces each compiled
/// literal with its variable (or shade expression), rewrites the faded
/// primary literal, strips residual `@name: value;` declarations and drops the
/// `\9` hack.
pub fn reverse_substitute(css: &str, escaped: &EscapedCalls, compiled: &CompiledColorMap) -> String {
    let mut css = css.to_string();

    for (sentinel, call) in escaped.iter() {
        css = replace_bounded(&css, sentinel, call, is_hex_continuation);
    }

    for (name, literal) in compiled.iter() {
        let symbol = if is_shade_name(name) {
            match shade_expression(name) {
                Some(expression) => expression,
                None => continue,
            }
        } else {
            name.to_string()
        };
        css = replace_bounded(&css, literal, &symbol, is_hex_continuation);
    }

    css = css.replace(FADED_PRIMARY_LITERAL, FADED_PRIMARY_EXPRESSION);
    css = RESIDUAL_DECLARATION.replace_all(&css, "").into_owned();
    css.replace(IE_HACK, "")
}

/// Appends the default theme source and prepends one canonical declaration
/// per selected variable, so each is declared exactly once ahead of its uses.
pub fn reassemble(
    css: &str,
    default_theme: &str,
    selected: &[String],
    symbols: &SymbolTable,
) -> Result<String> {
    let mut out = format!("{}\n{}", css.trim(), default_theme);

    for variable in selected.iter().rev() {
        let pattern = format!(r"{}( *):(.*);", regex::escape(variable));
        let residual = Regex::new(&pattern)
            .map_err(|source| ThemeError::InvalidPattern { pattern, source })?;
        out = residual.replace_all(&out, "").into_owned();

        let value = symbols.get(variable).unwrap_or_default();
        out = format!("{}: {};\n{}\n", variable, value, out);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_map::ColorMap;
    use crate::vars::VariableTable;

    fn compiled(pairs: &[(&str, &str)]) -> CompiledColorMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_after_colon_only() {
        let map = compiled(&[("@primary-color", "#123456")]);
        let source = ".a { color: @primary-color; }\n@primary-color-hover: x;\n.b:hover { border: 1px solid @primary-color; }\n";
        let out = substitute_after_colon(source, &map);
        assert_eq!(
            out,
            ".a { color: #123456; }\n@primary-color-hover: x;\n.b:hover { border: 1px solid #123456; }\n"
        );
    }

    #[test]
    fn test_substitute_leaves_lines_without_colon() {
        let map = compiled(&[("@primary-color", "#123456")]);
        let source = "@import \"@primary-color\";\n";
        assert_eq!(substitute_after_colon(source, &map), source);
    }

    #[test]
    fn test_reverse_substitute_restores_variables_and_shades() {
        let map = compiled(&[("@primary-color", "#123456"), ("@primary-5", "#3a5a7a")]);
        let css = ".a {\n  color: #123456;\n  border-color: #3a5a7a;\n}\n";
        let out = reverse_substitute(css, &EscapedCalls::default(), &map);
        assert_eq!(
            out,
            ".a {\n  color: @primary-color;\n  border-color: color(~`colorPalette(\"@{primary-color}\", 5)`);\n}\n"
        );
    }

    #[test]
    fn test_reverse_substitute_special_cases() {
        let css = ".a {\n  background: rgba(18, 52, 86, 0.2);\n  color: red\\9;\n}\n@foo: bar;\n";
        let out = reverse_substitute(css, &EscapedCalls::default(), &CompiledColorMap::default());
        assert_eq!(out, ".a {\n  background: fade(@primary-color, 20%);\n  color: red;\n}\n\n");
    }

    #[test]
    fn test_literal_inside_longer_hex_is_kept() {
        let map = compiled(&[("@primary-color", "#123456")]);
        let out = reverse_substitute("a: #12345678;", &EscapedCalls::default(), &map);
        assert_eq!(out, "a: #12345678;");
    }

    #[test]
    fn test_reassemble_declares_each_variable_once() {
        let symbols = SymbolTable::merge(
            &ColorMap::default(),
            &VariableTable::parse("@primary-color: #1890ff;\n@link-color: @primary-color;"),
        );
        let selected = vec!["@primary-color".to_string(), "@link-color".to_string()];
        let out = reassemble(
            ".btn {\n  color: @primary-color;\n}\n",
            "@primary-color: #1890ff;\n@link-color: @primary-color;\n@text-color: #000;",
            &selected,
            &symbols,
        )
        .unwrap();

        assert!(out.starts_with("@primary-color: #1890ff;\n@link-color: @primary-color;\n"));
        assert_eq!(out.matches("@primary-color: #1890ff;").count(), 1);
        assert_eq!(out.matches("@link-color:").count(), 1);
        assert!(out.contains("@text-color: #000;"));
        assert!(out.contains(".btn {\n  color: @primary-color;\n}"));
    }
}
