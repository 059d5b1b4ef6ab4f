//! Line-oriented CSS minification.
//!
//! These are plain text rewrites, not a parser. A string or `url()` that
//! happens to contain `//` or one of the collapsed sequences is rewritten too.

use once_cell::sync::Lazy;
use regex::Regex;

static COMMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*[\s\S]*?\*/|//.*").expect("valid comment regex"));
static BLOCK_COMMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*[\s\S]*?\*/").expect("valid block comment regex"));
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*$(\r\n?|\n)").expect("valid blank line regex"));
static OPEN_BRACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\r\n?|\n)\s+").expect("valid open brace regex"));
static CLOSE_BRACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r";(\r\n?|\n)\}").expect("valid close brace regex"));
static NEXT_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r";(\r\n?|\n)\s+").expect("valid declaration regex"));
static SELECTOR_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\r\n?|\n)[.]").expect("valid selector list regex"));

/// Compacts compiled CSS.
pub fn minify(css: &str) -> String {
    let css = COMMENTS.replace_all(css, "");
    let css = BLANK_LINES.replace_all(&css, "");
    let css = OPEN_BRACE.replace_all(&css, "{");
    let css = CLOSE_BRACE.replace_all(&css, ";}");
    let css = NEXT_DECLARATION.replace_all(&css, ";");
    SELECTOR_LIST.replace_all(&css, ", .").into_owned()
}

/// Removes `/* ... */` comments, leaving everything else untouched.
pub fn strip_block_comments(css: &str) -> String {
    BLOCK_COMMENTS.replace_all(css, "").into_owned()
}
