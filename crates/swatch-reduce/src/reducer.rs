//! Color-only reduction.
//!
//! Input:
//!
//! ```css
//! .body {
//!   font-family: 'Lato';
//!   background: #cccccc;
//!   color: #000;
//!   padding: 0;
//! }
//! ```
//!
//! Output:
//!
//! ```css
//! .body {
//!   background: #cccccc;
//!   color: #000;
//! }
//! ```

use crate::error::Result;
use crate::plugin::{process, Plugin};
use crate::tree::{Declaration, Rule, Stylesheet, Walk};

/// Property-name fragments that mark a declaration as color-bearing.
pub const COLOR_PROPERTIES: &[&str] = &["color", "background", "border", "box-shadow"];

/// Selector prefix of the library's internal palette preview rules.
pub const PALETTE_SELECTOR_PREFIX: &str = ".main-color .palatte-";

/// Plugin that strips everything unrelated to color.
///
/// - every at-rule is removed (comments never reach the tree);
/// - declarations whose value references `url(...)` are removed;
/// - declarations whose property is not color-bearing are removed;
/// - rules left without declarations, and palette preview rules, are removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorReducer;

impl ColorReducer {
    pub fn new() -> Self {
        Self
    }

    fn clean_rule(rule: &mut Rule) -> Walk {
        if rule.selector.starts_with(PALETTE_SELECTOR_PREFIX) {
            return Walk::Remove;
        }

        rule.walk_decls(|decl| {
            if is_color_declaration(decl) {
                Walk::Keep
            } else {
                Walk::Remove
            }
        });

        if rule.declarations.is_empty() {
            Walk::Remove
        } else {
            Walk::Keep
        }
    }
}

impl Plugin for ColorReducer {
    fn name(&self) -> &str {
        "color-reducer"
    }

    fn once(&mut self, root: &mut Stylesheet) {
        root.walk_at_rules(|_| Walk::Remove);
        root.walk_rules(Self::clean_rule);
    }
}

/// True when a declaration survives the reducer.
pub fn is_color_declaration(decl: &Declaration) -> bool {
    if references_url(&decl.value) {
        return false;
    }
    COLOR_PROPERTIES
        .iter()
        .any(|fragment| decl.property.contains(fragment))
}

fn references_url(value: &str) -> bool {
    value
        .find("url(")
        .is_some_and(|start| value[start..].contains(')'))
}

/// Parses compiled CSS and returns only its color-bearing rules.
pub fn reduce_to_colors(css: &str) -> Result<String> {
    let mut reducer = ColorReducer::new();
    process(css, &mut [&mut reducer])
}
