//! Color-only structural reduction of compiled CSS.
//!
//! This crate parses compiled stylesheets into a flat rule tree and strips
//! everything that does not carry color, so a theme can be re-emitted from
//! what remains.
//!
//! # Example
//!
//! ```rust
//! use swatch_reduce::reduce_to_colors;
//!
//! let css = ".body { font-family: 'Lato'; background: #ccc; padding: 0; }";
//! let reduced = reduce_to_colors(css).unwrap();
//! assert_eq!(reduced, ".body {\n  background: #ccc;\n}\n");
//! ```
//!
//! Custom passes implement [`Plugin`] and run through [`process`]:
//!
//! ```rust
//! use swatch_reduce::{process, Plugin, Stylesheet, Walk};
//!
//! struct DropHover;
//!
//! impl Plugin for DropHover {
//!     fn name(&self) -> &str {
//!         "drop-hover"
//!     }
//!
//!     fn once(&mut self, root: &mut Stylesheet) {
//!         root.walk_rules(|rule| {
//!             if rule.selector.contains(":hover") {
//!                 Walk::Remove
//!             } else {
//!                 Walk::Keep
//!             }
//!         });
//!     }
//! }
//!
//! let out = process(".a:hover { color: red; } .a { color: blue; }", &mut [&mut DropHover]).unwrap();
//! assert_eq!(out, ".a {\n  color: blue;\n}\n");
//! ```

mod error;
mod plugin;
mod reducer;
mod tree;

pub use error::{ReduceError, Result};
pub use plugin::{process, Plugin};
pub use reducer::{
    is_color_declaration, reduce_to_colors, ColorReducer, COLOR_PROPERTIES,
    PALETTE_SELECTOR_PREFIX,
};
pub use tree::{AtRule, Declaration, Node, Rule, Stylesheet, Walk};
