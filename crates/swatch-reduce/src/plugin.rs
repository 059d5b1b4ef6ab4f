use crate::error::Result;
use crate::tree::Stylesheet;

/// A transformation applied to a parsed stylesheet.
///
/// Each plugin is handed the root exactly once and does its work through the
/// tree's walkers (`walk_rules`, `walk_at_rules`, `Rule::walk_decls`).
pub trait Plugin {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Called once with the stylesheet root.
    fn once(&mut self, root: &mut Stylesheet);
}

/// Parses `css`, runs every plugin over the tree in order, and serialises the result.
pub fn process(css: &str, plugins: &mut [&mut dyn Plugin]) -> Result<String> {
    let mut root = Stylesheet::parse(css)?;
    for plugin in plugins.iter_mut() {
        plugin.once(&mut root);
    }
    Ok(root.to_css())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Walk;

    struct DropSelector(&'static str);

    impl Plugin for DropSelector {
        fn name(&self) -> &str {
            "drop-selector"
        }

        fn once(&mut self, root: &mut Stylesheet) {
            let target = self.0;
            root.walk_rules(|rule| {
                if rule.selector == target {
                    Walk::Remove
                } else {
                    Walk::Keep
                }
            });
        }
    }

    #[test]
    fn test_plugins_run_in_order() {
        let mut first = DropSelector(".a");
        let mut second = DropSelector(".b");
        let out = process(
            ".a { color: red; } .b { color: blue; } .c { color: green; }",
            &mut [&mut first, &mut second],
        )
        .unwrap();
        assert_eq!(out, ".c {\n  color: green;\n}\n");
    }

    #[test]
    fn test_no_plugins_normalises_layout() {
        let out = process(".a{color:red}", &mut []).unwrap();
        assert_eq!(out, ".a {\n  color: red;\n}\n");
    }
}
