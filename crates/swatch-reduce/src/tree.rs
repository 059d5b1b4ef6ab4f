//! A flat rule tree for compiled CSS.
//!
//! The tree keeps just enough structure for the reducer to work on: top-level
//! qualified rules with their declarations, and at-rules kept as raw text.
//! Selector and value text is sliced straight from the source, so whatever the
//! compiler emitted (hacks, `!important`, vendor syntax) survives a round trip
//! untouched.
//!
//! Parsing is built on `cssparser`. Its tokenizer drops comments between rules
//! and declarations, so a parsed tree never contains any. Comments that sit
//! inside a declaration value are stripped when the value is captured.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
};

use crate::error::ReduceError;

/// A parsed stylesheet: the ordered list of its top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

/// A top-level item of a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
}

/// A qualified rule such as `.btn:hover { color: red; }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Raw selector text, trimmed.
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

/// A single `property: value` pair inside a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    /// Raw value text, trimmed, including any `!important`.
    pub value: String,
}

/// An at-rule such as `@media ... { ... }` or `@charset "UTF-8";`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Name without the leading `@`.
    pub name: String,
    pub prelude: String,
    /// Raw block contents, or `None` for statement at-rules.
    pub block: Option<String>,
}

/// Result of a walker callback: keep the visited node or drop it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Keep,
    Remove,
}

impl Declaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

impl Rule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            declarations: Vec::new(),
        }
    }

    pub fn with_declaration(mut self, property: &str, value: &str) -> Self {
        self.declarations.push(Declaration::new(property, value));
        self
    }

    /// Visits every declaration, removing those the callback rejects.
    pub fn walk_decls<F>(&mut self, mut f: F)
    where
        F: FnMut(&Declaration) -> Walk,
    {
        self.declarations.retain(|decl| f(decl) == Walk::Keep);
    }

    fn write_css(&self, out: &mut String) {
        out.push_str(&self.selector);
        out.push_str(" {\n");
        for decl in &self.declarations {
            out.push_str("  ");
            out.push_str(&decl.property);
            out.push_str(": ");
            out.push_str(&decl.value);
            out.push_str(";\n");
        }
        out.push_str("}\n");
    }
}

impl AtRule {
    fn write_css(&self, out: &mut String) {
        out.push('@');
        out.push_str(&self.name);
        if !self.prelude.is_empty() {
            out.push(' ');
            out.push_str(&self.prelude);
        }
        match &self.block {
            Some(block) => {
                out.push_str(" {\n");
                out.push_str(block);
                out.push_str("\n}\n");
            }
            None => out.push_str(";\n"),
        }
    }
}

impl Stylesheet {
    /// Parses compiled CSS into a rule tree.
    ///
    /// Invalid declarations are skipped. An invalid top-level item (text that
    /// is neither a rule nor an at-rule) fails the whole parse.
    pub fn parse(css: &str) -> Result<Self, ReduceError> {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut builder = TreeBuilder;

        let mut nodes = Vec::new();
        for result in cssparser::StyleSheetParser::new(&mut parser, &mut builder) {
            match result {
                Ok(node) => nodes.push(node),
                Err((error, slice)) => {
                    return Err(ReduceError::Parse {
                        line: error.location.line + 1,
                        column: error.location.column,
                        snippet: slice.trim().chars().take(80).collect(),
                    });
                }
            }
        }

        Ok(Self { nodes })
    }

    /// Visits every top-level rule, removing those the callback rejects.
    pub fn walk_rules<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Rule) -> Walk,
    {
        self.nodes.retain_mut(|node| match node {
            Node::Rule(rule) => f(rule) == Walk::Keep,
            Node::AtRule(_) => true,
        });
    }

    /// Visits every top-level at-rule, removing those the callback rejects.
    pub fn walk_at_rules<F>(&mut self, mut f: F)
    where
        F: FnMut(&AtRule) -> Walk,
    {
        self.nodes.retain(|node| match node {
            Node::AtRule(at_rule) => f(at_rule) == Walk::Keep,
            Node::Rule(_) => true,
        });
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Rule(rule) => Some(rule),
            Node::AtRule(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialises the tree back to CSS, one block per rule.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Rule(rule) => rule.write_css(&mut out),
                Node::AtRule(at_rule) => at_rule.write_css(&mut out),
            }
        }
        out
    }
}

/// Consumes the rest of a delimited parser and returns the raw text it covered.
fn consume_raw<'i>(input: &mut Parser<'i, '_>) -> String {
    let start = input.position();
    while input.next().is_ok() {}
    strip_comments(input.slice_from(start)).trim().to_string()
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("/*") {
        out.push_str(&rest[..open]);
        match rest[open + 2..].find("*/") {
            Some(close) => rest = &rest[open + 2 + close + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

struct TreeBuilder;

impl<'i> QualifiedRuleParser<'i> for TreeBuilder {
    type Prelude = String;
    type QualifiedRule = Node;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let selector = consume_raw(input);
        if selector.is_empty() {
            return Err(input.new_custom_error::<(), ()>(()));
        }
        Ok(selector)
    }

    fn parse_block<'t>(
        &mut self,
        selector: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut collector = DeclarationCollector;
        let declarations = RuleBodyParser::new(input, &mut collector)
            .flatten()
            .collect();

        Ok(Node::Rule(Rule {
            selector,
            declarations,
        }))
    }
}

impl<'i> AtRuleParser<'i> for TreeBuilder {
    type Prelude = (String, String);
    type AtRule = Node;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Ok((name.as_ref().to_string(), consume_raw(input)))
    }

    fn rule_without_block(
        &mut self,
        (name, prelude): Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Ok(Node::AtRule(AtRule {
            name,
            prelude,
            block: None,
        }))
    }

    fn parse_block<'t>(
        &mut self,
        (name, prelude): Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        Ok(Node::AtRule(AtRule {
            name,
            prelude,
            block: Some(consume_raw(input)),
        }))
    }
}

struct DeclarationCollector;

impl<'i> DeclarationParser<'i> for DeclarationCollector {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        Ok(Declaration {
            property: name.as_ref().to_string(),
            value: consume_raw(input),
        })
    }
}

impl<'i> AtRuleParser<'i> for DeclarationCollector {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationCollector {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for DeclarationCollector {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule_with_declarations() {
        let sheet = Stylesheet::parse(".btn { color: #1890ff; padding: 4px 15px; }").unwrap();
        let rules: Vec<_> = sheet.rules().collect();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, ".btn");
        assert_eq!(
            rules[0].declarations,
            vec![
                Declaration::new("color", "#1890ff"),
                Declaration::new("padding", "4px 15px"),
            ]
        );
    }

    #[test]
    fn test_selector_text_is_preserved() {
        let sheet = Stylesheet::parse(".a,\n.b > .c:hover { color: red; }").unwrap();
        let rule = sheet.rules().next().unwrap();
        assert_eq!(rule.selector, ".a,\n.b > .c:hover");
    }

    #[test]
    fn test_important_and_functions_survive() {
        let sheet =
            Stylesheet::parse(".x { box-shadow: 0 0 0 2px rgba(24, 144, 255, 0.2) !important; }")
                .unwrap();
        let rule = sheet.rules().next().unwrap();
        assert_eq!(
            rule.declarations[0].value,
            "0 0 0 2px rgba(24, 144, 255, 0.2) !important"
        );
    }

    #[test]
    fn test_comments_are_dropped() {
        let css = "/* header */\n.a { /* lead */ color: red /* inline */; }\n/* tail */";
        let sheet = Stylesheet::parse(css).unwrap();
        assert_eq!(sheet.nodes.len(), 1);
        assert_eq!(sheet.to_css(), ".a {\n  color: red;\n}\n");
    }

    #[test]
    fn test_at_rules_are_captured() {
        let css = "@import \"x.css\";\n@media (max-width: 575px) { .a { color: red; } }";
        let sheet = Stylesheet::parse(css).unwrap();
        assert_eq!(sheet.nodes.len(), 2);
        match &sheet.nodes[0] {
            Node::AtRule(at_rule) => {
                assert_eq!(at_rule.name, "import");
                assert_eq!(at_rule.block, None);
            }
            other => panic!("Expected at-rule, got {:?}", other),
        }
        match &sheet.nodes[1] {
            Node::AtRule(at_rule) => {
                assert_eq!(at_rule.name, "media");
                assert_eq!(at_rule.prelude, "(max-width: 575px)");
                assert!(at_rule.block.as_deref().unwrap().contains(".a"));
            }
            other => panic!("Expected at-rule, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_declaration_is_skipped() {
        let sheet = Stylesheet::parse(".a { *zoom: 1; color: red; }").unwrap();
        let rule = sheet.rules().next().unwrap();
        assert_eq!(rule.declarations, vec![Declaration::new("color", "red")]);
    }

    #[test]
    fn test_walk_rules_removes_rejected() {
        let mut sheet = Stylesheet::parse(".a { color: red; } .b { color: blue; }").unwrap();
        sheet.walk_rules(|rule| {
            if rule.selector == ".a" {
                Walk::Remove
            } else {
                Walk::Keep
            }
        });
        assert_eq!(sheet.to_css(), ".b {\n  color: blue;\n}\n");
    }

    #[test]
    fn test_walk_at_rules_leaves_rules_alone() {
        let mut sheet = Stylesheet::parse("@font-face { font-family: x; } .a { color: red; }").unwrap();
        sheet.walk_at_rules(|_| Walk::Remove);
        assert_eq!(sheet.nodes.len(), 1);
        assert!(matches!(sheet.nodes[0], Node::Rule(_)));
    }

    #[test]
    fn test_round_trip_layout() {
        let mut sheet = Stylesheet::default();
        sheet.nodes.push(Node::Rule(
            Rule::new(".a").with_declaration("color", "red"),
        ));
        sheet.nodes.push(Node::AtRule(AtRule {
            name: "import".into(),
            prelude: "\"x.css\"".into(),
            block: None,
        }));
        assert_eq!(
            sheet.to_css(),
            ".a {\n  color: red;\n}\n@import \"x.css\";\n"
        );
    }
}
