// ABOUTME: Turns Python source text into a tree-sitter syntax tree.
// ABOUTME: ERROR or MISSING nodes, stray module indentation and Python 2 statements fail the parse.

use crate::extractor_utils::{position_of, snippet};
use scmextract_core::ParseError;
use tree_sitter::{Node, Parser, Tree};

/// Python 2 statement forms the grammar still accepts without an ERROR node.
const LEGACY_STATEMENTS: &[(&str, &str)] = &[
    ("print_statement", "Missing parentheses in call to 'print'"),
    ("exec_statement", "Missing parentheses in call to 'exec'"),
];

pub struct SourceParser {
    language: tree_sitter::Language,
}

impl Default for SourceParser {
    fn default() -> Self {
        Self::python()
    }
}

impl SourceParser {
    pub fn python() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    pub fn parse<'s>(&self, source: &'s str) -> Result<ParsedSource<'s>, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ParseError::new(1, 1, format!("grammar unavailable: {e}")))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::new(1, 1, "parser produced no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(first_syntax_error(root, source)
                .unwrap_or_else(|| ParseError::new(1, 1, "invalid syntax")));
        }
        if let Some(err) = unexpected_indent(root).or_else(|| first_legacy_statement(root)) {
            return Err(err);
        }

        Ok(ParsedSource { tree, source })
    }
}

/// A syntactically valid tree together with the text it was parsed from.
pub struct ParsedSource<'s> {
    tree: Tree,
    source: &'s str,
}

impl<'s> ParsedSource<'s> {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &'s str {
        self.source
    }
}

/// Pre-order search for the first ERROR or MISSING node, descending only into subtrees
/// that contain one.
fn first_syntax_error(node: Node, source: &str) -> Option<ParseError> {
    if node.is_missing() {
        let (line, column) = position_of(&node);
        return Some(ParseError::new(line, column, format!("missing `{}`", node.kind())));
    }
    if node.is_error() {
        let (line, column) = position_of(&node);
        let text = snippet(&node, source, 24);
        let message = if text.is_empty() {
            "unexpected end of input".to_string()
        } else {
            format!("unexpected `{text}`")
        };
        return Some(ParseError::new(line, column, message));
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).filter(|c| c.has_error()).collect();
    children
        .into_iter()
        .find_map(|child| first_syntax_error(child, source))
}

/// Module-level code must start at column 0; comments may be indented.
fn unexpected_indent(root: Node) -> Option<ParseError> {
    let mut cursor = root.walk();
    let first = root
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;
    let (line, column) = position_of(&first);
    (column != 1).then(|| ParseError::new(line, column, "unexpected indent"))
}

fn first_legacy_statement(node: Node) -> Option<ParseError> {
    if let Some((_, message)) = LEGACY_STATEMENTS.iter().find(|(kind, _)| *kind == node.kind()) {
        let (line, column) = position_of(&node);
        return Some(ParseError::new(line, column, *message));
    }

    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    children.into_iter().find_map(first_legacy_statement)
}
