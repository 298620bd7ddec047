// ABOUTME: Shared helpers for walking tree-sitter syntax trees
// ABOUTME: Text access, positions and child lookup used by the parser and visitor

use tree_sitter::Node;

/// Extract text from a tree-sitter Node
#[inline]
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// 1-based `(line, column)` of the start of a node
#[inline]
pub fn position_of(node: &Node) -> (usize, usize) {
    let point = node.start_position();
    (point.row + 1, point.column + 1)
}

/// First named child that is not one of `excluded` kinds
pub fn first_named_child_except<'t>(node: &Node<'t>, excluded: &[&str]) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| !excluded.contains(&child.kind()));
    found
}

/// Short single-line preview of a node's text for diagnostics
pub fn snippet(node: &Node, source: &str, max_chars: usize) -> String {
    let text = node_text(node, source);
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() > max_chars {
        let head: String = line.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        line.to_string()
    }
}
