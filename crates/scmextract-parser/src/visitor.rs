use crate::extractor_utils::{first_named_child_except, node_text};
use scmextract_core::{DependencyMap, VariableFilter};
use std::collections::BTreeSet;
use tracing::debug;
use tree_sitter::Node;

/// Name of the mutating method treated as an implicit assignment to its owner.
pub const APPEND_METHOD: &str = "append";

/// Single-pass walk over a Python syntax tree that records, for each assigned variable,
/// the set of variables its right-hand side reads.
///
/// Recognised shapes:
/// - `target = expr` and `obj.target = expr` (only the trailing attribute names the target)
/// - `owner.append(expr)`, an implicit assignment to `owner`
///
/// Annotated assignments (`target: T = expr`) are not recorded.
/// Everything else is traversed for nested statements but records nothing.
pub struct DependencyVisitor<'a> {
    source: &'a str,
    filter: &'a VariableFilter,
    dependencies: DependencyMap,
}

impl<'a> DependencyVisitor<'a> {
    pub fn new(source: &'a str, filter: &'a VariableFilter) -> Self {
        Self {
            source,
            filter,
            dependencies: DependencyMap::new(),
        }
    }

    pub fn into_dependencies(self) -> DependencyMap {
        self.dependencies
    }

    pub fn visit(&mut self, node: Node) {
        match node.kind() {
            "assignment" => {
                self.visit_assignment(node);
                return;
            }
            "call" => self.visit_call(node),
            _ => {}
        }
        self.visit_children(node);
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child);
        }
    }

    fn visit_assignment(&mut self, node: Node) {
        // `a = b = expr` nests assignments on the right; only the first target is recorded.
        let mut value = node.child_by_field_name("right");
        while let Some(inner) = value.filter(|v| v.kind() == "assignment") {
            value = inner.child_by_field_name("right");
        }

        let annotated = node.child_by_field_name("type").is_some();
        let target = node
            .child_by_field_name("left")
            .filter(|_| !annotated)
            .and_then(|left| self.target_name(left));
        if let (Some(target), Some(value)) = (target, value) {
            if self.filter.admits(target) {
                let deps = self.referenced_names(value);
                self.add_dependency(target, deps);
            }
        }

        self.visit_assignment_chain(node);
    }

    fn visit_assignment_chain(&mut self, node: Node) {
        let right = node.child_by_field_name("right");
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if Some(child) == right && child.kind() == "assignment" {
                self.visit_assignment_chain(child);
            } else {
                self.visit(child);
            }
        }
    }

    fn visit_call(&mut self, node: Node) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        if function.kind() != "attribute" {
            return;
        }
        let (Some(owner), Some(method)) = (
            function.child_by_field_name("object"),
            function.child_by_field_name("attribute"),
        ) else {
            return;
        };
        if owner.kind() != "identifier" || node_text(&method, self.source) != APPEND_METHOD {
            return;
        }

        let owner = node_text(&owner, self.source);
        if !self.filter.admits(owner) {
            return;
        }
        if let Some(argument) = node
            .child_by_field_name("arguments")
            .and_then(|args| first_positional_argument(&args))
        {
            let deps = self.referenced_names(argument);
            self.add_dependency(owner, deps);
        }
    }

    fn target_name(&self, target: Node) -> Option<&'a str> {
        match target.kind() {
            "identifier" => Some(node_text(&target, self.source)),
            "attribute" => target
                .child_by_field_name("attribute")
                .map(|attr| node_text(&attr, self.source)),
            _ => None,
        }
    }

    /// Every identifier read anywhere under `expr`, attribute names included, restricted
    /// to the filter.
    fn referenced_names(&self, expr: Node) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_names(expr, &mut names);
        names
    }

    fn collect_names(&self, node: Node, names: &mut BTreeSet<String>) {
        if node.kind() == "identifier" {
            let name = node_text(&node, self.source);
            if self.filter.admits(name) {
                names.insert(name.to_string());
            }
            return;
        }

        // Keyword names and lambda parameters bind rather than read.
        let binding = match node.kind() {
            "keyword_argument" | "default_parameter" => node.child_by_field_name("name"),
            _ => None,
        };
        let in_lambda_parameters = node.kind() == "lambda_parameters";

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if Some(child) == binding || (in_lambda_parameters && is_lambda_binding(&child)) {
                continue;
            }
            self.collect_names(child, names);
        }
    }

    fn add_dependency(&mut self, target: &str, mut deps: BTreeSet<String>) {
        deps.remove(target);
        if deps.is_empty() {
            return;
        }
        debug!(variable = target, parents = ?deps, "recorded dependencies");
        self.dependencies
            .entry(target.to_string())
            .or_default()
            .extend(deps);
    }
}

/// `x`, `*args` and `**kw` in a lambda's parameter list.
fn is_lambda_binding(parameter: &Node) -> bool {
    matches!(
        parameter.kind(),
        "identifier" | "list_splat_pattern" | "dictionary_splat_pattern"
    )
}

/// The first positional argument of a call, or the bare generator of `f(x for x in xs)`.
fn first_positional_argument<'t>(arguments: &Node<'t>) -> Option<Node<'t>> {
    if arguments.kind() == "generator_expression" {
        return Some(*arguments);
    }
    first_named_child_except(arguments, &["keyword_argument", "dictionary_splat", "comment"])
}
