// ABOUTME: Causal graph keyed by an ordered variable list with a dense boolean relation.
// ABOUTME: Shared by extractor output and simulator ground truth.

use crate::{Result, ScmError};
use ndarray::Array2;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

/// Target variable -> names of the variables its assignment reads.
pub type DependencyMap = BTreeMap<String, BTreeSet<String>>;

/// Build a [`DependencyMap`] from borrowed name lists.
pub fn dependency_map<'a, I, P>(entries: I) -> DependencyMap
where
    I: IntoIterator<Item = (&'a str, P)>,
    P: IntoIterator<Item = &'a str>,
{
    let mut map = DependencyMap::new();
    for (target, parents) in entries {
        map.entry(target.to_string())
            .or_default()
            .extend(parents.into_iter().map(String::from));
    }
    map
}

/// A directed causal graph over named variables.
///
/// `relation[[i, j]] == true` means the variable at index `i` is a direct cause of the
/// variable at index `j`. The relation is always `n x n` for `n` variables; every
/// constructor checks this before a value exists. Self-loops and cycles are allowed.
#[derive(Debug, Clone)]
pub struct CausalGraph {
    variables: Vec<String>,
    relation: Array2<bool>,
    metadata: BTreeMap<String, Value>,
}

impl CausalGraph {
    /// Fails on a relation that is not `n x n` or on a repeated variable name.
    pub fn new(variables: Vec<String>, relation: Array2<bool>) -> Result<Self> {
        reject_duplicates(&variables)?;
        let n = variables.len();
        if relation.dim() != (n, n) {
            return Err(ScmError::Shape {
                expected: (n, n),
                actual: relation.dim(),
            });
        }
        Ok(Self {
            variables,
            relation,
            metadata: BTreeMap::new(),
        })
    }

    /// Graph with the given variables and no edges. Repeated names keep their first position.
    pub fn empty(variables: Vec<String>) -> Self {
        let variables = dedup_keep_first(variables);
        let n = variables.len();
        Self {
            variables,
            relation: Array2::from_elem((n, n), false),
            metadata: BTreeMap::new(),
        }
    }

    /// Build a graph from a dependency mapping.
    ///
    /// Without an explicit ordering the variable set is every key and parent in the
    /// mapping, sorted lexicographically, so graphs over the same names always agree on
    /// indices. With an ordering, names missing from it are dropped silently and repeated
    /// names keep their first position.
    pub fn from_dependencies(dependencies: &DependencyMap, variables: Option<Vec<String>>) -> Self {
        let variables = variables.map(dedup_keep_first).unwrap_or_else(|| {
            let mut all: BTreeSet<&str> = BTreeSet::new();
            for (target, parents) in dependencies {
                all.insert(target.as_str());
                all.extend(parents.iter().map(String::as_str));
            }
            all.into_iter().map(String::from).collect()
        });

        let n = variables.len();
        let index: HashMap<&str, usize> = variables
            .iter()
            .enumerate()
            .map(|(i, v)| (v.as_str(), i))
            .collect();

        let mut relation = Array2::from_elem((n, n), false);
        for (target, parents) in dependencies {
            let Some(&j) = index.get(target.as_str()) else {
                continue;
            };
            for parent in parents {
                if let Some(&i) = index.get(parent.as_str()) {
                    relation[[i, j]] = true;
                }
            }
        }

        Self {
            variables,
            relation,
            metadata: BTreeMap::new(),
        }
    }

    /// Build a graph from `(parent, child)` name pairs over a fixed variable list.
    pub fn from_edges<I, A, B>(variables: Vec<String>, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        reject_duplicates(&variables)?;
        let mut graph = Self::empty(variables);
        for (parent, child) in edges {
            let (parent, child) = (parent.as_ref(), child.as_ref());
            let i = graph
                .index_of(parent)
                .ok_or_else(|| ScmError::Graph(format!("edge source '{parent}' is not a declared variable")))?;
            let j = graph
                .index_of(child)
                .ok_or_else(|| ScmError::Graph(format!("edge target '{child}' is not a declared variable")))?;
            graph.relation[[i, j]] = true;
        }
        Ok(graph)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn relation(&self) -> &Array2<bool> {
        &self.relation
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }

    pub fn has_edge(&self, parent: &str, child: &str) -> bool {
        match (self.index_of(parent), self.index_of(child)) {
            (Some(i), Some(j)) => self.relation[[i, j]],
            _ => false,
        }
    }

    /// Edges as `(parent, child)` in row-major order of the relation.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.relation
            .indexed_iter()
            .filter(|(_, present)| **present)
            .map(|((i, j), _)| (self.variables[i].as_str(), self.variables[j].as_str()))
    }

    pub fn edges(&self) -> Vec<(String, String)> {
        self.edge_pairs()
            .map(|(parent, child)| (parent.to_string(), child.to_string()))
            .collect()
    }

    pub fn num_edges(&self) -> usize {
        self.relation.iter().filter(|present| **present).count()
    }

    /// Direct causes of `name`, in variable order. Unknown names have no parents.
    pub fn parents_of(&self, name: &str) -> Vec<&str> {
        let Some(j) = self.index_of(name) else {
            return Vec::new();
        };
        self.relation
            .column(j)
            .iter()
            .enumerate()
            .filter(|(_, present)| **present)
            .map(|(i, _)| self.variables[i].as_str())
            .collect()
    }

    /// Inverse of [`CausalGraph::from_dependencies`]: every variable with at least one
    /// parent maps to its parents in variable order.
    pub fn to_dependencies(&self) -> BTreeMap<String, Vec<String>> {
        self.variables
            .iter()
            .filter_map(|child| {
                let parents: Vec<String> = self.parents_of(child).into_iter().map(String::from).collect();
                (!parents.is_empty()).then(|| (child.clone(), parents))
            })
            .collect()
    }
}

fn reject_duplicates(variables: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(variables.len());
    match variables.iter().find(|v| !seen.insert(v.as_str())) {
        Some(name) => Err(ScmError::Graph(format!("duplicate variable '{name}'"))),
        None => Ok(()),
    }
}

fn dedup_keep_first(variables: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(variables.len());
    variables
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Equal when the variable sequences match in order and the relations match elementwise.
/// Metadata is not compared.
impl PartialEq for CausalGraph {
    fn eq(&self, other: &Self) -> bool {
        self.variables == other.variables && self.relation == other.relation
    }
}

impl Eq for CausalGraph {}

impl fmt::Display for CausalGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CausalGraph(variables={:?}, edges={})",
            self.variables,
            self.num_edges()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn chain() -> CausalGraph {
        CausalGraph::new(
            names(&["A", "B", "C"]),
            array![[false, true, false], [false, false, true], [false, false, false]],
        )
        .unwrap()
    }

    #[test]
    fn rejects_relation_with_wrong_shape() {
        let err = CausalGraph::new(names(&["A", "B"]), Array2::from_elem((3, 3), false)).unwrap_err();
        match err {
            ScmError::Shape { expected, actual } => {
                assert_eq!(expected, (2, 2));
                assert_eq!(actual, (3, 3));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(CausalGraph::new(names(&["A", "B"]), Array2::from_elem((2, 3), false)).is_err());
    }

    #[test]
    fn empty_variable_list_is_valid() {
        let graph = CausalGraph::new(Vec::new(), Array2::from_elem((0, 0), false)).unwrap();
        assert_eq!(graph.num_edges(), 0);
        assert!(graph.to_dependencies().is_empty());
    }

    #[test]
    fn edges_are_listed_row_major() {
        let graph = CausalGraph::new(
            names(&["A", "B", "C"]),
            array![[false, true, true], [false, false, false], [true, true, false]],
        )
        .unwrap();
        assert_eq!(
            graph.edges(),
            vec![
                ("A".to_string(), "B".to_string()),
                ("A".to_string(), "C".to_string()),
                ("C".to_string(), "A".to_string()),
                ("C".to_string(), "B".to_string()),
            ]
        );
        assert_eq!(graph.num_edges(), 4);
    }

    #[test]
    fn inferred_ordering_is_sorted_union_of_names() {
        let deps = dependency_map([("y", vec!["x", "c"]), ("x", vec!["b", "a"])]);
        let graph = CausalGraph::from_dependencies(&deps, None);
        assert_eq!(graph.variables(), &names(&["a", "b", "c", "x", "y"])[..]);
        assert!(graph.has_edge("a", "x"));
        assert!(graph.has_edge("x", "y"));
        assert!(!graph.has_edge("y", "x"));
    }

    #[test]
    fn explicit_ordering_keeps_isolated_nodes_and_drops_unknown_names() {
        let deps = dependency_map([("x", vec!["a", "noise"])]);
        let graph = CausalGraph::from_dependencies(&deps, Some(names(&["x", "a", "lonely"])));
        assert_eq!(graph.variables(), &names(&["x", "a", "lonely"])[..]);
        assert_eq!(graph.edges(), vec![("a".to_string(), "x".to_string())]);
    }

    #[test]
    fn dependencies_round_trip() {
        let deps = dependency_map([
            ("S_to_I", vec!["rateSI", "Susceptible", "Infected"]),
            ("Susceptible", vec!["Susceptible", "S_to_I"]),
        ]);
        let graph = CausalGraph::from_dependencies(&deps, None);
        let back = graph.to_dependencies();

        assert_eq!(back.len(), deps.len());
        for (target, parents) in &deps {
            let got: BTreeSet<String> = back[target].iter().cloned().collect();
            assert_eq!(&got, parents);
        }
    }

    #[test]
    fn self_loops_are_structurally_permitted() {
        let deps = dependency_map([("x", vec!["x"])]);
        let graph = CausalGraph::from_dependencies(&deps, None);
        assert!(graph.has_edge("x", "x"));
        assert_eq!(graph.parents_of("x"), vec!["x"]);
    }

    #[test]
    fn equality_depends_on_variable_order() {
        let deps = dependency_map([("B", vec!["A"])]);
        let sorted = CausalGraph::from_dependencies(&deps, None);
        let reversed = CausalGraph::from_dependencies(&deps, Some(names(&["B", "A"])));

        assert_eq!(sorted.edges(), reversed.edges());
        assert_ne!(sorted, reversed);
        assert_eq!(sorted, CausalGraph::from_dependencies(&deps, None).with_metadata("k", "v"));
    }

    #[test]
    fn from_edges_rejects_undeclared_names() {
        let graph = CausalGraph::from_edges(names(&["A", "B"]), [("A", "B")]).unwrap();
        assert_eq!(graph, CausalGraph::from_dependencies(&dependency_map([("B", vec!["A"])]), None));

        let err = CausalGraph::from_edges(names(&["A"]), [("A", "Z")]).unwrap_err();
        assert!(matches!(err, ScmError::Graph(_)));
    }

    #[test]
    fn repeated_names_in_explicit_ordering_keep_first_position() {
        let deps = dependency_map([("x", vec!["a"])]);
        let graph = CausalGraph::from_dependencies(&deps, Some(names(&["a", "x", "a"])));

        assert_eq!(graph.variables(), &names(&["a", "x"])[..]);
        assert_eq!(graph.edges(), vec![("a".to_string(), "x".to_string())]);
        assert!(graph.has_edge("a", "x"));
        assert_eq!(graph.parents_of("x"), vec!["a"]);
        assert_eq!(CausalGraph::empty(names(&["b", "b"])).num_variables(), 1);
    }

    #[test]
    fn checked_constructors_reject_repeated_names() {
        let err = CausalGraph::new(names(&["A", "A"]), Array2::from_elem((2, 2), false)).unwrap_err();
        assert!(matches!(err, ScmError::Graph(ref msg) if msg.contains("'A'")));

        let err = CausalGraph::from_edges(names(&["A", "B", "A"]), [("A", "B")]).unwrap_err();
        assert!(matches!(err, ScmError::Graph(_)));
    }

    #[test]
    fn display_summarises_variables_and_edge_count() {
        assert_eq!(
            chain().to_string(),
            r#"CausalGraph(variables=["A", "B", "C"], edges=2)"#
        );
    }

    #[test]
    fn parents_of_unknown_variable_is_empty() {
        assert!(chain().parents_of("Z").is_empty());
        assert_eq!(chain().parents_of("C"), vec!["B"]);
    }
}
