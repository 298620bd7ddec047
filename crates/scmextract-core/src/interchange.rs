// ABOUTME: Persisted graph shapes: the JSON interchange document and DOT text.
// ABOUTME: Saves and loads CausalGraph values at the boundary of the system.

use crate::{CausalGraph, Result, ScmError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// JSON interchange form of a [`CausalGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub variables: Vec<String>,
    /// `[parent, child]` pairs in row-major order of the relation
    pub edges: Vec<[String; 2]>,
    pub dependencies: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl From<&CausalGraph> for GraphDocument {
    fn from(graph: &CausalGraph) -> Self {
        Self {
            variables: graph.variables().to_vec(),
            edges: graph
                .edges()
                .into_iter()
                .map(|(parent, child)| [parent, child])
                .collect(),
            dependencies: graph.to_dependencies(),
            metadata: graph.metadata().clone(),
        }
    }
}

impl TryFrom<GraphDocument> for CausalGraph {
    type Error = ScmError;

    /// Rebuilds the relation from `edges`; `dependencies` is a derived view and is ignored.
    fn try_from(document: GraphDocument) -> Result<Self> {
        let edges = document.edges.iter().map(|[parent, child]| (parent, child));
        let graph = CausalGraph::from_edges(document.variables.clone(), edges)?;
        Ok(document
            .metadata
            .into_iter()
            .fold(graph, |graph, (key, value)| graph.with_metadata(key, value)))
    }
}

pub fn to_document(graph: &CausalGraph) -> GraphDocument {
    GraphDocument::from(graph)
}

/// Render a graph as Graphviz DOT, one `"parent" -> "child";` statement per edge.
pub fn to_dot(graph: &CausalGraph, title: &str) -> String {
    let mut lines = vec![
        format!("digraph \"{}\" {{", escape(title)),
        "    rankdir=BT;".to_string(),
        "    node [shape=box];".to_string(),
    ];
    for (parent, child) in graph.edge_pairs() {
        lines.push(format!("    \"{}\" -> \"{}\";", escape(parent), escape(child)));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Json,
    Dot,
}

impl GraphFormat {
    /// `.dot` and `.gv` select DOT; every other extension falls back to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("dot") | Some("gv") => Self::Dot,
            _ => Self::Json,
        }
    }
}

/// Write `graph` to `path`, creating parent directories as needed.
pub fn save_graph(graph: &CausalGraph, path: &Path, format: GraphFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = match format {
        GraphFormat::Json => serde_json::to_string_pretty(&to_document(graph))?,
        GraphFormat::Dot => to_dot(graph, "Causal Graph"),
    };
    std::fs::write(path, content)?;
    info!(path = %path.display(), ?format, edges = graph.num_edges(), "saved graph");
    Ok(())
}

/// Read a graph from its JSON interchange document.
pub fn load_graph(path: &Path) -> Result<CausalGraph> {
    let text = std::fs::read_to_string(path)?;
    let document: GraphDocument = serde_json::from_str(&text)?;
    CausalGraph::try_from(document)
}
