use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::model::{Graph, LinkRecord};

const SAMPLE_GRAPH: &str = include_str!("../../assets/sample_graph.json");

/// Parses either a bare `[{source, target, type}]` array or a
/// `{ "nodes": [...], "links": [...] }` object with an explicit node set.
pub fn parse_graph(raw: &str) -> Result<Graph> {
    let parsed: Value = serde_json::from_str(raw).context("invalid graph JSON")?;

    if parsed.is_array() {
        let records = Vec::<LinkRecord>::deserialize(parsed)
            .context("graph array must contain {source, target, type} records")?;
        return Graph::from_records(&records).context("inconsistent graph records");
    }

    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type for graph; expected an array or object"))?;

    let links = object
        .get("links")
        .ok_or_else(|| anyhow!("graph object is missing `links`"))?;
    let records = Vec::<LinkRecord>::deserialize(links).context("invalid `links` array")?;

    match object.get("nodes") {
        Some(nodes) => {
            let ids = Vec::<String>::deserialize(nodes).context("invalid `nodes` array")?;
            Graph::with_nodes(ids, &records).context("inconsistent graph nodes and links")
        }
        None => Graph::from_records(&records).context("inconsistent graph records"),
    }
}

pub fn load_graph_file(path: &Path) -> Result<Graph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {}", path.display()))?;
    let graph =
        parse_graph(&raw).with_context(|| format!("failed to parse graph file {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        links = graph.link_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// Small dependency graph bundled with the binary for a first look without a file.
pub fn sample_graph() -> Result<Graph> {
    parse_graph(SAMPLE_GRAPH).context("bundled sample graph is invalid")
}
