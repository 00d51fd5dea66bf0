use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;
use std::fmt;

use serde::Deserialize;
use tracing::debug;

use super::path::NodePath;
use crate::layout::{Vector, vector};

const INITIAL_RADIUS: f64 = 10.0;

/// One `{source, target, type}` record as delivered by the graph source.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LinkRecord {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: String,
}

impl LinkRecord {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        link_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type: link_type.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// A link names an endpoint that is not in the node set.
    UnresolvedReference { link: usize, id: String },
    EmptyNodeId { link: usize },
    /// An explicit node list contains an empty id.
    EmptyNode { index: usize },
    DuplicateNode { id: String },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedReference { link, id } => {
                write!(f, "link #{link} references unknown node `{id}`")
            }
            Self::EmptyNodeId { link } => write!(f, "link #{link} has an empty endpoint id"),
            Self::EmptyNode { index } => write!(f, "node #{index} has an empty id"),
            Self::DuplicateNode { id } => write!(f, "node `{id}` is listed more than once"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Whether a node follows the physics or is held at a fixed position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Pin {
    #[default]
    Free,
    Pinned(Vector),
}

impl Pin {
    pub fn is_pinned(self) -> bool {
        matches!(self, Self::Pinned(_))
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodePath,
    pub position: Vector,
    pub velocity: Vector,
    pub pin: Pin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub link_type: String,
}

impl Link {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Graph topology plus the live physical state of every node.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    links: Vec<Link>,
    index_by_id: HashMap<NodePath, usize>,
    degree: Vec<usize>,
}

/// Deterministic phyllotaxis placement so that every load starts from the same layout.
pub fn initial_position(index: usize) -> Vector {
    let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
    let radius = INITIAL_RADIUS * (0.5 + index as f64).sqrt();
    let angle = index as f64 * golden_angle;
    vector(radius * angle.cos(), radius * angle.sin())
}

impl Graph {
    /// Builds a graph whose node set is every distinct link endpoint, in first-seen order.
    pub fn from_records(records: &[LinkRecord]) -> Result<Self, GraphError> {
        let mut ids = Vec::new();
        for (link, record) in records.iter().enumerate() {
            for endpoint in [&record.source, &record.target] {
                if endpoint.is_empty() {
                    return Err(GraphError::EmptyNodeId { link });
                }
                ids.push(NodePath::new(endpoint.as_str()));
            }
        }

        let mut seen = HashSet::with_capacity(ids.len());
        ids.retain(|id| seen.insert(id.clone()));

        Self::build(ids, records)
    }

    /// Builds a graph from an explicit node list; every link must reference a listed node.
    pub fn with_nodes<I, S>(node_ids: I, records: &[LinkRecord]) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = node_ids
            .into_iter()
            .map(NodePath::new)
            .collect::<Vec<_>>();
        Self::build(ids, records)
    }

    fn build(ids: Vec<NodePath>, records: &[LinkRecord]) -> Result<Self, GraphError> {
        let mut index_by_id = HashMap::with_capacity(ids.len());
        let mut nodes = Vec::with_capacity(ids.len());
        for (index, id) in ids.into_iter().enumerate() {
            if id.is_empty() {
                return Err(GraphError::EmptyNode { index });
            }
            if index_by_id.insert(id.clone(), index).is_some() {
                return Err(GraphError::DuplicateNode { id: id.to_string() });
            }
            nodes.push(Node {
                id,
                position: initial_position(index),
                velocity: Vector::ZERO,
                pin: Pin::Free,
            });
        }

        let resolve = |link: usize, id: &str| {
            if id.is_empty() {
                return Err(GraphError::EmptyNodeId { link });
            }
            index_by_id
                .get(id)
                .copied()
                .ok_or_else(|| GraphError::UnresolvedReference {
                    link,
                    id: id.to_owned(),
                })
        };

        let mut links = Vec::with_capacity(records.len());
        let mut degree = vec![0usize; nodes.len()];
        for (link, record) in records.iter().enumerate() {
            let source = resolve(link, &record.source)?;
            let target = resolve(link, &record.target)?;
            degree[source] += 1;
            degree[target] += 1;
            links.push(Link {
                source,
                target,
                link_type: record.link_type.clone(),
            });
        }

        debug!(nodes = nodes.len(), links = links.len(), "graph built");

        Ok(Self {
            nodes,
            links,
            index_by_id,
            degree,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Number of link endpoints touching the node.
    pub fn degree(&self, index: usize) -> usize {
        self.degree.get(index).copied().unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node groups in node order, repeats included.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.group())
    }

    pub fn positions(&self) -> Vec<Vector> {
        self.nodes.iter().map(|node| node.position).collect()
    }
}
