//! Converts a simulation snapshot into device-space shapes.
//!
//! Nothing here keeps state between frames; the host paints whatever
//! [`scene`] returns.

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_3;

use super::color::{ColorAssignment, PALETTE, Rgb};
use super::simulation::Snapshot;
use super::vector::{Vector, vector};
use super::viewport::Viewport;
use crate::graph::Graph;

/// Node circle radius in graph units.
pub const NODE_RADIUS: f64 = 5.0;
/// Horizontal label offset from the node center, in graph units.
pub const LABEL_OFFSET: f64 = 8.0;
pub const LABEL_FONT_SIZE: f64 = 12.0;
pub const LINK_STROKE_WIDTH: f64 = 1.5;

const ARC_SEGMENTS: usize = 16;
const ARROW_LENGTH: f64 = 9.0;
const ARROW_HALF_WIDTH: f64 = 4.5;
/// Distance the arrow tip stops short of the target center.
const ARROW_INSET: f64 = 4.5;
const DEGENERATE_LENGTH: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Arrow,
}

/// End-cap marker per link type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerSet {
    by_type: HashMap<String, Marker>,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::empty().with("import", Marker::Arrow)
    }
}

impl MarkerSet {
    pub fn empty() -> Self {
        Self {
            by_type: HashMap::new(),
        }
    }

    pub fn with(mut self, link_type: impl Into<String>, marker: Marker) -> Self {
        self.by_type.insert(link_type.into(), marker);
        self
    }

    pub fn marker_for(&self, link_type: &str) -> Option<Marker> {
        self.by_type.get(link_type).copied()
    }
}

/// Filled triangle in device space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerShape {
    pub kind: Marker,
    pub tip: Vector,
    pub left: Vector,
    pub right: Vector,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LinkShape {
    Arc {
        link: usize,
        /// Polyline from source to target, device space.
        points: Vec<Vector>,
        end: Vector,
        /// Unit tangent at `end`, pointing along the direction of travel.
        heading: Vector,
        marker: Option<MarkerShape>,
    },
    /// Source and target coincide; nothing to curve.
    Point { link: usize, at: Vector },
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeShape {
    pub index: usize,
    pub center: Vector,
    pub radius: f64,
    pub color: Rgb,
    pub label: String,
    pub label_anchor: Vector,
    pub font_size: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub links: Vec<LinkShape>,
    pub nodes: Vec<NodeShape>,
}

impl Scene {
    /// Topmost node whose circle contains `point`, in device space.
    pub fn node_at(&self, point: Vector) -> Option<usize> {
        self.nodes
            .iter()
            .rev()
            .find(|node| node.center.distance(point) <= node.radius)
            .map(|node| node.index)
    }
}

pub fn scene(
    graph: &Graph,
    snapshot: &Snapshot,
    viewport: &Viewport,
    colors: &ColorAssignment,
    markers: &MarkerSet,
) -> Scene {
    let position = |index: usize| {
        snapshot
            .position(index)
            .or_else(|| graph.node(index).map(|node| node.position))
            .unwrap_or(Vector::ZERO)
    };
    let scale = viewport.uniform_scale();

    let links = graph
        .links()
        .iter()
        .enumerate()
        .map(|(index, link)| {
            let marker = markers.marker_for(&link.link_type);
            link_shape(
                index,
                position(link.source),
                position(link.target),
                viewport,
                marker,
            )
        })
        .collect();

    let nodes = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let center = viewport.graph_to_device(position(index));
            NodeShape {
                index,
                center,
                radius: NODE_RADIUS * scale,
                color: colors.color_for(node.id.group()).unwrap_or(PALETTE[0]),
                label: node.id.to_string(),
                label_anchor: center + vector(LABEL_OFFSET * scale, 0.0),
                font_size: LABEL_FONT_SIZE,
            }
        })
        .collect();

    Scene { links, nodes }
}

fn link_shape(
    link: usize,
    source: Vector,
    target: Vector,
    viewport: &Viewport,
    marker: Option<Marker>,
) -> LinkShape {
    let radius = source.distance(target);
    if !radius.is_finite() || radius < DEGENERATE_LENGTH {
        return LinkShape::Point {
            link,
            at: viewport.graph_to_device(source),
        };
    }

    let arc = ArcGeometry::between(source, target);
    let points = (0..=ARC_SEGMENTS)
        .map(|step| {
            let t = step as f64 / ARC_SEGMENTS as f64;
            viewport.graph_to_device(arc.point_at(arc.start_angle + FRAC_PI_3 * t))
        })
        .collect::<Vec<_>>();
    let end = viewport.graph_to_device(target);

    let end_angle = arc.start_angle + FRAC_PI_3;
    let heading = vector(-end_angle.sin(), end_angle.cos())
        .scale(viewport.scale())
        .normalized()
        .unwrap_or(vector(1.0, 0.0));

    LinkShape::Arc {
        link,
        points,
        end,
        heading,
        marker: marker.map(|kind| marker_shape(kind, end, heading, viewport.uniform_scale())),
    }
}

/// Small arc with positive sweep and radius equal to the chord, so it always
/// spans 60 degrees.
struct ArcGeometry {
    center: Vector,
    radius: f64,
    start_angle: f64,
}

impl ArcGeometry {
    fn between(source: Vector, target: Vector) -> Self {
        let midpoint = (source + target) * 0.5;
        let normal = vector(source.y - target.y, target.x - source.x);
        let center = midpoint + normal * (3.0f64.sqrt() * 0.5);
        let offset = source - center;

        Self {
            center,
            radius: source.distance(target),
            start_angle: offset.y.atan2(offset.x),
        }
    }

    fn point_at(&self, angle: f64) -> Vector {
        self.center + vector(angle.cos(), angle.sin()) * self.radius
    }
}

fn marker_shape(kind: Marker, end: Vector, heading: Vector, scale: f64) -> MarkerShape {
    match kind {
        Marker::Arrow => {
            let tip = end - heading * (ARROW_INSET * scale);
            let base = tip - heading * (ARROW_LENGTH * scale);
            let normal = vector(-heading.y, heading.x) * (ARROW_HALF_WIDTH * scale);
            MarkerShape {
                kind,
                tip,
                left: base + normal,
                right: base - normal,
            }
        }
    }
}
