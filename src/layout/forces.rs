use serde::Deserialize;

use super::quadtree::{Cell, QuadTree};
use super::vector::{Vector, vector};
use crate::graph::{Graph, Link};

/// Force coefficients. Negative `charge_strength` repels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub charge_strength: f64,
    /// Pairs closer than this are treated as if they were this far apart.
    pub distance_min: f64,
    /// Barnes–Hut opening criterion: a cell is summarized when `side / distance < theta`.
    pub theta: f64,
    /// Node count above which repulsion switches from exact pairs to the quadtree.
    pub barnes_hut_threshold: usize,
    pub link_distance: f64,
    /// Multiplier on the degree-weighted link strength.
    pub link_strength_scale: f64,
    pub center_strength: f64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            charge_strength: -8000.0,
            distance_min: 1.0,
            theta: 0.9,
            barnes_hut_threshold: 100,
            link_distance: 30.0,
            link_strength_scale: 1.0,
            center_strength: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct LinkWeight {
    /// Inverse of the smaller endpoint degree.
    strength: f64,
    /// Share of the correction applied to the target; the source gets `1 - bias`.
    bias: f64,
}

/// Repulsion, spring and centering forces for one graph.
///
/// Link weights depend on node degrees and are computed once per graph.
#[derive(Clone, Debug)]
pub struct ForceModel {
    config: ForceConfig,
    link_weights: Vec<LinkWeight>,
}

impl ForceModel {
    pub fn new(config: ForceConfig, graph: &Graph) -> Self {
        let link_weights = graph
            .links()
            .iter()
            .map(|link| {
                let source_degree = graph.degree(link.source).max(1) as f64;
                let target_degree = graph.degree(link.target).max(1) as f64;
                LinkWeight {
                    strength: 1.0 / source_degree.min(target_degree),
                    bias: source_degree / (source_degree + target_degree),
                }
            })
            .collect();

        Self {
            config,
            link_weights,
        }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ForceConfig) {
        self.config = config;
    }

    /// Writes one acceleration per position into `accelerations`, already scaled by `alpha`.
    ///
    /// Reads only `positions`, so every contribution of a tick sees the same snapshot.
    pub fn accumulate(
        &self,
        positions: &[Vector],
        links: &[Link],
        alpha: f64,
        accelerations: &mut Vec<Vector>,
    ) {
        accelerations.clear();
        accelerations.resize(positions.len(), Vector::ZERO);
        if positions.is_empty() || alpha == 0.0 {
            return;
        }

        self.apply_repulsion(positions, alpha, accelerations);
        self.apply_links(positions, links, alpha, accelerations);
        self.apply_centering(positions, alpha, accelerations);
    }

    fn apply_repulsion(&self, positions: &[Vector], alpha: f64, accelerations: &mut [Vector]) {
        let strength = -self.config.charge_strength * alpha;
        let distance_min_sq = self.config.distance_min * self.config.distance_min;

        if positions.len() > self.config.barnes_hut_threshold
            && let Some(tree) = QuadTree::build(positions)
        {
            let params = RepulsionParams {
                strength,
                distance_min_sq,
                theta: self.config.theta,
            };
            let mut pending = Vec::new();
            for (index, acceleration) in accelerations.iter_mut().enumerate() {
                *acceleration += tree_repulsion(&tree, index, positions, params, &mut pending);
            }
            return;
        }

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let push =
                    repulsion_between(i, positions[i], j, positions[j], strength, distance_min_sq);
                accelerations[i] += push;
                accelerations[j] -= push;
            }
        }
    }

    fn apply_links(
        &self,
        positions: &[Vector],
        links: &[Link],
        alpha: f64,
        accelerations: &mut [Vector],
    ) {
        let node_count = positions.len();
        let scale = self.config.link_strength_scale * alpha;
        for (link, weight) in links.iter().zip(&self.link_weights) {
            if link.is_self_loop() || link.source >= node_count || link.target >= node_count {
                continue;
            }

            let delta = positions[link.target] - positions[link.source];
            let distance = delta.length();
            if distance <= 1e-9 {
                continue;
            }

            let stretch =
                (distance - self.config.link_distance) / distance * scale * weight.strength;
            accelerations[link.target] -= delta * (stretch * weight.bias);
            accelerations[link.source] += delta * (stretch * (1.0 - weight.bias));
        }
    }

    fn apply_centering(&self, positions: &[Vector], alpha: f64, accelerations: &mut [Vector]) {
        let pull = self.config.center_strength * alpha;
        for (acceleration, position) in accelerations.iter_mut().zip(positions) {
            *acceleration -= *position * pull;
        }
    }
}

#[derive(Clone, Copy)]
struct RepulsionParams {
    strength: f64,
    distance_min_sq: f64,
    theta: f64,
}

/// How a quadtree cell acts on one node during the repulsion walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellInteraction {
    /// Far enough away: one body of the cell's mass at its centroid.
    Aggregate,
    /// Leaf: sum its nodes pairwise.
    Exact,
    /// Too close or too large: descend into the children.
    Open,
}

impl RepulsionParams {
    fn interaction(&self, cell: &Cell, point: Vector) -> CellInteraction {
        if cell.is_leaf() {
            return CellInteraction::Exact;
        }
        if cell.contains(point) {
            return CellInteraction::Open;
        }

        let distance = point.distance(cell.centroid);
        if distance > 0.0 && cell.side_length() < self.theta * distance {
            CellInteraction::Aggregate
        } else {
            CellInteraction::Open
        }
    }
}

/// Direction from `b` to `a`; coincident points get a fixed direction derived from the
/// index pair so that `(a, b)` and `(b, a)` push exactly opposite ways.
fn separation(a_index: usize, a: Vector, b_index: usize, b: Vector) -> (Vector, f64) {
    let delta = a - b;
    let distance_sq = delta.length_sq();
    if let Some(direction) = delta.normalized() {
        return (direction, distance_sq);
    }

    let (low, high) = (a_index.min(b_index), a_index.max(b_index));
    let angle = ((low as f64) * 0.618_034 + (high as f64) * 0.414_214) * std::f64::consts::TAU;
    let direction = vector(angle.cos(), angle.sin());
    if a_index < b_index {
        (direction, distance_sq)
    } else {
        (-direction, distance_sq)
    }
}

fn repulsion_between(
    a_index: usize,
    a: Vector,
    b_index: usize,
    b: Vector,
    strength: f64,
    distance_min_sq: f64,
) -> Vector {
    let (direction, distance_sq) = separation(a_index, a, b_index, b);
    direction * (strength / distance_sq.max(distance_min_sq))
}

/// Repulsion on node `index` from every other node, walking `tree` with
/// `pending` as the explicit stack.
fn tree_repulsion(
    tree: &QuadTree,
    index: usize,
    positions: &[Vector],
    params: RepulsionParams,
    pending: &mut Vec<usize>,
) -> Vector {
    let point = positions[index];
    let mut total = Vector::ZERO;

    pending.clear();
    pending.push(QuadTree::ROOT);
    while let Some(cell_index) = pending.pop() {
        let cell = tree.cell(cell_index);
        match params.interaction(cell, point) {
            CellInteraction::Aggregate => {
                let delta = point - cell.centroid;
                let distance_sq = delta.length_sq();
                let magnitude =
                    params.strength * cell.mass / distance_sq.max(params.distance_min_sq);
                total += delta / distance_sq.sqrt() * magnitude;
            }
            CellInteraction::Exact => {
                for &other in tree.points(cell) {
                    if other != index {
                        total += repulsion_between(
                            index,
                            point,
                            other,
                            positions[other],
                            params.strength,
                            params.distance_min_sq,
                        );
                    }
                }
            }
            CellInteraction::Open => pending.extend(cell.children()),
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, LinkRecord, initial_position};

    fn pair_graph() -> Graph {
        Graph::from_records(&[LinkRecord::new("a/x", "a/y", "import")]).unwrap()
    }

    fn accelerations(model: &ForceModel, graph: &Graph, positions: &[Vector]) -> Vec<Vector> {
        let mut out = Vec::new();
        model.accumulate(positions, graph.links(), 1.0, &mut out);
        out
    }

    #[test]
    fn repulsion_pushes_apart_with_inverse_square_falloff() {
        let graph = Graph::with_nodes(["a", "b"], &[]).unwrap();
        let model = ForceModel::new(
            ForceConfig {
                center_strength: 0.0,
                ..ForceConfig::default()
            },
            &graph,
        );

        let near = accelerations(&model, &graph, &[vector(0.0, 0.0), vector(10.0, 0.0)]);
        let far = accelerations(&model, &graph, &[vector(0.0, 0.0), vector(20.0, 0.0)]);

        assert!(near[0].x < 0.0 && near[1].x > 0.0);
        assert!((near[0].x + near[1].x).abs() < 1e-9);
        assert!((near[0].x - (-80.0)).abs() < 1e-9);
        assert!((near[0].x / far[0].x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_nodes_still_separate() {
        let graph = Graph::with_nodes(["a", "b"], &[]).unwrap();
        let model = ForceModel::new(
            ForceConfig {
                center_strength: 0.0,
                ..ForceConfig::default()
            },
            &graph,
        );
        let forces = accelerations(&model, &graph, &[vector(3.0, 3.0), vector(3.0, 3.0)]);

        assert!(forces[0].is_finite() && forces[1].is_finite());
        assert!(forces[0].length() > 0.0);
        assert!((forces[0] + forces[1]).length() < 1e-9);
    }

    #[test]
    fn spring_pulls_stretched_link_together() {
        let graph = pair_graph();
        let model = ForceModel::new(
            ForceConfig {
                charge_strength: 0.0,
                center_strength: 0.0,
                ..ForceConfig::default()
            },
            &graph,
        );

        let forces = accelerations(&model, &graph, &[vector(0.0, 0.0), vector(50.0, 0.0)]);
        // (50 - 30) split evenly between two degree-1 endpoints.
        assert!((forces[0].x - 10.0).abs() < 1e-9);
        assert!((forces[1].x + 10.0).abs() < 1e-9);

        let compressed = accelerations(&model, &graph, &[vector(0.0, 0.0), vector(10.0, 0.0)]);
        assert!(compressed[0].x < 0.0 && compressed[1].x > 0.0);
    }

    #[test]
    fn hub_endpoint_moves_less_than_leaf() {
        let records = ["b", "c", "d", "e"]
            .iter()
            .map(|leaf| LinkRecord::new("hub", *leaf, "import"))
            .collect::<Vec<_>>();
        let graph = Graph::from_records(&records).unwrap();
        let model = ForceModel::new(
            ForceConfig {
                charge_strength: 0.0,
                center_strength: 0.0,
                ..ForceConfig::default()
            },
            &graph,
        );

        let mut positions = vec![vector(0.0, 0.0); 5];
        positions[1] = vector(100.0, 0.0);
        positions[2] = vector(-100.0, 0.0);
        positions[3] = vector(0.0, 100.0);
        positions[4] = vector(0.0, -100.0);
        let forces = accelerations(&model, &graph, &positions);

        assert!(forces[0].length() < 1e-9);
        assert!(forces[1].x < 0.0);
        assert!((forces[1].x - (-70.0 * 0.8)).abs() < 1e-9);
    }

    #[test]
    fn centering_pulls_each_axis_toward_origin() {
        let graph = Graph::with_nodes(["solo"], &[]).unwrap();
        let model = ForceModel::new(ForceConfig::default(), &graph);
        let mut out = Vec::new();
        model.accumulate(&[vector(40.0, -20.0)], graph.links(), 0.5, &mut out);
        assert!((out[0].x - (-2.0)).abs() < 1e-12);
        assert!((out[0].y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_alpha_produces_no_acceleration() {
        let graph = pair_graph();
        let model = ForceModel::new(ForceConfig::default(), &graph);
        let mut out = Vec::new();
        model.accumulate(&graph.positions(), graph.links(), 0.0, &mut out);
        assert!(out.iter().all(|acceleration| *acceleration == Vector::ZERO));
    }

    #[test]
    fn barnes_hut_tracks_exact_repulsion() {
        let ids = (0..300).map(|i| format!("n/{i}")).collect::<Vec<_>>();
        let graph = Graph::with_nodes(ids, &[]).unwrap();
        let positions = (0..300).map(initial_position).collect::<Vec<_>>();

        let base = ForceConfig {
            center_strength: 0.0,
            ..ForceConfig::default()
        };
        let exact = ForceModel::new(
            ForceConfig {
                barnes_hut_threshold: usize::MAX,
                ..base
            },
            &graph,
        );
        let approximate = ForceModel::new(
            ForceConfig {
                barnes_hut_threshold: 0,
                ..base
            },
            &graph,
        );

        let exact_forces = accelerations(&exact, &graph, &positions);
        let approximate_forces = accelerations(&approximate, &graph, &positions);

        let error = exact_forces
            .iter()
            .zip(&approximate_forces)
            .map(|(a, b)| (*a - *b).length())
            .sum::<f64>();
        let magnitude = exact_forces.iter().map(|a| a.length()).sum::<f64>();
        assert!(error / magnitude < 0.1, "relative error {}", error / magnitude);
    }

    #[test]
    fn link_strength_scale_multiplies_spring() {
        let graph = pair_graph();
        let base = ForceConfig {
            charge_strength: 0.0,
            center_strength: 0.0,
            ..ForceConfig::default()
        };
        let mut model = ForceModel::new(base, &graph);
        model.set_config(ForceConfig {
            link_strength_scale: 2.0,
            ..base
        });

        let forces = accelerations(&model, &graph, &[vector(0.0, 0.0), vector(50.0, 0.0)]);
        assert!((forces[0].x - 20.0).abs() < 1e-9);
    }

    #[test]
    fn self_loop_contributes_no_spring() {
        let graph = Graph::from_records(&[LinkRecord::new("a/x", "a/x", "import")]).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.degree(0), 2);
        assert!(graph.links()[0].is_self_loop());

        let model = ForceModel::new(
            ForceConfig {
                center_strength: 0.0,
                ..ForceConfig::default()
            },
            &graph,
        );
        let forces = accelerations(&model, &graph, &[vector(12.0, -7.0)]);
        assert_eq!(forces, [Vector::ZERO]);
    }

    #[test]
    fn self_loop_leaves_other_forces_unchanged() {
        let looped = Graph::from_records(&[
            LinkRecord::new("a/x", "a/x", "import"),
            LinkRecord::new("a/y", "a/y", "import"),
        ])
        .unwrap();
        let plain = Graph::with_nodes(["a/x", "a/y"], &[]).unwrap();
        let positions = [vector(-15.0, 4.0), vector(20.0, 9.0)];

        let looped_forces = accelerations(
            &ForceModel::new(ForceConfig::default(), &looped),
            &looped,
            &positions,
        );
        let plain_forces = accelerations(
            &ForceModel::new(ForceConfig::default(), &plain),
            &plain,
            &positions,
        );
        assert!(looped_forces.iter().all(|force| force.is_finite()));
        assert_eq!(looped_forces, plain_forces);
    }

    #[test]
    fn cells_are_summarized_only_when_small_and_distant() {
        let positions = (0..200).map(initial_position).collect::<Vec<_>>();
        let tree = QuadTree::build(&positions).unwrap();
        let params = RepulsionParams {
            strength: 8000.0,
            distance_min_sq: 1.0,
            theta: 0.9,
        };

        let root = tree.cell(QuadTree::ROOT);
        assert_eq!(params.interaction(root, positions[0]), CellInteraction::Open);
        assert_eq!(
            params.interaction(root, vector(1e6, 0.0)),
            CellInteraction::Aggregate
        );

        let mut index = QuadTree::ROOT;
        while !tree.cell(index).is_leaf() {
            index = tree.cell(index).children().start;
        }
        assert_eq!(
            params.interaction(tree.cell(index), vector(1e6, 0.0)),
            CellInteraction::Exact
        );
    }
}
