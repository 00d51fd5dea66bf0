use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::forces::{ForceConfig, ForceModel};
use super::vector::Vector;
use crate::graph::{Graph, Pin, initial_position};

/// Cooling schedule and integration constants.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fraction of the gap to `alpha_target` closed each tick.
    pub alpha_decay: f64,
    /// Below this alpha the layout counts as settled and ticking stops.
    pub alpha_min: f64,
    /// Share of velocity kept after each tick.
    pub velocity_decay: f64,
    /// `alpha_target` used while a node is being dragged.
    pub reheat_target: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha_decay: 0.0228,
            alpha_min: 0.001,
            velocity_decay: 0.6,
            reheat_target: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationState {
    pub alpha: f64,
    pub alpha_target: f64,
    pub running: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Warming,
    Cooling,
    Settled,
}

/// Requests handled by the simulation, which is the only writer of its state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Control {
    /// Raise `alpha_target` to the reheat target and resume ticking if idle.
    Reheat,
    /// Drop `alpha_target` back to zero.
    Cool,
    Pin { node: usize, at: Vector },
    Unpin { node: usize },
}

/// Positions produced by one tick. Shared read-only with the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub alpha: f64,
    pub positions: Vec<Vector>,
}

impl Snapshot {
    pub fn position(&self, index: usize) -> Option<Vector> {
        self.positions.get(index).copied()
    }
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vector>,
    accelerations: Vec<Vector>,
}

pub struct Simulation {
    graph: Graph,
    forces: ForceModel,
    config: SimulationConfig,
    state: SimulationState,
    phase: Phase,
    tick: u64,
    snapshot: Arc<Snapshot>,
    scratch: Scratch,
}

impl Simulation {
    pub fn new(graph: Graph, force_config: ForceConfig, config: SimulationConfig) -> Self {
        let forces = ForceModel::new(force_config, &graph);
        let snapshot = Arc::new(Snapshot {
            tick: 0,
            alpha: 1.0,
            positions: graph.positions(),
        });

        info!(
            nodes = graph.node_count(),
            links = graph.link_count(),
            "simulation started"
        );

        Self {
            graph,
            forces,
            config,
            state: SimulationState {
                alpha: 1.0,
                alpha_target: 0.0,
                running: true,
            },
            phase: Phase::Warming,
            tick: 0,
            snapshot,
            scratch: Scratch::default(),
        }
    }

    /// Replaces the graph wholesale and starts again from `alpha = 1`.
    pub fn restart(&mut self, graph: Graph) {
        let force_config = *self.forces.config();
        *self = Self::new(graph, force_config, self.config);
    }

    /// Puts every node back on its initial spiral position, unpinned, and
    /// starts again from `alpha = 1`.
    pub fn reset(&mut self) {
        let mut graph = std::mem::take(&mut self.graph);
        for (index, node) in graph.nodes_mut().iter_mut().enumerate() {
            node.position = initial_position(index);
            node.velocity = Vector::ZERO;
            node.pin = Pin::Free;
        }
        self.restart(graph);
    }

    /// Halts ticking. A later `Reheat` resumes it.
    pub fn stop(&mut self) {
        if self.state.running {
            debug!(tick = self.tick, "simulation stopped");
        }
        self.state.running = false;
    }

    pub fn apply(&mut self, control: Control) {
        match control {
            Control::Reheat => {
                self.state.alpha_target = self.config.reheat_target;
                self.phase = Phase::Warming;
                if !self.state.running {
                    debug!(alpha = self.state.alpha, "simulation reheated");
                    self.state.running = true;
                }
            }
            Control::Cool => {
                self.state.alpha_target = 0.0;
                self.phase = Phase::Cooling;
            }
            Control::Pin { node, at } => {
                if !at.is_finite() {
                    warn!(node, "ignoring pin at a non-finite position");
                    return;
                }
                if let Some(entry) = self.graph.nodes_mut().get_mut(node) {
                    entry.pin = Pin::Pinned(at);
                }
            }
            Control::Unpin { node } => {
                if let Some(entry) = self.graph.nodes_mut().get_mut(node) {
                    entry.pin = Pin::Free;
                }
            }
        }
    }

    /// Advances one step and returns the new snapshot, or `None` while halted.
    pub fn tick(&mut self) -> Option<Arc<Snapshot>> {
        if !self.state.running {
            return None;
        }

        self.state.alpha += (self.state.alpha_target - self.state.alpha) * self.config.alpha_decay;
        let alpha = self.state.alpha;

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch
            .positions
            .extend(self.graph.nodes().iter().map(|node| node.position));
        self.forces.accumulate(
            &scratch.positions,
            self.graph.links(),
            alpha,
            &mut scratch.accelerations,
        );

        let velocity_decay = self.config.velocity_decay;
        let mut recovered = 0usize;
        for (index, node) in self.graph.nodes_mut().iter_mut().enumerate() {
            match node.pin {
                Pin::Pinned(at) => {
                    node.position = at;
                    node.velocity = Vector::ZERO;
                }
                Pin::Free => {
                    let mut velocity =
                        (node.velocity + scratch.accelerations[index]) * velocity_decay;
                    if !velocity.is_finite() {
                        velocity = Vector::ZERO;
                        recovered += 1;
                    }

                    let position = node.position + velocity;
                    if position.is_finite() {
                        node.position = position;
                        node.velocity = velocity;
                    } else {
                        node.position = scratch.positions[index];
                        node.velocity = Vector::ZERO;
                        recovered += 1;
                    }
                }
            }
        }

        if recovered > 0 {
            warn!(
                tick = self.tick + 1,
                recovered, "reset non-finite node motion; check force coefficients"
            );
        }

        self.tick += 1;
        if self.state.alpha < self.config.alpha_min {
            self.state.running = false;
            info!(tick = self.tick, alpha = self.state.alpha, "layout settled");
        }

        self.snapshot = Arc::new(Snapshot {
            tick: self.tick,
            alpha,
            positions: self.graph.positions(),
        });
        Some(Arc::clone(&self.snapshot))
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        if self.state.running {
            self.phase
        } else {
            Phase::Settled
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SimulationConfig) {
        self.config = config;
    }

    pub fn force_config(&self) -> &ForceConfig {
        self.forces.config()
    }

    pub fn set_force_config(&mut self, config: ForceConfig) {
        self.forces.set_config(config);
    }
}
