use tracing::debug;

use super::simulation::{Control, Simulation};
use super::vector::Vector;
use super::viewport::Viewport;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Active(usize),
}

/// Single-pointer drag gesture. Events for a node that is not being dragged
/// are dropped.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn active(&self) -> Option<usize> {
        match self.state {
            DragState::Idle => None,
            DragState::Active(node) => Some(node),
        }
    }

    pub fn start(&mut self, node: usize, simulation: &mut Simulation) -> bool {
        if self.state != DragState::Idle {
            return false;
        }
        let Some(position) = simulation.graph().node(node).map(|entry| entry.position) else {
            return false;
        };

        simulation.apply(Control::Pin { node, at: position });
        let state = simulation.state();
        if state.alpha_target < simulation.config().reheat_target {
            simulation.apply(Control::Reheat);
        }

        debug!(node, "drag started");
        self.state = DragState::Active(node);
        true
    }

    pub fn move_to(
        &mut self,
        node: usize,
        device_point: Vector,
        viewport: &Viewport,
        simulation: &mut Simulation,
    ) -> bool {
        if self.state != DragState::Active(node) {
            return false;
        }

        let at = viewport.device_to_graph(device_point);
        simulation.apply(Control::Pin { node, at });
        true
    }

    pub fn end(&mut self, node: usize, simulation: &mut Simulation) -> bool {
        if self.state != DragState::Active(node) {
            return false;
        }

        simulation.apply(Control::Unpin { node });
        simulation.apply(Control::Cool);
        debug!(node, "drag ended");
        self.state = DragState::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Graph, LinkRecord, Pin};
    use crate::layout::forces::ForceConfig;
    use crate::layout::simulation::{Phase, SimulationConfig};
    use crate::layout::vector;

    fn simulation() -> Simulation {
        let graph = Graph::from_records(&[
            LinkRecord::new("a/x", "a/y", "import"),
            LinkRecord::new("a/y", "b/z", "import"),
        ])
        .unwrap();
        Simulation::new(graph, ForceConfig::default(), SimulationConfig::default())
    }

    #[test]
    fn dragged_node_follows_pointer_exactly() {
        let mut simulation = simulation();
        let mut drag = DragController::new();
        let viewport = Viewport::with_window(
            vector(-50.0, -50.0),
            vector(400.0, 400.0),
            vector(400.0, 400.0),
        );
        let node = simulation.graph().index_of("a/x").unwrap();

        assert!(drag.start(node, &mut simulation));
        assert!(drag.move_to(node, vector(100.0, 100.0), &viewport, &mut simulation));

        let snapshot = simulation.tick().unwrap();
        assert_eq!(snapshot.positions[node], vector(50.0, 50.0));
    }

    #[test]
    fn start_pins_in_place_and_reheats() {
        let mut simulation = simulation();
        while simulation.tick().is_some() {}
        let position = simulation.graph().nodes()[1].position;

        let mut drag = DragController::new();
        assert!(drag.start(1, &mut simulation));
        assert_eq!(drag.state(), DragState::Active(1));
        assert_eq!(simulation.graph().nodes()[1].pin, Pin::Pinned(position));
        assert!(simulation.is_running());
        assert_eq!(simulation.phase(), Phase::Warming);
        assert_eq!(simulation.state().alpha_target, 0.3);
    }

    #[test]
    fn second_start_is_rejected() {
        let mut simulation = simulation();
        let mut drag = DragController::new();
        assert!(drag.start(0, &mut simulation));
        assert!(!drag.start(2, &mut simulation));
        assert_eq!(drag.active(), Some(0));
        assert_eq!(simulation.graph().nodes()[2].pin, Pin::Free);
    }

    #[test]
    fn missing_node_is_rejected() {
        let mut simulation = simulation();
        let mut drag = DragController::new();
        assert!(!drag.start(99, &mut simulation));
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn end_unpins_and_cools() {
        let mut simulation = simulation();
        let mut drag = DragController::new();
        drag.start(0, &mut simulation);
        assert!(drag.end(0, &mut simulation));

        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(simulation.graph().nodes()[0].pin, Pin::Free);
        assert_eq!(simulation.state().alpha_target, 0.0);
        assert_eq!(simulation.phase(), Phase::Cooling);
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut simulation = simulation();
        let mut drag = DragController::new();
        let viewport = Viewport::new(400.0, 400.0);

        assert!(!drag.move_to(0, vector(10.0, 10.0), &viewport, &mut simulation));
        assert!(!drag.end(0, &mut simulation));

        drag.start(1, &mut simulation);
        assert!(!drag.move_to(0, vector(10.0, 10.0), &viewport, &mut simulation));
        assert!(!drag.end(2, &mut simulation));
        assert_eq!(simulation.graph().nodes()[0].pin, Pin::Free);
        assert_eq!(drag.active(), Some(1));
    }
}
