mod color;
mod drag;
mod forces;
mod quadtree;
mod render;
mod simulation;
mod vector;
mod viewport;

pub use color::{ColorAssignment, PALETTE, Rgb, rgb};
pub use drag::{DragController, DragState};
pub use forces::{ForceConfig, ForceModel};
pub use render::{
    LABEL_FONT_SIZE, LINK_STROKE_WIDTH, LinkShape, Marker, MarkerSet, MarkerShape, NODE_RADIUS,
    NodeShape, Scene, scene,
};
pub use simulation::{Control, Phase, Simulation, SimulationConfig, SimulationState, Snapshot};
pub use vector::{Vector, vector};
pub use viewport::{Viewport, ViewportConfig};
