mod load;
mod model;
mod path;

pub use load::{load_graph_file, parse_graph, sample_graph};
pub use model::{Graph, GraphError, Link, LinkRecord, Node, Pin, initial_position};
pub use path::NodePath;
