//! Force-directed layout and viewport core for dependency graph viewing.

pub mod bus;
pub mod config;
pub mod graph;
pub mod layout;
