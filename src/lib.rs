//! Job dependency diagrams for a distributed job scheduler.
//!
//! Given the full job collection and a focal job, build the subgraph of its
//! ancestors and descendants, lay it out in levels, and render it.

pub mod diagnostics;
pub mod graph;
pub mod jobs;
pub mod render;

pub type Result<T> = anyhow::Result<T>;

pub use graph::{
    DependencyEdge, DependencyGraph, DependencyNode, LayoutConfig, build_dependency_graph,
    build_dependency_graph_with,
};
pub use jobs::{Job, JobDirectory, JobStatus};
