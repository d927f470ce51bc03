//! Dependency graph around one focal job.
//!
//! Three pure stages, each testable on its own:
//! - extract: related jobs + signed levels
//! - layout: deterministic (x, y) per related job
//! - edges: parent -> child anchors between placed nodes
//!
//! Nothing here fails or logs. Broken references and cycles in job data are
//! absorbed; the result is always finite and acyclic.

pub mod edges;
pub mod extract;
pub mod layout;

pub use edges::resolve_edges;
pub use extract::{Relatives, extract_related};
pub use layout::{LayoutConfig, layout};

use crate::jobs::{Job, JobDirectory, JobStatus};

use serde::Serialize;

/// Job resolution for the walks: the focal record itself, then the directory.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    focal: &'a Job,
    dir: &'a JobDirectory<'a>,
}

impl<'a> Lookup<'a> {
    pub fn new(focal: &'a Job, dir: &'a JobDirectory<'a>) -> Self {
        Self { focal, dir }
    }

    pub fn focal_name(&self) -> &'a str {
        self.focal.name.as_str()
    }

    pub fn get(&self, name: &str) -> Option<&'a Job> {
        if name == self.focal.name {
            Some(self.focal)
        } else {
            self.dir.get(name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyNode {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub status: JobStatus,
    /// 0 for the focal job, negative above it, positive below.
    pub level: i32,
    /// Top-left corner of the node box.
    pub x: f64,
    pub y: f64,
    pub is_focal: bool,
}

impl DependencyNode {
    pub fn bottom_center(&self, config: &LayoutConfig) -> (f64, f64) {
        (self.x + config.node_width / 2.0, self.y + config.node_height)
    }

    pub fn top_center(&self, config: &LayoutConfig) -> (f64, f64) {
        (self.x + config.node_width / 2.0, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    pub from_id: String,
    pub to_id: String,
    pub from_x: f64,
    pub from_y: f64,
    pub to_x: f64,
    pub to_y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DependencyGraph {
    pub nodes: Vec<DependencyNode>,
    pub edges: Vec<DependencyEdge>,
}

impl DependencyGraph {
    /// No data yet (focal not loaded, or no jobs).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// More than the focal job alone. A single node with no edges is the
    /// "no relationships" case.
    pub fn has_relationships(&self) -> bool {
        self.nodes.len() > 1
    }

    pub fn focal(&self) -> Option<&DependencyNode> {
        self.nodes.iter().find(|n| n.is_focal)
    }

    pub fn node(&self, id: &str) -> Option<&DependencyNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Right and bottom extent of all node boxes (0, 0 when empty).
    pub fn extent(&self, config: &LayoutConfig) -> (f64, f64) {
        self.nodes.iter().fold((0.0_f64, 0.0_f64), |(w, h), n| {
            (w.max(n.x + config.node_width), h.max(n.y + config.node_height))
        })
    }
}

/// Build the graph with the default geometry.
pub fn build_dependency_graph(focal: Option<&Job>, all_jobs: &[Job]) -> DependencyGraph {
    build_dependency_graph_with(focal, all_jobs, &LayoutConfig::default())
}

pub fn build_dependency_graph_with(
    focal: Option<&Job>,
    all_jobs: &[Job],
    config: &LayoutConfig,
) -> DependencyGraph {
    let Some(focal) = focal.filter(|f| !f.name.is_empty()) else {
        return DependencyGraph::default();
    };
    if all_jobs.is_empty() {
        return DependencyGraph::default();
    }

    let config = config.sanitized();
    let dir = JobDirectory::new(all_jobs);
    let lookup = Lookup::new(focal, &dir);

    let rel = extract_related(&lookup);
    let nodes = layout(&rel, &lookup, &config);
    let edges = resolve_edges(&rel, &nodes, &lookup, &config);

    DependencyGraph { nodes, edges }
}
