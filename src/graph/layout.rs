//! Layered layout: one row per level, each row centered under the widest one.
//!
//! Rows are ordered by level (most distant ancestor on top). Within a row,
//! jobs keep their discovery order, so identical inputs give identical
//! coordinates.

use crate::graph::extract::Relatives;
use crate::graph::{DependencyNode, Lookup};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed geometry of the diagram, in layout units (pixels for the SVG surface).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Horizontal gap between neighbours on the same level.
    pub node_gap: f64,
    /// Vertical distance between the tops of consecutive levels.
    pub level_pitch: f64,
    pub top_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 160.0,
            node_height: 60.0,
            node_gap: 20.0,
            level_pitch: 100.0,
            top_margin: 30.0,
        }
    }
}

impl LayoutConfig {
    /// Width of a row holding `count` nodes.
    pub fn row_width(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        count as f64 * self.node_width + (count - 1) as f64 * self.node_gap
    }

    /// Horizontal distance between the left edges of neighbours.
    pub fn column_step(&self) -> f64 {
        self.node_width + self.node_gap
    }

    /// Clamp nonsensical values so the non-overlap guarantees hold.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        let fix = |v: f64, fallback: f64| if v.is_finite() && v >= 0.0 { v } else { fallback };
        self.node_width = fix(self.node_width, d.node_width);
        self.node_height = fix(self.node_height, d.node_height);
        self.node_gap = fix(self.node_gap, d.node_gap);
        self.level_pitch = fix(self.level_pitch, d.level_pitch);
        self.top_margin = fix(self.top_margin, d.top_margin);
        self
    }
}

pub fn layout(rel: &Relatives<'_>, lookup: &Lookup<'_>, config: &LayoutConfig) -> Vec<DependencyNode> {
    // level -> names in discovery order
    let mut rows: BTreeMap<i32, Vec<&str>> = BTreeMap::new();
    for name in rel.names() {
        if let Some(level) = rel.level(name) {
            rows.entry(level).or_default().push(name);
        }
    }

    let Some(&min_level) = rows.keys().next() else {
        return Vec::new();
    };

    let max_width = rows
        .values()
        .map(|row| config.row_width(row.len()))
        .fold(0.0, f64::max);

    let mut nodes = Vec::with_capacity(rel.len());
    for (&level, row) in &rows {
        let start_x = (max_width - config.row_width(row.len())) / 2.0;
        let y = f64::from(level - min_level) * config.level_pitch + config.top_margin;

        for (i, &name) in row.iter().enumerate() {
            let Some(job) = lookup.get(name) else {
                continue;
            };
            nodes.push(DependencyNode {
                id: job.name.clone(),
                name: job.name.clone(),
                display_name: job.display_name().to_string(),
                status: job.status,
                level,
                x: start_x + i as f64 * config.column_step(),
                y,
                is_focal: name == lookup.focal_name(),
            });
        }
    }

    nodes
}
