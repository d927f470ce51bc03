//! Edge resolution: parent -> child anchors between placed nodes.

use crate::graph::extract::Relatives;
use crate::graph::layout::LayoutConfig;
use crate::graph::{DependencyEdge, DependencyNode, Lookup};

use std::collections::HashMap;

/// Parent -> child edges between related jobs, anchored bottom-center of the
/// parent box to top-center of the child box.
///
/// Edges are taken in discovery order. An edge that would close a cycle among
/// the edges already emitted is dropped (cyclic `parent_job` data), so the
/// drawn graph stays acyclic. Every other parent link is kept, whatever the
/// relative levels of the two nodes.
pub fn resolve_edges(
    rel: &Relatives<'_>,
    nodes: &[DependencyNode],
    lookup: &Lookup<'_>,
    config: &LayoutConfig,
) -> Vec<DependencyEdge> {
    let by_id: HashMap<&str, &DependencyNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    // child -> parent over emitted edges; each child has at most one
    let mut emitted: HashMap<&str, &str> = HashMap::new();

    let mut edges = Vec::new();
    for name in rel.names() {
        let Some(parent) = lookup.get(name).and_then(|job| job.parent_job.as_deref()) else {
            continue;
        };
        let (Some(from), Some(to)) = (by_id.get(parent), by_id.get(name)) else {
            continue;
        };
        if closes_cycle(&emitted, &from.id, &to.id) {
            continue;
        }
        emitted.insert(to.id.as_str(), from.id.as_str());

        let (from_x, from_y) = from.bottom_center(config);
        let (to_x, to_y) = to.top_center(config);
        edges.push(DependencyEdge {
            from_id: from.id.clone(),
            to_id: to.id.clone(),
            from_x,
            from_y,
            to_x,
            to_y,
        });
    }

    edges
}

/// Would `parent -> child` close a loop? Only if `child` is already an
/// ancestor of `parent` (or is `parent`) along emitted edges. Emitted edges
/// are acyclic, so the walk ends.
fn closes_cycle<'a>(emitted: &HashMap<&'a str, &'a str>, parent: &'a str, child: &str) -> bool {
    let mut cur = parent;
    loop {
        if cur == child {
            return true;
        }
        match emitted.get(cur) {
            Some(&up) => cur = up,
            None => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::extract::extract_related;
    use crate::graph::layout::layout;
    use crate::jobs::{Job, JobDirectory};
    use pretty_assertions::assert_eq;

    fn edges_for(focal: &str, jobs: &[Job]) -> Vec<DependencyEdge> {
        let config = LayoutConfig::default();
        let dir = JobDirectory::new(jobs);
        let lookup = Lookup::new(dir.get(focal).unwrap(), &dir);
        let rel = extract_related(&lookup);
        let nodes = layout(&rel, &lookup, &config);
        resolve_edges(&rel, &nodes, &lookup, &config)
    }

    #[test]
    fn anchors_are_bottom_center_to_top_center() {
        let jobs = vec![
            Job::new("a").with_dependents(["b"]),
            Job::new("b").with_parent("a"),
        ];
        assert_eq!(
            edges_for("a", &jobs),
            vec![DependencyEdge {
                from_id: "a".to_string(),
                to_id: "b".to_string(),
                from_x: 80.0,
                from_y: 90.0,
                to_x: 80.0,
                to_y: 130.0,
            }]
        );
    }

    #[test]
    fn parent_outside_related_set_has_no_edge() {
        // b is a descendant of a, but claims an unrelated parent.
        let jobs = vec![
            Job::new("a").with_dependents(["b"]),
            Job::new("b").with_parent("x"),
            Job::new("x"),
        ];
        assert!(edges_for("a", &jobs).is_empty());
    }

    #[test]
    fn child_without_parent_link_has_no_edge() {
        let jobs = vec![Job::new("a").with_dependents(["b"]), Job::new("b")];
        assert!(edges_for("a", &jobs).is_empty());
    }

    #[test]
    fn same_level_parent_keeps_its_edge() {
        // c and d are both children of f; d names c as its parent.
        let jobs = vec![
            Job::new("f").with_dependents(["d", "c"]),
            Job::new("c"),
            Job::new("d").with_parent("c"),
        ];
        let got: Vec<(String, String)> = edges_for("f", &jobs)
            .into_iter()
            .map(|e| (e.from_id, e.to_id))
            .collect();
        assert_eq!(got, vec![("c".to_string(), "d".to_string())]);
    }

    #[test]
    fn upward_edge_without_cycle_is_kept() {
        // c sits one level below d but is d's parent.
        let jobs = vec![
            Job::new("f").with_dependents(["d", "x"]),
            Job::new("d").with_parent("c"),
            Job::new("x").with_dependents(["c"]),
            Job::new("c"),
        ];
        let edges = edges_for("f", &jobs);
        assert_eq!(edges.len(), 1);
        let e = &edges[0];
        assert_eq!((e.from_id.as_str(), e.to_id.as_str()), ("c", "d"));
        // bottom of level 2 to top of level 1
        assert_eq!((e.from_y, e.to_y), (290.0, 130.0));
    }

    #[test]
    fn longer_cycle_drops_only_the_closing_edge() {
        let jobs = vec![
            Job::new("a").with_parent("c"),
            Job::new("b").with_parent("a"),
            Job::new("c").with_parent("b"),
        ];
        let got: Vec<(String, String)> = edges_for("a", &jobs)
            .into_iter()
            .map(|e| (e.from_id, e.to_id))
            .collect();
        assert_eq!(
            got,
            vec![
                ("c".to_string(), "a".to_string()),
                ("b".to_string(), "c".to_string()),
            ]
        );
    }

    #[test]
    fn self_parent_has_no_edge() {
        let jobs = vec![Job::new("a").with_parent("a")];
        assert!(edges_for("a", &jobs).is_empty());
    }

    #[test]
    fn cycle_back_link_is_dropped() {
        let jobs = vec![
            Job::new("a").with_parent("b"),
            Job::new("b").with_parent("a"),
        ];
        let got: Vec<(String, String)> = edges_for("a", &jobs)
            .into_iter()
            .map(|e| (e.from_id, e.to_id))
            .collect();
        assert_eq!(got, vec![("b".to_string(), "a".to_string())]);
    }
}
