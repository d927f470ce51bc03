//! Subgraph extraction: find every job related to the focal job and give it a
//! signed level (ancestors negative, descendants positive).
//!
//! Source data may be cyclic. Each direction keeps its own visited set, so
//! each walk touches every job at most once; the focal job seeds both walks.

use crate::graph::Lookup;

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Related jobs with their levels, in discovery order (focal, then the
/// ancestor chain upward, then descendants depth-first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relatives<'a> {
    order: Vec<&'a str>,
    levels: HashMap<&'a str, i32>,
}

impl<'a> Relatives<'a> {
    fn new(focal: &'a str) -> Self {
        let mut rel = Self {
            order: Vec::new(),
            levels: HashMap::new(),
        };
        rel.assign(focal, 0);
        rel
    }

    /// First assignment wins; later ones are ignored.
    fn assign(&mut self, name: &'a str, level: i32) {
        if let Entry::Vacant(e) = self.levels.entry(name) {
            e.insert(level);
            self.order.push(name);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.order.iter().copied()
    }

    pub fn level(&self, name: &str) -> Option<i32> {
        self.levels.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.levels.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

pub fn extract_related<'a>(lookup: &Lookup<'a>) -> Relatives<'a> {
    let focal = lookup.focal_name();
    let mut rel = Relatives::new(focal);

    walk_ancestors(lookup, focal, &mut rel);
    walk_descendants(lookup, focal, &mut rel);

    rel
}

fn walk_ancestors<'a>(lookup: &Lookup<'a>, start: &'a str, rel: &mut Relatives<'a>) {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut cur = start;

    while visited.insert(cur) {
        let Some(parent) = lookup
            .get(cur)
            .and_then(|job| job.parent_job.as_deref())
            .and_then(|p| lookup.get(p))
        else {
            break;
        };

        let level = rel.level(cur).unwrap_or_default() - 1;
        rel.assign(parent.name.as_str(), level);
        cur = parent.name.as_str();
    }
}

/// Depth-first, children in listed order. Iterative so a long chain cannot
/// exhaust the call stack.
fn walk_descendants<'a>(lookup: &Lookup<'a>, start: &'a str, rel: &mut Relatives<'a>) {
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(start);

    // (job name, index of the next child to try)
    let mut stack: Vec<(&'a str, usize)> = vec![(start, 0)];

    while let Some(frame) = stack.last_mut() {
        let (name, next) = *frame;
        let children = lookup
            .get(name)
            .map(|job| job.dependent_jobs.as_slice())
            .unwrap_or_default();

        let Some(child_name) = children.get(next) else {
            stack.pop();
            continue;
        };
        frame.1 += 1;

        let Some(child) = lookup.get(child_name) else {
            continue;
        };
        let child = child.name.as_str();
        if !visited.insert(child) {
            continue;
        }

        let level = rel.level(name).unwrap_or_default() + 1;
        rel.assign(child, level);
        stack.push((child, 0));
    }
}
