use crate::Result;
use crate::diagnostics;
use crate::jobs::Job;

use anyhow::Context;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Read;

/// Largest collection we expect to lay out in a single diagram. Larger inputs
/// still work (everything is linear in the job count) but get a warning.
pub const MAX_DIAGRAM_JOBS: usize = 5000;

/// Accepted top-level shapes of a jobs file: a bare array, or the list
/// endpoint's `{ "data": [...], "total": n }` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JobsFile {
    List(Vec<Job>),
    Envelope {
        data: Vec<Job>,
        #[serde(default)]
        total: Option<u64>,
    },
}

impl JobsFile {
    pub fn into_jobs(self) -> Vec<Job> {
        match self {
            JobsFile::List(jobs) | JobsFile::Envelope { data: jobs, .. } => jobs,
        }
    }
}

/// Read a jobs file (or stdin for `-`).
pub fn load_jobs(path: &str) -> Result<Vec<Job>> {
    let text = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .with_context(|| diagnostics::error_message("read jobs from stdin"))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| diagnostics::error_message(format!("read jobs file {}", path)))?
    };

    parse_jobs(&text).with_context(|| diagnostics::error_message(format!("parse jobs {}", path)))
}

pub fn parse_jobs(text: &str) -> Result<Vec<Job>> {
    let file: JobsFile = serde_json::from_str(text)?;
    if let JobsFile::Envelope {
        data,
        total: Some(total),
    } = &file
    {
        if (data.len() as u64) < *total {
            diagnostics::warn(format!(
                "jobs file holds {} of {} jobs; the diagram may be incomplete",
                data.len(),
                total
            ));
        }
    }
    Ok(file.into_jobs())
}

/// Name index over a job collection. Borrowed; the records are never mutated.
///
/// On duplicate names the first record wins. Records with an empty name are
/// not indexed.
#[derive(Debug, Clone, Default)]
pub struct JobDirectory<'a> {
    by_name: HashMap<&'a str, &'a Job>,
}

impl<'a> JobDirectory<'a> {
    pub fn new(jobs: &'a [Job]) -> Self {
        let mut by_name = HashMap::with_capacity(jobs.len());
        for job in jobs {
            if job.name.is_empty() {
                continue;
            }
            by_name.entry(job.name.as_str()).or_insert(job);
        }
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&'a Job> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Data-quality findings for a job collection. None of these stop the core;
/// they are reported so operators can fix their job definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryReport {
    pub jobs: usize,
    pub unnamed: usize,
    pub duplicate_names: Vec<String>,
    /// (job, referenced name) pairs where the reference does not resolve.
    pub dangling_references: Vec<(String, String)>,
    /// Parent-link cycles, each rotated to start at its smallest name.
    pub parent_cycles: Vec<Vec<String>>,
}

impl DirectoryReport {
    pub fn has_issues(&self) -> bool {
        self.unnamed > 0
            || !self.duplicate_names.is_empty()
            || !self.dangling_references.is_empty()
            || !self.parent_cycles.is_empty()
    }

    /// Emit one warning per finding.
    pub fn warn_all(&self) {
        if self.jobs > MAX_DIAGRAM_JOBS {
            diagnostics::warn(format!(
                "{} jobs exceeds the practical diagram size of {}",
                self.jobs, MAX_DIAGRAM_JOBS
            ));
        }
        if self.unnamed > 0 {
            diagnostics::warn(format!("{} job(s) without a name were ignored", self.unnamed));
        }
        for name in &self.duplicate_names {
            diagnostics::warn(format!("duplicate job name '{}', keeping the first", name));
        }
        for (job, missing) in &self.dangling_references {
            diagnostics::warn(format!("job '{}' references missing job '{}'", job, missing));
        }
        for cycle in &self.parent_cycles {
            diagnostics::warn(format!("parent_job cycle: {}", cycle.join(" -> ")));
        }
    }
}

pub fn inspect(jobs: &[Job]) -> DirectoryReport {
    let dir = JobDirectory::new(jobs);

    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();
    let mut unnamed = 0;
    for job in jobs {
        if job.name.is_empty() {
            unnamed += 1;
        } else if !seen.insert(job.name.as_str()) {
            duplicates.insert(job.name.clone());
        }
    }

    let mut dangling = Vec::new();
    for job in jobs.iter().filter(|j| !j.name.is_empty()) {
        let refs = job.parent_job.iter().chain(job.dependent_jobs.iter());
        for r in refs {
            if !dir.contains(r) {
                dangling.push((job.name.clone(), r.clone()));
            }
        }
    }
    dangling.sort();
    dangling.dedup();

    DirectoryReport {
        jobs: jobs.len(),
        unnamed,
        duplicate_names: duplicates.into_iter().collect(),
        dangling_references: dangling,
        parent_cycles: parent_cycles(&dir, jobs),
    }
}

/// Find cycles in the parent relation. Each job has at most one parent, so
/// every chain either ends or loops; each job is walked at most once overall.
fn parent_cycles(dir: &JobDirectory<'_>, jobs: &[Job]) -> Vec<Vec<String>> {
    let mut done: HashSet<&str> = HashSet::new();
    let mut cycles = Vec::new();

    for start in jobs.iter().filter(|j| !j.name.is_empty()) {
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: HashMap<&str, usize> = HashMap::new();
        let mut cur = Some(start.name.as_str());

        while let Some(name) = cur {
            if done.contains(name) {
                break;
            }
            if let Some(&pos) = on_path.get(name) {
                let mut cycle: Vec<String> = path[pos..].iter().map(|s| s.to_string()).collect();
                if let Some(min_at) = cycle
                    .iter()
                    .enumerate()
                    .min_by(|a, b| a.1.cmp(b.1))
                    .map(|(i, _)| i)
                {
                    cycle.rotate_left(min_at);
                }
                cycles.push(cycle);
                break;
            }
            on_path.insert(name, path.len());
            path.push(name);
            cur = dir
                .get(name)
                .and_then(|j| j.parent_job.as_deref())
                .filter(|p| dir.contains(p));
        }

        done.extend(path);
    }

    cycles.sort();
    cycles
}
