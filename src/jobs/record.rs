//! Job records as the scheduler's REST API returns them.
//!
//! JSON shape (only the fields we read; everything else is ignored):
//! {
//!   "name": "nightly-export",
//!   "displayname": "Nightly export",   // optional label
//!   "parent_job": "nightly-dump",      // optional, single parent
//!   "dependent_jobs": ["notify"],      // optional, ordered children
//!   "status": "success"                // success | failed | running | untriggered
//! }
//!
//! Records come from loosely typed JSON, so every optional field has a defined
//! default instead of a presence check at the use site.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Job {
    #[serde(default, deserialize_with = "deserialize_name")]
    pub name: String,

    #[serde(
        default,
        alias = "displayName",
        deserialize_with = "deserialize_non_empty"
    )]
    pub displayname: Option<String>,

    #[serde(default, alias = "parentJob", deserialize_with = "deserialize_non_empty")]
    pub parent_job: Option<String>,

    #[serde(
        default,
        alias = "dependentJobs",
        deserialize_with = "deserialize_dependents"
    )]
    pub dependent_jobs: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_status")]
    pub status: JobStatus,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_job = Some(parent.into());
        self
    }

    pub fn with_dependents<I, S>(mut self, dependents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependent_jobs = dependents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_display_name(mut self, label: impl Into<String>) -> Self {
        self.displayname = Some(label.into());
        self
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    /// Human label, falling back to `name`.
    pub fn display_name(&self) -> &str {
        self.displayname.as_deref().unwrap_or(&self.name)
    }
}

/// Last known execution status of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Success,
    Failed,
    Running,
    #[default]
    Untriggered,
}

impl JobStatus {
    /// Lenient parse: anything unrecognized counts as never triggered.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => JobStatus::Success,
            "failed" => JobStatus::Failed,
            "running" => JobStatus::Running,
            _ => JobStatus::Untriggered,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
            JobStatus::Running => "running",
            JobStatus::Untriggered => "untriggered",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn deserialize_name<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    // The API sends "" for an unset parent.
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

fn deserialize_dependents<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(v.into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect())
}

fn deserialize_status<'de, D>(deserializer: D) -> std::result::Result<JobStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.as_deref().map(JobStatus::parse).unwrap_or_default())
}
