//! Job layer: the scheduler's job records and the name index over them.
//!
//! Kept apart from graph construction and rendering. It owns:
//! - Job / JobStatus (lenient serde models)
//! - JobDirectory (name lookup) and jobs-file loading + data-quality checks

pub mod directory;
pub mod record;

pub use directory::{DirectoryReport, JobDirectory, MAX_DIAGRAM_JOBS, inspect, load_jobs, parse_jobs};
pub use record::{Job, JobStatus};
