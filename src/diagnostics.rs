//! Uniform stderr diagnostics.
//!
//! Warnings are data-quality signals raised while loading jobs; they never
//! stop the run. Errors are formatted here and propagated through `anyhow`.

use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress (or re-enable) warnings for the rest of the process.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub fn warn(msg: impl AsRef<str>) {
    if !is_quiet() {
        eprintln!("WARN: {}", msg.as_ref());
    }
}

/// Build a user-facing error message with the tool prefix.
pub fn error_message(msg: impl AsRef<str>) -> String {
    format!("job-dep-viz: {}", msg.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_is_prefixed() {
        assert_eq!(
            error_message("focal job not found: a"),
            "job-dep-viz: focal job not found: a"
        );
    }
}
