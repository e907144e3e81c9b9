//! Best-effort adapter for calls into optional collaborators.
//!
//! Backend entry points, the breadcrumb hub and the script loader all return
//! `Result`s. The dispatcher routes every such call through [`best_effort`],
//! which logs and discards the failure so nothing reaches the host page.

use std::fmt::Display;

use tracing::debug;

/// Run a fallible call, keeping its value on success. Failures are logged
/// at debug level and dropped.
pub fn best_effort<T, E, F>(operation: &str, call: F) -> Option<T>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    match call() {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(operation, error = %e, "best-effort call failed, discarded");
            None
        }
    }
}
