//! Fixes for flagged records.
//!
//! ## Architecture
//!
//! ```text
//! Fixer (attached to a record by a validator)
//!     ↓  plan(action id), re-reading the affected files
//! Operation (all edits for one file)
//!     ↓
//! execute (file modification)
//! ```

mod fixer;
mod operation;

use anyhow::{Result, bail};

pub use fixer::{
    FLATTEN_ACTION, FixAction, Fixer, KEEP_ACTION_PREFIX, USE_ACTION_PREFIX, apply_fixer,
};
pub use operation::{Edit, Operation, execute_operations};

use crate::core::record::ByIdRecord;

/// Statistics from applying a fix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionStats {
    /// Number of operations processed.
    pub processed: usize,
    /// Number of operations that left their file unchanged.
    pub skipped: usize,
    /// Number of edits written.
    pub changes_applied: usize,
    /// Files that were rewritten. Callers feed these back into the aggregator.
    pub files_modified: Vec<String>,
}

impl std::ops::AddAssign for ActionStats {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.changes_applied += other.changes_applied;
        for file in other.files_modified {
            if !self.files_modified.contains(&file) {
                self.files_modified.push(file);
            }
        }
    }
}

/// Invoke the fixer attached to `entry` with `action_id`.
///
/// Runs synchronously; the caller is expected to report every file in
/// [`ActionStats::files_modified`] to the aggregator afterwards.
pub fn apply_fix(entry: &ByIdRecord, action_id: &str) -> Result<ActionStats> {
    let Some(fixer) = &entry.record.fixer else {
        bail!(
            "No fix available for '{}' in {} (occurrence {})",
            entry.record.id,
            entry.file,
            entry.record.occurrence
        );
    };
    tracing::info!(id = %entry.record.id, action = action_id, "applying fix");
    apply_fixer(fixer, action_id)
}
