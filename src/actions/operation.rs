//! Low-level text edits on template files.

use std::{collections::BTreeSet, fs, io::Write, ops::Range};

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::actions::ActionStats;

/// Replace `range` (byte offsets) with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub replacement: String,
    /// 1-based line of the edit start, for previews.
    pub line: usize,
}

/// Every edit for one file, applied together in a single write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub file_path: String,
    pub edits: Vec<Edit>,
}

impl Operation {
    /// Apply all edits to `source`. Edits must not overlap.
    pub fn apply_to(&self, source: &str) -> Result<String> {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        edits.sort_by_key(|edit| edit.range.start);

        for pair in edits.windows(2) {
            if pair[0].range.end > pair[1].range.start {
                bail!(
                    "Overlapping edits in {} at bytes {:?} and {:?}",
                    self.file_path,
                    pair[0].range,
                    pair[1].range
                );
            }
        }

        let mut result = source.to_string();
        // Back to front so earlier offsets stay valid.
        for edit in edits.iter().rev() {
            if edit.range.end > result.len()
                || !result.is_char_boundary(edit.range.start)
                || !result.is_char_boundary(edit.range.end)
            {
                bail!(
                    "Edit range {:?} is outside of {} (file changed?)",
                    edit.range,
                    self.file_path
                );
            }
            result.replace_range(edit.range.clone(), &edit.replacement);
        }
        Ok(result)
    }

    /// Rewrite the file. Returns false when the edits left it unchanged.
    pub fn execute(&self) -> Result<bool> {
        let source = fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path))?;
        let updated = self.apply_to(&source)?;
        if updated == source {
            return Ok(false);
        }
        fs::write(&self.file_path, updated)
            .with_context(|| format!("Failed to write {}", self.file_path))?;
        tracing::debug!(file = %self.file_path, edits = self.edits.len(), "applied fix");
        Ok(true)
    }

    /// Write what `execute` would change.
    pub fn preview_to<W: Write>(&self, writer: &mut W) {
        for edit in &self.edits {
            let _ = writeln!(
                writer,
                "  {} {}:{} {} {}",
                "-->".blue(),
                self.file_path,
                edit.line,
                "=>".dimmed(),
                edit.replacement.green()
            );
        }
    }
}

/// Execute operations, one write per file.
pub fn execute_operations(ops: &[Operation]) -> Result<ActionStats> {
    let mut files_modified: BTreeSet<&str> = BTreeSet::new();
    let mut changes_applied = 0;
    let mut skipped = 0;

    for op in ops {
        if op.execute()? {
            changes_applied += op.edits.len();
            files_modified.insert(&op.file_path);
        } else {
            skipped += 1;
        }
    }

    Ok(ActionStats {
        processed: ops.len(),
        skipped,
        changes_applied,
        files_modified: files_modified.into_iter().map(String::from).collect(),
    })
}
