//! Owns the file and identifier indices.
//!
//! State machine: `Uninitialized -> Initializing -> Initialized`. File change
//! events received before `Initialized` are queued and replayed once the
//! initial scan has been published. Observers receive whole
//! [`IndexSnapshot`]s through a `watch` channel, so they never see an index
//! that is only partly patched.

use std::{
    fs, io,
    path::Path,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tokio::sync::watch;

use crate::core::{
    parsers::html::parse_html,
    record::{IndexSnapshot, OccurrenceRecord},
    walker::walk_document,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Uninitialized,
    Initializing,
    Initialized,
}

/// A template that could not be read during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub files_scanned: usize,
    pub failures: Vec<ScanFailure>,
    /// True when the call did nothing because a scan had already started.
    pub ignored: bool,
}

/// What `on_file_changed` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    /// Re-walked and published.
    Updated,
    /// File no longer exists; its records were dropped.
    Removed,
    /// Initial scan not finished yet; replayed later.
    Queued,
}

struct Inner {
    state: ScanState,
    pending: Vec<String>,
}

pub struct ResultAggregator {
    inner: Mutex<Inner>,
    snapshot: watch::Sender<Arc<IndexSnapshot>>,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: ScanState::Uninitialized,
                pending: Vec::new(),
            }),
            snapshot: watch::Sender::new(Arc::new(IndexSnapshot::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ScanState {
        self.lock().state
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<IndexSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Walk every file and build both indices from scratch.
    ///
    /// Reads and parses in parallel, then merges sequentially in the order of
    /// `files`. Unreadable files are logged and reported; the rest of the scan
    /// is kept. A no-op unless the aggregator is still uninitialized.
    pub fn initial_scan(&self, files: &[String]) -> ScanReport {
        {
            let mut inner = self.lock();
            if inner.state != ScanState::Uninitialized {
                tracing::debug!(state = ?inner.state, "initial scan already started, ignoring");
                return ScanReport {
                    ignored: true,
                    ..ScanReport::default()
                };
            }
            inner.state = ScanState::Initializing;
        }

        tracing::debug!(files = files.len(), "initial scan started");
        let walked: Vec<(&String, Result<Vec<OccurrenceRecord>>)> = files
            .par_iter()
            .map(|file| (file, walk_file(Path::new(file))))
            .collect();

        let mut snapshot = IndexSnapshot::default();
        let mut report = ScanReport::default();
        for (file, result) in walked {
            match result {
                Ok(records) => {
                    snapshot.insert_file(file, records);
                    report.files_scanned += 1;
                }
                Err(e) => {
                    tracing::warn!(file = %file, error = %format!("{:#}", e), "failed to read template");
                    report.failures.push(ScanFailure {
                        file: file.clone(),
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        let pending = {
            let mut inner = self.lock();
            self.snapshot.send_replace(Arc::new(snapshot));
            inner.state = ScanState::Initialized;
            std::mem::take(&mut inner.pending)
        };
        tracing::debug!(
            scanned = report.files_scanned,
            failed = report.failures.len(),
            "initial scan finished"
        );

        for file in pending {
            if let Err(e) = self.on_file_changed(&file) {
                tracing::warn!(file = %file, error = %format!("{:#}", e), "failed to apply queued change");
            }
        }
        report
    }

    /// Re-walk one file and patch both indices.
    ///
    /// A file that no longer exists is removed from the indices. Before the
    /// initial scan is published, the event is queued instead. The file is
    /// read under the index lock, so snapshots are published in the order the
    /// file was read.
    pub fn on_file_changed(&self, file: &str) -> Result<FileChange> {
        let mut inner = self.lock();
        if inner.state != ScanState::Initialized {
            tracing::debug!(file, "queueing change until initial scan completes");
            if !inner.pending.iter().any(|queued| queued == file) {
                inner.pending.push(file.to_string());
            }
            return Ok(FileChange::Queued);
        }

        let walked = match walk_file(Path::new(file)) {
            Ok(records) => Some(records),
            Err(e) if is_not_found(&e) => None,
            Err(e) => return Err(e),
        };

        let mut snapshot = IndexSnapshot::clone(&self.snapshot.borrow());
        let change = match walked {
            Some(records) => {
                snapshot.replace_file(file, records);
                FileChange::Updated
            }
            None => {
                snapshot.remove_file(file);
                FileChange::Removed
            }
        };
        self.snapshot.send_replace(Arc::new(snapshot));
        drop(inner);
        tracing::debug!(file, ?change, "file re-indexed");
        Ok(change)
    }
}

fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

/// Read, parse and walk one template.
pub fn walk_file(path: &Path) -> Result<Vec<OccurrenceRecord>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read template: {}", path.display()))?;
    let doc = parse_html(source, &path.to_string_lossy());
    if !doc.errors.is_empty() {
        tracing::debug!(file = %path.display(), errors = doc.errors.len(), "recovered from markup errors");
    }
    Ok(walk_document(&doc))
}
