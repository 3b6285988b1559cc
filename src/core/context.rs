//! A loaded project: configuration, the template file set and the live
//! indices built from it.
//!
//! Commands, watch mode and the MCP server all go through [`ProjectContext`]
//! so they agree on which files belong to the project and how paths are shown.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context as _, Result};

use crate::{
    config::{Config, ConfigSource, load_config},
    core::{
        aggregator::{ResultAggregator, ScanFailure, ScanReport},
        record::{AnnotatedIndex, ByIdRecord},
        scanner::{FileFilter, scan_with_filter},
    },
    issues::{EntryIssue, Issue, ReadErrorIssue},
    validators::validate_index,
};

pub struct ProjectContext {
    /// Canonical project root.
    pub root: PathBuf,
    pub config: Config,
    /// Config file in use; `None` when running on defaults.
    pub config_path: Option<PathBuf>,
    pub filter: FileFilter,
    /// Template files found at load time, sorted.
    pub files: Vec<String>,
    pub skipped_count: usize,
    pub aggregator: Arc<ResultAggregator>,
    pub config_source: ConfigSource,
}

impl ProjectContext {
    /// Load configuration from `root` and enumerate its templates.
    ///
    /// Nothing is parsed yet; call [`ProjectContext::scan`] to build the indices.
    pub fn load(root: &Path) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Project root not found: {}", root.display()))?;
        let loaded = load_config(&root)?;
        match &loaded.path {
            Some(path) => tracing::debug!(path = %path.display(), "using config file"),
            None => tracing::debug!("no config file found, using defaults"),
        }

        let config = loaded.config;
        let filter = FileFilter::new(&root, &config.includes, &config.ignores);
        let scan = scan_with_filter(&filter);
        let config_source = ConfigSource::new(&config);

        Ok(Self {
            root,
            config,
            config_path: loaded.path,
            filter,
            files: scan.files,
            skipped_count: scan.skipped_count,
            aggregator: Arc::new(ResultAggregator::new()),
            config_source,
        })
    }

    /// Run the initial scan over the enumerated files.
    pub fn scan(&self) -> ScanReport {
        self.aggregator.initial_scan(&self.files)
    }

    /// Validate the latest snapshot with the current validator settings.
    pub fn validate(&self) -> AnnotatedIndex {
        let snapshot = self.aggregator.snapshot();
        validate_index(&snapshot.by_id, &self.config_source.validators())
    }

    /// Path relative to the root for display; unchanged when outside it.
    pub fn display_path(&self, file: &str) -> String {
        Path::new(file)
            .strip_prefix(&self.root)
            .map(|relative| relative.to_string_lossy().into_owned())
            .unwrap_or_else(|_| file.to_string())
    }

    /// The record behind `(id, index)` in an annotated index.
    pub fn entry<'a>(annotated: &'a AnnotatedIndex, id: &str, index: usize) -> Option<&'a ByIdRecord> {
        annotated.get(id).and_then(|entries| entries.get(index))
    }

    /// Flagged records and read failures as reportable issues.
    ///
    /// Ordered by file, then line and column; read failures come first.
    pub fn issues(&self, annotated: &AnnotatedIndex, failures: &[ScanFailure]) -> Vec<Issue> {
        let mut entries: Vec<EntryIssue> = annotated
            .values()
            .flat_map(|records| {
                records
                    .iter()
                    .enumerate()
                    .filter_map(|(index, entry)| EntryIssue::from_record(entry, index))
            })
            .map(|mut issue| {
                issue.context.location.file_path = self.display_path(&issue.context.location.file_path);
                issue
            })
            .collect();
        entries.sort_by(|a, b| {
            let (a, b) = (&a.context.location, &b.context.location);
            (&a.file_path, a.line, a.col).cmp(&(&b.file_path, b.line, b.col))
        });

        failures
            .iter()
            .map(|failure| {
                Issue::from(ReadErrorIssue {
                    file_path: self.display_path(&failure.file),
                    error: failure.error.clone(),
                })
            })
            .chain(entries.into_iter().map(Issue::from))
            .collect()
    }
}
