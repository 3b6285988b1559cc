use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use glob::{Pattern, glob};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
const EXCLUDED_DIRS: &[&str] = &["node_modules"];

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Template paths, sorted. This is the enumeration order of the index.
    pub files: Vec<String>,
    pub skipped_count: usize,
}

/// Include/ignore rules of a project, shared by the scan and watch mode.
#[derive(Debug, Clone)]
pub struct FileFilter {
    base_dir: PathBuf,
    includes: Vec<String>,
    literal_ignore_paths: Vec<PathBuf>,
    glob_patterns: Vec<Pattern>,
}

impl FileFilter {
    pub fn new(base_dir: &Path, includes: &[String], ignore_patterns: &[String]) -> Self {
        let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
        let mut glob_patterns: Vec<Pattern> = Vec::new();

        for p in ignore_patterns {
            if is_glob_pattern(p) {
                match Pattern::new(p) {
                    Ok(pattern) => glob_patterns.push(pattern),
                    Err(e) => tracing::warn!(pattern = %p, error = %e, "invalid ignore pattern"),
                }
            } else {
                literal_ignore_paths.push(base_dir.join(p));
            }
        }

        Self {
            base_dir: base_dir.to_path_buf(),
            includes: includes.to_vec(),
            literal_ignore_paths,
            glob_patterns,
        }
    }

    /// Directories to walk.
    pub fn roots(&self) -> Vec<PathBuf> {
        if self.includes.is_empty() {
            return vec![self.base_dir.clone()];
        }
        let mut paths = Vec::new();
        for inc in &self.includes {
            if is_glob_pattern(inc) {
                let full_pattern = self.base_dir.join(inc);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten().filter(|entry| entry.is_dir())),
                    Err(e) => tracing::warn!(pattern = %inc, error = %e, "invalid include pattern"),
                }
            } else {
                let path = self.base_dir.join(inc);
                if path.exists() {
                    paths.push(path);
                } else {
                    tracing::warn!(path = %path.display(), "include path does not exist");
                }
            }
        }
        paths
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.literal_ignore_paths
            .iter()
            .any(|ignore_path| path.starts_with(ignore_path))
            || self.glob_patterns.iter().any(|p| p.matches(&path_str))
    }

    fn is_included(&self, path: &Path) -> bool {
        if self.includes.is_empty() {
            return path.starts_with(&self.base_dir);
        }
        self.includes.iter().any(|inc| {
            let include = self.base_dir.join(inc);
            if is_glob_pattern(inc) {
                match Pattern::new(&include.to_string_lossy()) {
                    Ok(pattern) => path.ancestors().any(|dir| pattern.matches_path(dir)),
                    Err(_) => false,
                }
            } else {
                path.starts_with(&include)
            }
        })
    }

    /// Whether a file (that may not have existed at scan time) belongs to the project.
    pub fn accepts(&self, path: &Path) -> bool {
        is_scannable_file(path) && self.is_included(path) && !self.is_ignored(path)
    }
}

pub fn scan_files(base_dir: &Path, includes: &[String], ignore_patterns: &[String]) -> ScanResult {
    let filter = FileFilter::new(base_dir, includes, ignore_patterns);
    scan_with_filter(&filter)
}

pub fn scan_with_filter(filter: &FileFilter) -> ScanResult {
    let mut files: BTreeSet<String> = BTreeSet::new();
    let mut skipped_count = 0;

    for dir in filter.roots() {
        for entry in WalkDir::new(dir).into_iter().filter_entry(|e| !is_excluded_dir(e)) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    tracing::warn!(error = %e, "cannot access path");
                    continue;
                }
            };
            let path = entry.path();
            if filter.is_ignored(path) {
                continue;
            }
            if entry.file_type().is_file() && is_scannable_file(path) {
                files.insert(path.to_string_lossy().into());
            }
        }
    }

    tracing::debug!(count = files.len(), skipped = skipped_count, "scanned template files");

    ScanResult {
        files: files.into_iter().collect(),
        skipped_count,
    }
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

pub fn is_scannable_file(path: &Path) -> bool {
    let excluded = path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
    });
    !excluded && matches!(path.extension().and_then(|e| e.to_str()), Some("html"))
}
