use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::filter::{Dimensionality, FilterError};

/// What specialization will do to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileAction {
    /// Replace the content with the filtered text
    Rewrite(String),
    /// Nothing survives for the target dimensionality
    Delete,
    /// The filter kept every line
    Unchanged,
}

/// The planned change for one file, computed without touching the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlan {
    pub path: PathBuf,
    pub action: FileAction,
    pub lines_before: usize,
    pub lines_after: usize,
}

/// What happened (or would happen, in a dry run) to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Rewritten,
    Deleted,
    Unchanged,
}

/// Failure to specialize one file, tagged with its path
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{}: {source}", .path.display())]
    Structure { path: PathBuf, source: FilterError },

    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
}

impl ProcessError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ProcessError::Structure { path, .. } | ProcessError::Io { path, .. } => path,
        }
    }
}

/// Planning failed for at least one file; nothing was written
#[derive(Error, Debug)]
#[error("{} of {files_examined} file(s) could not be specialized, no files were modified", .failures.len())]
pub struct PlanningFailed {
    pub failures: Vec<ProcessError>,
    pub files_examined: usize,
}

/// One file touched by a run
#[derive(Debug, Clone, Serialize)]
pub struct FileChange {
    pub path: PathBuf,
    pub outcome: Outcome,
    pub lines_before: usize,
    pub lines_after: usize,
}

/// Summary of a specialization run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub ndims: u8,
    pub dry_run: bool,
    pub files_examined: usize,
    pub rewritten: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub duration_ms: u64,
    /// Rewritten and deleted files, in path order
    pub changes: Vec<FileChange>,
}

impl RunReport {
    pub fn new(target: Dimensionality, dry_run: bool, files_examined: usize) -> Self {
        Self {
            ndims: target.value(),
            dry_run,
            files_examined,
            rewritten: 0,
            deleted: 0,
            unchanged: 0,
            duration_ms: 0,
            changes: Vec::new(),
        }
    }

    pub fn record(&mut self, plan: &FilePlan, outcome: Outcome) {
        match outcome {
            Outcome::Rewritten => self.rewritten += 1,
            Outcome::Deleted => self.deleted += 1,
            Outcome::Unchanged => {
                self.unchanged += 1;
                return;
            }
        }
        self.changes.push(FileChange {
            path: plan.path.clone(),
            outcome,
            lines_before: plan.lines_before,
            lines_after: plan.lines_after,
        });
    }
}
