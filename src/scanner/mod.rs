//! Source discovery and in-place specialization
//!
//! [`directory`] finds candidate files, [`file`] plans and applies the change
//! for one file, and [`Specializer`] runs the two over a whole tree.

pub mod directory;
pub mod file;
pub mod types;

use anyhow::Result;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{ExtractConfig, ParallelConfig};
use crate::filter::{Dimensionality, DirectiveFilter};
use crate::parallel::ExecutionStrategy;

pub use directory::DirectoryHandler;
pub use types::{FileAction, FileChange, FilePlan, Outcome, PlanningFailed, ProcessError, RunReport};

/// Specializes every source file below the configured roots
///
/// A run happens in two phases. Planning reads and filters every file and
/// writes nothing; it may run on worker threads. Only when every file planned
/// cleanly are the plans applied, in path order, on the calling thread. A
/// malformed file anywhere in the tree therefore leaves the whole tree as it was.
pub struct Specializer {
    filter: DirectiveFilter,
    directories: DirectoryHandler,
    roots: Vec<PathBuf>,
    parallel: ParallelConfig,
}

impl Specializer {
    pub fn from_config(config: &ExtractConfig) -> Result<Self> {
        Ok(Self {
            filter: DirectiveFilter::new(config.selector()),
            directories: DirectoryHandler::from_config(config)?,
            roots: config.roots.clone(),
            parallel: config.parallel.clone(),
        })
    }

    /// Files a run would examine
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        self.directories.collect_source_files(&self.roots)
    }

    /// Execution strategy for `file_count` files under the configured limits
    pub fn strategy(&self, file_count: usize) -> ExecutionStrategy {
        ExecutionStrategy::for_mode(
            self.parallel.mode,
            file_count,
            self.parallel.min_files_for_parallel,
            self.parallel.max_threads,
            self.parallel.thread_percentage,
        )
    }

    /// Plan every file, failing with [`PlanningFailed`] if any file cannot be specialized
    pub fn plan<P>(&self, files: Vec<PathBuf>, target: Dimensionality, progress: Option<P>) -> Result<Vec<FilePlan>>
    where
        P: Fn(usize, usize) + Send + Sync,
    {
        let files_examined = files.len();
        let strategy = self.strategy(files_examined);
        tracing::info!(files = files_examined, ?strategy, "planning specialization for {}D", target);

        let filter = &self.filter;
        let results = strategy.execute(files, |path| file::plan(path, filter, target), progress)?;

        let mut plans = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(plan) => plans.push(plan),
                Err(e) => failures.push(e),
            }
        }

        if !failures.is_empty() {
            return Err(PlanningFailed { failures, files_examined }.into());
        }
        Ok(plans)
    }

    /// Specialize the tree for `target`
    ///
    /// With `dry_run` the report describes what would change and no file is touched.
    pub fn run<P>(&self, target: Dimensionality, dry_run: bool, progress: Option<P>) -> Result<RunReport>
    where
        P: Fn(usize, usize) + Send + Sync,
    {
        let files = self.collect()?;
        self.specialize(files, target, dry_run, progress)
    }

    /// Specialize an already enumerated list of files
    pub fn specialize<P>(
        &self,
        files: Vec<PathBuf>,
        target: Dimensionality,
        dry_run: bool,
        progress: Option<P>,
    ) -> Result<RunReport>
    where
        P: Fn(usize, usize) + Send + Sync,
    {
        let start_time = Instant::now();
        let plans = self.plan(files, target, progress)?;

        let mut report = RunReport::new(target, dry_run, plans.len());
        for plan in &plans {
            let outcome = if dry_run { plan.outcome() } else { plan.apply()? };
            report.record(plan, outcome);
        }

        report.duration_ms = start_time.elapsed().as_millis() as u64;
        tracing::info!(
            rewritten = report.rewritten,
            deleted = report.deleted,
            unchanged = report.unchanged,
            "specialization finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ExecutionMode;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_for(root: &Path, mode: ExecutionMode) -> ExtractConfig {
        ExtractConfig {
            selector: "NDIMS".to_string(),
            roots: vec![root.join("src"), root.join("include")],
            include: vec!["*.c".to_string(), "*.h".to_string()],
            use_gitignore: false,
            follow_symlinks: false,
            parallel: ParallelConfig {
                mode,
                max_threads: 2,
                ..ParallelConfig::default()
            },
        }
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(
            &root.join("src/main.c"),
            "#include \"domain.h\"\n#if NDIMS == 2\nstatic const int n = 2;\n#else\nstatic const int n = 3;\n#endif\n",
        );
        write(&root.join("src/fluid/uz.c"), "#if NDIMS == 3\nvoid update_uz(void) {}\n#endif\n");
        write(&root.join("include/domain.h"), "#pragma once\ntypedef struct domain_t domain_t;\n");
        temp_dir
    }

    #[test]
    fn test_run_specializes_tree() {
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let temp_dir = fixture();
            let root = temp_dir.path();
            let specializer = Specializer::from_config(&config_for(root, mode)).unwrap();

            let report = specializer
                .run(Dimensionality::Two, false, None::<fn(usize, usize)>)
                .unwrap();

            assert_eq!(report.ndims, 2);
            assert_eq!(report.files_examined, 3);
            assert_eq!((report.rewritten, report.deleted, report.unchanged), (1, 1, 1));
            assert_eq!(
                fs::read_to_string(root.join("src/main.c")).unwrap(),
                "#include \"domain.h\"\nstatic const int n = 2;\n"
            );
            assert!(!root.join("src/fluid/uz.c").exists());
            assert!(root.join("include/domain.h").exists());

            let changed: Vec<_> = report.changes.iter().map(|c| (c.path.clone(), c.outcome)).collect();
            assert_eq!(
                changed,
                vec![
                    (root.join("src/fluid/uz.c"), Outcome::Deleted),
                    (root.join("src/main.c"), Outcome::Rewritten),
                ]
            );
        }
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let temp_dir = fixture();
        let specializer = Specializer::from_config(&config_for(temp_dir.path(), ExecutionMode::Auto)).unwrap();

        specializer.run(Dimensionality::Three, false, None::<fn(usize, usize)>).unwrap();
        let again = specializer.run(Dimensionality::Three, false, None::<fn(usize, usize)>).unwrap();

        assert_eq!(again.files_examined, 3);
        assert_eq!(again.unchanged, 3);
        assert!(again.changes.is_empty());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        let before = fs::read_to_string(root.join("src/main.c")).unwrap();
        let specializer = Specializer::from_config(&config_for(root, ExecutionMode::Sequential)).unwrap();

        let report = specializer.run(Dimensionality::Two, true, None::<fn(usize, usize)>).unwrap();

        assert!(report.dry_run);
        assert_eq!((report.rewritten, report.deleted), (1, 1));
        assert_eq!(fs::read_to_string(root.join("src/main.c")).unwrap(), before);
        assert!(root.join("src/fluid/uz.c").exists());
    }

    #[test]
    fn test_malformed_file_aborts_before_any_write() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        write(&root.join("src/zz_broken.c"), "#if NDIMS == 2\nint x;\n");
        let before = fs::read_to_string(root.join("src/main.c")).unwrap();
        let specializer = Specializer::from_config(&config_for(root, ExecutionMode::Parallel)).unwrap();

        let err = specializer
            .run(Dimensionality::Two, false, None::<fn(usize, usize)>)
            .unwrap_err();

        let failed = err.downcast_ref::<PlanningFailed>().expect("planning failure");
        assert_eq!(failed.files_examined, 4);
        assert_eq!(failed.failures.len(), 1);
        assert_eq!(failed.failures[0].path(), root.join("src/zz_broken.c"));

        assert_eq!(fs::read_to_string(root.join("src/main.c")).unwrap(), before);
        assert!(root.join("src/fluid/uz.c").exists());
    }

    #[test]
    fn test_non_utf8_file_aborts_before_any_write() {
        let temp_dir = fixture();
        let root = temp_dir.path();
        fs::write(root.join("include/latin1.h"), b"#if NDIMS==2\n\xe9t\xe9\n#endif\n").unwrap();
        let before = fs::read_to_string(root.join("src/main.c")).unwrap();
        let specializer = Specializer::from_config(&config_for(root, ExecutionMode::Sequential)).unwrap();

        let err = specializer
            .run(Dimensionality::Two, false, None::<fn(usize, usize)>)
            .unwrap_err();

        let failed = err.downcast_ref::<PlanningFailed>().expect("planning failure");
        assert_eq!(failed.failures.len(), 1);
        match &failed.failures[0] {
            ProcessError::Io { path, source } => {
                assert_eq!(path, &root.join("include/latin1.h"));
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(fs::read_to_string(root.join("src/main.c")).unwrap(), before);
        assert!(root.join("src/fluid/uz.c").exists());
    }
}
