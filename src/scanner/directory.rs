use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::ExtractConfig;

/// File discovery for a specialization run
///
/// Walks every root recursively and keeps the files whose *name* matches one
/// of the include patterns (`*.c`, `*.h` by default). The walk does not skip
/// anything unless `use_gitignore` is set, in which case `.gitignore`,
/// `.ignore` and hidden entries are honoured the way ripgrep does.
///
/// The returned list is sorted and free of duplicates, so overlapping roots
/// and the order roots are listed in make no difference.
#[derive(Debug)]
pub struct DirectoryHandler {
    include: GlobSet,
    use_gitignore: bool,
    follow_symlinks: bool,
}

impl DirectoryHandler {
    pub fn new(patterns: &[String], use_gitignore: bool, follow_symlinks: bool) -> Result<Self> {
        Ok(Self {
            include: build_globset(patterns)?,
            use_gitignore,
            follow_symlinks,
        })
    }

    pub fn from_config(config: &ExtractConfig) -> Result<Self> {
        Self::new(&config.include, config.use_gitignore, config.follow_symlinks)
    }

    /// Whether the file name of `path` matches the include patterns
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.include.is_match(Path::new(name)))
    }

    /// Collect every source file below `roots`
    ///
    /// Roots that do not exist are skipped with a warning. Errors while walking
    /// an existing root abort the collection, since a silently missed file
    /// would stay unspecialized.
    pub fn collect_source_files(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = BTreeSet::new();

        for root in roots {
            if !root.exists() {
                tracing::warn!("Skipping missing root directory: {}", root.display());
                continue;
            }

            let walker = WalkBuilder::new(root)
                .standard_filters(self.use_gitignore)
                .follow_links(self.follow_symlinks)
                .sort_by_file_name(|a, b| a.cmp(b))
                .build();

            for entry in walker {
                let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
                if entry.file_type().is_some_and(|ft| ft.is_file()) && self.is_source_file(entry.path()) {
                    files.insert(entry.into_path());
                }
            }
        }

        tracing::debug!(count = files.len(), "collected source files");
        Ok(files.into_iter().collect())
    }
}

/// Compile file-name patterns into one matcher
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid include pattern: {pattern}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
