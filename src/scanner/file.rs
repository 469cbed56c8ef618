//! Reading, planning and writing back a single source file

use std::fs;
use std::path::Path;

use super::types::{FileAction, FilePlan, Outcome, ProcessError};
use crate::filter::{Dimensionality, DirectiveFilter};

/// Split text into lines that keep their own terminators
///
/// Concatenating the result reproduces the input byte for byte, including
/// `\r\n` endings and a missing newline on the last line.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split_inclusive('\n').collect()
}

/// Read `path` and work out what specializing it for `target` means
pub fn plan(path: &Path, filter: &DirectiveFilter, target: Dimensionality) -> Result<FilePlan, ProcessError> {
    let content = fs::read_to_string(path).map_err(|source| ProcessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    plan_content(path, &content, filter, target)
}

/// Same as [`plan`] for content already in memory
pub fn plan_content(
    path: &Path,
    content: &str,
    filter: &DirectiveFilter,
    target: Dimensionality,
) -> Result<FilePlan, ProcessError> {
    let lines = split_lines(content);
    let kept = filter
        .filter(lines.iter().copied(), target)
        .map_err(|source| ProcessError::Structure {
            path: path.to_path_buf(),
            source,
        })?;

    // `kept` is a subsequence of `lines`, so equal length means identical
    let action = if kept.is_empty() {
        FileAction::Delete
    } else if kept.len() == lines.len() {
        FileAction::Unchanged
    } else {
        FileAction::Rewrite(kept.concat())
    };

    Ok(FilePlan {
        path: path.to_path_buf(),
        action,
        lines_before: lines.len(),
        lines_after: kept.len(),
    })
}

impl FilePlan {
    /// Outcome this plan produces when applied
    pub fn outcome(&self) -> Outcome {
        match self.action {
            FileAction::Rewrite(_) => Outcome::Rewritten,
            FileAction::Delete => Outcome::Deleted,
            FileAction::Unchanged => Outcome::Unchanged,
        }
    }

    /// Write the filtered content back, or delete the file if nothing is left
    pub fn apply(&self) -> Result<Outcome, ProcessError> {
        let io_error = |source| ProcessError::Io {
            path: self.path.clone(),
            source,
        };

        match &self.action {
            FileAction::Rewrite(content) => fs::write(&self.path, content).map_err(io_error)?,
            FileAction::Delete => fs::remove_file(&self.path).map_err(io_error)?,
            FileAction::Unchanged => {}
        }

        tracing::debug!(path = %self.path.display(), outcome = ?self.outcome(), "applied");
        Ok(self.outcome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterError;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    const SOURCE: &str = "#include \"domain.h\"\n#if NDIMS == 2\nint n = 2;\n#else\nint n = 3;\n#endif\n";

    #[test]
    fn test_split_lines_round_trips() {
        let content = "a\r\nb\n\nc";
        let lines = split_lines(content);
        assert_eq!(lines, ["a\r\n", "b\n", "\n", "c"]);
        assert_eq!(lines.concat(), content);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_plan_rewrite() {
        let plan = plan_content(Path::new("x.c"), SOURCE, &DirectiveFilter::default(), Dimensionality::Three).unwrap();
        assert_eq!(
            plan.action,
            FileAction::Rewrite("#include \"domain.h\"\nint n = 3;\n".to_string())
        );
        assert_eq!(plan.lines_before, 6);
        assert_eq!(plan.lines_after, 2);
        assert_eq!(plan.outcome(), Outcome::Rewritten);
    }

    #[test]
    fn test_plan_delete_and_unchanged() {
        let filter = DirectiveFilter::default();
        let only_3d = "#if NDIMS == 3\nvoid f(void);\n#endif\n";
        let plan = plan_content(Path::new("f.h"), only_3d, &filter, Dimensionality::Two).unwrap();
        assert_eq!(plan.action, FileAction::Delete);

        let plain = "int main(void) { return 0; }\n";
        let plan = plan_content(Path::new("m.c"), plain, &filter, Dimensionality::Two).unwrap();
        assert_eq!(plan.action, FileAction::Unchanged);

        let plan = plan_content(Path::new("empty.c"), "", &filter, Dimensionality::Two).unwrap();
        assert_eq!(plan.action, FileAction::Delete);
    }

    #[test]
    fn test_plan_reports_structure_errors_with_path() {
        let err = plan_content(Path::new("bad.c"), "#if NDIMS==2\nx\n", &DirectiveFilter::default(), Dimensionality::Two)
            .unwrap_err();
        assert_eq!(err.path(), Path::new("bad.c"));
        match &err {
            ProcessError::Structure { source, .. } => {
                assert!(matches!(source, FilterError::UnclosedConditional { line: 1, .. }))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("bad.c: line 1:"));
    }

    #[test]
    fn test_apply_writes_and_deletes() {
        let temp_dir = TempDir::new().unwrap();
        let filter = DirectiveFilter::default();

        let kept = temp_dir.path().join("kept.c");
        fs::write(&kept, SOURCE).unwrap();
        let outcome = plan(&kept, &filter, Dimensionality::Two).unwrap().apply().unwrap();
        assert_eq!(outcome, Outcome::Rewritten);
        assert_eq!(fs::read_to_string(&kept).unwrap(), "#include \"domain.h\"\nint n = 2;\n");

        let gone = temp_dir.path().join("gone.h");
        fs::write(&gone, "#if NDIMS==3\nx\n#endif\n").unwrap();
        let outcome = plan(&gone, &filter, Dimensionality::Two).unwrap().apply().unwrap();
        assert_eq!(outcome, Outcome::Deleted);
        assert!(!gone.exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.c");
        let err = plan(&missing, &DirectiveFilter::default(), Dimensionality::Two).unwrap_err();
        assert!(matches!(err, ProcessError::Io { .. }));
    }

    #[test]
    fn test_non_utf8_is_invalid_data() {
        let temp_dir = TempDir::new().unwrap();
        let latin1 = temp_dir.path().join("latin1.c");
        fs::write(&latin1, b"#if NDIMS==2\n\xff\n#endif\n").unwrap();

        let err = plan(&latin1, &DirectiveFilter::default(), Dimensionality::Two).unwrap_err();
        assert_eq!(err.path(), latin1.as_path());
        match err {
            ProcessError::Io { source, .. } => assert_eq!(source.kind(), io::ErrorKind::InvalidData),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_apply_reports_failing_path() {
        let temp_dir = TempDir::new().unwrap();
        let vanished = temp_dir.path().join("vanished.h");
        fs::write(&vanished, "#if NDIMS==3\nx\n#endif\n").unwrap();

        let plan = plan(&vanished, &DirectiveFilter::default(), Dimensionality::Two).unwrap();
        assert_eq!(plan.action, FileAction::Delete);
        fs::remove_file(&vanished).unwrap();

        let err = plan.apply().unwrap_err();
        assert!(matches!(err, ProcessError::Io { .. }));
        assert_eq!(err.path(), vanished.as_path());
    }
}
