//! Concatenate every source file into a single text file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{AuditError, Result};
use crate::normalize::display_rel;
use crate::walk::{SourceWalker, WalkOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub files: usize,
    /// `None` when no file matched and nothing was written.
    pub output: Option<PathBuf>,
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|err| AuditError::io(path, err))?;
    Ok(cwd.join(path))
}

/// Merge all matching files under `source_root` into `output`, sorted by
/// relative path, each preceded by `// Merged from` (absolute path) and
/// `// Relative:` header lines. A pre-existing `output` is removed first.
pub fn merge_sources(source_root: &Path, output: &Path, options: WalkOptions) -> Result<MergeOutcome> {
    let walker = SourceWalker::new(&absolute(source_root)?, options)?;
    let output_abs = absolute(output)?;

    if output.exists() {
        fs::remove_file(output).map_err(|err| AuditError::io(output, err))?;
    }

    let mut files = walker.collect::<Result<Vec<_>>>()?;
    files.retain(|f| f.path != output_abs);
    files.sort_by(|a, b| a.rel.cmp(&b.rel));
    if files.is_empty() {
        return Ok(MergeOutcome {
            files: 0,
            output: None,
        });
    }

    let handle = File::create(output).map_err(|err| AuditError::io(output, err))?;
    let mut writer = BufWriter::new(handle);
    for file in &files {
        let bytes = fs::read(&file.path).map_err(|err| AuditError::io(&file.path, err))?;
        let content = String::from_utf8_lossy(&bytes);
        write!(
            writer,
            "// Merged from {}\n// Relative: {}\n{}\n\n",
            file.path.display(),
            display_rel(&file.rel),
            content
        )
        .map_err(|err| AuditError::io(output, err))?;
        log::debug!("merged {}", file.path.display());
    }
    writer.flush().map_err(|err| AuditError::io(output, err))?;

    Ok(MergeOutcome {
        files: files.len(),
        output: Some(output.to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> WalkOptions {
        WalkOptions {
            extension: "ts".into(),
            exclude_suffix: Some(".d.ts".into()),
            ignore_globs: vec!["**/dist".into()],
        }
    }

    #[test]
    fn merges_sorted_with_headers() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("b")).unwrap();
        fs::create_dir_all(src.join("dist")).unwrap();
        fs::write(src.join("b/Two.ts"), "two").unwrap();
        fs::write(src.join("One.ts"), "one").unwrap();
        fs::write(src.join("global.d.ts"), "declare").unwrap();
        fs::write(src.join("dist/out.ts"), "built").unwrap();
        let out = tmp.path().join("merged.txt");
        fs::write(&out, "stale").unwrap();

        let outcome = merge_sources(&src, &out, options()).unwrap();
        assert_eq!(outcome.files, 2);

        let merged = fs::read_to_string(&out).unwrap();
        let expected = format!(
            "// Merged from {}\n// Relative: One.ts\none\n\n// Merged from {}\n// Relative: b/Two.ts\ntwo\n\n",
            src.join("One.ts").display(),
            src.join("b/Two.ts").display()
        );
        assert_eq!(merged, expected);
    }

    #[test]
    fn relative_paths_resolve_against_working_dir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute(Path::new("a/b.ts")).unwrap(), cwd.join("a/b.ts"));
        assert_eq!(absolute(Path::new("/x/y.ts")).unwrap(), PathBuf::from("/x/y.ts"));
    }

    #[test]
    fn nothing_to_merge_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("merged.txt");
        let outcome = merge_sources(tmp.path(), &out, options()).unwrap();
        assert_eq!(outcome.files, 0);
        assert_eq!(outcome.output, None);
        assert!(!out.exists());
    }

    #[test]
    fn missing_source_dir_fails_before_touching_output() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("merged.txt");
        fs::write(&out, "keep").unwrap();
        let err = merge_sources(&tmp.path().join("absent"), &out, options()).unwrap_err();
        assert!(matches!(err, AuditError::RootNotFound(_)));
        assert_eq!(fs::read_to_string(&out).unwrap(), "keep");
    }
}
