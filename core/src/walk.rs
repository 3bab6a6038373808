//! Recursive enumeration of source files under a root.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::{AuditError, Result};

/// What the walker yields and what it skips.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Extension (without dot) a file must carry.
    pub extension: String,
    /// Files whose name ends with this are skipped (ambient declarations).
    pub exclude_suffix: Option<String>,
    /// Directories matching any of these (relative to the root) are pruned.
    pub ignore_globs: Vec<String>,
}

/// A walked source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the walk root.
    pub rel: PathBuf,
}

pub(crate) fn build_ignore_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| AuditError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|source| AuditError::InvalidGlob {
        pattern: patterns.join(", "),
        source,
    })?;
    Ok(Some(set))
}

/// Lazy walk over matching files. Enumeration order is file-system order.
pub struct SourceWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
    options: WalkOptions,
    ignore: Option<GlobSet>,
}

impl SourceWalker {
    /// Start a walk. Fails up front when the root is missing or not a
    /// directory; read errors further down surface as `Err` items.
    pub fn new(root: &Path, options: WalkOptions) -> Result<Self> {
        if !root.exists() {
            return Err(AuditError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(AuditError::NotADirectory(root.to_path_buf()));
        }
        let ignore = build_ignore_set(&options.ignore_globs)?;
        Ok(Self {
            root: root.to_path_buf(),
            inner: WalkDir::new(root).into_iter(),
            options,
            ignore,
        })
    }

    fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if let Some(suffix) = &self.options.exclude_suffix {
            if name.ends_with(suffix.as_str()) {
                return false;
            }
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(false, |ext| ext == self.options.extension)
    }
}

impl Iterator for SourceWalker {
    type Item = Result<SourceFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(AuditError::Walk(err))),
            };
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or_else(|_| entry.path())
                .to_path_buf();

            if entry.file_type().is_dir() {
                if entry.depth() > 0 {
                    if let Some(set) = &self.ignore {
                        if set.is_match(&rel) {
                            log::debug!("pruning {}", entry.path().display());
                            self.inner.skip_current_dir();
                        }
                    }
                }
                continue;
            }
            if !entry.file_type().is_file() || !self.accepts(entry.path()) {
                continue;
            }
            return Some(Ok(SourceFile {
                path: entry.path().to_path_buf(),
                rel,
            }));
        }
    }
}

/// Collect every matching file, sorted by relative path.
pub fn collect_sources(root: &Path, options: WalkOptions) -> Result<Vec<SourceFile>> {
    let mut files = SourceWalker::new(root, options)?.collect::<Result<Vec<_>>>()?;
    files.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(files)
}
