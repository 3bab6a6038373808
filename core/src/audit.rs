//! Walk → map → classify pipeline over a pair of trees.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::classify::{Classification, Classifier};
use crate::config::Config;
use crate::error::{AuditError, Result};
use crate::normalize::map_path;
use crate::report::Summary;
use crate::walk::{SourceFile, SourceWalker, WalkOptions};

/// A source file and where its counterpart should be.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilePathPair {
    pub source_path: PathBuf,
    /// Source path relative to the source root.
    pub source_rel: PathBuf,
    pub counterpart_path: PathBuf,
    /// Counterpart path relative to the counterpart root.
    pub counterpart_rel: PathBuf,
    pub exists: bool,
}

/// Outcome for one source file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClassificationResult {
    pub identifier: String,
    pub pair: FilePathPair,
    pub classification: Classification,
}

impl Config {
    fn walk_options_with(&self, ignore_globs: &[String]) -> WalkOptions {
        WalkOptions {
            extension: self.source_extension.clone(),
            exclude_suffix: if self.declaration_suffix.is_empty() {
                None
            } else {
                Some(self.declaration_suffix.clone())
            },
            ignore_globs: ignore_globs.to_vec(),
        }
    }

    /// Walk options for `diff`, `ratio` and `missing`.
    pub fn walk_options(&self) -> WalkOptions {
        self.walk_options_with(&self.ignore_globs)
    }

    /// Walk options for `merge`, which also prunes build output directories.
    pub fn merge_walk_options(&self) -> WalkOptions {
        self.walk_options_with(&self.merge_ignore_globs)
    }

    /// Lazily walk the source tree.
    pub fn walk_sources(&self) -> Result<SourceWalker> {
        SourceWalker::new(&self.source_root, self.walk_options())
    }

    /// Pair a walked source file with its expected counterpart; stats the
    /// counterpart but does not read it.
    pub fn pair_for(&self, source: &SourceFile) -> (String, FilePathPair) {
        let mapped = map_path(&source.rel, &self.target_extension);
        let counterpart_path = self.counterpart_root.join(&mapped.counterpart_rel);
        let exists = counterpart_path.is_file();
        let pair = FilePathPair {
            source_path: source.path.clone(),
            source_rel: source.rel.clone(),
            counterpart_path,
            counterpart_rel: mapped.counterpart_rel,
            exists,
        };
        (mapped.identifier, pair)
    }
}

pub(crate) fn ensure_counterpart_root(config: &Config) -> Result<()> {
    let root = &config.counterpart_root;
    if !root.exists() {
        return Err(AuditError::RootNotFound(root.clone()));
    }
    if !root.is_dir() {
        return Err(AuditError::NotADirectory(root.clone()));
    }
    Ok(())
}

/// Classify every source file under the configured roots.
///
/// Results are sorted by identifier. Any I/O error aborts the run.
pub fn classify_tree(config: &Config) -> Result<Vec<ClassificationResult>> {
    ensure_counterpart_root(config)?;
    let classifier = Classifier::new(config);
    let mut results = Vec::new();
    for source in config.walk_sources()? {
        let source = source?;
        let (identifier, pair) = config.pair_for(&source);
        let classification = if pair.exists {
            let bytes = fs::read(&pair.counterpart_path)
                .map_err(|err| AuditError::io(&pair.counterpart_path, err))?;
            classifier.classify(&String::from_utf8_lossy(&bytes))
        } else {
            Classification::Missing
        };
        log::debug!("{identifier}: {classification}");
        results.push(ClassificationResult {
            identifier,
            pair,
            classification,
        });
    }
    results.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    Ok(results)
}

/// Classify the trees and summarize.
pub fn audit(config: &Config) -> Result<Summary> {
    let results = classify_tree(config)?;
    Ok(Summary::from_results(&results))
}

/// Source-relative paths (forward slashes) that have no counterpart, sorted.
pub fn missing_sources(config: &Config) -> Result<Vec<String>> {
    ensure_counterpart_root(config)?;
    let mut missing = Vec::new();
    for source in config.walk_sources()? {
        let source = source?;
        let (_, pair) = config.pair_for(&source);
        if !pair.exists {
            missing.push(crate::normalize::display_rel(&pair.source_rel));
        }
    }
    missing.sort();
    Ok(missing)
}
