//! Configuration for a porting audit.
//!
//! Every root path and naming convention is carried here and passed into the
//! walker, mapper and classifier explicitly, so the same logic runs against
//! any pair of trees.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Comment tokens of the counterpart language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommentSyntax {
    pub line: Option<String>,
    pub block_start: Option<String>,
    pub block_end: Option<String>,
}

impl Default for CommentSyntax {
    fn default() -> Self {
        Self {
            line: Some("//".into()),
            block_start: Some("/*".into()),
            block_end: Some("*/".into()),
        }
    }
}

/// Top-level configuration for an audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the original-language tree.
    pub source_root: PathBuf,
    /// Root of the ported tree.
    pub counterpart_root: PathBuf,
    /// Extension (without dot) of source files to audit.
    pub source_extension: String,
    /// Extension (without dot) appended to mapped counterpart names.
    pub target_extension: String,
    /// File-name suffix of ambient declaration files excluded from the walk.
    pub declaration_suffix: String,
    /// Any of these appearing in a counterpart marks it as a stub.
    pub stub_markers: Vec<String>,
    /// Lines starting with one of these are not meaningful code.
    pub import_prefixes: Vec<String>,
    pub comment_syntax: CommentSyntax,
    /// Globs (relative to the source root) pruned from the audit walk.
    pub ignore_globs: Vec<String>,
    /// Globs pruned when merging sources into one file.
    pub merge_ignore_globs: Vec<String>,
    /// Source-relative path of the Hershey font table.
    pub hershey_source: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("typescript/src"),
            counterpart_root: PathBuf::from("lib/src"),
            source_extension: "ts".into(),
            target_extension: "dart".into(),
            declaration_suffix: ".d.ts".into(),
            stub_markers: vec!["UnimplementedError".into()],
            import_prefixes: vec!["import ".into()],
            comment_syntax: CommentSyntax::default(),
            ignore_globs: Vec::new(),
            merge_ignore_globs: vec![
                "**/node_modules".into(),
                "**/.git".into(),
                "**/dist".into(),
                "**/build".into(),
            ],
            hershey_source: PathBuf::from("editor/core/draw/particle/latex/utils/hershey.ts"),
        }
    }
}

impl Config {
    /// Parse a YAML document; missing keys keep their defaults.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}
