//! Completeness classification of counterpart files.
//!
//! A counterpart is a stub when it carries a stub marker or when every
//! non-blank line is a comment or an import. The line scan is a two-state
//! machine (`Normal`, `InBlockComment`); it does not understand string
//! literals or nested comments.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use serde::{Deserialize, Serialize};

use crate::config::{CommentSyntax, Config};

/// Porting status of one source file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Missing,
    Stubbed,
    Implemented,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Classification::Missing => "missing",
            Classification::Stubbed => "stubbed",
            Classification::Implemented => "implemented",
        };
        f.write_str(name)
    }
}

/// Scanner state carried from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Normal,
    InBlockComment,
}

/// What a single line contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Import,
    Code,
}

/// Classifier with compiled stub markers and the counterpart's syntax.
pub struct Classifier {
    markers: Option<AhoCorasick>,
    syntax: CommentSyntax,
    import_prefixes: Vec<String>,
}

impl Classifier {
    pub fn new(config: &Config) -> Self {
        let markers = if config.stub_markers.is_empty() {
            None
        } else {
            Some(AhoCorasickBuilder::new().build(&config.stub_markers))
        };
        Self {
            markers,
            syntax: config.comment_syntax.clone(),
            import_prefixes: config.import_prefixes.clone(),
        }
    }

    /// Classify one line given the state left by the previous one.
    pub fn step(&self, state: ScanState, raw_line: &str) -> (ScanState, LineKind) {
        let line = raw_line.trim();
        if line.is_empty() {
            return (state, LineKind::Blank);
        }

        if state == ScanState::InBlockComment {
            let closed = self
                .syntax
                .block_end
                .as_deref()
                .map_or(true, |end| line.contains(end));
            let next = if closed {
                ScanState::Normal
            } else {
                ScanState::InBlockComment
            };
            return (next, LineKind::Comment);
        }

        if let (Some(start), Some(end)) = (
            self.syntax.block_start.as_deref(),
            self.syntax.block_end.as_deref(),
        ) {
            if let Some(rest) = line.strip_prefix(start) {
                let next = if rest.contains(end) {
                    ScanState::Normal
                } else {
                    ScanState::InBlockComment
                };
                return (next, LineKind::Comment);
            }
        }

        if let Some(marker) = self.syntax.line.as_deref() {
            if line.starts_with(marker) {
                return (ScanState::Normal, LineKind::Comment);
            }
        }

        if self
            .import_prefixes
            .iter()
            .any(|prefix| line.starts_with(prefix.as_str()))
        {
            return (ScanState::Normal, LineKind::Import);
        }

        (ScanState::Normal, LineKind::Code)
    }

    /// True when some line survives the blank/comment/import rules.
    pub fn has_meaningful_code(&self, content: &str) -> bool {
        let mut state = ScanState::Normal;
        for line in content.lines() {
            let (next, kind) = self.step(state, line);
            if kind == LineKind::Code {
                return true;
            }
            state = next;
        }
        false
    }

    pub fn has_stub_marker(&self, content: &str) -> bool {
        self.markers
            .as_ref()
            .map_or(false, |matcher| matcher.is_match(content))
    }

    /// Classify an existing counterpart's text as stubbed or implemented.
    pub fn classify(&self, content: &str) -> Classification {
        if self.has_stub_marker(content) || !self.has_meaningful_code(content) {
            Classification::Stubbed
        } else {
            Classification::Implemented
        }
    }
}
