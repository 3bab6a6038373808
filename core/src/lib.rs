//! Porting-completeness analysis core.
//!
//! Maps every file of a source tree to its expected location in a
//! counterpart tree, classifies each counterpart as missing, stubbed or
//! implemented, and summarizes the result. Also hosts the line-ratio,
//! merge and Hershey table utilities used alongside the audit.

pub mod audit;
pub mod classify;
pub mod config;
mod error;
pub mod hershey;
pub mod merge;
pub mod normalize;
pub mod ratio;
pub mod report;
pub mod walk;

pub use audit::{audit, classify_tree, missing_sources, ClassificationResult, FilePathPair};
pub use classify::{Classification, Classifier, LineKind, ScanState};
pub use config::{CommentSyntax, Config};
pub use error::{AuditError, Result};
pub use normalize::{map_path, normalize_segment, MappedPath};
pub use ratio::{ratio_report, RatioPair, RatioReport};
pub use report::{render_json, render_markdown, Summary};
pub use walk::{collect_sources, SourceFile, SourceWalker, WalkOptions};
