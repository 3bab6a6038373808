//! Line-count ratios between source files and their counterparts.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::audit::ensure_counterpart_root;
use crate::config::Config;
use crate::error::{AuditError, Result};
use crate::normalize::display_rel;

/// Line counts of one matched pair.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RatioPair {
    /// Counterpart lines per source line; 1.0 for an empty source.
    pub ratio: f64,
    pub source_lines: usize,
    pub counterpart_lines: usize,
    pub source_rel: String,
    pub counterpart_rel: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RatioReport {
    /// Sorted ascending by ratio.
    pub pairs: Vec<RatioPair>,
    pub average_ratio: f64,
    pub missing: Vec<String>,
}

fn count_lines(path: &Path) -> Result<usize> {
    let bytes = fs::read(path).map_err(|err| AuditError::io(path, err))?;
    Ok(String::from_utf8_lossy(&bytes).lines().count())
}

pub fn line_ratio(source_lines: usize, counterpart_lines: usize) -> f64 {
    if source_lines == 0 {
        1.0
    } else {
        counterpart_lines as f64 / source_lines as f64
    }
}

/// Compare line counts of every source file with an existing counterpart.
pub fn ratio_report(config: &Config) -> Result<RatioReport> {
    ensure_counterpart_root(config)?;
    let mut pairs = Vec::new();
    let mut missing = Vec::new();
    for source in config.walk_sources()? {
        let source = source?;
        let (_, pair) = config.pair_for(&source);
        if !pair.exists {
            missing.push(display_rel(&pair.source_rel));
            continue;
        }
        let source_lines = count_lines(&pair.source_path)?;
        let counterpart_lines = count_lines(&pair.counterpart_path)?;
        pairs.push(RatioPair {
            ratio: line_ratio(source_lines, counterpart_lines),
            source_lines,
            counterpart_lines,
            source_rel: display_rel(&pair.source_rel),
            counterpart_rel: display_rel(&pair.counterpart_rel),
        });
    }

    pairs.sort_by(|a, b| {
        a.ratio
            .total_cmp(&b.ratio)
            .then_with(|| a.source_rel.cmp(&b.source_rel))
    });
    missing.sort();
    let average_ratio = if pairs.is_empty() {
        0.0
    } else {
        pairs.iter().map(|p| p.ratio).sum::<f64>() / pairs.len() as f64
    };
    Ok(RatioReport {
        pairs,
        average_ratio,
        missing,
    })
}

impl RatioReport {
    pub fn lowest(&self, limit: usize) -> &[RatioPair] {
        &self.pairs[..limit.min(self.pairs.len())]
    }

    pub fn highest(&self, limit: usize) -> &[RatioPair] {
        let start = self.pairs.len().saturating_sub(limit);
        &self.pairs[start..]
    }
}

impl RatioPair {
    /// Tab-separated line: ratio, both line counts and both paths.
    pub fn display_line(&self) -> String {
        format!(
            "{:.2}\tsource:{}\tcounterpart:{}\t{}\t{}",
            self.ratio, self.source_lines, self.counterpart_lines, self.source_rel, self.counterpart_rel
        )
    }
}
