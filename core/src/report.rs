//! Aggregation and rendering of classification results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::audit::ClassificationResult;
use crate::classify::Classification;
use crate::error::Result;

/// Run-level summary. Field order is alphabetical so the JSON rendering has
/// sorted keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub implemented_count: usize,
    pub missing: Vec<String>,
    pub missing_count: usize,
    pub missing_grouped: BTreeMap<String, Vec<String>>,
    pub source_total: usize,
    pub stubbed: Vec<String>,
    pub stubbed_count: usize,
    pub stubbed_grouped: BTreeMap<String, Vec<String>>,
}

/// First path segment of a normalized identifier.
pub fn top_segment(identifier: &str) -> &str {
    identifier.split('/').next().unwrap_or(identifier)
}

/// Group identifiers by their first segment; members are sorted.
pub fn group_by_top_segment(ids: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for id in ids {
        grouped
            .entry(top_segment(id).to_string())
            .or_default()
            .push(id.clone());
    }
    for members in grouped.values_mut() {
        members.sort();
    }
    grouped
}

impl Summary {
    pub fn from_results(results: &[ClassificationResult]) -> Self {
        let mut missing = Vec::new();
        let mut stubbed = Vec::new();
        for result in results {
            match result.classification {
                Classification::Missing => missing.push(result.identifier.clone()),
                Classification::Stubbed => stubbed.push(result.identifier.clone()),
                Classification::Implemented => {}
            }
        }
        missing.sort();
        stubbed.sort();

        let source_total = results.len();
        Self {
            implemented_count: source_total - missing.len() - stubbed.len(),
            missing_count: missing.len(),
            missing_grouped: group_by_top_segment(&missing),
            source_total,
            stubbed_count: stubbed.len(),
            stubbed_grouped: group_by_top_segment(&stubbed),
            missing,
            stubbed,
        }
    }
}

/// Pretty-printed JSON rendering.
pub fn render_json(summary: &Summary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Markdown checklist of stubbed counterparts, one section per top-level
/// directory. `counterpart_prefix` is prepended to each listed path.
pub fn render_markdown(summary: &Summary, counterpart_prefix: &str, extension: &str) -> String {
    let prefix = counterpart_prefix.trim_end_matches('/');
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!("Total pendente: {} arquivos", summary.stubbed_count));
    lines.push(String::new());
    for (group, items) in &summary.stubbed_grouped {
        lines.push(format!("### {} ({} arquivos)", group, items.len()));
        for item in items {
            if prefix.is_empty() {
                lines.push(format!("- `{item}.{extension}`"));
            } else {
                lines.push(format!("- `{prefix}/{item}.{extension}`"));
            }
        }
        lines.push(String::new());
    }
    let mut out = lines.join("\n").trim_end().to_string();
    out.push('\n');
    out
}
