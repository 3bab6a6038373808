//! Name normalization and source → counterpart path mapping.
//!
//! Source files use camelCase/PascalCase names with hyphens; their ported
//! counterparts use lowercase snake_case. The conversion is a single scan
//! with two split rules:
//!
//! - an uppercase letter preceded by a lowercase letter or digit starts a
//!   new word (`barBaz` → `bar_baz`, `v2Api` → `v2_api`);
//! - an uppercase letter that ends an uppercase run and is followed by a
//!   lowercase letter starts a new word (`HTTPServer` → `http_server`).
//!
//! The output contains no uppercase ASCII and no hyphens, so normalizing
//! twice is the same as normalizing once.

use std::path::{Component, Path, PathBuf};

/// Convert one path segment to snake_case.
pub fn normalize_segment(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let mut out = String::with_capacity(segment.len() + 4);
    for (idx, &ch) in chars.iter().enumerate() {
        if ch == '-' {
            out.push('_');
            continue;
        }
        if ch.is_ascii_uppercase() && idx > 0 {
            let prev = chars[idx - 1];
            let next = chars.get(idx + 1).copied();
            let after_lower = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let ends_acronym =
                prev.is_ascii_uppercase() && next.map_or(false, |n| n.is_ascii_lowercase());
            if after_lower || ends_acronym {
                out.push('_');
            }
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// File name without its last extension, following `Path::file_stem`.
fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

/// Where a source file is expected to live in the counterpart tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPath {
    /// Slash-joined, snake_case, extension-less key shared by both trees.
    pub identifier: String,
    /// Counterpart path relative to the counterpart root.
    pub counterpart_rel: PathBuf,
}

/// Map a source-root-relative path to its counterpart location.
///
/// Directory segments are normalized as they are; the final segment loses
/// its extension before normalization and gets `target_extension` appended.
pub fn map_path(rel: &Path, target_extension: &str) -> MappedPath {
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let mut segments = Vec::with_capacity(parts.len());
    for (idx, part) in parts.iter().enumerate() {
        let current = if idx + 1 == parts.len() {
            file_stem(part)
        } else {
            part.as_str()
        };
        segments.push(normalize_segment(current));
    }

    let mut counterpart_rel = PathBuf::new();
    if let Some((last, dirs)) = segments.split_last() {
        for dir in dirs {
            counterpart_rel.push(dir);
        }
        counterpart_rel.push(format!("{last}.{target_extension}"));
    }

    MappedPath {
        identifier: segments.join("/"),
        counterpart_rel,
    }
}

/// Forward-slash rendering of a relative path, independent of the platform.
pub fn display_rel(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn splits_camel_case() {
        assert_eq!(normalize_segment("BarBaz"), "bar_baz");
        assert_eq!(normalize_segment("barBaz"), "bar_baz");
        assert_eq!(normalize_segment("lineBreakParticle"), "line_break_particle");
    }

    #[test]
    fn replaces_hyphens() {
        assert_eq!(normalize_segment("date-picker"), "date_picker");
        assert_eq!(normalize_segment("block-Item"), "block_item");
    }

    #[test]
    fn splits_acronym_runs() {
        assert_eq!(normalize_segment("HTTPServer"), "http_server");
        assert_eq!(normalize_segment("parseHTMLString"), "parse_html_string");
        assert_eq!(normalize_segment("ABCDefGHIjk"), "abc_def_gh_ijk");
        assert_eq!(normalize_segment("URL"), "url");
    }

    #[test]
    fn digits_start_a_new_word_before_uppercase() {
        assert_eq!(normalize_segment("v2Api"), "v2_api");
        assert_eq!(normalize_segment("LaTexUtils"), "la_tex_utils");
        assert_eq!(normalize_segment("i18n"), "i18n");
    }

    #[test]
    fn already_normalized_is_unchanged() {
        for seg in ["bar_baz", "http_server", "i18n", "", "_private"] {
            assert_eq!(normalize_segment(seg), seg);
        }
    }

    #[test]
    fn maps_nested_path() {
        let mapped = map_path(Path::new("editor/core/draw/particle/LineBreakParticle.ts"), "dart");
        assert_eq!(mapped.identifier, "editor/core/draw/particle/line_break_particle");
        assert_eq!(
            mapped.counterpart_rel,
            PathBuf::from("editor/core/draw/particle/line_break_particle.dart")
        );
    }

    #[test]
    fn converts_directory_case_too() {
        let mapped = map_path(Path::new("dataset/constant/ControlComponent/Index.ts"), "dart");
        assert_eq!(mapped.identifier, "dataset/constant/control_component/index");
    }

    #[test]
    fn strips_only_last_extension() {
        let mapped = map_path(Path::new("utils/index.test.ts"), "dart");
        assert_eq!(mapped.identifier, "utils/index.test");
        assert_eq!(mapped.counterpart_rel, PathBuf::from("utils/index.test.dart"));
    }

    #[test]
    fn mapping_is_deterministic() {
        let rel = Path::new("foo/BarBaz.ts");
        assert_eq!(map_path(rel, "dart"), map_path(rel, "dart"));
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(seg in "[A-Za-z0-9_-]{0,24}") {
            let once = normalize_segment(&seg);
            prop_assert_eq!(normalize_segment(&once), once);
        }
    }
}
