//! Hershey vector-font table: extraction from the TypeScript source and
//! emission as a Dart lookup table.
//!
//! Each raw entry is a string. Characters 3 and 4 hold the glyph's left and
//! right bounds, the rest is a list of two-character coordinate pairs where
//! every character is offset by `'R'`. The pair `" R"` lifts the pen and
//! starts a new polyline.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{AuditError, Result};

const ORD_R: i32 = 'R' as i32;

static ENTRY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+)\s*:\s*(.+?)[\s,]*$").expect("valid entry regex"));

/// Decoded glyph geometry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Glyph {
    pub width: i32,
    pub xmin: i32,
    pub xmax: i32,
    pub ymin: i32,
    pub ymax: i32,
    pub polylines: Vec<Vec<[i32; 2]>>,
}

/// Decode one raw entry. Entries of five characters or fewer carry no
/// geometry and decode to `None`.
pub fn decode_glyph(entry: &str) -> Option<Glyph> {
    let chars: Vec<char> = entry.chars().collect();
    if chars.len() <= 5 {
        return None;
    }
    let left = chars[3] as i32 - ORD_R;
    let right = chars[4] as i32 - ORD_R;
    let content = &chars[5..];

    let mut polylines: Vec<Vec<[i32; 2]>> = vec![Vec::new()];
    let mut x_range: Option<(i32, i32)> = None;
    let mut y_range: Option<(i32, i32)> = None;

    for pair in content.chunks_exact(2) {
        if pair[0] == ' ' && pair[1] == 'R' {
            polylines.push(Vec::new());
            continue;
        }
        let x = pair[0] as i32 - ORD_R - left;
        let y = pair[1] as i32 - ORD_R;
        x_range = Some(x_range.map_or((x, x), |(lo, hi)| (lo.min(x), hi.max(x))));
        y_range = Some(y_range.map_or((y, y), |(lo, hi)| (lo.min(y), hi.max(y))));
        if let Some(line) = polylines.last_mut() {
            line.push([x, y]);
        }
    }

    let (xmin, xmax) = x_range.unwrap_or((0, 0));
    let (ymin, ymax) = y_range.unwrap_or((0, 0));
    Some(Glyph {
        width: right - left,
        xmin,
        xmax,
        ymin,
        ymax,
        polylines,
    })
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> std::result::Result<char, String> {
    let hex: String = chars.take(digits).collect();
    if hex.len() != digits {
        return Err(format!("truncated escape `{hex}`"));
    }
    let code = u32::from_str_radix(&hex, 16).map_err(|_| format!("bad hex escape `{hex}`"))?;
    char::from_u32(code).ok_or_else(|| format!("invalid code point {code:#x}"))
}

/// Decode a single- or double-quoted string literal with backslash escapes.
/// Unknown escapes yield the escaped character itself.
pub fn decode_string_literal(literal: &str) -> std::result::Result<String, String> {
    let mut chars = literal.chars();
    let quote = match chars.next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(format!("expected a quoted string, found `{literal}`")),
    };
    let mut out = String::new();
    loop {
        let Some(ch) = chars.next() else {
            return Err("unterminated string literal".into());
        };
        match ch {
            '\\' => {
                let Some(esc) = chars.next() else {
                    return Err("unterminated escape".into());
                };
                let decoded = match esc {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    'v' => '\u{b}',
                    '0' => '\0',
                    'x' => hex_escape(&mut chars, 2)?,
                    'u' => hex_escape(&mut chars, 4)?,
                    other => other,
                };
                out.push(decoded);
            }
            c if c == quote => break,
            c => out.push(c),
        }
    }
    let rest = chars.as_str().trim();
    if !rest.is_empty() {
        return Err(format!("unexpected `{rest}` after string literal"));
    }
    Ok(out)
}

/// Extract the `const raw = { <int>: '<entry>', ... }` table from source text.
pub fn parse_raw_table(text: &str) -> Result<BTreeMap<i64, String>> {
    let marker = text
        .find("const raw")
        .ok_or(AuditError::MarkerNotFound("const raw"))?;
    let open = text[marker..]
        .find('{')
        .map(|idx| marker + idx)
        .ok_or(AuditError::MarkerNotFound("{"))?;
    let close = text
        .rfind('}')
        .filter(|&idx| idx > open)
        .ok_or(AuditError::MarkerNotFound("}"))?;

    let first_line = text[..=open].lines().count().max(1);
    let mut table = BTreeMap::new();
    for (offset, raw_line) in text[open + 1..close].lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("//") || !line.contains(':') {
            continue;
        }
        let line_no = first_line + offset;
        let caps = ENTRY_LINE
            .captures(line)
            .ok_or_else(|| AuditError::InvalidEntry {
                line: line_no,
                reason: format!("expected `<index>: <string>`, found `{line}`"),
            })?;
        let key: i64 = caps[1].parse().map_err(|_| AuditError::InvalidEntry {
            line: line_no,
            reason: format!("invalid index `{}`", &caps[1]),
        })?;
        let value = decode_string_literal(&caps[2])
            .map_err(|reason| AuditError::InvalidEntry { line: line_no, reason })?;
        table.insert(key, value);
    }
    Ok(table)
}

const DART_HEADER: &str = r#"// ignore_for_file: lines_longer_than_80_chars

class HersheyEntry {
  const HersheyEntry({
    required this.width,
    required this.xmin,
    required this.xmax,
    required this.ymin,
    required this.ymax,
    required this.polylines,
  });

  final int width;
  final int xmin;
  final int xmax;
  final int ymin;
  final int ymax;
  final List<List<List<int>>> polylines;
}

const int _ordR = 82;

final Map<int, HersheyEntry> _hersheyCache = <int, HersheyEntry>{};

HersheyEntry? HERSHEY(int index) {
  final cached = _hersheyCache[index];
  if (cached != null) {
    return cached;
  }

  final compiled = _compile(index);
  if (compiled != null) {
    _hersheyCache[index] = compiled;
  }

  return compiled;
}

HersheyEntry? _compile(int index) {
  final entry = _raw[index];
  if (entry == null || entry.length <= 5) {
    return null;
  }

  final bounds = entry.substring(3, 5);
  final int xmin = bounds.codeUnitAt(0) - _ordR;
  final int xmax = bounds.codeUnitAt(1) - _ordR;
  final String content = entry.substring(5);

  final List<List<List<int>>> polylines = <List<List<int>>>[];
  polylines.add(<List<int>>[]);
  int? ymin;
  int? ymax;
  int? zmin;
  int? zmax;

  for (var j = 0; j + 1 < content.length; j += 2) {
    final digit = content.substring(j, j + 2);
    if (digit == ' R') {
      polylines.add(<List<int>>[]);
      continue;
    }

    final int x = digit.codeUnitAt(0) - _ordR - xmin;
    final int y = digit.codeUnitAt(1) - _ordR;

    ymin = (ymin == null || y < ymin) ? y : ymin;
    ymax = (ymax == null || y > ymax) ? y : ymax;
    zmin = (zmin == null || x < zmin) ? x : zmin;
    zmax = (zmax == null || x > zmax) ? x : zmax;

    polylines.last.add(<int>[x, y]);
  }

  return HersheyEntry(
    width: xmax - xmin,
    xmin: zmin ?? 0,
    xmax: zmax ?? 0,
    ymin: ymin ?? 0,
    ymax: ymax ?? 0,
    polylines: polylines,
  );
}

const Map<int, String> _raw = <int, String>{
"#;

/// Double-quoted Dart literal; `$` is escaped so entries never interpolate.
pub fn dart_string_literal(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace('$', "\\$"))
}

/// Render the Dart source: fixed header, then entries in ascending order.
pub fn render_dart(table: &BTreeMap<i64, String>) -> Result<String> {
    let mut out = String::from(DART_HEADER);
    for (key, value) in table {
        out.push_str(&format!("  {}: {},\n", key, dart_string_literal(value)?));
    }
    out.push_str("};\n");
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub entries: usize,
    /// Entries that decode to a glyph.
    pub glyphs: usize,
}

/// Read the TypeScript table at `input` and write the Dart table to `output`.
pub fn generate(input: &Path, output: &Path) -> Result<GenerateOutcome> {
    let text = fs::read_to_string(input).map_err(|err| AuditError::io(input, err))?;
    let table = parse_raw_table(&text)?;
    let glyphs = table.values().filter_map(|v| decode_glyph(v)).count();
    let rendered = render_dart(&table)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| AuditError::io(parent, err))?;
    }
    fs::write(output, rendered).map_err(|err| AuditError::io(output, err))?;
    log::info!(
        "wrote {} hershey entries ({} with geometry) to {}",
        table.len(),
        glyphs,
        output.display()
    );
    Ok(GenerateOutcome {
        entries: table.len(),
        glyphs,
    })
}
