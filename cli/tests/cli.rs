use std::fs;
use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write file");
}

fn fixture() -> TempDir {
    let tmp = tempfile::tempdir().expect("temp dir");
    let root = tmp.path();
    write_file(&root.join("typescript/src/foo/BarBaz.ts"), "export class BarBaz {}\n");
    write_file(&root.join("typescript/src/foo/Missing.ts"), "export const x = 1\n");
    write_file(&root.join("typescript/src/core/Draw.ts"), "export class Draw {}\n");
    write_file(
        &root.join("lib/src/foo/bar_baz.dart"),
        "import 'x.dart';\nclass BarBaz { BarBaz() { throw UnimplementedError(); } }\n",
    );
    write_file(&root.join("lib/src/core/draw.dart"), "class Draw { int value = 1; }\n");
    tmp
}

fn port_audit(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("port-audit").expect("binary built");
    cmd.current_dir(dir);
    cmd
}

#[test]
fn default_command_prints_json_summary() {
    let tmp = fixture();
    let output = port_audit(tmp.path()).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["source_total"], 3);
    assert_eq!(json["missing"], serde_json::json!(["foo/missing"]));
    assert_eq!(json["stubbed"], serde_json::json!(["foo/bar_baz"]));
    assert_eq!(json["stubbed_grouped"]["foo"], serde_json::json!(["foo/bar_baz"]));
    assert_eq!(json["implemented_count"], 1);
}

#[test]
fn markdown_report() {
    let tmp = fixture();
    let output = port_audit(tmp.path()).arg("--markdown").output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "Total pendente: 1 arquivos\n\n### foo (1 arquivos)\n- `lib/src/foo/bar_baz.dart`\n"
    );
}

#[test]
fn missing_lists_source_paths() {
    let tmp = fixture();
    let output = port_audit(tmp.path()).arg("missing").output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "foo/Missing.ts\nTOTAL 1\n");
}

#[test]
fn unreadable_root_exits_non_zero() {
    let tmp = fixture();
    let output = port_audit(tmp.path())
        .args(["--source-root", "does/not/exist"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does/not/exist"));
}

#[test]
fn config_file_is_honoured() {
    let tmp = fixture();
    write_file(
        &tmp.path().join("port-audit.yml"),
        "stub_markers: []\ncounterpart_root: lib/src\n",
    );
    let output = port_audit(tmp.path()).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stubbed_count"], 0);
    assert_eq!(json["implemented_count"], 2);
}

#[test]
fn hershey_generates_mapped_output() {
    let tmp = fixture();
    write_file(
        &tmp.path().join("typescript/src/editor/core/draw/particle/latex/utils/hershey.ts"),
        "const raw = {\n  501: '  9MWRMNV RRMVV RPSTS',\n}\n",
    );
    let output = port_audit(tmp.path()).arg("hershey").output().unwrap();
    assert!(output.status.success());
    let dart = fs::read_to_string(
        tmp.path().join("lib/src/editor/core/draw/particle/latex/utils/hershey.dart"),
    )
    .unwrap();
    assert!(dart.contains("  501: \"  9MWRMNV RRMVV RPSTS\",\n};\n"));
}

#[test]
fn top_level_markdown_reaches_diff_subcommand() {
    let tmp = fixture();
    let output = port_audit(tmp.path())
        .args(["--markdown", "diff"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)
        .unwrap()
        .starts_with("Total pendente: 1 arquivos\n"));

    let output = port_audit(tmp.path())
        .args(["--markdown", "ratio"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn ratio_prints_text_report() {
    let tmp = fixture();
    let output = port_audit(tmp.path()).arg("ratio").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Lowest ratios (first 20):"), "{stdout}");
    assert!(stdout.contains("Highest ratios (last 20):"), "{stdout}");
    assert!(stdout.contains("\tfoo/BarBaz.ts\tfoo/bar_baz.dart\n"), "{stdout}");
    assert!(stdout.contains("Matched files: 2\n"), "{stdout}");
    assert!(stdout.contains("Missing counterparts: 1\n"), "{stdout}");
    assert!(stdout.contains(" - foo/Missing.ts\n"), "{stdout}");
}

#[test]
fn merge_writes_file_with_absolute_headers() {
    let tmp = fixture();
    write_file(&tmp.path().join("typescript/src/build/Gen.ts"), "generated\n");
    let output = port_audit(tmp.path())
        .args(["merge", "--output", "merged.txt"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "Merged 3 .ts files into merged.txt\n"
    );

    let merged = fs::read_to_string(tmp.path().join("merged.txt")).unwrap();
    let root = fs::canonicalize(tmp.path()).unwrap();
    let first = format!(
        "// Merged from {}\n// Relative: core/Draw.ts\n",
        root.join("typescript/src/core/Draw.ts").display()
    );
    assert!(merged.starts_with(&first), "{merged}");
    assert!(!merged.contains("build/Gen.ts"));
}

#[test]
fn merge_reports_empty_tree() {
    let tmp = tempfile::tempdir().expect("temp dir");
    fs::create_dir_all(tmp.path().join("typescript/src")).unwrap();
    let output = port_audit(tmp.path()).arg("merge").output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "No .ts files found in typescript/src\n"
    );
    assert!(!tmp.path().join("merged_sources.txt").exists());
}
