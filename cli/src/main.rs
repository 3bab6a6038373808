use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::{ArgAction, Args, Parser, Subcommand};
use console::style;
use port_audit_core::{
    audit, hershey, map_path, merge::merge_sources, missing_sources, normalize::display_rel,
    ratio_report, render_json, render_markdown, Config, RatioReport,
};
use serde_yaml::Value as YamlValue;

/// Porting-completeness tools entry point.
#[derive(Debug, Parser)]
#[command(
    name = "port-audit",
    about = "Track how much of a source tree has been ported to its counterpart tree."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(flatten)]
    diff: DiffArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Path to config file (YAML). Defaults are used when it does not exist.
    #[arg(long, global = true, default_value = "port-audit.yml")]
    config: PathBuf,

    /// Root of the original-language tree (overrides config).
    #[arg(long, global = true, value_name = "DIR")]
    source_root: Option<PathBuf>,

    /// Root of the ported tree (overrides config).
    #[arg(long, global = true, value_name = "DIR")]
    counterpart_root: Option<PathBuf>,

    /// Set config overrides (repeatable as key=value). Example: --set target_extension=kt
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    sets: Vec<String>,

    /// Log debug details to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify counterparts as missing, stubbed or implemented (default).
    Diff(DiffArgs),
    /// Compare line counts of matched source/counterpart pairs.
    Ratio(RatioArgs),
    /// List source files that have no counterpart.
    Missing,
    /// Concatenate every source file into one text file.
    Merge(MergeArgs),
    /// Regenerate the Dart Hershey font table from its TypeScript source.
    Hershey(HersheyArgs),
}

#[derive(Debug, Args)]
struct DiffArgs {
    /// Emit a Markdown checklist of stubbed files instead of JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    markdown: bool,
}

#[derive(Debug, Args)]
struct RatioArgs {
    /// Emit the full report as JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// How many of the lowest/highest ratios and missing files to show.
    #[arg(long, default_value_t = 20)]
    limit: usize,
}

#[derive(Debug, Args)]
struct MergeArgs {
    /// Output file. Defaults to ./merged_sources.txt.
    #[arg(long, short, default_value = "merged_sources.txt")]
    output: PathBuf,
}

#[derive(Debug, Args)]
struct HersheyArgs {
    /// TypeScript table to read. Defaults to `hershey_source` under the source root.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Dart file to write. Defaults to the mapped counterpart of the input.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let Cli {
        global,
        diff,
        command,
    } = Cli::parse();
    init_logging(global.verbose);
    let command = resolve_command(diff, command)?;

    let mut cfg = load_config(&global.config)?;
    apply_overrides(&mut cfg, &global.sets)?;
    if let Some(root) = &global.source_root {
        cfg.source_root = root.clone();
    }
    if let Some(root) = &global.counterpart_root {
        cfg.counterpart_root = root.clone();
    }

    match command {
        Command::Diff(args) => run_diff(&cfg, &args),
        Command::Ratio(args) => run_ratio(&cfg, &args),
        Command::Missing => run_missing(&cfg),
        Command::Merge(args) => run_merge(&cfg, &args),
        Command::Hershey(args) => run_hershey(&cfg, &args),
    }
}

/// Fold the top-level diff flags into the command to run; they only apply to `diff`.
fn resolve_command(top: DiffArgs, command: Option<Command>) -> anyhow::Result<Command> {
    match command {
        None => Ok(Command::Diff(top)),
        Some(Command::Diff(args)) => Ok(Command::Diff(DiffArgs {
            markdown: args.markdown || top.markdown,
        })),
        Some(_) if top.markdown => bail!("--markdown only applies to the diff command"),
        Some(other) => Ok(other),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let value: YamlValue = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse YAML {}", path.display()))?;
        let cfg: Config = serde_yaml::from_value(value)
            .with_context(|| format!("Invalid config structure in {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(cfg)
    } else {
        log::debug!("{} not found, using defaults", path.display());
        Ok(Config::default())
    }
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn optional_token(val: &str) -> Option<String> {
    if val.is_empty() || val.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(val.to_string())
    }
}

fn apply_overrides(cfg: &mut Config, sets: &[String]) -> anyhow::Result<()> {
    for kv in sets {
        let mut parts = kv.splitn(2, '=');
        let key = parts.next().unwrap_or("").trim();
        let raw_val = parts.next().unwrap_or("");
        let val = raw_val.trim();
        if key.is_empty() {
            continue;
        }
        match key {
            "source_root" => cfg.source_root = PathBuf::from(val),
            "counterpart_root" => cfg.counterpart_root = PathBuf::from(val),
            "source_extension" => cfg.source_extension = val.trim_start_matches('.').into(),
            "target_extension" => cfg.target_extension = val.trim_start_matches('.').into(),
            "declaration_suffix" => cfg.declaration_suffix = val.into(),
            "stub_markers" => cfg.stub_markers = split_list(val),
            "import_prefixes" => {
                // prefixes keep trailing whitespace ("import ")
                cfg.import_prefixes = raw_val
                    .split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| s.trim_start().to_string())
                    .collect();
            }
            "ignore_globs" => cfg.ignore_globs = split_list(val),
            "merge_ignore_globs" => cfg.merge_ignore_globs = split_list(val),
            "hershey_source" => cfg.hershey_source = PathBuf::from(val),
            "comment_syntax.line" => cfg.comment_syntax.line = optional_token(val),
            "comment_syntax.block_start" => cfg.comment_syntax.block_start = optional_token(val),
            "comment_syntax.block_end" => cfg.comment_syntax.block_end = optional_token(val),
            other => bail!("unknown config key `{other}`"),
        }
    }
    Ok(())
}

fn run_diff(cfg: &Config, args: &DiffArgs) -> anyhow::Result<()> {
    let summary = audit(cfg).with_context(|| {
        format!(
            "Failed to audit {} against {}",
            cfg.source_root.display(),
            cfg.counterpart_root.display()
        )
    })?;
    if args.markdown {
        print!(
            "{}",
            render_markdown(&summary, &display_rel(&cfg.counterpart_root), &cfg.target_extension)
        );
    } else {
        println!("{}", render_json(&summary)?);
    }
    Ok(())
}

fn run_ratio(cfg: &Config, args: &RatioArgs) -> anyhow::Result<()> {
    let report = ratio_report(cfg).context("Failed to compute line ratios")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_ratio_report(&report, args.limit);
    }
    Ok(())
}

fn print_ratio_report(report: &RatioReport, limit: usize) {
    println!("{}", style(format!("Lowest ratios (first {limit}):")).bold());
    for pair in report.lowest(limit) {
        println!("{}", pair.display_line());
    }
    println!();
    println!("{}", style(format!("Highest ratios (last {limit}):")).bold());
    for pair in report.highest(limit) {
        println!("{}", pair.display_line());
    }
    println!();
    println!("Matched files: {}", report.pairs.len());
    println!("Average ratio: {:.2}", report.average_ratio);
    println!("Missing counterparts: {}", report.missing.len());
    if !report.missing.is_empty() {
        println!("{}", style(format!("Sample missing (up to {limit}):")).yellow());
        for rel in report.missing.iter().take(limit) {
            println!(" - {rel}");
        }
    }
}

fn run_missing(cfg: &Config) -> anyhow::Result<()> {
    let missing = missing_sources(cfg).context("Failed to list missing counterparts")?;
    for rel in &missing {
        println!("{rel}");
    }
    println!("TOTAL {}", missing.len());
    Ok(())
}

fn run_merge(cfg: &Config, args: &MergeArgs) -> anyhow::Result<()> {
    let outcome = merge_sources(&cfg.source_root, &args.output, cfg.merge_walk_options())
        .with_context(|| format!("Failed to merge {}", cfg.source_root.display()))?;
    match outcome.output {
        Some(path) => println!(
            "Merged {} .{} files into {}",
            outcome.files,
            cfg.source_extension,
            path.display()
        ),
        None => println!(
            "No .{} files found in {}",
            cfg.source_extension,
            cfg.source_root.display()
        ),
    }
    Ok(())
}

fn run_hershey(cfg: &Config, args: &HersheyArgs) -> anyhow::Result<()> {
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| cfg.source_root.join(&cfg.hershey_source));
    let output = match &args.output {
        Some(path) => path.clone(),
        None => {
            let rel = input.strip_prefix(&cfg.source_root).with_context(|| {
                format!(
                    "{} is outside {}; pass --output explicitly",
                    input.display(),
                    cfg.source_root.display()
                )
            })?;
            cfg.counterpart_root
                .join(map_path(rel, &cfg.target_extension).counterpart_rel)
        }
    };
    let outcome = hershey::generate(&input, &output)
        .with_context(|| format!("Failed to generate Hershey table from {}", input.display()))?;
    println!(
        "Wrote {} entries ({} glyphs) to {}",
        outcome.entries,
        outcome.glyphs,
        output.display()
    );
    Ok(())
}
