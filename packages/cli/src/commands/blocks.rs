use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use storefront_blocks::{analyze_performance, filter_outline, flatten, parse_tree, BlockNode, IdGenerator, LoadLevel};
use storefront_editor::{EditSession, FileKv, Mutation, PresetStore};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Block forest JSON file
    pub input: PathBuf,

    /// Write the result back to the input file
    #[arg(short, long)]
    pub write: bool,
}

#[derive(Args, Debug)]
pub struct OutlineArgs {
    /// Block forest JSON file
    pub input: PathBuf,

    /// Only show rows whose type or label contains this text
    #[arg(short, long)]
    pub query: Option<String>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Block forest JSON file or a directory of them
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Block forest JSON file
    pub input: PathBuf,

    /// JSON array of editor actions
    #[arg(short, long)]
    pub script: PathBuf,

    /// Write the result back to the input file instead of printing it
    #[arg(short, long)]
    pub write: bool,
}

fn load_forest(path: &Path, ids: &mut IdGenerator) -> Result<Vec<BlockNode>> {
    let source = fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let forest = parse_tree(&source, ids).with_context(|| format!("Invalid block JSON in {}", path.display()))?;
    debug!(path = %path.display(), nodes = forest.len(), "loaded block forest");
    Ok(forest)
}

fn write_or_print(forest: &[BlockNode], path: &Path, write: bool) -> Result<()> {
    let json = serde_json::to_string_pretty(forest)?;
    if write {
        fs::write(path, json)?;
        println!("{} {}", "✓".green(), path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}

pub fn normalize(args: NormalizeArgs) -> Result<()> {
    let mut ids = IdGenerator::session();
    let forest = load_forest(&args.input, &mut ids)?;
    write_or_print(&forest, &args.input, args.write)
}

pub fn outline(args: OutlineArgs) -> Result<()> {
    let mut ids = IdGenerator::session();
    let forest = load_forest(&args.input, &mut ids)?;
    let items = flatten(&forest);
    let shown = filter_outline(&items, args.query.as_deref().unwrap_or(""));

    for item in &shown {
        let mut flags = Vec::new();
        if item.locked {
            flags.push("locked");
        }
        if item.hidden {
            flags.push("hidden");
        }
        println!(
            "{}{} {} {}{}",
            "  ".repeat(item.depth()),
            item.kind.to_string().cyan(),
            item.label,
            item.id.dimmed(),
            if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", ")).yellow().to_string()
            }
        );
    }

    println!();
    println!("   {} of {} blocks", shown.len(), items.len());
    Ok(())
}

fn find_json_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().map(|ext| ext == "json").unwrap_or(false))
        .map(|entry| entry.into_path())
        .collect()
}

pub fn analyze(args: AnalyzeArgs) -> Result<()> {
    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        let files = find_json_files(&args.input);
        println!("   Found {} .json files", files.len());
        println!();
        files
    } else {
        return Err(anyhow!("Input path does not exist: {}", args.input.display()));
    };

    let mut failures = 0;
    for file in &files {
        let mut ids = IdGenerator::session();
        let forest = match load_forest(file, &mut ids) {
            Ok(forest) => forest,
            Err(err) => {
                failures += 1;
                eprintln!("{} {} - {:#}", "✗".red(), file.display(), err);
                continue;
            }
        };

        let report = analyze_performance(&forest);
        let level = match report.level {
            LoadLevel::Low => "low".green(),
            LoadLevel::Medium => "medium".yellow(),
            LoadLevel::High => "high".red(),
        };
        println!("{} {} (score {})", level.bold(), file.display(), report.score);
        println!(
            "   blocks: {}  depth: {}  images: {}  animated: {}",
            report.count, report.max_depth, report.image_count, report.animated_count
        );
        for warning in report.warnings() {
            println!("   {} {}", "⚠".yellow(), warning);
        }
    }

    if failures > 0 {
        return Err(anyhow!("{} of {} files could not be analyzed", failures, files.len()));
    }
    Ok(())
}

pub fn edit(args: EditArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut ids = IdGenerator::session();
    let forest = load_forest(&args.input, &mut ids)?;

    let script = fs::read_to_string(&args.script).with_context(|| format!("Cannot read {}", args.script.display()))?;
    let actions: Vec<Mutation> =
        serde_json::from_str(&script).with_context(|| format!("Invalid action script {}", args.script.display()))?;

    let presets = PresetStore::open(FileKv::new(config.presets_dir(cwd)))?;
    let mut session = EditSession::with_ids(forest, presets, ids)
        .with_history_limit(config.history_limit)
        .with_auto_expand_delay(config.auto_expand_delay());

    let now = chrono::Utc::now();
    let mut applied = 0;
    for action in actions {
        if session.dispatch(action, now)? {
            applied += 1;
        }
    }
    info!(applied, undo_levels = session.history().undo_levels(), "script applied");

    write_or_print(session.tree(), &args.input, args.write)
}
