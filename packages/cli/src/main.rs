mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    analyze, check, edit, history, normalize, outline, presets, preview, publish, reset, restore, status, theme,
    AnalyzeArgs, CheckArgs, EditArgs, NormalizeArgs, OutlineArgs, PresetsCommand, PublishArgs, ResetArgs, RestoreArgs,
    ThemeCommand,
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Storefront CLI - block trees, page layouts and publishing
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a normalized block forest
    Normalize(NormalizeArgs),

    /// Print the flattened outline of a block forest
    Outline(OutlineArgs),

    /// Report render cost of block forests
    Analyze(AnalyzeArgs),

    /// Apply a script of editor actions to a block forest
    Edit(EditArgs),

    /// Show publish status and draft changes
    Status,

    /// Publish now, or schedule with --at
    Publish(PublishArgs),

    /// Promote a scheduled publish that is due, once or with --watch
    Check(CheckArgs),

    /// Reset layout, theme and branding to defaults
    Reset(ResetArgs),

    /// List saved versions, newest first
    History,

    /// Restore a saved version
    Restore(RestoreArgs),

    /// Print the preview update for the current settings
    Preview,

    /// Export or import block presets
    Presets {
        #[command(subcommand)]
        command: PresetsCommand,
    },

    /// Export or import the site theme
    Theme {
        #[command(subcommand)]
        command: ThemeCommand,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run(command: Command, cwd: &Path) -> anyhow::Result<()> {
    match command {
        Command::Normalize(args) => normalize(args),
        Command::Outline(args) => outline(args),
        Command::Analyze(args) => analyze(args),
        Command::Edit(args) => edit(args, cwd),
        Command::Status => status(cwd),
        Command::Publish(args) => publish(args, cwd),
        Command::Check(args) => check(args, cwd),
        Command::Reset(args) => reset(args, cwd),
        Command::History => history(cwd),
        Command::Restore(args) => restore(args, cwd),
        Command::Preview => preview(cwd),
        Command::Presets { command } => presets(command, cwd),
        Command::Theme { command } => theme(command, cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| run(cli.command, &cwd));

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
