use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use storefront_editor::{PreviewDebouncer, PreviewMessage, VisualEditor};
use std::future::Future;
use std::time::Duration;
use storefront_layout::{JsonFileStore, PublishCheck, PublishStatus, PublishWorker, SettingsService};
use tokio::sync::mpsc;

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Schedule for this RFC 3339 time instead of publishing now
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Keep checking on an interval until interrupted
    #[arg(short, long)]
    pub watch: bool,

    /// Polling period for --watch, in milliseconds
    #[arg(long, default_value_t = 60_000)]
    pub interval_ms: u64,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Type RESET to confirm
    #[arg(long)]
    pub confirm: String,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Version id from `storefront history`
    pub id: String,
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// Write the theme document to stdout or a file
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Load an exported theme document or bare settings snapshot
    Import { input: PathBuf },
}

fn open_service(cwd: &Path) -> Result<SettingsService<JsonFileStore>> {
    let config = Config::load(cwd)?;
    let path = config.settings_path(cwd);
    SettingsService::open(JsonFileStore::new(&path)).with_context(|| format!("Cannot open {}", path.display()))
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw).with_context(|| format!("Invalid timestamp: {}", raw))?;
    Ok(parsed.with_timezone(&Utc))
}

fn status_label(status: PublishStatus) -> colored::ColoredString {
    match status {
        PublishStatus::Draft => "draft".yellow(),
        PublishStatus::Scheduled => "scheduled".cyan(),
        PublishStatus::Live => "live".green(),
    }
}

pub fn status(cwd: &Path) -> Result<()> {
    let service = open_service(cwd)?;
    let settings = service.settings();
    let workflow = &settings.publish_workflow;

    println!("Status: {}", status_label(workflow.status).bold());
    if let Some(at) = workflow.scheduled_at {
        println!("   Scheduled for: {}", at.to_rfc3339());
    }
    if let Some(at) = workflow.published_at {
        println!("   Published at:  {}", at.to_rfc3339());
    }
    println!("   Version: {} ({} saved)", settings.current_version, settings.version_history.len());

    println!();
    for section in &settings.layout {
        let marker = if section.enabled { "●".green() } else { "○".dimmed() };
        println!("   {} {} {}", marker, section.kind, section.id.dimmed());
    }

    let diff = settings.diff_against_live();
    println!();
    if diff.is_empty() {
        println!("   {} Draft matches live", "✓".green());
    } else {
        println!(
            "   {} {} sections, {} field groups differ from live",
            "≠".yellow(),
            diff.changed_sections,
            diff.changed_field_groups
        );
    }
    Ok(())
}

pub fn publish(args: PublishArgs, cwd: &Path) -> Result<()> {
    let mut service = open_service(cwd)?;
    let now = Utc::now();

    match args.at.as_deref() {
        Some(raw) => {
            let at = parse_time(raw)?;
            service.schedule_publish(Some(at), now)?;
            println!("{} Scheduled for {}", "✓".green(), at.to_rfc3339());
        }
        None => {
            service.publish_now(now)?;
            println!("{} Published", "✓".green());
        }
    }
    Ok(())
}

fn print_check(outcome: PublishCheck) {
    match outcome {
        PublishCheck::Promoted { published_at } => {
            println!("{} Scheduled publish went live at {}", "✓".green(), published_at.to_rfc3339())
        }
        PublishCheck::NotScheduled => println!("Nothing scheduled"),
        PublishCheck::NotDueYet { scheduled_at } => println!("Scheduled for {}", scheduled_at.to_rfc3339()),
        PublishCheck::InvalidSchedule => println!("{} Scheduled without a time", "⚠".yellow()),
    }
}

/// Run the publish worker until `shutdown` resolves; returns the outcomes seen
async fn watch_until<F>(
    service: SettingsService<JsonFileStore>,
    period: Duration,
    shutdown: F,
) -> Vec<PublishCheck>
where
    F: Future<Output = ()>,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let worker = PublishWorker::spawn(service, period, Utc::now, Some(tx));

    let mut seen = Vec::new();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            outcome = rx.recv() => match outcome {
                Some(outcome) => {
                    print_check(outcome);
                    seen.push(outcome);
                }
                None => break,
            },
        }
    }

    worker.stop().await;
    seen
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let mut service = open_service(cwd)?;
    if !args.watch {
        print_check(service.run_publish_check(Utc::now())?);
        return Ok(());
    }

    let period = Duration::from_millis(args.interval_ms.max(1));
    println!("Watching for scheduled publishes every {:?} (Ctrl-C to stop)", period);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch_until(service, period, async {
        let _ = tokio::signal::ctrl_c().await;
    }));
    Ok(())
}

pub fn reset(args: ResetArgs, cwd: &Path) -> Result<()> {
    let mut service = open_service(cwd)?;
    service.reset_to_defaults(&args.confirm, Utc::now())?;
    println!("{} Reset to defaults and published", "✓".green());
    Ok(())
}

pub fn history(cwd: &Path) -> Result<()> {
    let service = open_service(cwd)?;
    let items = service.history();
    if items.is_empty() {
        println!("No saved versions");
        return Ok(());
    }
    for item in items {
        println!("{:>6}  {}  {}", item.id.cyan(), item.saved_at.to_rfc3339().dimmed(), item.label);
    }
    Ok(())
}

pub fn restore(args: RestoreArgs, cwd: &Path) -> Result<()> {
    let mut service = open_service(cwd)?;
    service.restore(&args.id, Utc::now())?;
    println!("{} Restored {}", "✓".green(), args.id);
    Ok(())
}

/// The full update a freshly attached preview receives
fn preview_message(cwd: &Path) -> Result<PreviewMessage> {
    let config = Config::load(cwd)?;
    let store = JsonFileStore::new(config.settings_path(cwd));
    let runtime = tokio::runtime::Runtime::new()?;

    let message = runtime.block_on(async {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let debouncer = PreviewDebouncer::spawn(config.preview_debounce(), out_tx);
        let mut editor = VisualEditor::open(store)?;
        editor.attach_preview(debouncer);
        drop(editor);
        anyhow::Ok(out_rx.recv().await)
    })?;

    message.ok_or_else(|| anyhow!("Preview produced no update"))
}

pub fn preview(cwd: &Path) -> Result<()> {
    let message = preview_message(cwd)?;
    println!("{}", serde_json::to_string_pretty(&message)?);
    Ok(())
}

pub fn theme(command: ThemeCommand, cwd: &Path) -> Result<()> {
    match command {
        ThemeCommand::Export { out } => {
            let service = open_service(cwd)?;
            let json = service.export_theme(Utc::now())?;
            match out {
                Some(path) => {
                    fs::write(&path, json)?;
                    println!("{} {}", "✓".green(), path.display());
                }
                None => println!("{}", json),
            }
        }
        ThemeCommand::Import { input } => {
            let mut service = open_service(cwd)?;
            let json = fs::read_to_string(&input).with_context(|| format!("Cannot read {}", input.display()))?;
            service.import_theme(&json, Utc::now())?;
            println!("{} Imported {}", "✓".green(), input.display());
        }
    }
    Ok(())
}
