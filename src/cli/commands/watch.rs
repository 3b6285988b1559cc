//! Watch mode: keep the index live and print a notification whenever the
//! problem counts change.
//!
//! Lines read from stdin drive the session:
//!
//! - `fix <id> <index> <action>` applies a fix and re-indexes the touched files
//! - `quit` stops watching

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use colored::Colorize;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use crate::{
    actions::apply_fix,
    cli::{args::WatchCommand, exit_status::ExitStatus, report::SUCCESS_MARK},
    config::{CONFIG_FILE_NAME, Config, read_config_file},
    core::{AnnotatedIndex, Notification, Notifier, ProjectContext, ValidationSummary},
    issues::Severity,
    validators::spawn_validation_service,
};

pub fn watch(cmd: WatchCommand) -> Result<ExitStatus> {
    let ctx = ProjectContext::load(&cmd.common.root)?;
    let debounce = Duration::from_millis(cmd.debounce_ms);

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(ctx, debounce))
}

async fn run(ctx: ProjectContext, debounce: Duration) -> Result<ExitStatus> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
        let _ = event_tx.send(event);
    })
    .context("Failed to start file watcher")?;
    watcher
        .watch(&ctx.root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", ctx.root.display()))?;

    // Scan off the event loop so changes arriving meanwhile get queued.
    let aggregator = Arc::clone(&ctx.aggregator);
    let files = ctx.files.clone();
    let mut scan = tokio::task::spawn_blocking(move || aggregator.initial_scan(&files));
    let mut scan_pending = true;

    let (mut annotated_rx, _validation) = spawn_validation_service(
        ctx.aggregator.subscribe(),
        ctx.config_source.subscribe_validators(),
        debounce,
    );
    let mut notifications_rx = ctx.config_source.subscribe_notifications();
    let mut notifier = Notifier::new();

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    println!("Watching {} for changes...", ctx.root.display());

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => handle_event(&ctx, event),
            report = &mut scan, if scan_pending => {
                scan_pending = false;
                let report = report.context("Initial scan failed")?;
                println!(
                    "{} Indexed {} template file(s)",
                    SUCCESS_MARK.green(),
                    report.files_scanned
                );
                for failure in &report.failures {
                    eprintln!(
                        "{} {}",
                        "warning:".bold().yellow(),
                        failure.error
                    );
                }
            }
            changed = annotated_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let annotated = annotated_rx.borrow_and_update().clone();
                emit_notification(&mut notifier, &annotated, &ctx);
            }
            changed = notifications_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let annotated = annotated_rx.borrow().clone();
                emit_notification(&mut notifier, &annotated, &ctx);
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    let annotated = annotated_rx.borrow().clone();
                    if !handle_command(&ctx, &annotated, line.trim()) {
                        break;
                    }
                }
                Ok(None) | Err(_) => stdin_open = false,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(ExitStatus::Success)
}

fn emit_notification(notifier: &mut Notifier, annotated: &AnnotatedIndex, ctx: &ProjectContext) {
    let summary = ValidationSummary::from_index(annotated);
    if let Some(notification) = notifier.update(summary, &ctx.config_source.notifications()) {
        print_notification(&notification);
    }
}

fn print_notification(notification: &Notification) {
    match notification.severity() {
        Some(Severity::Error) => println!("{} {}", "error:".bold().red(), notification),
        Some(Severity::Warning) => println!("{} {}", "warning:".bold().yellow(), notification),
        None => println!(
            "{} {}",
            SUCCESS_MARK.green(),
            notification.to_string().green()
        ),
    }
}

fn handle_event(ctx: &ProjectContext, event: notify::Result<Event>) {
    let event = match event {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "file watcher error");
            return;
        }
    };
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return;
    }

    for path in &event.paths {
        if path.file_name().is_some_and(|name| name == CONFIG_FILE_NAME) {
            if is_project_config(ctx, path) {
                reload_config(ctx, path);
            }
            continue;
        }
        if !ctx.filter.accepts(path) {
            continue;
        }
        let file = path.to_string_lossy();
        match ctx.aggregator.on_file_changed(&file) {
            Ok(change) => tracing::debug!(file = %file, ?change, "template changed"),
            Err(e) => tracing::warn!(file = %file, error = %format!("{:#}", e), "failed to re-index template"),
        }
    }
}

fn is_project_config(ctx: &ProjectContext, path: &Path) -> bool {
    match &ctx.config_path {
        Some(config_path) => config_path == path,
        None => path.parent() == Some(ctx.root.as_path()),
    }
}

/// Include/ignore changes only take effect on restart; validator and
/// notification settings are applied live.
fn reload_config(ctx: &ProjectContext, path: &Path) {
    let config = if path.exists() {
        match read_config_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{} {:#}", "warning:".bold().yellow(), e);
                return;
            }
        }
    } else {
        Config::default()
    };
    if config.includes != ctx.config.includes || config.ignores != ctx.config.ignores {
        eprintln!(
            "{} includes/ignores changed; restart watch to apply them",
            "note:".bold()
        );
    }
    ctx.config_source.update(&config);
}

/// Returns false when the session should end.
fn handle_command(ctx: &ProjectContext, annotated: &AnnotatedIndex, line: &str) -> bool {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [] => {}
        ["quit"] | ["exit"] => return false,
        ["fix", id, index, action] => {
            if let Err(e) = run_fix(ctx, annotated, id, index, action) {
                eprintln!("Error: {:#}", e);
            }
        }
        _ => eprintln!("Commands: fix <id> <index> <action>, quit"),
    }
    true
}

fn run_fix(
    ctx: &ProjectContext,
    annotated: &AnnotatedIndex,
    id: &str,
    index: &str,
    action: &str,
) -> Result<()> {
    let index: usize = index
        .parse()
        .with_context(|| format!("Invalid index '{}'", index))?;
    let entry = ProjectContext::entry(annotated, id, index)
        .with_context(|| format!("No record '{}' at index {}", id, index))?;

    let stats = apply_fix(entry, action)?;
    // Feed the rewritten files back right away instead of waiting for the
    // watcher, so the next validation pass sees them.
    for file in &stats.files_modified {
        ctx.aggregator.on_file_changed(file)?;
    }
    println!(
        "{} {} edit(s) in {} file(s)",
        "Applied".green().bold(),
        stats.changes_applied,
        stats.files_modified.len()
    );
    Ok(())
}
