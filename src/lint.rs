use crate::{
    language::typecheck::{FormatChecker, FormatDiagnostic},
    project::{find_manifest, CallsFile, CheckerManifest},
    tools::diagnostics::{emit_call_diagnostics, emit_calls_error, CheckSummary},
};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rayon::prelude::*;
use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    sync::mpsc,
    time::Duration,
};

/// Command-line settings for `check`.
#[derive(Clone, Debug, Default)]
pub struct CheckSettings {
    /// Explicit configuration file; otherwise one is searched for next to
    /// the calls file.
    pub config: Option<PathBuf>,
    pub target: Option<String>,
}

/// Checks every call in `file`. Results are in input order.
pub fn check_calls(checker: &FormatChecker, file: &CallsFile) -> Vec<Vec<FormatDiagnostic>> {
    file.calls
        .par_iter()
        .map(|call| checker.check_call(call))
        .collect()
}

pub fn load_checker(
    calls_path: &Path,
    settings: &CheckSettings,
) -> Result<FormatChecker, Box<dyn Error + Send + Sync>> {
    let manifest_path = settings
        .config
        .clone()
        .or_else(|| find_manifest(calls_path));
    let manifest = match manifest_path {
        Some(path) => {
            log::info!("Using configuration {}.", path.display());
            CheckerManifest::load(&path)?
        }
        None => CheckerManifest::default(),
    };
    let target = manifest.resolve_target(settings.target.clone());
    Ok(manifest.checker(target))
}

pub fn run_check(
    file_path: &Path,
    settings: &CheckSettings,
    watch: bool,
) -> Result<CheckSummary, Box<dyn Error + Send + Sync>> {
    let mut summary = run_single_check(file_path, settings)?;

    if !watch {
        return Ok(summary);
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = build_watcher(tx)?;
    for path in watched_paths(file_path, settings) {
        log::debug!("Watching {}.", path.display());
        watcher.watch(&path, RecursiveMode::NonRecursive)?;
    }
    println!(
        "Watching {} for changes. Press Ctrl+C to stop…",
        file_path.display()
    );

    for event in rx {
        match event {
            Ok(event) if is_edit(&event.kind) => match run_single_check(file_path, settings) {
                Ok(next) => {
                    println!("{}", next.progress_since(&summary));
                    summary = next;
                }
                Err(err) => eprintln!("check error: {err}"),
            },
            Ok(_) => {}
            Err(err) => log::warn!("watch error: {err}"),
        }
    }

    Ok(summary)
}

/// The calls file and, when there is one, the configuration that applies to
/// it.
fn watched_paths(file_path: &Path, settings: &CheckSettings) -> Vec<PathBuf> {
    let mut paths = vec![file_path.to_path_buf()];
    if let Some(config) = settings.config.clone().or_else(|| find_manifest(file_path)) {
        paths.push(config);
    }
    paths
}

fn is_edit(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

fn build_watcher(
    tx: mpsc::Sender<notify::Result<notify::Event>>,
) -> notify::Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })?;
    watcher.configure(Config::default().with_poll_interval(Duration::from_millis(200)))?;
    Ok(watcher)
}

fn run_single_check(
    path: &Path,
    settings: &CheckSettings,
) -> Result<CheckSummary, Box<dyn Error + Send + Sync>> {
    let checker = load_checker(path, settings)?;
    let source = fs::read_to_string(path)?;

    let file = match CallsFile::parse(path, &source) {
        Ok(file) => file,
        Err(err) => {
            emit_calls_error(path, &source, &err);
            return Ok(CheckSummary {
                errors: 1,
                ..CheckSummary::default()
            });
        }
    };

    let results = check_calls(&checker, &file);
    let summary = emit_call_diagnostics(path, &source, &file, &results);
    if summary.errors == 0 && summary.warnings == 0 {
        println!("{}: no diagnostics", path.display());
    } else {
        println!(
            "{}: {} calls checked, {} errors, {} warnings",
            path.display(),
            summary.calls,
            summary.errors,
            summary.warnings
        );
    }
    Ok(summary)
}
