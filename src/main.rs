//! Command-line entry point for **hyprlaunch**.
//!
//! Owns argument parsing, output formatting, and every interactive prompt;
//! the engines in the library crate never talk to a terminal. Each
//! subcommand wires a [`HyprlandSession`] into the launcher or capture
//! engine and renders the results.

use clap::{Parser, Subcommand};
use hyprlaunch::capture::{CaptureEngine, CaptureMode};
use hyprlaunch::config::Config;
use hyprlaunch::hyprland::session::HyprlandSession;
use hyprlaunch::launcher::{LaunchMode, LaunchOptions, Launcher};
use hyprlaunch::model::{CapturedWindow, LaunchResult, LaunchStatus, Workspace};
use hyprlaunch::store::{StoreError, WorkspaceStore};
use log::info;
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hyprlaunch",
    version,
    about = "Launch and capture application workspace layouts on Hyprland"
)]
struct Cli {
    /// Workspace store file (default: $XDG_CONFIG_HOME/hyprlaunch/workspaces.json).
    #[arg(long, value_name = "FILE", global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Launch a stored workspace.
    Launch {
        /// Workspace name.
        name: String,
        /// Launch apps one at a time instead of all at once.
        #[arg(long)]
        sequential: bool,
        /// Simulate: report what would happen without spawning anything.
        #[arg(long)]
        dry_run: bool,
        /// Do not offer to retry failed apps.
        #[arg(long)]
        no_retry: bool,
    },
    /// Capture the current window layout into a workspace.
    Capture {
        /// Name for the new workspace.
        name: String,
        /// Description stored alongside the workspace.
        #[arg(long, default_value = "")]
        description: String,
        /// Include every window, without filtering or prompting.
        #[arg(long)]
        all: bool,
        /// Replace an existing workspace with the same name.
        #[arg(long)]
        overwrite: bool,
    },
    /// List stored workspaces.
    List,
    /// Show one workspace in detail.
    Show {
        /// Workspace name.
        name: String,
    },
    /// Delete a stored workspace.
    Remove {
        /// Workspace name.
        name: String,
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprlaunch`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("hyprlaunch")
}

/// Try to load the config from `$XDG_CONFIG_HOME/hyprlaunch/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| config_dir().join("workspaces.json"));
    let store = WorkspaceStore::new(store_path);

    if let Err(e) = run(cli.command, &store) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: CliCommand, store: &WorkspaceStore) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        CliCommand::Launch {
            name,
            sequential,
            dry_run,
            no_retry,
        } => cmd_launch(store, &name, sequential, dry_run, no_retry),
        CliCommand::Capture {
            name,
            description,
            all,
            overwrite,
        } => cmd_capture(store, &name, &description, all, overwrite),
        CliCommand::List => cmd_list(store),
        CliCommand::Show { name } => cmd_show(store, &name),
        CliCommand::Remove { name, yes } => cmd_remove(store, &name, yes),
    }
}

//  launch

fn cmd_launch(
    store: &WorkspaceStore,
    name: &str,
    sequential: bool,
    dry_run: bool,
    no_retry: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = store.get(name)?;
    let config = load_config();
    let session = HyprlandSession::new();
    let launcher = Launcher::new(&session, config.launch);

    let mode = if sequential {
        LaunchMode::Sequential
    } else {
        LaunchMode::Parallel
    };

    println!(
        "launching workspace {:?} ({} app(s))",
        workspace.name,
        workspace.apps.len()
    );
    if !workspace.description.is_empty() {
        println!("  {}", workspace.description);
    }

    let opts = LaunchOptions {
        mode,
        dry_run,
        retry_only_failed_from: None,
    };
    let mut results = launcher.launch(&workspace, &opts)?;
    print_results(&results);

    // The batch always completes; retrying just the failed subset is the
    // user's call.
    while !dry_run && !no_retry && count_failed(&results) > 0 {
        if !confirm(&format!(
            "retry the {} failed app(s)? [y/N] ",
            count_failed(&results)
        )) {
            break;
        }
        let opts = LaunchOptions {
            mode,
            dry_run: false,
            retry_only_failed_from: Some(results),
        };
        results = launcher.launch(&workspace, &opts)?;
        print_results(&results);
    }
    Ok(())
}

fn count_failed(results: &[LaunchResult]) -> usize {
    results
        .iter()
        .filter(|r| !r.is_success() && r.status != LaunchStatus::Skipped)
        .count()
}

fn print_results(results: &[LaunchResult]) {
    if results.is_empty() {
        println!("no applications defined in this workspace");
        return;
    }
    println!();
    println!(
        "  {:<16} {:<20} {:>8}  {:<16} {}",
        "app", "status", "pid", "window", "detail"
    );
    for r in results {
        let status = match (r.status, r.carried_from) {
            (LaunchStatus::Skipped, Some(prev)) => format!("skipped ({})", prev),
            (status, _) => status.to_string(),
        };
        println!(
            "  {:<16} {:<20} {:>8}  {:<16} {}",
            r.app_id,
            status,
            r.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
            r.window
                .map(|w| w.to_string())
                .unwrap_or_else(|| "-".into()),
            r.error_detail.as_deref().unwrap_or("")
        );
    }
    let ok = results.iter().filter(|r| r.is_success()).count();
    println!(
        "\n  {} succeeded, {} failed, {} skipped",
        ok,
        count_failed(results),
        results
            .iter()
            .filter(|r| r.status == LaunchStatus::Skipped)
            .count()
    );
}

//  capture

fn cmd_capture(
    store: &WorkspaceStore,
    name: &str,
    description: &str,
    all: bool,
    overwrite: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = HyprlandSession::new();
    let engine = CaptureEngine::new(&session);

    let mode = if all {
        CaptureMode::All
    } else {
        CaptureMode::Interactive
    };
    let candidates = engine.candidates(mode)?;
    if candidates.is_empty() {
        println!("no windows to capture");
        return Ok(());
    }

    let selection = if all {
        candidates
    } else {
        select_windows(candidates)?
    };
    if selection.is_empty() {
        println!("nothing selected, workspace not saved");
        return Ok(());
    }

    let existing = match store.get(name) {
        Ok(ws) => Some(ws),
        Err(StoreError::NotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };

    let workspace = engine.build_workspace(name, description, &selection, existing.as_ref(), overwrite)?;
    store.save(&workspace, overwrite)?;
    println!(
        "saved workspace {:?} with {} app(s) to {}",
        workspace.name,
        workspace.apps.len(),
        store.path().display()
    );
    print_workspace(&workspace);
    Ok(())
}

/// Numbered toggle prompt: numbers and ranges flip entries, `a` selects
/// all, `n` none, `d` (or end of input) finishes.
fn select_windows(windows: Vec<CapturedWindow>) -> std::io::Result<Vec<CapturedWindow>> {
    let mut selected = vec![true; windows.len()];
    let stdin = std::io::stdin();

    loop {
        println!();
        for (i, w) in windows.iter().enumerate() {
            let exe = w
                .exe_path
                .as_deref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "?".into());
            println!(
                "  {} [{:2}] desktop {}  {:<40} ({})",
                if selected[i] { "*" } else { " " },
                i + 1,
                w.desktop_index,
                truncate(&w.title, 40),
                exe
            );
        }
        print!("toggle (numbers, ranges like 2-4), 'a' all, 'n' none, 'd' done: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim().to_lowercase();
        match input.as_str() {
            "" | "d" => break,
            "a" => selected.iter_mut().for_each(|s| *s = true),
            "n" => selected.iter_mut().for_each(|s| *s = false),
            _ => {
                for part in input.split([',', ' ']).filter(|p| !p.is_empty()) {
                    let range = match part.split_once('-') {
                        Some((lo, hi)) => lo.parse::<usize>().ok().zip(hi.parse::<usize>().ok()),
                        None => part.parse::<usize>().ok().map(|n| (n, n)),
                    };
                    match range {
                        Some((lo, hi)) if lo >= 1 && hi <= windows.len() && lo <= hi => {
                            for i in lo..=hi {
                                selected[i - 1] = !selected[i - 1];
                            }
                        }
                        _ => println!("invalid selection: {}", part),
                    }
                }
            }
        }
    }

    Ok(windows
        .into_iter()
        .zip(selected)
        .filter_map(|(w, keep)| keep.then_some(w))
        .collect())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

//  list / show / remove

fn cmd_list(store: &WorkspaceStore) -> Result<(), Box<dyn std::error::Error>> {
    let names = store.list()?;
    if names.is_empty() {
        println!("no workspaces stored in {}", store.path().display());
        return Ok(());
    }
    println!("  {:<20} {:>5}  {}", "name", "apps", "description");
    for name in names {
        let ws = store.get(&name)?;
        println!(
            "  {:<20} {:>5}  {}",
            ws.name,
            ws.apps.len(),
            truncate(&ws.description, 50)
        );
    }
    Ok(())
}

fn cmd_show(store: &WorkspaceStore, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = store.get(name)?;
    print_workspace(&workspace);
    Ok(())
}

fn print_workspace(workspace: &Workspace) {
    println!("workspace: {}", workspace.name);
    if !workspace.description.is_empty() {
        println!("  {}", workspace.description);
    }
    println!(
        "  {} app(s), {} desktop(s) required",
        workspace.apps.len(),
        workspace.required_desktops()
    );
    for app in &workspace.apps {
        let geometry = app
            .window
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unpositioned".into());
        println!(
            "    {:<16} {:<30} desktop {}  {}",
            app.id,
            truncate(&app.exe, 30),
            app.virtual_desktop,
            geometry
        );
    }
}

fn cmd_remove(
    store: &WorkspaceStore,
    name: &str,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Fails early with NotFound before prompting.
    let workspace = store.get(name)?;
    if !yes
        && !confirm(&format!(
            "delete workspace {:?} ({} app(s))? [y/N] ",
            workspace.name,
            workspace.apps.len()
        ))
    {
        println!("not deleted");
        return Ok(());
    }
    store.remove(name)?;
    println!("deleted workspace {:?}", name);
    Ok(())
}

fn confirm(prompt: &str) -> bool {
    print!("{}", prompt);
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).unwrap_or(0) == 0 {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}
