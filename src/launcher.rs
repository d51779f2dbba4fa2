//! The launch orchestrator: resolve a [`Workspace`] into process spawns,
//! desktop assignments, and window placements.
//!
//! Every app entry runs the same pipeline (ensure desktop, spawn, discover
//! window, move, place); the orchestrator only decides *when* pipelines run
//! (all at once or strictly in order) and assembles the per-app outcomes.
//! Failures inside a pipeline are recovered into its [`LaunchResult`] and
//! never abort sibling apps; only structurally invalid input fails the call
//! itself.
//!
//! There is no cancellation once a process is spawned, and nothing spawned
//! here is ever killed or waited on. Dry-run is the non-invasive escape
//! hatch: it produces the full result list without a single session call.

use crate::config::LaunchTuning;
use crate::desktops::DesktopController;
use crate::model::{AppSpec, InvalidWorkspace, LaunchResult, LaunchStatus, WindowHandle, Workspace};
use crate::placer::WindowPlacer;
use crate::traits::Backend;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

/// How app pipelines are scheduled relative to each other.
///
/// Sequential mode exists because some applications only create a
/// positionable window reliably when they do not compete with simultaneous
/// launches for system resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    /// All pipelines run concurrently; the call returns when every one has
    /// reached a terminal state.
    #[default]
    Parallel,
    /// Pipelines run strictly in `apps` order, each terminal before the
    /// next starts.
    Sequential,
}

/// Options for a single launch call.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub mode: LaunchMode,
    /// Simulate: produce the full result list without touching the session.
    pub dry_run: bool,
    /// Results of a previous call. When set, only apps whose previous entry
    /// is non-success are processed; everything else is carried over as
    /// [`LaunchStatus::Skipped`] with its prior outcome preserved.
    pub retry_only_failed_from: Option<Vec<LaunchResult>>,
}

/// Call-level failure. Per-app problems never surface here; they live in
/// the returned [`LaunchResult`]s.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("invalid workspace: {0}")]
    InvalidWorkspace(#[from] InvalidWorkspace),
}

/// Work scheduled for one app entry.
enum Plan<'a> {
    Run { app: &'a AppSpec, attempt: u32 },
    Carry(LaunchResult),
}

/// Orchestrates workspace launches over a session [`Backend`].
///
/// Stateless across calls: each `launch` resolves everything from its
/// arguments, and the only state that outlives a call is what the session
/// itself accumulated (spawned processes, created desktops).
pub struct Launcher<'b, B: Backend> {
    backend: &'b B,
    desktops: DesktopController<'b, B>,
    placer: WindowPlacer<'b, B>,
    tuning: LaunchTuning,
}

impl<'b, B: Backend + Sync> Launcher<'b, B> {
    pub fn new(backend: &'b B, tuning: LaunchTuning) -> Self {
        let placer = WindowPlacer::new(backend, tuning.place_attempts, tuning.place_backoff());
        Self {
            backend,
            desktops: DesktopController::new(backend),
            placer,
            tuning,
        }
    }

    /// Launch every app in `workspace` and return one result per entry, in
    /// `apps` order regardless of mode.
    pub fn launch(
        &self,
        workspace: &Workspace,
        opts: &LaunchOptions,
    ) -> Result<Vec<LaunchResult>, LaunchError> {
        workspace.validate()?;
        if workspace.apps.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "launching workspace {:?} ({} app(s), {:?}{})",
            workspace.name,
            workspace.apps.len(),
            opts.mode,
            if opts.dry_run { ", dry run" } else { "" }
        );

        let plan = self.plan(workspace, opts);
        let results = match opts.mode {
            LaunchMode::Sequential => self.run_sequential(plan, opts.dry_run),
            LaunchMode::Parallel => self.run_parallel(plan, opts.dry_run),
        };

        let failed = results.iter().filter(|r| !r.is_success()).count();
        if failed > 0 {
            warn!("{} of {} app(s) did not fully succeed", failed, results.len());
        }
        Ok(results)
    }

    /// Decide, per app, whether to run its pipeline or carry a previous
    /// outcome forward.
    fn plan<'a>(&self, workspace: &'a Workspace, opts: &LaunchOptions) -> Vec<Plan<'a>> {
        let previous = opts.retry_only_failed_from.as_deref();
        workspace
            .apps
            .iter()
            .map(|app| {
                let Some(previous) = previous else {
                    return Plan::Run { app, attempt: 1 };
                };
                match previous.iter().find(|r| r.app_id == app.id) {
                    Some(prior) if !prior.is_success() => Plan::Run {
                        app,
                        attempt: prior.attempt_count + 1,
                    },
                    Some(prior) => Plan::Carry(LaunchResult {
                        app_id: app.id.clone(),
                        status: LaunchStatus::Skipped,
                        carried_from: Some(prior.status),
                        pid: prior.pid,
                        window: prior.window,
                        error_detail: prior.error_detail.clone(),
                        attempt_count: prior.attempt_count,
                    }),
                    // Never attempted before: a retry pass only re-runs
                    // known failures.
                    None => Plan::Carry(LaunchResult {
                        app_id: app.id.clone(),
                        status: LaunchStatus::Skipped,
                        carried_from: None,
                        pid: None,
                        window: None,
                        error_detail: None,
                        attempt_count: 0,
                    }),
                }
            })
            .collect()
    }

    fn run_sequential(&self, plan: Vec<Plan<'_>>, dry_run: bool) -> Vec<LaunchResult> {
        let mut results = Vec::with_capacity(plan.len());
        let mut ran_one = false;
        for item in plan {
            match item {
                Plan::Carry(r) => results.push(r),
                Plan::Run { app, attempt } => {
                    if ran_one && !dry_run {
                        std::thread::sleep(self.tuning.sequential_gap());
                    }
                    results.push(self.run_app(app, attempt, dry_run));
                    ran_one = true;
                }
            }
        }
        results
    }

    /// Fan out one worker per pipeline, fan in after all terminate. Workers
    /// share nothing mutable; each returns its own result and the sequence
    /// is assembled only after the scope joins.
    fn run_parallel(&self, plan: Vec<Plan<'_>>, dry_run: bool) -> Vec<LaunchResult> {
        enum Slot<'s> {
            Done(LaunchResult),
            Pending(String, u32, std::thread::ScopedJoinHandle<'s, LaunchResult>),
        }

        std::thread::scope(|s| {
            let slots: Vec<Slot<'_>> = plan
                .into_iter()
                .map(|item| match item {
                    Plan::Carry(r) => Slot::Done(r),
                    Plan::Run { app, attempt } => Slot::Pending(
                        app.id.clone(),
                        attempt,
                        s.spawn(move || self.run_app(app, attempt, dry_run)),
                    ),
                })
                .collect();

            slots
                .into_iter()
                .map(|slot| match slot {
                    Slot::Done(r) => r,
                    Slot::Pending(app_id, attempt, handle) => {
                        handle.join().unwrap_or_else(|_| {
                            warn!("{}: launch worker panicked", app_id);
                            let mut r = Self::terminal(&app_id, attempt, LaunchStatus::SpawnFailed);
                            r.error_detail = Some("launch worker panicked".into());
                            r
                        })
                    }
                })
                .collect()
        })
    }

    //  Per-app pipeline

    /// Run one app's pipeline to a terminal state. Independent of mode.
    fn run_app(&self, app: &AppSpec, attempt: u32, dry_run: bool) -> LaunchResult {
        if dry_run {
            debug!("{}: dry run, not launched", app.id);
            let mut r = Self::terminal(&app.id, attempt, LaunchStatus::Success);
            r.error_detail = Some("dry run: not launched".into());
            return r;
        }

        // The desktop must exist before the window can be assigned to it,
        // but a creation failure must not prevent the app from opening.
        let desktop_failure = self
            .desktops
            .ensure_desktop_count(app.virtual_desktop + 1)
            .err()
            .map(|e| e.to_string());

        let launch_desktop = self.backend.current_desktop().unwrap_or(0);
        let before: HashSet<WindowHandle> = self
            .backend
            .enumerate(launch_desktop)
            .map(|ws| ws.iter().map(|w| w.handle).collect())
            .unwrap_or_default();

        let pid = match self
            .backend
            .spawn(&app.exe, &app.args, app.working_dir.as_deref())
        {
            Ok(pid) => pid,
            Err(e) => {
                warn!("{}: spawn failed: {}", app.id, e);
                let mut r = Self::terminal(&app.id, attempt, LaunchStatus::SpawnFailed);
                r.error_detail = Some(e.to_string());
                return r;
            }
        };
        info!("{}: spawned {} (pid {})", app.id, app.exe, pid);

        if let Some(cause) = desktop_failure {
            warn!(
                "{}: desktop {} unavailable, window stays where it opens: {}",
                app.id, app.virtual_desktop, cause
            );
            let mut r = Self::terminal(&app.id, attempt, LaunchStatus::DesktopMoveFailed);
            r.pid = Some(pid);
            r.error_detail = Some(cause);
            return r;
        }

        let Some(window) = self.wait_for_window(app, pid, launch_desktop, &before) else {
            let mut r = Self::terminal(&app.id, attempt, LaunchStatus::PlacementFailed);
            r.pid = Some(pid);
            r.error_detail = Some(format!(
                "no window observed within {} ms (process may still be starting)",
                self.tuning.window_timeout_ms
            ));
            return r;
        };
        debug!("{}: window {} appeared", app.id, window);

        let mut move_failure = None;
        if app.virtual_desktop != launch_desktop {
            match self.desktops.move_window(window, app.virtual_desktop) {
                Ok(()) => debug!("{}: moved to desktop {}", app.id, app.virtual_desktop),
                Err(e) => {
                    warn!("{}: {}", app.id, e);
                    move_failure = Some(e.to_string());
                    if !self.tuning.place_after_desktop_move_failure {
                        let mut r =
                            Self::terminal(&app.id, attempt, LaunchStatus::DesktopMoveFailed);
                        r.pid = Some(pid);
                        r.window = Some(window);
                        r.error_detail = move_failure;
                        return r;
                    }
                }
            }
        }

        let mut place_failure = None;
        if let Some(rect) = app.window {
            match self.placer.place(window, rect) {
                Ok(attempts) => debug!("{}: placed at {} in {} attempt(s)", app.id, rect, attempts),
                Err(e) => {
                    warn!("{}: {}", app.id, e);
                    place_failure = Some(e.to_string());
                }
            }
        }

        // Placement trouble wins the terminal status; a lone desktop-move
        // failure still fails the app (the window sits on the wrong
        // desktop) even when the rect was applied there.
        let (status, detail) = match (place_failure, move_failure) {
            (Some(p), Some(m)) => (
                LaunchStatus::PlacementFailed,
                Some(format!("{}; desktop move also failed: {}", p, m)),
            ),
            (Some(p), None) => (LaunchStatus::PlacementFailed, Some(p)),
            (None, Some(m)) => (LaunchStatus::DesktopMoveFailed, Some(m)),
            (None, None) => (LaunchStatus::Success, None),
        };
        let mut r = Self::terminal(&app.id, attempt, status);
        r.pid = Some(pid);
        r.window = Some(window);
        r.error_detail = detail;
        r
    }

    /// Poll for the spawned app's window on the launch desktop, bounded by
    /// the discovery timeout.
    ///
    /// Two strategies, in order: a window owned by the spawned pid, then
    /// any window that appeared since the pre-spawn snapshot *and* matches
    /// the executable name. The fallback covers single-instance apps that
    /// hand the window to an already-running process.
    fn wait_for_window(
        &self,
        app: &AppSpec,
        pid: u32,
        desktop: usize,
        before: &HashSet<WindowHandle>,
    ) -> Option<WindowHandle> {
        let wanted_stem = exe_stem(&app.exe);
        let deadline = Instant::now() + self.tuning.window_timeout();
        loop {
            if let Ok(windows) = self.backend.enumerate(desktop) {
                if let Some(w) = windows.iter().find(|w| w.pid == pid) {
                    return Some(w.handle);
                }
                if let Some(w) = windows.iter().find(|w| {
                    !before.contains(&w.handle)
                        && w.exe_path
                            .as_deref()
                            .map(|p| exe_stem(&p.to_string_lossy()) == wanted_stem)
                            .unwrap_or(false)
                }) {
                    debug!(
                        "{}: adopting new window {} by executable match",
                        app.id, w.handle
                    );
                    return Some(w.handle);
                }
            }
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(self.tuning.poll_interval());
        }
    }

    fn terminal(app_id: &str, attempt: u32, status: LaunchStatus) -> LaunchResult {
        LaunchResult {
            app_id: app_id.to_string(),
            status,
            carried_from: None,
            pid: None,
            window: None,
            error_detail: None,
            attempt_count: attempt,
        }
    }
}

/// File stem of an executable path or bare name, for loose identity checks.
fn exe_stem(exe: &str) -> String {
    Path::new(exe)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| exe.to_string())
}

//  Tests
