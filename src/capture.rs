//! Capture engine: turn the live window population into a [`Workspace`].
//!
//! The inverse of launching. Enumeration is desktop-scoped, so the engine
//! iterates every desktop index and re-queries; the resulting snapshot is
//! filtered through an injectable "system window" predicate and handed to
//! the caller for selection. The engine itself performs no UI: it exposes
//! the candidate list and accepts a selection set back.
//!
//! Command lines cannot be reliably recovered from a running process, so
//! captured apps always have empty `args`. This is a documented limitation,
//! not a defect.

use crate::model::{AppSpec, CapturedWindow, InvalidWorkspace, Workspace};
use crate::traits::{DesktopOps, WindowInspector};
use log::{debug, info, warn};
use std::collections::HashMap;

/// How much of the window population is offered for capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Apply the system-window filter; the caller selects from the rest.
    Interactive,
    /// Bypass the filter entirely and offer every window.
    All,
}

/// Errors from capturing.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// A workspace with this name already exists and `overwrite` was unset.
    #[error("workspace {0:?} already exists (use overwrite to replace it)")]
    NamingConflict(String),
    #[error("failed to enumerate windows: {0}")]
    Enumerate(String),
    #[error("captured workspace is invalid: {0}")]
    Invalid(#[from] InvalidWorkspace),
}

/// Background processes whose windows are never worth capturing.
///
/// Part of the *default* predicate only; callers with different shells can
/// inject their own via [`CaptureEngine::with_filter`].
const SYSTEM_PROCESSES: &[&str] = &[
    "waybar",
    "hyprpaper",
    "swaybg",
    "swaync",
    "mako",
    "wofi",
    "rofi",
    "xdg-desktop-portal",
    "xdg-desktop-portal-gtk",
    "xdg-desktop-portal-hyprland",
    "polkit-gnome-authentication-agent-1",
];

/// Default heuristic for windows that should not become workspace apps:
/// known shell/background processes, untitled windows, degenerate or
/// fully off-screen rectangles, and windows without a resolvable
/// executable (nothing to relaunch).
pub fn default_system_filter(window: &CapturedWindow) -> bool {
    let Some(exe) = window.exe_path.as_deref() else {
        return true;
    };
    let name = exe
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if SYSTEM_PROCESSES.contains(&name.as_str()) {
        return true;
    }
    if window.title.trim().is_empty() {
        return true;
    }
    let r = &window.rect;
    if r.width <= 0 || r.height <= 0 {
        return true;
    }
    // Entirely left of or above the virtual screen origin.
    if r.x + r.width <= 0 || r.y + r.height <= 0 {
        return true;
    }
    false
}

/// Captures the current session state into a [`Workspace`].
pub struct CaptureEngine<'b, B: WindowInspector + DesktopOps> {
    backend: &'b B,
    is_system: Box<dyn Fn(&CapturedWindow) -> bool + Send + Sync>,
}

impl<'b, B: WindowInspector + DesktopOps> CaptureEngine<'b, B> {
    /// Engine with the [`default_system_filter`].
    pub fn new(backend: &'b B) -> Self {
        Self::with_filter(backend, default_system_filter)
    }

    /// Engine with a custom system-window predicate.
    pub fn with_filter<F>(backend: &'b B, is_system: F) -> Self
    where
        F: Fn(&CapturedWindow) -> bool + Send + Sync + 'static,
    {
        Self {
            backend,
            is_system: Box::new(is_system),
        }
    }

    /// Snapshot every toplevel window across all virtual desktops, with
    /// `is_system` flagged by the predicate.
    pub fn snapshot(&self) -> Result<Vec<CapturedWindow>, CaptureError> {
        let desktops = self
            .backend
            .desktop_count()
            .map_err(|e| CaptureError::Enumerate(e.to_string()))?;

        let mut all = Vec::new();
        for desktop in 0..desktops {
            let mut windows = self
                .backend
                .enumerate(desktop)
                .map_err(|e| CaptureError::Enumerate(e.to_string()))?;
            for w in &mut windows {
                w.is_system = (self.is_system)(w);
            }
            all.extend(windows);
        }
        debug!("snapshot: {} window(s) across {} desktop(s)", all.len(), desktops);
        Ok(all)
    }

    /// The windows offered for selection: the full snapshot in
    /// [`CaptureMode::All`], only non-system windows otherwise.
    pub fn candidates(&self, mode: CaptureMode) -> Result<Vec<CapturedWindow>, CaptureError> {
        let snapshot = self.snapshot()?;
        Ok(match mode {
            CaptureMode::All => snapshot,
            CaptureMode::Interactive => snapshot.into_iter().filter(|w| !w.is_system).collect(),
        })
    }

    /// Build a [`Workspace`] from the selected windows.
    ///
    /// Fails with [`CaptureError::NamingConflict`] when `existing` is given
    /// and `overwrite` is unset; persisting the result is the caller's
    /// concern. Windows without a resolvable executable are skipped (there
    /// is nothing to relaunch).
    pub fn build_workspace(
        &self,
        name: &str,
        description: &str,
        selection: &[CapturedWindow],
        existing: Option<&Workspace>,
        overwrite: bool,
    ) -> Result<Workspace, CaptureError> {
        if existing.is_some() && !overwrite {
            return Err(CaptureError::NamingConflict(name.to_string()));
        }

        let mut workspace = Workspace::new(name, description);
        let mut used_ids: HashMap<String, usize> = HashMap::new();

        for window in selection {
            let Some(exe) = window.exe_path.as_deref() else {
                warn!(
                    "skipping window {:?}: no resolvable executable",
                    window.title
                );
                continue;
            };

            let stem = exe
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "app".to_string());
            let seen = used_ids.entry(stem.clone()).or_insert(0);
            *seen += 1;
            let id = if *seen == 1 {
                stem
            } else {
                format!("{}_{}", stem, seen)
            };

            workspace.apps.push(AppSpec {
                id,
                exe: exe.to_string_lossy().into_owned(),
                args: Vec::new(),
                working_dir: self.backend.working_dir_of(window.pid),
                virtual_desktop: window.desktop_index,
                window: Some(window.rect),
            });
        }

        workspace.validate()?;
        info!(
            "captured workspace {:?} with {} app(s)",
            workspace.name,
            workspace.apps.len()
        );
        Ok(workspace)
    }
}

//  Tests
