//! Data model shared by every component.
//!
//! This module defines the vocabulary the whole crate speaks:
//! [`Workspace`] / [`AppSpec`] / [`WindowRect`] describe a saved layout,
//! [`LaunchResult`] reports what happened to each app during a launch, and
//! [`CapturedWindow`] is the ephemeral view of a live window produced by
//! enumeration and consumed by capture.
//!
//! `Workspace` and `AppSpec` are plain value objects: the launch and capture
//! engines receive and return them by value and never retain references
//! across invocations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque handle identifying a toplevel window for the lifetime of the
/// session. On Hyprland this is the client address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Window position and size in virtual-screen pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl fmt::Display for WindowRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// One application's launch and placement configuration within a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSpec {
    /// Identifier, unique within the owning [`Workspace`].
    pub id: String,
    /// Executable path, or a bare name resolved through `PATH`.
    pub exe: String,
    /// Arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory for the spawned process.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Target virtual desktop index (0-based).
    #[serde(default)]
    pub virtual_desktop: usize,
    /// Target window rectangle. `None` means the app is launched and
    /// desktop-assigned but never positioned.
    #[serde(default)]
    pub window: Option<WindowRect>,
}

/// A named, ordered collection of [`AppSpec`]s representing a saved desktop
/// layout.
///
/// The order of `apps` defines the launch sequence in sequential mode; in
/// parallel mode it only determines the order of the result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique, non-empty name. Used as the storage key.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub apps: Vec<AppSpec>,
}

/// Structural problems that make a [`Workspace`] unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidWorkspace {
    #[error("workspace name must not be empty")]
    EmptyName,
    #[error("duplicate app id {0:?}")]
    DuplicateAppId(String),
    #[error("app {0:?} has an empty executable")]
    EmptyExe(String),
    #[error("app {0:?} has a degenerate window rect {1}")]
    DegenerateRect(String, WindowRect),
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            apps: Vec::new(),
        }
    }

    /// Check the structural invariants: non-empty name, unique non-empty app
    /// ids, non-empty executables, positive rect dimensions.
    pub fn validate(&self) -> Result<(), InvalidWorkspace> {
        if self.name.trim().is_empty() {
            return Err(InvalidWorkspace::EmptyName);
        }
        let mut seen = std::collections::HashSet::new();
        for app in &self.apps {
            if !seen.insert(app.id.as_str()) {
                return Err(InvalidWorkspace::DuplicateAppId(app.id.clone()));
            }
            if app.exe.trim().is_empty() {
                return Err(InvalidWorkspace::EmptyExe(app.id.clone()));
            }
            if let Some(rect) = &app.window {
                if rect.width <= 0 || rect.height <= 0 {
                    return Err(InvalidWorkspace::DegenerateRect(app.id.clone(), *rect));
                }
            }
        }
        Ok(())
    }

    /// Number of virtual desktops this workspace needs (highest target
    /// index plus one; at least one).
    pub fn required_desktops(&self) -> usize {
        self.apps
            .iter()
            .map(|a| a.virtual_desktop + 1)
            .max()
            .unwrap_or(1)
    }

    /// Look up an app by id.
    pub fn app(&self, id: &str) -> Option<&AppSpec> {
        self.apps.iter().find(|a| a.id == id)
    }
}

//  Launch results

/// Terminal state of one app's launch pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStatus {
    /// Process spawned, window placed (or no placement requested).
    Success,
    /// The executable could not be started.
    SpawnFailed,
    /// Desktop creation or window-desktop assignment was rejected.
    DesktopMoveFailed,
    /// The window never appeared, vanished mid-placement, or refused the
    /// requested rectangle.
    PlacementFailed,
    /// Not processed in this call: a retry pass carried the previous
    /// outcome over.
    Skipped,
}

impl fmt::Display for LaunchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchStatus::Success => write!(f, "success"),
            LaunchStatus::SpawnFailed => write!(f, "spawn failed"),
            LaunchStatus::DesktopMoveFailed => write!(f, "desktop move failed"),
            LaunchStatus::PlacementFailed => write!(f, "placement failed"),
            LaunchStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Per-app outcome of a launch call. Produced by the orchestrator, rendered
/// by the front end, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchResult {
    pub app_id: String,
    pub status: LaunchStatus,
    /// When `status` is [`LaunchStatus::Skipped`] because a retry pass
    /// carried this entry over, the terminal status of the previous attempt.
    pub carried_from: Option<LaunchStatus>,
    /// Pid of the spawned process, when one was started.
    pub pid: Option<u32>,
    /// Handle of the window the pipeline resolved, when one appeared.
    pub window: Option<WindowHandle>,
    /// Human-readable cause for non-success outcomes.
    pub error_detail: Option<String>,
    /// How many launch invocations have attempted this app. Starts at 1 and
    /// is incremented by retry-of-failed passes; carried entries keep their
    /// previous count.
    pub attempt_count: u32,
}

impl LaunchResult {
    /// Whether this entry counts as a success for retry purposes.
    pub fn is_success(&self) -> bool {
        self.status == LaunchStatus::Success
    }
}

//  Captured windows

/// Snapshot of one live toplevel window, as reported by the window
/// inspector. Ephemeral: valid only as long as the window exists.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedWindow {
    pub handle: WindowHandle,
    pub title: String,
    /// Resolved executable path of the owning process, when obtainable.
    pub exe_path: Option<PathBuf>,
    pub pid: u32,
    pub rect: WindowRect,
    /// Virtual desktop the window currently lives on (0-based).
    pub desktop_index: usize,
    /// Heuristic flag: shell, background, or otherwise non-capturable
    /// window. Set by the capture engine's filter, not by enumeration.
    pub is_system: bool,
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> WindowRect {
        WindowRect {
            x: 0,
            y: 0,
            width: 800,
            height: 600,
        }
    }

    fn app(id: &str) -> AppSpec {
        AppSpec {
            id: id.into(),
            exe: "foot".into(),
            args: vec![],
            working_dir: None,
            virtual_desktop: 0,
            window: Some(rect()),
        }
    }

    #[test]
    fn valid_workspace_passes() {
        let ws = Workspace {
            name: "dev".into(),
            description: String::new(),
            apps: vec![app("a"), app("b")],
        };
        assert_eq!(ws.validate(), Ok(()));
    }

    #[test]
    fn empty_name_rejected() {
        let ws = Workspace::new("  ", "");
        assert_eq!(ws.validate(), Err(InvalidWorkspace::EmptyName));
    }

    #[test]
    fn duplicate_app_id_rejected() {
        let ws = Workspace {
            name: "dev".into(),
            description: String::new(),
            apps: vec![app("a"), app("a")],
        };
        assert_eq!(
            ws.validate(),
            Err(InvalidWorkspace::DuplicateAppId("a".into()))
        );
    }

    #[test]
    fn zero_size_rect_rejected() {
        let mut bad = app("a");
        bad.window = Some(WindowRect {
            x: 10,
            y: 10,
            width: 0,
            height: 600,
        });
        let ws = Workspace {
            name: "dev".into(),
            description: String::new(),
            apps: vec![bad],
        };
        assert!(matches!(
            ws.validate(),
            Err(InvalidWorkspace::DegenerateRect(..))
        ));
    }

    #[test]
    fn required_desktops_covers_highest_index() {
        let mut ws = Workspace::new("dev", "");
        assert_eq!(ws.required_desktops(), 1);
        let mut a = app("a");
        a.virtual_desktop = 3;
        ws.apps.push(a);
        ws.apps.push(app("b"));
        assert_eq!(ws.required_desktops(), 4);
    }

    #[test]
    fn minimal_app_spec_deserializes_with_defaults() {
        let json = r#"{ "id": "term", "exe": "foot" }"#;
        let spec: AppSpec = serde_json::from_str(json).unwrap();
        assert!(spec.args.is_empty());
        assert_eq!(spec.working_dir, None);
        assert_eq!(spec.virtual_desktop, 0);
        assert_eq!(spec.window, None);
    }

    #[test]
    fn unknown_keys_ignored() {
        let json = r#"{ "name": "dev", "apps": [], "future_section": 42 }"#;
        // Should not fail — unknown keys are silently ignored.
        let ws: Workspace = serde_json::from_str(json).unwrap();
        assert_eq!(ws.name, "dev");
    }

    #[test]
    fn window_handle_displays_as_hex() {
        assert_eq!(WindowHandle(0x55aa).to_string(), "0x55aa");
    }
}
