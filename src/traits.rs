//! Core traits that decouple the launch and capture engines from any
//! specific compositor or process-management mechanism.
//!
//! The OS session is an external, partially observable, concurrently
//! mutable resource: every read through these traits is a snapshot that may
//! be stale by the time a write is issued. The engines therefore never
//! assume success after observation — see the retry policy in
//! [`WindowPlacer`](crate::placer::WindowPlacer).
//!
//! A concrete backend (Hyprland IPC, a recording test double, …) implements
//! all four traits; [`Backend`] bundles them for components that drive the
//! whole session.

use crate::model::{CapturedWindow, WindowHandle, WindowRect};
use std::path::{Path, PathBuf};

/// Read-only view of the window population.
pub trait WindowInspector {
    /// The error type produced by this inspector.
    type Error: std::error::Error + Send + 'static;

    /// Enumerate the toplevel windows currently on virtual desktop
    /// `desktop` (0-based).
    ///
    /// Enumeration is desktop-scoped: callers that want every window must
    /// iterate the desktop indices and re-query. The returned
    /// [`CapturedWindow`]s have `is_system` unset; flagging is the capture
    /// engine's concern.
    fn enumerate(&self, desktop: usize) -> Result<Vec<CapturedWindow>, Self::Error>;

    /// Best-effort working directory of the process `pid`, or `None` when
    /// it cannot be determined. Never fails hard; capture treats an absent
    /// value as "omit the field".
    fn working_dir_of(&self, pid: u32) -> Option<PathBuf>;
}

/// Control over the ordered set of virtual desktops.
///
/// Desktop creation is monotonic within a session: desktops are only ever
/// added by this system, never removed.
pub trait DesktopOps {
    /// The error type produced by this controller backend.
    type Error: std::error::Error + Send + 'static;

    /// Number of virtual desktops that currently exist.
    fn desktop_count(&self) -> Result<usize, Self::Error>;

    /// Index of the currently active desktop (0-based).
    fn current_desktop(&self) -> Result<usize, Self::Error>;

    /// Create one additional desktop at the end of the order.
    fn create_desktop(&self) -> Result<(), Self::Error>;

    /// Move `window` to the desktop at `desktop` (0-based). The desktop
    /// must already exist.
    fn move_to_desktop(&self, window: WindowHandle, desktop: usize) -> Result<(), Self::Error>;
}

/// Geometry control over a single window.
pub trait WindowOps {
    /// The error type produced by this backend.
    type Error: std::error::Error + Send + 'static;

    /// Whether `window` still exists in the session.
    fn window_exists(&self, window: WindowHandle) -> Result<bool, Self::Error>;

    /// Apply `rect` to `window` in one shot (move and resize). A single
    /// attempt — the bounded-retry policy lives in
    /// [`WindowPlacer`](crate::placer::WindowPlacer).
    fn set_rect(&self, window: WindowHandle, rect: WindowRect) -> Result<(), Self::Error>;
}

/// Starts external processes.
pub trait ProcessSpawner {
    /// The error type produced by this spawner.
    type Error: std::error::Error + Send + 'static;

    /// Start `exe` (a path or a `PATH`-resolvable name) with `args`,
    /// optionally in `working_dir`, and return the new process id.
    ///
    /// The spawned process is detached: nothing in this crate waits on it
    /// or kills it later.
    fn spawn(
        &self,
        exe: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<u32, Self::Error>;
}

/// A full session backend: everything the launch orchestrator and capture
/// engine need, in one bound.
pub trait Backend: WindowInspector + DesktopOps + WindowOps + ProcessSpawner {}

impl<T> Backend for T where T: WindowInspector + DesktopOps + WindowOps + ProcessSpawner {}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockBackend;

    #[test]
    fn mock_backend_records_spawns() {
        let backend = MockBackend::new(1);
        let pid = backend.spawn("foot", &[], None).unwrap();
        assert!(pid > 0);
        assert_eq!(backend.spawn_log(), vec!["foot".to_string()]);
    }

    #[test]
    fn mock_backend_enumeration_is_desktop_scoped() {
        let backend = MockBackend::new(2);
        backend.add_window(1, "editor", "/usr/bin/editor", 100);
        assert!(backend.enumerate(0).unwrap().is_empty());
        assert_eq!(backend.enumerate(1).unwrap().len(), 1);
    }
}
