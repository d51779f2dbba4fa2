//! Recording backend double shared by the unit tests.
//!
//! [`MockBackend`] implements every session trait, logs each call behind a
//! mutex (parallel launch workers hit it from several threads), and can be
//! scripted to fail specific operations.

use crate::model::{CapturedWindow, WindowHandle, WindowRect};
use crate::traits::{DesktopOps, ProcessSpawner, WindowInspector, WindowOps};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
#[error("mock backend: {0}")]
pub struct MockError(pub String);

#[derive(Debug, Default)]
struct State {
    desktops: usize,
    current_desktop: usize,
    windows: Vec<CapturedWindow>,
    working_dirs: Vec<(u32, PathBuf)>,
    next_pid: u32,
    next_handle: u64,

    fail_spawn: bool,
    fail_create_desktop: bool,
    fail_move_to_desktop: bool,
    set_rect_failures: u32,
    fail_set_rect_always: bool,
    window_on_spawn: bool,

    spawn_log: Vec<String>,
    created_desktops: usize,
    move_log: Vec<(WindowHandle, usize)>,
    rect_log: Vec<(WindowHandle, WindowRect)>,
    os_calls: usize,
}

/// A scriptable, recording session backend.
pub struct MockBackend {
    state: Mutex<State>,
}

impl MockBackend {
    /// Create a mock session with `desktops` existing desktops and no
    /// windows. By default every spawn also creates a window for the new
    /// pid on the current desktop, so the discovery poll succeeds at once.
    pub fn new(desktops: usize) -> Self {
        Self {
            state: Mutex::new(State {
                desktops,
                next_pid: 1000,
                next_handle: 0x1000,
                window_on_spawn: true,
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    //  Scripting

    /// Pre-populate a window on `desktop`.
    pub fn add_window(&self, desktop: usize, title: &str, exe: &str, pid: u32) -> WindowHandle {
        let mut s = self.lock();
        let handle = WindowHandle(s.next_handle);
        s.next_handle += 0x10;
        s.windows.push(CapturedWindow {
            handle,
            title: title.into(),
            exe_path: if exe.is_empty() {
                None
            } else {
                Some(PathBuf::from(exe))
            },
            pid,
            rect: WindowRect {
                x: 100,
                y: 100,
                width: 640,
                height: 480,
            },
            desktop_index: desktop,
            is_system: false,
        });
        handle
    }

    /// Close a window, as if the user or the app did.
    pub fn remove_window(&self, handle: WindowHandle) {
        self.lock().windows.retain(|w| w.handle != handle);
    }

    /// Make subsequent spawns fail.
    pub fn fail_spawn(&self) {
        self.lock().fail_spawn = true;
    }

    /// Make desktop creation fail.
    pub fn fail_create_desktop(&self) {
        self.lock().fail_create_desktop = true;
    }

    /// Make window-to-desktop moves fail.
    pub fn fail_move_to_desktop(&self) {
        self.lock().fail_move_to_desktop = true;
    }

    /// Make the next `n` `set_rect` calls fail, then succeed.
    pub fn fail_set_rect_times(&self, n: u32) {
        self.lock().set_rect_failures = n;
    }

    /// Make every `set_rect` call fail.
    pub fn fail_set_rect_always(&self) {
        self.lock().fail_set_rect_always = true;
    }

    /// Spawned processes no longer present a window (background apps,
    /// crashed processes).
    pub fn suppress_windows_on_spawn(&self) {
        self.lock().window_on_spawn = false;
    }

    /// Record a working directory for `pid`.
    pub fn set_working_dir(&self, pid: u32, dir: &str) {
        self.lock().working_dirs.push((pid, PathBuf::from(dir)));
    }

    //  Inspection

    /// Executable names in spawn order.
    pub fn spawn_log(&self) -> Vec<String> {
        self.lock().spawn_log.clone()
    }

    /// How many desktops were created through the trait.
    pub fn created_desktops(&self) -> usize {
        self.lock().created_desktops
    }

    /// `(window, desktop)` pairs in move order.
    pub fn move_log(&self) -> Vec<(WindowHandle, usize)> {
        self.lock().move_log.clone()
    }

    /// `(window, rect)` pairs in placement order.
    pub fn rect_log(&self) -> Vec<(WindowHandle, WindowRect)> {
        self.lock().rect_log.clone()
    }

    /// Total number of trait calls of any kind. Zero means the session was
    /// never touched.
    pub fn os_calls(&self) -> usize {
        self.lock().os_calls
    }
}

impl WindowInspector for MockBackend {
    type Error = MockError;

    fn enumerate(&self, desktop: usize) -> Result<Vec<CapturedWindow>, MockError> {
        let mut s = self.lock();
        s.os_calls += 1;
        Ok(s
            .windows
            .iter()
            .filter(|w| w.desktop_index == desktop)
            .cloned()
            .collect())
    }

    fn working_dir_of(&self, pid: u32) -> Option<PathBuf> {
        let mut s = self.lock();
        s.os_calls += 1;
        s.working_dirs
            .iter()
            .find(|(p, _)| *p == pid)
            .map(|(_, d)| d.clone())
    }
}

impl DesktopOps for MockBackend {
    type Error = MockError;

    fn desktop_count(&self) -> Result<usize, MockError> {
        let mut s = self.lock();
        s.os_calls += 1;
        Ok(s.desktops)
    }

    fn current_desktop(&self) -> Result<usize, MockError> {
        let mut s = self.lock();
        s.os_calls += 1;
        Ok(s.current_desktop)
    }

    fn create_desktop(&self) -> Result<(), MockError> {
        let mut s = self.lock();
        s.os_calls += 1;
        if s.fail_create_desktop {
            return Err(MockError("desktop creation rejected".into()));
        }
        s.desktops += 1;
        s.created_desktops += 1;
        Ok(())
    }

    fn move_to_desktop(&self, window: WindowHandle, desktop: usize) -> Result<(), MockError> {
        let mut s = self.lock();
        s.os_calls += 1;
        if s.fail_move_to_desktop {
            return Err(MockError(format!("cannot move {} to {}", window, desktop)));
        }
        if desktop >= s.desktops {
            return Err(MockError(format!("desktop {} does not exist", desktop)));
        }
        s.move_log.push((window, desktop));
        if let Some(w) = s.windows.iter_mut().find(|w| w.handle == window) {
            w.desktop_index = desktop;
        }
        Ok(())
    }
}

impl WindowOps for MockBackend {
    type Error = MockError;

    fn window_exists(&self, window: WindowHandle) -> Result<bool, MockError> {
        let mut s = self.lock();
        s.os_calls += 1;
        Ok(s.windows.iter().any(|w| w.handle == window))
    }

    fn set_rect(&self, window: WindowHandle, rect: WindowRect) -> Result<(), MockError> {
        let mut s = self.lock();
        s.os_calls += 1;
        if s.fail_set_rect_always {
            return Err(MockError("window refused the rectangle".into()));
        }
        if s.set_rect_failures > 0 {
            s.set_rect_failures -= 1;
            return Err(MockError("window not yet responsive".into()));
        }
        if !s.windows.iter().any(|w| w.handle == window) {
            return Err(MockError(format!("no such window {}", window)));
        }
        s.rect_log.push((window, rect));
        if let Some(w) = s.windows.iter_mut().find(|w| w.handle == window) {
            w.rect = rect;
        }
        Ok(())
    }
}

impl ProcessSpawner for MockBackend {
    type Error = MockError;

    fn spawn(
        &self,
        exe: &str,
        _args: &[String],
        _working_dir: Option<&Path>,
    ) -> Result<u32, MockError> {
        let mut s = self.lock();
        s.os_calls += 1;
        if s.fail_spawn {
            return Err(MockError(format!("executable not found: {}", exe)));
        }
        let pid = s.next_pid;
        s.next_pid += 1;
        s.spawn_log.push(exe.to_string());
        if s.window_on_spawn {
            let handle = WindowHandle(s.next_handle);
            s.next_handle += 0x10;
            let desktop = s.current_desktop;
            s.windows.push(CapturedWindow {
                handle,
                title: format!("{} window", exe),
                exe_path: Some(PathBuf::from(format!("/usr/bin/{}", exe))),
                pid,
                rect: WindowRect {
                    x: 0,
                    y: 0,
                    width: 640,
                    height: 480,
                },
                desktop_index: desktop,
                is_system: false,
            });
        }
        Ok(pid)
    }
}
