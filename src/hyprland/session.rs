//! Session backend implemented over Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.
//!
//! Numbered Hyprland workspaces play the role of the ordered virtual
//! desktops: desktop index `n` maps to workspace id `n + 1`. Hyprland
//! materializes a workspace the first time it is switched to, so "create a
//! desktop" is a switch to the next unused id — a visible side effect, and
//! one that is never undone by this crate.

use crate::model::{CapturedWindow, WindowHandle, WindowRect};
use crate::traits::{DesktopOps, ProcessSpawner, WindowInspector, WindowOps};
use log::debug;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Hyprland-backed session.
///
/// All communication happens over Hyprland's IPC socket; each method call
/// opens a short-lived request. No state is held between calls.
pub struct HyprlandSession;

/// Errors that can occur when talking to Hyprland or spawning processes.
#[derive(Debug, thiserror::Error)]
#[error("hyprland session error: {0}")]
pub struct HyprlandError(String);

impl Default for HyprlandSession {
    fn default() -> Self {
        Self
    }
}

impl HyprlandSession {
    /// Create a new handle.
    ///
    /// No connection is opened eagerly; each method call opens a
    /// short-lived IPC request.
    pub fn new() -> Self {
        Self
    }
}

//  Direct Hyprland IPC helpers

/// Resolve the Hyprland command socket path.
///
/// Hyprland ≥ 0.40 stores its sockets at
/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
fn socket_path() -> Result<PathBuf, HyprlandError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/.socket.sock",
        runtime_dir, his
    )))
}

/// Send a raw command to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(command: &str) -> Result<String, HyprlandError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and return the raw JSON string.
fn ipc_json(data_command: &str) -> Result<String, HyprlandError> {
    ipc_request(&format!("j/{}", data_command))
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandError> {
    let response = ipc_request(&format!("/dispatch {}", args))?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandError(format!("dispatch error: {}", response)))
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of the JSON object returned by `j/clients`.
#[derive(Debug, Deserialize)]
struct ClientJson {
    address: String,
    mapped: bool,
    hidden: bool,
    at: [i32; 2],
    size: [i32; 2],
    workspace: WorkspaceRefJson,
    pid: i64,
    title: String,
}

/// Workspace reference embedded in a client object.
#[derive(Debug, Deserialize)]
struct WorkspaceRefJson {
    id: i64,
}

/// Subset of the JSON object returned by `j/workspaces` and
/// `j/activeworkspace`.
#[derive(Debug, Deserialize)]
struct WorkspaceJson {
    id: i64,
}

//  Mapping helpers

/// Desktop index (0-based) to Hyprland workspace id (1-based, positive).
fn workspace_id(desktop: usize) -> i64 {
    desktop as i64 + 1
}

/// Parse a client address like `"0x55d2c9a81e20"`.
fn parse_address(address: &str) -> Option<WindowHandle> {
    let hex = address.trim().trim_start_matches("0x");
    u64::from_str_radix(hex, 16).ok().map(WindowHandle)
}

/// Resolve the executable behind a pid via procfs, when still readable.
fn exe_of(pid: i64) -> Option<PathBuf> {
    if pid <= 0 {
        return None;
    }
    std::fs::read_link(format!("/proc/{}/exe", pid)).ok()
}

/// Convert the clients of one workspace into [`CapturedWindow`]s.
///
/// Unmapped, hidden, and special-workspace clients are not user-visible
/// toplevels and are dropped; so are clients whose address fails to parse.
fn to_captured(clients: Vec<ClientJson>, desktop: usize) -> Vec<CapturedWindow> {
    let target = workspace_id(desktop);
    clients
        .into_iter()
        .filter(|c| c.mapped && !c.hidden && c.workspace.id == target)
        .filter_map(|c| {
            let handle = parse_address(&c.address)?;
            Some(CapturedWindow {
                handle,
                title: c.title,
                exe_path: exe_of(c.pid),
                pid: c.pid.max(0) as u32,
                rect: WindowRect {
                    x: c.at[0],
                    y: c.at[1],
                    width: c.size[0],
                    height: c.size[1],
                },
                desktop_index: desktop,
                is_system: false,
            })
        })
        .collect()
}

fn fetch_clients() -> Result<Vec<ClientJson>, HyprlandError> {
    let json = ipc_json("clients")?;
    serde_json::from_str(&json).map_err(|e| HyprlandError(format!("parse clients: {}", e)))
}

//  Trait implementations

impl WindowInspector for HyprlandSession {
    type Error = HyprlandError;

    fn enumerate(&self, desktop: usize) -> Result<Vec<CapturedWindow>, HyprlandError> {
        Ok(to_captured(fetch_clients()?, desktop))
    }

    fn working_dir_of(&self, pid: u32) -> Option<PathBuf> {
        std::fs::read_link(format!("/proc/{}/cwd", pid)).ok()
    }
}

impl DesktopOps for HyprlandSession {
    type Error = HyprlandError;

    fn desktop_count(&self) -> Result<usize, HyprlandError> {
        let json = ipc_json("workspaces")?;
        let workspaces: Vec<WorkspaceJson> = serde_json::from_str(&json)
            .map_err(|e| HyprlandError(format!("parse workspaces: {}", e)))?;
        // Special workspaces have negative ids and are not part of the
        // ordered desktop set.
        let highest = workspaces.iter().map(|w| w.id).filter(|id| *id > 0).max();
        Ok(highest.unwrap_or(1) as usize)
    }

    fn current_desktop(&self) -> Result<usize, HyprlandError> {
        let json = ipc_json("activeworkspace")?;
        let active: WorkspaceJson = serde_json::from_str(&json)
            .map_err(|e| HyprlandError(format!("parse activeworkspace: {}", e)))?;
        Ok((active.id.max(1) - 1) as usize)
    }

    fn create_desktop(&self) -> Result<(), HyprlandError> {
        let next = workspace_id(self.desktop_count()?);
        debug!("materializing workspace {}", next);
        ipc_dispatch(&format!("workspace {}", next))
    }

    fn move_to_desktop(&self, window: WindowHandle, desktop: usize) -> Result<(), HyprlandError> {
        ipc_dispatch(&format!(
            "movetoworkspacesilent {},address:{}",
            workspace_id(desktop),
            window
        ))
    }
}

impl WindowOps for HyprlandSession {
    type Error = HyprlandError;

    fn window_exists(&self, window: WindowHandle) -> Result<bool, HyprlandError> {
        Ok(fetch_clients()?
            .iter()
            .any(|c| parse_address(&c.address) == Some(window)))
    }

    fn set_rect(&self, window: WindowHandle, rect: WindowRect) -> Result<(), HyprlandError> {
        // Tiled clients ignore pixel moves; pin the window to the floating
        // layer first. setfloating (unlike togglefloating) is idempotent.
        ipc_dispatch(&format!("setfloating address:{}", window))?;
        ipc_dispatch(&format!(
            "movewindowpixel exact {} {},address:{}",
            rect.x, rect.y, window
        ))?;
        ipc_dispatch(&format!(
            "resizewindowpixel exact {} {},address:{}",
            rect.width, rect.height, window
        ))
    }
}

impl ProcessSpawner for HyprlandSession {
    type Error = HyprlandError;

    fn spawn(
        &self,
        exe: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> Result<u32, HyprlandError> {
        let mut command = Command::new(exe);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }
        let child = command
            .spawn()
            .map_err(|e| HyprlandError(format!("failed to start {}: {}", exe, e)))?;
        // Detached: the child is never waited on or killed by this crate.
        Ok(child.id())
    }
}

//  Tests
