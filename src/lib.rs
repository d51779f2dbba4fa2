//! **hyprlaunch** — a workspace launcher and layout capturer.
//!
//! A *workspace* is a named collection of applications, each with a target
//! virtual desktop and window rectangle.  Launching a workspace spawns
//! every application, assigns its window to the right desktop, and applies
//! the saved geometry; capturing does the inverse, deriving a workspace
//! from the windows currently on screen.
//!
//! # Architecture
//!
//! The crate is organised around four traits in [`traits`] —
//! [`WindowInspector`](traits::WindowInspector),
//! [`DesktopOps`](traits::DesktopOps), [`WindowOps`](traits::WindowOps) and
//! [`ProcessSpawner`](traits::ProcessSpawner) — so the
//! [`Launcher`](launcher::Launcher) and
//! [`CaptureEngine`](capture::CaptureEngine) are not coupled to any
//! specific compositor.  The concrete backend lives in [`hyprland`]
//! (Hyprland IPC); tests drive the same engines through a recording double.
//!
//! Per-app launch failures are data, not errors: a launch call returns one
//! [`LaunchResult`](model::LaunchResult) per app and only fails as a whole
//! on structurally invalid input.

pub mod capture;
pub mod config;
pub mod desktops;
pub mod hyprland;
pub mod launcher;
pub mod model;
pub mod placer;
pub mod store;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;
