//! Hyprland-specific implementations.
//!
//! This module provides the concrete session backend for the
//! [`WindowInspector`](crate::traits::WindowInspector),
//! [`DesktopOps`](crate::traits::DesktopOps),
//! [`WindowOps`](crate::traits::WindowOps) and
//! [`ProcessSpawner`](crate::traits::ProcessSpawner) traits, powered by
//! Hyprland's IPC socket.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod session;
