//! Desktop controller: ordered virtual desktops, created on demand.
//!
//! Desktop creation is an OS-global, visible side effect shared by every
//! concurrent launch worker, so "read count, create if short" runs under a
//! single internal lock — two workers asking for the same index must not
//! race into creating it twice. Desktops created here are never removed.

use crate::model::WindowHandle;
use crate::traits::DesktopOps;
use log::{debug, info};
use std::sync::Mutex;

/// Errors from desktop operations, with the backend cause flattened in.
#[derive(Debug, thiserror::Error)]
pub enum DesktopError {
    #[error("failed to query desktops: {0}")]
    Query(String),
    #[error("failed to create desktop {index}: {cause}")]
    Create { index: usize, cause: String },
    #[error("failed to move window {window} to desktop {desktop}: {cause}")]
    Move {
        window: WindowHandle,
        desktop: usize,
        cause: String,
    },
}

/// Serialized front of a [`DesktopOps`] backend.
pub struct DesktopController<'b, B: DesktopOps> {
    backend: &'b B,
    create_lock: Mutex<()>,
}

impl<'b, B: DesktopOps> DesktopController<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        Self {
            backend,
            create_lock: Mutex::new(()),
        }
    }

    /// Ensure at least `required` desktops exist, creating the missing tail.
    ///
    /// Idempotent: an already-satisfied count is a no-op success, and
    /// concurrent callers are serialized so each missing desktop is created
    /// exactly once.
    pub fn ensure_desktop_count(&self, required: usize) -> Result<(), DesktopError> {
        let _guard = self.create_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut count = self
            .backend
            .desktop_count()
            .map_err(|e| DesktopError::Query(e.to_string()))?;
        if count >= required {
            debug!("{} desktop(s) present, {} required", count, required);
            return Ok(());
        }

        info!("creating {} additional desktop(s)", required - count);
        while count < required {
            self.backend
                .create_desktop()
                .map_err(|e| DesktopError::Create {
                    index: count,
                    cause: e.to_string(),
                })?;
            count += 1;
        }
        Ok(())
    }

    /// Move `window` to the desktop at `desktop`.
    pub fn move_window(&self, window: WindowHandle, desktop: usize) -> Result<(), DesktopError> {
        self.backend
            .move_to_desktop(window, desktop)
            .map_err(|e| DesktopError::Move {
                window,
                desktop,
                cause: e.to_string(),
            })
    }
}

//  Tests
