//! Window placer: apply a target rectangle with bounded retries.
//!
//! A window is often not yet responsive right after creation or right after
//! a desktop move, and any enumeration result may be stale by the time the
//! resize lands. The placer therefore retries a small, bounded number of
//! times with a short backoff instead of trusting a single observation.

use crate::model::{WindowHandle, WindowRect};
use crate::traits::WindowOps;
use log::debug;
use std::time::Duration;

/// Placement failure, after retries were exhausted.
#[derive(Debug, thiserror::Error)]
pub enum PlaceError {
    #[error("window no longer exists")]
    WindowGone,
    #[error("window refused placement after {attempts} attempt(s): {cause}")]
    Unresponsive { attempts: u32, cause: String },
}

/// Bounded-retry front of a [`WindowOps`] backend.
pub struct WindowPlacer<'b, B: WindowOps> {
    backend: &'b B,
    attempts: u32,
    backoff: Duration,
}

impl<'b, B: WindowOps> WindowPlacer<'b, B> {
    /// `attempts` is clamped to at least one.
    pub fn new(backend: &'b B, attempts: u32, backoff: Duration) -> Self {
        Self {
            backend,
            attempts: attempts.max(1),
            backoff,
        }
    }

    /// Move and resize `window` to `rect`.
    ///
    /// Re-checks window existence before every attempt: a handle that
    /// vanished mid-operation yields [`PlaceError::WindowGone`] rather than
    /// an opaque backend error. Returns the number of attempts used.
    pub fn place(&self, window: WindowHandle, rect: WindowRect) -> Result<u32, PlaceError> {
        let mut last_cause = String::new();
        for attempt in 1..=self.attempts {
            match self.backend.window_exists(window) {
                Ok(false) => return Err(PlaceError::WindowGone),
                Ok(true) => {}
                // Treat a failed existence query like a failed attempt; the
                // window may still be there.
                Err(e) => last_cause = e.to_string(),
            }

            match self.backend.set_rect(window, rect) {
                Ok(()) => {
                    debug!("placed {} at {} (attempt {})", window, rect, attempt);
                    return Ok(attempt);
                }
                Err(e) => {
                    debug!("placing {} failed on attempt {}: {}", window, attempt, e);
                    last_cause = e.to_string();
                }
            }

            if attempt < self.attempts {
                std::thread::sleep(self.backoff);
            }
        }
        Err(PlaceError::Unresponsive {
            attempts: self.attempts,
            cause: last_cause,
        })
    }
}

//  Tests
