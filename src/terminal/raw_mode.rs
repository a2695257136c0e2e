//! Raw-mode lifecycle for the interactive session.
//!
//! Raw mode is held only while an exchange is in flight, so keystrokes
//! typed during the wait are suppressed instead of echoing into the next
//! prompt. Acquisition and restoration are paired through a guard.

use std::io::{stdin, IsTerminal};
use std::time::Duration;

use crossterm::event;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::debug;

use crate::errors::DrillError;

/// Owns the obligation to restore the terminal's input mode.
///
/// crossterm snapshots the previous attributes when raw mode is enabled and
/// restores them on disable. The guard guarantees disable runs exactly
/// once: through `release` on the normal path, or through `Drop` when the
/// caller unwinds past it.
#[derive(Debug)]
pub struct RawModeGuard {
    restored: bool,
}

impl RawModeGuard {
    /// Switch stdin to character-at-a-time input.
    ///
    /// Fails when stdin is not an interactive terminal or when the
    /// attribute switch itself fails; in both cases the terminal is left
    /// untouched.
    pub fn acquire() -> Result<Self, DrillError> {
        if !stdin().is_terminal() {
            return Err(DrillError::terminal(
                "standard input is not an interactive terminal",
            ));
        }

        enable_raw_mode()
            .map_err(|e| DrillError::terminal("failed to enable raw mode").with_source(e))?;
        debug!("raw mode enabled");

        Ok(RawModeGuard { restored: false })
    }

    /// Restore the attributes captured when the guard was acquired.
    pub fn release(mut self) -> Result<(), DrillError> {
        self.restore()
    }

    fn restore(&mut self) -> Result<(), DrillError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        disable_raw_mode().map_err(|e| {
            DrillError::terminal("failed to restore the terminal's input mode")
                .with_suggestion("Run `reset` if your terminal is garbled.")
                .with_source(e)
        })?;
        debug!("raw mode restored");

        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Discard any input already buffered on stdin.
///
/// Uses a zero-timeout readiness check, so with nothing buffered the first
/// poll returns immediately and the call never blocks. Runs before the
/// busy indicator starts, against stale keystrokes from earlier prompts,
/// and again after raw mode is released, against anything typed while
/// input was suppressed.
pub fn drain_pending_input() {
    loop {
        match event::poll(Duration::ZERO) {
            Ok(true) => {
                if event::read().is_err() {
                    break;
                }
            }
            Ok(false) | Err(_) => break,
        }
    }
}
