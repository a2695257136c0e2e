//! Session controller bracketing each exchange with terminal resources.

use std::future::Future;

use log::warn;

use crate::errors::DrillError;
use crate::terminal::raw_mode::{drain_pending_input, RawModeGuard};
use crate::terminal::spinner::Spinner;

/// Drives the raw-mode and busy-indicator envelope around one blocking
/// exchange at a time.
///
/// The sequencing is the contract: acquire raw mode, drain stale input,
/// start the indicator, run the work, stop the indicator, release raw
/// mode, drain suppressed input. Every resource acquired is released on
/// every path because the steps are straight-line code over owning guards;
/// there is no state to reconcile afterwards.
#[derive(Debug)]
pub struct SessionController {
    interactive: bool,
}

impl SessionController {
    /// Create a controller. `interactive` reports whether stdin and stdout
    /// are real terminals; the caller detects that once at startup.
    pub fn new(interactive: bool) -> Self {
        SessionController { interactive }
    }

    /// Run `work` behind the busy indicator.
    ///
    /// In a non-interactive session the work runs bare: no raw mode, no
    /// indicator, nothing to restore afterwards. Interactively, raw mode
    /// and the indicator envelope the call and are torn down again
    /// whatever the outcome. A failed restore is logged rather than
    /// displacing the outcome the caller asked for.
    pub async fn run_with_indicator<T, F>(&mut self, work: F) -> Result<T, DrillError>
    where
        F: Future<Output = Result<T, DrillError>>,
    {
        if !self.interactive {
            return work.await;
        }

        let guard = RawModeGuard::acquire()?;
        drain_pending_input();

        let spinner = Spinner::start();
        let outcome = work.await;
        spinner.stop().await;

        if let Err(error) = guard.release() {
            warn!("{}", error);
        }
        drain_pending_input();

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_non_interactive_passes_success_through() {
        let mut controller = SessionController::new(false);

        let outcome = controller.run_with_indicator(async { Ok(42) }).await;

        assert_eq!(outcome.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_non_interactive_passes_failure_through() {
        let mut controller = SessionController::new(false);

        let outcome: Result<(), DrillError> = controller
            .run_with_indicator(async { Err(DrillError::exchange("service returned 500")) })
            .await;

        let error = outcome.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Exchange);
        assert!(error.message.contains("500"));
    }

    #[tokio::test]
    async fn test_non_interactive_awaits_the_work() {
        let mut controller = SessionController::new(false);

        let outcome = controller
            .run_with_indicator(async {
                sleep(Duration::from_millis(20)).await;
                Ok("done")
            })
            .await;

        assert_eq!(outcome.unwrap(), "done");
    }
}
