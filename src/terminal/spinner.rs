//! Busy indicator shown while an exchange is in flight.

use std::io::stdout;
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::execute;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use log::debug;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Glyphs of the rotation, one per frame.
const GLYPHS: [char; 4] = ['|', '/', '-', '\\'];

/// Time between frames.
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

fn glyph(frame: usize) -> char {
    GLYPHS[frame % GLYPHS.len()]
}

/// A running busy indicator.
///
/// The animation runs on a background task that owns the terminal line
/// until `stop` completes. Stop signals the task, waits for it to exit,
/// and only then blanks the line, so a late frame can never land after
/// the line is cleared.
#[derive(Debug)]
pub struct Spinner {
    task: Option<JoinHandle<()>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl Spinner {
    /// Spawn the animation task and hand it the terminal line.
    pub fn start() -> Self {
        let (cancel, mut cancelled) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut frame = 0;
            loop {
                let _ = execute!(stdout(), MoveToColumn(0), Print(glyph(frame)));
                frame += 1;

                tokio::select! {
                    _ = &mut cancelled => break,
                    _ = sleep(FRAME_INTERVAL) => {}
                }
            }
        });
        debug!("indicator started");

        Spinner { task: Some(task), cancel: Some(cancel) }
    }

    /// Stop the animation and blank the line it occupied.
    ///
    /// Returns only once the background task has exited.
    pub async fn stop(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }

        let _ = execute!(stdout(), MoveToColumn(0), Clear(ClearType::CurrentLine));
        debug!("indicator stopped");
    }
}

impl Drop for Spinner {
    /// Abort the task if `stop` never ran, so an unwinding caller does not
    /// leave the animation behind.
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[test]
    fn test_glyph_rotation_wraps() {
        assert_eq!(glyph(0), '|');
        assert_eq!(glyph(1), '/');
        assert_eq!(glyph(2), '-');
        assert_eq!(glyph(3), '\\');
        assert_eq!(glyph(4), '|');
    }

    #[tokio::test]
    async fn test_stop_terminates_promptly() {
        let spinner = Spinner::start();
        sleep(Duration::from_millis(250)).await;

        let stopped = timeout(Duration::from_secs(1), spinner.stop()).await;

        assert!(stopped.is_ok());
    }

    #[tokio::test]
    async fn test_stop_before_first_frame() {
        let spinner = Spinner::start();

        let stopped = timeout(Duration::from_secs(1), spinner.stop()).await;

        assert!(stopped.is_ok());
    }

    #[tokio::test]
    async fn test_drop_aborts_the_task() {
        let spinner = Spinner::start();

        drop(spinner);
        sleep(Duration::from_millis(50)).await;
    }
}
