//! Terminal session machinery.
//!
//! Raw-mode lifecycle, the busy indicator, and the controller that
//! brackets each exchange with both.

pub mod raw_mode;
pub mod session;
pub mod spinner;

pub use session::SessionController;
