//! The person at the keyboard

use std::io;
use std::time::Duration;

/// Interaction points of a flashing session
pub trait Operator {
    /// Show `menu` and block until an integer is entered
    fn prompt_choice(&mut self, menu: &str) -> io::Result<i64>;

    /// Give the operator `window` to cancel a preselected choice
    ///
    /// Returns `false` if the operator cancelled.
    fn confirm_preselection(&mut self, choice: i64, window: Duration) -> io::Result<bool>;
}
