//! Terminal operator: menu prompt and preselection countdown

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use dialoguer::Input;
use easyinstall_flash::Operator;
use indicatif::{ProgressBar, ProgressStyle};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Ctrl-C state shared with the signal handler
///
/// While a countdown is armed, Ctrl-C cancels the preselection instead of
/// ending the program.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    armed: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called from the Ctrl-C handler
    ///
    /// Returns `false` if no countdown was running.
    pub fn interrupt(&self) -> bool {
        if self.armed.load(Ordering::SeqCst) {
            self.cancelled.store(true, Ordering::SeqCst);
            true
        } else {
            false
        }
    }

    fn arm(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
    }

    fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Operator at an interactive terminal
pub struct TerminalOperator {
    cancel: CancelFlag,
}

impl TerminalOperator {
    pub fn new(cancel: CancelFlag) -> Self {
        Self { cancel }
    }

    /// Run the countdown bar; `false` if cancelled before it ran out
    fn countdown(&self, choice: i64, window: Duration) -> io::Result<bool> {
        let pb = ProgressBar::new(window.as_secs().max(1));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{bar:30.cyan/blue}] {pos}/{len}s")
                .map_err(io::Error::other)?
                .progress_chars("#>-"),
        );
        pb.set_message(format!("Running option {} (Ctrl-C to cancel)", choice));

        self.cancel.arm();
        let start = Instant::now();
        let confirmed = loop {
            if self.cancel.is_cancelled() {
                break false;
            }
            let elapsed = start.elapsed();
            if elapsed >= window {
                break true;
            }
            pb.set_position(elapsed.as_secs());
            thread::sleep(POLL_INTERVAL.min(window - elapsed));
        };
        self.cancel.disarm();

        if confirmed {
            pb.finish_and_clear();
        } else {
            pb.abandon_with_message("Cancelled");
        }
        Ok(confirmed)
    }
}

impl Operator for TerminalOperator {
    fn prompt_choice(&mut self, menu: &str) -> io::Result<i64> {
        println!("{}", menu);
        Input::<i64>::new()
            .with_prompt("Please enter the number of your choice")
            .interact_text()
            .map_err(io::Error::other)
    }

    fn confirm_preselection(&mut self, choice: i64, window: Duration) -> io::Result<bool> {
        self.countdown(choice, window)
    }
}
