//! Menu-driven flashing state machine
//!
//! ```text
//! SelectingChoice -> ResolvingParameters -> Erasing -> Writing -> Done
//! SelectingChoice -> Erasing -> Done                   (erase only)
//! SelectingChoice -> Updating -> SelectingChoice
//! SelectingChoice -> Exit
//! ```
//!
//! A preselected choice is consumed once and makes the session
//! non-interactive: anything that would send an interactive session back to
//! the menu ends it instead.

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;

use easyinstall_core::board::BoardChoice;
use easyinstall_core::flasher::Flasher;
use easyinstall_core::menu::{render_menu, MenuAction};
use easyinstall_core::prereqs::ResolvedPrerequisites;
use easyinstall_core::retry::{retry, RetryPolicy};
use easyinstall_core::CoreError;
use easyinstall_firmware::layout::SlotLookup;
use easyinstall_firmware::{FirmwareError, UpdateCoordinator};
use easyinstall_serial::{discover, DeviceHandle, DiscoveryError, PortLister, VendorSignature};

use crate::error::FlashError;
use crate::operator::Operator;
use crate::session::FlashSession;

/// How long a preselected choice can still be cancelled
pub const PRESELECT_WINDOW: Duration = Duration::from_secs(5);

/// Replaces the cached firmware and returns the new prerequisites
pub trait Refresh {
    /// Run the update
    fn refresh(&mut self) -> Result<ResolvedPrerequisites, FirmwareError>;
}

impl Refresh for UpdateCoordinator<'_> {
    fn refresh(&mut self) -> Result<ResolvedPrerequisites, FirmwareError> {
        self.run()
    }
}

/// How a session ended without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A firmware was written
    Flashed {
        /// Board display name
        board: &'static str,
        /// Firmware name
        firmware: &'static str,
        /// Flasher invocations, including retries
        attempts: u32,
    },
    /// The flash was erased
    Erased {
        /// Serial port
        port: String,
    },
    /// Firmware was updated (non-interactive sessions only)
    Updated,
    /// The operator chose to exit
    Exited,
}

/// Drives one session from menu selection to a flashed board
pub struct Orchestrator<'a> {
    flasher: &'a mut dyn Flasher,
    ports: &'a dyn PortLister,
    operator: &'a mut dyn Operator,
    refresher: &'a mut dyn Refresh,
    prereqs: ResolvedPrerequisites,
    asset_root: PathBuf,
    serial_port: Option<String>,
    preselect: Option<i64>,
    interactive: bool,
    retry: RetryPolicy,
    preselect_window: Duration,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator
    ///
    /// `asset_root` is where the bundled images live. `prereqs` is the result
    /// of the startup prerequisite check.
    pub fn new(
        flasher: &'a mut dyn Flasher,
        ports: &'a dyn PortLister,
        operator: &'a mut dyn Operator,
        refresher: &'a mut dyn Refresh,
        prereqs: ResolvedPrerequisites,
        asset_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            flasher,
            ports,
            operator,
            refresher,
            prereqs,
            asset_root: asset_root.into(),
            serial_port: None,
            preselect: None,
            interactive: true,
            retry: RetryPolicy::DEFAULT,
            preselect_window: PRESELECT_WINDOW,
        }
    }

    /// Use this port instead of discovering one (empty means discover)
    pub fn with_serial_port(mut self, port: Option<String>) -> Self {
        self.serial_port = port.filter(|p| !p.is_empty());
        self
    }

    /// Run this menu choice without showing the menu
    pub fn with_preselect(mut self, choice: Option<i64>) -> Self {
        self.preselect = choice;
        self
    }

    /// Override the retry policy used for erase and write
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Override the cancellation window for a preselected choice
    pub fn with_preselect_window(mut self, window: Duration) -> Self {
        self.preselect_window = window;
        self
    }

    /// Prerequisites currently in use
    pub fn prerequisites(&self) -> &ResolvedPrerequisites {
        &self.prereqs
    }

    /// Run until something is flashed, the operator exits, or an error ends
    /// the session
    ///
    /// An interactive update goes back to the menu. A preselected update has
    /// no menu to return to, so it ends the session with [`Outcome::Updated`]
    /// instead of updating again.
    pub fn run(&mut self) -> Result<Outcome, FlashError> {
        loop {
            let action = self.select()?;
            log::debug!("Selected {:?}", action);

            let result = match action {
                MenuAction::Flash(board) => self.flash(board),
                MenuAction::Erase => self.erase_only(),
                MenuAction::Update => {
                    self.update()?;
                    if self.interactive {
                        continue;
                    }
                    return Ok(Outcome::Updated);
                }
                MenuAction::Exit => {
                    println!("Exiting!");
                    return Ok(Outcome::Exited);
                }
            };

            match result {
                Err(FlashError::Discovery(DiscoveryError::NotFound)) if self.interactive => {
                    print_no_device();
                }
                other => return other,
            }
        }
    }

    /// SelectingChoice
    fn select(&mut self) -> Result<MenuAction, FlashError> {
        let choice = match self.preselect.take() {
            Some(choice) => {
                self.interactive = false;
                println!(
                    "{}",
                    format!("You have preselected option {}", choice).blue()
                );
                println!("If you didn't mean to do this, CTRL-C now!");
                println!(
                    "Waiting {} seconds before continuing...",
                    self.preselect_window.as_secs()
                );
                let proceed = self
                    .operator
                    .confirm_preselection(choice, self.preselect_window)
                    .map_err(FlashError::Operator)?;
                if !proceed {
                    return Err(FlashError::Cancelled);
                }
                choice
            }
            None => {
                self.interactive = true;
                self.operator
                    .prompt_choice(&render_menu())
                    .map_err(FlashError::Operator)?
            }
        };

        MenuAction::try_from(choice).map_err(|e| {
            println!("{}", "Invalid option!".red());
            FlashError::Core(e)
        })
    }

    fn discover(&self) -> Result<DeviceHandle, FlashError> {
        let device = discover(self.serial_port.as_deref(), self.ports)?;
        if device.signature != VendorSignature::Skipped {
            println!("{}", device.signature.hint().blue());
        }
        Ok(device)
    }

    /// ResolvingParameters, Erasing, Writing
    fn flash(&mut self, board: BoardChoice) -> Result<Outcome, FlashError> {
        let device = self.discover()?;

        let profile = board
            .profile(&self.prereqs, &self.asset_root)
            .map_err(|e| match e {
                CoreError::MissingFirmware(slot) => FlashError::MissingFirmware {
                    slot,
                    pattern: SlotLookup::for_slot(slot).as_str(),
                },
                other => FlashError::Core(other),
            })?;
        profile.validate()?;
        let (board_name, firmware) = (profile.board, profile.firmware);

        let mut session = FlashSession::for_profile(profile, device);
        self.erase(&mut session)?;

        if let Some(write) = session.write_params() {
            let args = write.to_args();
            let message = format!("Flashing {} on {}", firmware, board_name);
            let attempts = self.run_flasher("write", &session.target(), &args, &message)?;
            session.add_attempts(attempts);
        }

        println!(
            "{}",
            format!("{} has been flashed with {}", board_name, firmware).green()
        );
        Ok(Outcome::Flashed {
            board: board_name,
            firmware,
            attempts: session.attempts(),
        })
    }

    /// Erase-only path
    fn erase_only(&mut self) -> Result<Outcome, FlashError> {
        let device = self.discover()?;
        let mut session = FlashSession::erase_only(device);
        self.erase(&mut session)?;

        println!("{}", "Flash erased".green());
        Ok(Outcome::Erased {
            port: session.device().port.clone(),
        })
    }

    /// Erasing
    fn erase(&mut self, session: &mut FlashSession) -> Result<(), FlashError> {
        let args = session.erase_params().to_args();
        let attempts =
            self.run_flasher("erase", &session.target(), &args, "Erasing firmware...")?;
        session.add_attempts(attempts);
        Ok(())
    }

    /// Updating
    fn update(&mut self) -> Result<(), FlashError> {
        println!("Updating all firmware files...");
        self.prereqs = self.refresher.refresh()?;
        println!("{}", "Firmware files updated".green());
        Ok(())
    }

    /// One flasher operation under the retry policy; returns the attempts used
    fn run_flasher(
        &mut self,
        operation: &'static str,
        target: &str,
        args: &[String],
        message: &str,
    ) -> Result<u32, FlashError> {
        let flasher = &mut *self.flasher;
        let mut used = 0;
        let result = retry(&self.retry, |attempt| {
            used = attempt;
            println!("{}", message);
            flasher.run(args).map_err(|e| {
                println!("{}", e.to_string().red());
                e
            })
        });

        match result {
            Ok(()) => Ok(used),
            Err(exhausted) => {
                println!(
                    "{}",
                    format!("Could not complete the operation on {}", target).red()
                );
                Err(FlashError::RetriesExhausted {
                    operation,
                    target: target.to_string(),
                    attempts: exhausted.attempts,
                    last: exhausted.last,
                })
            }
        }
    }
}

fn print_no_device() {
    println!("{}", "No ESP32 device was detected!".red());
    println!(
        "{}",
        "Please plug in a Flipper WiFi devboard or an ESP32 chip and try again".red()
    );
}
