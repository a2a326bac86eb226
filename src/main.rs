//! easyinstall - Flash prebuilt firmware onto ESP32 boards
//!
//! Presents a numbered menu of Marauder, Evil Portal and Blackmagic builds,
//! finds the board on a serial port, then erases and writes it with esptool.
//!
//! # Working directory
//!
//! Everything is relative to `--workdir`:
//!
//! - `Extra_ESP32_Bins/` - git clone of the extra binaries repository
//! - `ESP32Marauder/releases/` - latest Marauder release assets
//! - `EvilPortal/` - Evil Portal images
//! - `Marauder/`, `Blackmagic/` - bundled bootloaders and partition tables

mod cli;
mod commands;
mod operator;

use std::process;

use clap::Parser;
use colored::Colorize;
use easyinstall_core::prereqs::ResolvedPrerequisites;
use easyinstall_firmware::{
    resolve_local, FirmwareError, FirmwareLayout, GitCli, HttpFetcher, Prerequisites,
    UpdateCoordinator,
};
use easyinstall_flash::{open_flasher, FlashError, Orchestrator, Outcome};
use easyinstall_serial::SystemPorts;

use cli::Cli;
use operator::{CancelFlag, TerminalOperator};

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse_from(cli::normalize_args(std::env::args_os()));

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if !handler_flag.interrupt() {
            println!();
            process::exit(130);
        }
    }) {
        log::warn!("Failed to set Ctrl-C handler: {}", e);
    }

    match run(cli, cancel) {
        Ok(outcome) => log::debug!("Session ended: {:?}", outcome),
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            process::exit(e.exit_code());
        }
    }
}

fn run(cli: Cli, cancel: CancelFlag) -> Result<Outcome, FlashError> {
    if cli.list_boards {
        commands::list_boards();
        return Ok(Outcome::Exited);
    }
    if cli.list_ports {
        commands::list_ports(&SystemPorts)?;
        return Ok(Outcome::Exited);
    }

    let layout = FirmwareLayout::new(&cli.workdir);
    let git = GitCli::new();
    let http = HttpFetcher::new().map_err(FirmwareError::from)?;

    let prereqs = load_prerequisites(&layout, &git, &http, cli.skip_prereqs)?;
    for slot in prereqs.missing() {
        log::warn!("No {} firmware found", slot);
    }

    let flasher_name = if cli.dry_run { "dummy" } else { "esptool" };
    let mut flasher = open_flasher(flasher_name, &cli.esptool)?;
    let mut updater = UpdateCoordinator::new(layout.clone(), &git, &http);
    let mut operator = TerminalOperator::new(cancel);

    let serial_port = Some(cli.serial_port).filter(|p| !p.is_empty());

    let outcome = Orchestrator::new(
        &mut *flasher,
        &SystemPorts,
        &mut operator,
        &mut updater,
        prereqs,
        layout.root(),
    )
    .with_serial_port(serial_port)
    .with_preselect(cli.preselect)
    .run()?;

    Ok(outcome)
}

fn load_prerequisites(
    layout: &FirmwareLayout,
    git: &GitCli,
    http: &HttpFetcher,
    skip_sync: bool,
) -> Result<ResolvedPrerequisites, FirmwareError> {
    if skip_sync {
        log::info!("Using firmware already in {}", layout.root().display());
        return resolve_local(layout);
    }
    println!("Checking for and installing prerequisites...");
    Prerequisites::new(layout, git, http).resolve()
}
