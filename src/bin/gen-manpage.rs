//! Writes the easyinstall(1) man page
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]
//!
//! Besides the sections clap_mangen derives from the CLI, the page documents
//! the exit codes and the directories kept under the working directory.

use std::fs;
use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_mangen::roff::{bold, italic, roman, Roff};
use clap_mangen::Man;
use easyinstall_firmware::layout::{
    EVIL_PORTAL_DIR, EVIL_PORTAL_S2_FILE, EVIL_PORTAL_WROOM_FILE, EXTRA_BINS_DIR,
    EXTRA_BINS_REPO, MARAUDER_DIR, MARAUDER_RELEASES_SUBDIR,
};

#[path = "../cli.rs"]
#[allow(dead_code)]
mod cli;

const EXIT_CODES: &[(&str, &str)] = &[
    ("0", "Flashed, erased, updated, exited from the menu, or a --list option ran."),
    ("1", "Firmware sync, download, filesystem or operator I/O failure."),
    ("2", "The menu choice is not between 1 and 18."),
    ("3", "No ESP32 was detected in a preselected session."),
    ("4", "esptool kept failing after 3 attempts."),
    ("5", "A firmware image needed by the chosen board is missing."),
    ("130", "Cancelled with Ctrl-C."),
];

fn exit_status_section(roff: &mut Roff) {
    roff.control("SH", ["EXIT STATUS"]);
    for (code, meaning) in EXIT_CODES {
        roff.control("TP", []).text([bold(*code)]).text([roman(*meaning)]);
    }
}

fn files_section(roff: &mut Roff) {
    let releases = format!("{}/{}/", MARAUDER_DIR, MARAUDER_RELEASES_SUBDIR);
    let portal = format!("{}/", EVIL_PORTAL_DIR);
    let mirror = format!("{}/", EXTRA_BINS_DIR);
    let portal_files = format!("{} and {}", EVIL_PORTAL_WROOM_FILE, EVIL_PORTAL_S2_FILE);

    roff.control("SH", ["FILES"]);
    roff.text([
        roman("All paths are relative to the directory given with "),
        bold("--workdir"),
        roman("."),
    ]);
    roff.control("TP", [])
        .text([italic(mirror.as_str())])
        .text([roman("Clone of "), roman(EXTRA_BINS_REPO), roman(", refreshed on update.")]);
    roff.control("TP", [])
        .text([italic(releases.as_str())])
        .text([roman(
            "Assets of the latest ESP32 Marauder release. The newest matching file is flashed.",
        )]);
    roff.control("TP", [])
        .text([italic(portal.as_str())])
        .text([roman("Evil Portal images "), roman(portal_files.as_str()), roman(".")]);
}

fn render_page() -> io::Result<Vec<u8>> {
    let man = Man::new(cli::Cli::command());
    let mut buffer = Vec::new();

    man.render_title(&mut buffer)?;
    man.render_name_section(&mut buffer)?;
    man.render_synopsis_section(&mut buffer)?;
    man.render_description_section(&mut buffer)?;
    man.render_options_section(&mut buffer)?;

    let mut extra = Roff::new();
    exit_status_section(&mut extra);
    files_section(&mut extra);
    extra.to_writer(&mut buffer)?;

    man.render_version_section(&mut buffer)?;
    Ok(buffer)
}

fn main() -> io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    fs::create_dir_all(&output_dir)?;

    let output_path = output_dir.join("easyinstall.1");
    fs::write(&output_path, render_page()?)?;

    println!("Man page generated at: {}", output_path.display());
    println!("  man -l {}", output_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_documents_exit_codes_and_files() {
        let page = String::from_utf8(render_page().unwrap()).unwrap();
        assert!(page.contains("EXIT STATUS"));
        assert!(page.contains("130"));
        assert!(page.contains("FILES"));
        assert!(page.contains(EXTRA_BINS_DIR));
        assert!(page.contains(EVIL_PORTAL_WROOM_FILE));
        assert!(page.contains("serialport"));
    }
}
