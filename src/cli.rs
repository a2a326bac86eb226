//! CLI argument parsing

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "easyinstall")]
#[command(
    author,
    version,
    about = "Flash Marauder, Evil Portal and Blackmagic firmware onto ESP32 boards",
    long_about = None
)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Serial port of the board (autodetected when empty)
    #[arg(short = 's', long = "serialport", default_value = "")]
    pub serial_port: String,

    /// Menu choice to run without prompting (also accepted as -ps N)
    #[arg(long, alias = "ps", allow_negative_numbers = true)]
    pub preselect: Option<i64>,

    /// Directory holding the firmware caches and bundled images
    #[arg(short = 'C', long, default_value = ".")]
    pub workdir: PathBuf,

    /// esptool executable
    #[arg(long, default_value = "esptool.py")]
    pub esptool: String,

    /// Print the esptool invocations instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Use the firmware already on disk instead of syncing and downloading
    #[arg(long)]
    pub skip_prereqs: bool,

    /// List the flashable boards and exit
    #[arg(long)]
    pub list_boards: bool,

    /// List serial ports and the vendor recognised on each, then exit
    #[arg(long)]
    pub list_ports: bool,
}

/// Rewrite the single-dash `-ps` spelling into `--preselect`
///
/// clap only takes one character after a single dash, so `-ps 4` and
/// `-ps=4` are mapped before parsing.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-ps") => OsString::from("--preselect"),
            Some(s) => match s.strip_prefix("-ps=") {
                Some(value) => OsString::from(format!("--preselect={}", value)),
                None => arg,
            },
            None => arg,
        })
        .collect()
}
