//! Repository sync capability
//!
//! Only four git operations are needed: clone into an empty directory, and
//! `reset --hard` / `clean -xdf` / `pull` on an existing checkout.

use std::path::Path;
use std::process::Command;

use crate::error::SyncError;

/// Git-like repository operations
pub trait RepoSync {
    /// Clone `url` into `dir` (which exists and is empty)
    fn clone_repo(&self, url: &str, dir: &Path) -> Result<(), SyncError>;

    /// Discard local modifications
    fn reset_hard(&self, dir: &Path) -> Result<(), SyncError>;

    /// Remove untracked and ignored files
    fn clean(&self, dir: &Path) -> Result<(), SyncError>;

    /// Fetch and merge from the origin remote
    fn pull(&self, dir: &Path) -> Result<(), SyncError>;
}

/// [`RepoSync`] backed by the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Use `git` from `PATH`
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> Command {
        Command::new(&self.program)
    }

    fn run(&self, mut cmd: Command, command: String) -> Result<(), SyncError> {
        log::debug!("Running {:?}", cmd);

        let output = cmd.output().map_err(|e| SyncError::Spawn {
            program: self.program.clone(),
            source: e,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SyncError::Failed {
                command,
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(())
    }

    fn run_in(&self, dir: &Path, args: &[&str]) -> Result<(), SyncError> {
        let mut cmd = self.command();
        cmd.arg("-C").arg(dir).args(args);
        self.run(cmd, args.join(" "))
    }
}

impl RepoSync for GitCli {
    fn clone_repo(&self, url: &str, dir: &Path) -> Result<(), SyncError> {
        let mut cmd = self.command();
        cmd.arg("clone").arg(url).arg(dir);
        self.run(cmd, format!("clone {}", url))
    }

    fn reset_hard(&self, dir: &Path) -> Result<(), SyncError> {
        self.run_in(dir, &["reset", "--hard"])
    }

    fn clean(&self, dir: &Path) -> Result<(), SyncError> {
        self.run_in(dir, &["clean", "-xdf"])
    }

    fn pull(&self, dir: &Path) -> Result<(), SyncError> {
        self.run_in(dir, &["pull"])
    }
}
