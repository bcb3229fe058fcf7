use std::process::Command;

use crate::error::{Error, Result};

/// Something that answers tracker subcommands with text.
pub trait Tracker {
    fn run(&self, subcommand: &str, strip: bool) -> Result<String>;
}

/// Runs the real tracker binary under the C locale so dates and durations
/// print the same way regardless of the user's settings.
pub struct TrackerCli {
    program: String,
}

impl TrackerCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Tracker for TrackerCli {
    fn run(&self, subcommand: &str, strip: bool) -> Result<String> {
        log::debug!("running {} {}", self.program, subcommand);
        let output = Command::new(&self.program)
            .args(subcommand.split_whitespace())
            .env("LC_ALL", "C")
            .output()
            .map_err(|e| Error::gateway(subcommand, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = match stderr.trim() {
                "" => output.status.to_string(),
                text => format!("{}: {}", output.status, text),
            };
            return Err(Error::gateway(subcommand, detail));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(if strip {
            text.trim().to_string()
        } else {
            text.into_owned()
        })
    }
}
