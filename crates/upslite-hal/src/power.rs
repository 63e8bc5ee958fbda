//! Power management
//!
//! Orderly system shutdown once the battery is exhausted.

use crate::{HalError, Result};
use std::process::Command;

/// Host shutdown primitive
pub trait ShutdownAction: Send + Sync {
    /// Ask the system to power off. Returns once the request has been issued.
    fn shutdown(&self) -> Result<()>;
}

/// Shuts the machine down through the system's `shutdown` command
#[derive(Debug, Clone)]
pub struct SystemPower {
    program: String,
    args: Vec<String>,
}

impl SystemPower {
    /// `shutdown -h now`
    pub fn new() -> Self {
        Self::with_command("shutdown", &["-h", "now"])
    }

    /// Use a different power-off command, e.g. `halt -p`
    pub fn with_command(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Default for SystemPower {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownAction for SystemPower {
    fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down system...");

        // Flush filesystems before the power goes
        nix::unistd::sync();

        let output = Command::new(&self.program).args(&self.args).output()?;
        if !output.status.success() {
            return Err(HalError::Shutdown(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let power = SystemPower::default();
        assert_eq!(power.program(), "shutdown");
        assert_eq!(power.args(), ["-h", "now"]);
    }

    #[test]
    fn test_failing_command_is_reported() {
        let power = SystemPower::with_command("false", &[]);
        assert!(matches!(power.shutdown(), Err(HalError::Shutdown(_))));
    }

    #[test]
    fn test_missing_command_is_io_error() {
        let power = SystemPower::with_command("/nonexistent/upslite-poweroff", &[]);
        assert!(matches!(power.shutdown(), Err(HalError::Io(_))));
    }

    #[test]
    fn test_successful_command() {
        let power = SystemPower::with_command("true", &[]);
        assert!(power.shutdown().is_ok());
    }
}
