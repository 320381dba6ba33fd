// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The command being timed and how it is handed to the platform shell.
//!
//! The command is an uninterpreted string: it is passed to `sh -c` (or
//! `cmd /C` on Windows) as-is, so it may carry arguments, pipes, globs and
//! variable expansions. Quoting is the caller's responsibility.

use std::{fmt, process::Command};

use serde::{Deserialize, Serialize};

/// Command run when none is given on the command line.
pub const DEFAULT_COMMAND: &str = "./test_rej_uniform_sve";

/// A command line to run through the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetCommand(String);

impl TargetCommand {
    /// Wrap a command string.
    pub fn new<S: Into<String>>(cmd: S) -> Self {
        Self(cmd.into())
    }

    /// The command string exactly as it will be given to the shell.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a [`Command`] that runs this command line through the shell.
    ///
    /// Standard streams are inherited from the current process.
    pub fn to_command(&self) -> Command {
        let (shell, flag) = shell();
        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(&self.0);
        cmd
    }

    /// Whether `code`, as returned by the shell, means the command could not
    /// be found.
    pub(crate) fn is_not_found_status(code: i32) -> bool {
        if cfg!(windows) {
            code == 9009
        } else {
            code == 127
        }
    }

    /// Whether `code`, as returned by the shell, means the command was found
    /// but could not be executed.
    pub(crate) fn is_not_executable_status(code: i32) -> bool {
        !cfg!(windows) && code == 126
    }
}

impl Default for TargetCommand {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND)
    }
}

impl fmt::Display for TargetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetCommand {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

fn shell() -> (&'static str, &'static str) {
    if cfg!(windows) {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_placeholder() {
        assert_eq!(TargetCommand::default().as_str(), DEFAULT_COMMAND);
    }

    #[test]
    fn display_is_verbatim() {
        let cmd = TargetCommand::new("echo hi | tr a-z A-Z");
        insta::assert_snapshot!(cmd.to_string(), @"echo hi | tr a-z A-Z");
    }

    #[cfg(unix)]
    #[test]
    fn runs_through_sh() {
        let cmd = TargetCommand::new("ls -l *.rs").to_command();
        assert_eq!(cmd.get_program(), "sh");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["-c", "ls -l *.rs"]);
    }

    #[cfg(unix)]
    #[test]
    fn shell_launch_statuses() {
        assert!(TargetCommand::is_not_found_status(127));
        assert!(TargetCommand::is_not_executable_status(126));
        for code in [0, 1, 2, 125, 128] {
            assert!(!TargetCommand::is_not_found_status(code));
            assert!(!TargetCommand::is_not_executable_status(code));
        }
    }
}
