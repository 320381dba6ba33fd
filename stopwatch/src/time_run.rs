// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Run a command once and measure how long it takes, from just before the
//! spawn to just after the wait.

use std::{
    io,
    process::ExitCode,
    time::{Duration, Instant},
};

use thiserror::Error;

use crate::{command::TargetCommand, measurement::RunMeasurement};

/// The `stopwatch` utility runs a single command through the shell and reports
/// the wall-clock time it took.
///
/// There is no timeout: the run lasts as long as the command does. A command
/// that exits with a non-zero status is still timed normally; only failing to
/// launch it is an error.
#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Time {
    /// Output the measurement as JSON rather than a human-readable line
    #[arg(long)]
    pub json: bool,
    /// Command to run, passed to the shell as-is
    #[arg(default_value = crate::command::DEFAULT_COMMAND)]
    pub command: String,
}

/// Failure to get the command running. Once the command has started, nothing
/// it does is an error.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The shell itself could not be started.
    #[error("could not launch `{command}`: {source}")]
    Spawn {
        /// The command that was being launched.
        command: TargetCommand,
        /// The underlying OS error.
        source: io::Error,
    },
    /// Waiting for the child failed.
    #[error("could not wait for `{command}`: {source}")]
    Wait {
        /// The command that was running.
        command: TargetCommand,
        /// The underlying OS error.
        source: io::Error,
    },
    /// The shell reported that the command does not exist.
    ///
    /// This is detected from the shell's exit status, so a command that starts
    /// and then itself exits 127 is also reported here and its timing is
    /// discarded. [`LaunchError::NotExecutable`] has the same caveat for 126.
    #[error("command not found: `{command}`")]
    NotFound {
        /// The command that was not found.
        command: TargetCommand,
    },
    /// The shell found the command but could not execute it.
    #[error("command not executable: `{command}`")]
    NotExecutable {
        /// The command that could not be executed.
        command: TargetCommand,
    },
}

impl LaunchError {
    /// Exit status to use for this error, following `timeout(1)`.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            LaunchError::NotFound { .. } => ExitCode::from(127),
            _ => ExitCode::from(126),
        }
    }
}

/// CPU time used by waited-for children so far.
#[derive(Debug, Clone, Copy, Default)]
struct ChildUsage {
    user: Duration,
    sys: Duration,
}

#[cfg(unix)]
fn child_usage() -> ChildUsage {
    use nix::sys::{
        resource::{getrusage, UsageWho},
        time::TimeVal,
    };

    fn time_val_to_duration(time: TimeVal) -> Duration {
        Duration::from_secs(time.tv_sec() as u64) + Duration::from_micros(time.tv_usec() as u64)
    }

    match getrusage(UsageWho::RUSAGE_CHILDREN) {
        Ok(usage) => ChildUsage {
            user: time_val_to_duration(usage.user_time()),
            sys: time_val_to_duration(usage.system_time()),
        },
        Err(err) => {
            log::warn!("getrusage failed: {err}");
            ChildUsage::default()
        }
    }
}

#[cfg(not(unix))]
fn child_usage() -> ChildUsage {
    ChildUsage::default()
}

impl ChildUsage {
    /// Usage accumulated between `before` and `self`.
    fn since(self, before: ChildUsage) -> ChildUsage {
        ChildUsage {
            user: self.user.saturating_sub(before.user),
            sys: self.sys.saturating_sub(before.sys),
        }
    }
}

impl Time {
    /// Create a new timing config for library use.
    pub fn new<S: Into<String>>(command: S) -> Self {
        Self {
            json: false,
            command: command.into(),
        }
    }

    /// Run the command once, blocking until it exits, and measure it.
    ///
    /// The child inherits stdin, stdout and stderr, so anything it prints
    /// appears between the caller's own output.
    pub fn run(&self) -> Result<RunMeasurement, LaunchError> {
        let command = TargetCommand::new(self.command.as_str());
        let mut cmd = command.to_command();
        log::debug!("running {cmd:?}");

        let usage_before = child_usage();
        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            command: command.clone(),
            source,
        })?;
        let status = child.wait().map_err(|source| LaunchError::Wait {
            command: command.clone(),
            source,
        })?;
        let real_time = start.elapsed();
        let usage = child_usage().since(usage_before);

        let exit_code = status.code();
        log::info!(
            "exit status {exit_code:?}, user {:0.3}s, sys {:0.3}s",
            usage.user.as_secs_f64(),
            usage.sys.as_secs_f64()
        );
        if let Some(code) = exit_code {
            if TargetCommand::is_not_found_status(code) {
                return Err(LaunchError::NotFound { command });
            }
            if TargetCommand::is_not_executable_status(code) {
                return Err(LaunchError::NotExecutable { command });
            }
        }

        Ok(RunMeasurement {
            command,
            real_time,
            user_time: usage.user,
            sys_time: usage.sys,
            exit_code,
        })
    }

    /// Run `stopwatch` with the arguments in `self`: announce the command,
    /// time it, and print the report. Returns the exit status for the
    /// binary.
    pub fn exec(&self) -> ExitCode {
        println!("Running: {}", self.command);
        match self.run() {
            Ok(measurement) => {
                if self.json {
                    println!("{}", measurement.to_json());
                } else {
                    measurement.print();
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err}");
                err.exit_code()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_default_command() {
        let app = Time::parse_from(["stopwatch"]);
        assert_eq!(app.command, crate::command::DEFAULT_COMMAND);
        assert!(!app.json);
    }

    #[test]
    fn test_command_with_args_is_one_string() {
        let app = Time::parse_from(["stopwatch", "--json", "ls -la | wc -l"]);
        assert_eq!(app.command, "ls -la | wc -l");
        assert!(app.json);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_true() {
        let m = Time::new("true").run().expect("could not run true");
        assert!(m.success());
        assert_eq!(m.command.as_str(), "true");
    }

    #[cfg(unix)]
    #[test]
    fn test_measures_sleep() {
        let m = Time::new("sleep 0.2").run().unwrap();
        assert!(m.real_time >= Duration::from_millis(200), "{m:?}");
        assert!(m.elapsed_s() >= 0.2);
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let m = Time::new("exit 3").run().unwrap();
        assert_eq!(m.exit_code, Some(3));
        assert!(!m.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_not_found() {
        let err = Time::new("this_binary_does_not_exist_xyz").run().unwrap_err();
        assert!(matches!(err, LaunchError::NotFound { .. }), "{err:?}");
        assert_eq!(err.exit_code(), ExitCode::from(127));
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_status_taken_as_launch_failure() {
        // indistinguishable from a missing command once it reaches the shell
        let err = Time::new("exit 127").run().unwrap_err();
        assert!(matches!(err, LaunchError::NotFound { .. }), "{err:?}");
        let err = Time::new("exit 126").run().unwrap_err();
        assert!(matches!(err, LaunchError::NotExecutable { .. }), "{err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_are_independent() {
        let time = Time::new("true");
        let first = time.run().unwrap();
        let second = time.run().unwrap();
        assert!(first.success() && second.success());
        assert_eq!(first.command, second.command);
    }
}
